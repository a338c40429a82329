//! Native editor window
//!
//! Draws the [`PlayerEditor`] panel with egui and forwards clicks to it.
//! The editor owns every label, colour and bound; this module only
//! translates them.

mod chooser;

use std::time::Duration;

use eframe::egui;
use log::info;

use crate::config::PlayerConfig;
use crate::editor::{Colour, PlayerEditor, Rectangle, TextButton};
use crate::engine::io::FormatManager;
use crate::engine::output::{open_output, AudioOutput};
use crate::engine::transport::AudioTransport;
use crate::error::{Result, WavdeckError};

pub use chooser::RfdChooser;

/// Which of the three buttons was clicked this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Click {
    Open,
    Play,
    Stop,
}

pub struct PlayerApp {
    editor: PlayerEditor<AudioTransport>,
    chooser: RfdChooser,
    poll_interval: Duration,
    // Kept alive for the lifetime of the window
    _output: Box<dyn AudioOutput>,
}

impl PlayerApp {
    pub fn new(
        editor: PlayerEditor<AudioTransport>,
        chooser: RfdChooser,
        output: Box<dyn AudioOutput>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            editor,
            chooser,
            poll_interval,
            _output: output,
        }
    }
}

impl eframe::App for PlayerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.editor.poll();

        let screen = ctx.screen_rect();
        self.editor
            .set_size(screen.width() as u32, screen.height() as u32);

        let background = to_color32(self.editor.background_colour());
        let mut click = None;

        egui::CentralPanel::default()
            .frame(egui::Frame::default().fill(background))
            .show(ctx, |ui| {
                let origin = ui.max_rect().min;
                let buttons = [
                    (Click::Open, self.editor.open_button()),
                    (Click::Play, self.editor.play_button()),
                    (Click::Stop, self.editor.stop_button()),
                ];
                for (id, button) in buttons {
                    if draw_button(ui, origin, button).clicked() {
                        click = Some(id);
                    }
                }
            });

        match click {
            Some(Click::Open) => self.editor.open_button_clicked(&mut self.chooser),
            Some(Click::Play) => self.editor.play_button_clicked(),
            Some(Click::Stop) => self.editor.stop_button_clicked(),
            None => {}
        }

        // Transport notifications arrive from the output thread; keep looking
        ctx.request_repaint_after(self.poll_interval);
    }
}

/// Open the editor window and block until it is closed
pub fn run(config: &PlayerConfig) -> Result<()> {
    let transport = AudioTransport::new();
    transport.set_gain(config.gain);
    let output = open_output(&config.output, &transport)?;

    let editor = PlayerEditor::new(transport, FormatManager::with_basic_formats(), config);
    let (width, height) = editor.size();
    let poll_interval = Duration::from_millis(config.editor.poll_interval_ms.max(1));

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([width as f32, height as f32])
            .with_title("wavdeck"),
        ..Default::default()
    };

    info!("Opening editor window {}x{}", width, height);
    eframe::run_native(
        "wavdeck",
        native_options,
        Box::new(move |cc| {
            let chooser = RfdChooser::new(cc.egui_ctx.clone());
            Ok(Box::new(PlayerApp::new(editor, chooser, output, poll_interval)))
        }),
    )
    .map_err(|e| WavdeckError::Window {
        reason: e.to_string(),
    })
}

fn draw_button(ui: &mut egui::Ui, origin: egui::Pos2, button: &TextButton) -> egui::Response {
    let rect = to_rect(origin, button.bounds());
    let mut widget = egui::Button::new(button.label()).min_size(rect.size());
    if let Some(colour) = button.colour() {
        widget = widget.fill(to_color32(colour));
    }
    let enabled = button.is_enabled();
    ui.put(rect, move |ui: &mut egui::Ui| ui.add_enabled(enabled, widget))
}

fn to_rect(origin: egui::Pos2, bounds: Rectangle) -> egui::Rect {
    egui::Rect::from_min_size(
        origin + egui::vec2(bounds.x as f32, bounds.y as f32),
        egui::vec2(bounds.width as f32, bounds.height as f32),
    )
}

fn to_color32(colour: Colour) -> egui::Color32 {
    egui::Color32::from_rgb(colour.r, colour.g, colour.b)
}
