//! Player Editor
//!
//! The Open/Play/Stop panel and the transport state machine behind it.
//!
//! Two kinds of input move the machine: button clicks, and change
//! notifications from the transport. Clicks request a transitional state
//! (`Starting`, `Pausing`, `Stopping`) and issue the matching engine call;
//! the notification that follows settles it (`Playing`, `Paused`,
//! `Stopped`). Every change goes through [`PlayerEditor::change_state`],
//! which does nothing when asked for the state it is already in, so the
//! engine never sees a repeated start or stop from the same transition.
//!
//! All of this runs on one thread. Transport notifications and file chooser
//! results arrive over channels and are handled in [`PlayerEditor::poll`].

pub mod chooser;
pub mod components;
pub mod state;

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};

use log::{debug, info, warn};

use crate::config::PlayerConfig;
use crate::engine::io::FormatManager;
use crate::engine::source::ReaderSource;
use crate::engine::transport::{ChangeMessage, TransportSource};

pub use chooser::{ChooserCallback, ChooserOptions, FileChooser, PresetChooser};
pub use components::{Colour, Rectangle, TextButton};
pub use state::TransportState;

const BUTTON_MARGIN: i32 = 10;
const BUTTON_HEIGHT: i32 = 20;
const BUTTON_SPACING: i32 = 30;

/// The editor panel: three buttons over one transport
pub struct PlayerEditor<T: TransportSource> {
    transport: T,
    format_manager: FormatManager,
    state: TransportState,

    open_button: TextButton,
    play_button: TextButton,
    stop_button: TextButton,
    width: u32,
    height: u32,

    chooser_options: ChooserOptions,
    chooser_pending: bool,
    chosen_tx: Sender<Option<PathBuf>>,
    chosen_rx: Receiver<Option<PathBuf>>,
    transport_events: Receiver<ChangeMessage>,

    current_file: Option<PathBuf>,
}

impl<T: TransportSource> PlayerEditor<T> {
    /// Build the editor and subscribe it to `transport`
    pub fn new(transport: T, format_manager: FormatManager, config: &PlayerConfig) -> Self {
        let transport_events = transport.add_change_listener();
        let (chosen_tx, chosen_rx) = mpsc::channel();

        let mut editor = Self {
            transport,
            format_manager,
            state: TransportState::Stopped,
            open_button: TextButton::new("Open..."),
            play_button: TextButton::new("Play")
                .with_colour(Colour::DODGER_BLUE)
                .disabled(),
            stop_button: TextButton::new("Stop")
                .with_colour(Colour::CORNFLOWER_BLUE)
                .disabled(),
            width: config.editor.width,
            height: config.editor.height,
            chooser_options: ChooserOptions::open_files(&config.chooser),
            chooser_pending: false,
            chosen_tx,
            chosen_rx,
            transport_events,
            current_file: None,
        };
        editor.resized();
        editor
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn open_button(&self) -> &TextButton {
        &self.open_button
    }

    pub fn play_button(&self) -> &TextButton {
        &self.play_button
    }

    pub fn stop_button(&self) -> &TextButton {
        &self.stop_button
    }

    /// The file behind the installed source, if any
    pub fn current_file(&self) -> Option<&Path> {
        self.current_file.as_deref()
    }

    /// A chooser has been launched and has not answered yet
    pub fn is_chooser_pending(&self) -> bool {
        self.chooser_pending
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn set_size(&mut self, width: u32, height: u32) {
        if (width, height) != (self.width, self.height) {
            self.width = width;
            self.height = height;
            self.resized();
        }
    }

    /// The panel is opaque and filled with this
    pub fn background_colour(&self) -> Colour {
        Colour::LIGHT_BLUE
    }

    /// Lay the buttons out as full-width rows
    pub fn resized(&mut self) {
        let width = (self.width as i32 - 2 * BUTTON_MARGIN).max(0);
        let rows = [
            &mut self.open_button,
            &mut self.play_button,
            &mut self.stop_button,
        ];
        for (row, button) in rows.into_iter().enumerate() {
            let y = BUTTON_MARGIN + row as i32 * BUTTON_SPACING;
            button.set_bounds(Rectangle::new(BUTTON_MARGIN, y, width, BUTTON_HEIGHT));
        }
    }

    /// The single mutator for the transport state
    ///
    /// Entering a state applies its side effects once. Asking for the
    /// current state does nothing.
    pub fn change_state(&mut self, new_state: TransportState) {
        if self.state == new_state {
            return;
        }

        debug!("[EDITOR] {} -> {}", self.state, new_state);
        self.state = new_state;

        match new_state {
            TransportState::Stopped => {
                self.play_button.set_label("Play");
                self.stop_button.set_label("Stop");
                self.stop_button.set_enabled(false);
                self.transport.set_position(0.0);
            }
            TransportState::Starting => {
                self.transport.start();
            }
            TransportState::Playing => {
                self.play_button.set_label("Pause");
                self.stop_button.set_label("Stop");
                self.stop_button.set_enabled(true);
            }
            TransportState::Pausing => {
                self.transport.stop();
            }
            TransportState::Paused => {
                self.play_button.set_label("Resume");
                self.stop_button.set_label("Return to Zero");
            }
            TransportState::Stopping => {
                self.transport.stop();
            }
        }
    }

    /// Settle the state against what the transport now reports
    pub fn change_listener_callback(&mut self) {
        if self.transport.is_playing() {
            self.change_state(TransportState::Playing);
        } else if matches!(
            self.state,
            TransportState::Stopping | TransportState::Playing
        ) {
            self.change_state(TransportState::Stopped);
        } else if self.state == TransportState::Pausing {
            self.change_state(TransportState::Paused);
        }
    }

    pub fn play_button_clicked(&mut self) {
        if self.state == TransportState::Playing {
            self.change_state(TransportState::Pausing);
        } else {
            self.change_state(TransportState::Starting);
        }
    }

    pub fn stop_button_clicked(&mut self) {
        if self.state == TransportState::Paused {
            self.change_state(TransportState::Stopped);
        } else {
            self.change_state(TransportState::Stopping);
        }
    }

    /// Ask `chooser` for a file; the answer is handled by a later [`poll`]
    ///
    /// Ignored while a previous chooser is still open.
    ///
    /// [`poll`]: PlayerEditor::poll
    pub fn open_button_clicked(&mut self, chooser: &mut dyn FileChooser) {
        if self.chooser_pending {
            debug!("[EDITOR] File chooser already open");
            return;
        }

        self.chooser_pending = true;
        let tx = self.chosen_tx.clone();
        chooser.launch_async(
            &self.chooser_options,
            Box::new(move |result| {
                // The editor may be gone by the time the dialog closes
                let _ = tx.send(result);
            }),
        );
    }

    /// Handle everything that arrived since the last poll
    ///
    /// Chooser results first, then transport notifications. Queued
    /// notifications are replayed in order and then the change callback
    /// runs once against the transport's current status. Returns whether
    /// anything was handled.
    pub fn poll(&mut self) -> bool {
        let mut handled = false;

        while let Ok(result) = self.chosen_rx.try_recv() {
            self.chooser_pending = false;
            self.file_chosen(result);
            handled = true;
        }

        let messages: Vec<ChangeMessage> = self.transport_events.try_iter().collect();
        if !messages.is_empty() {
            debug!("[EDITOR] Transport changed: {:?}", messages);
            for message in &messages {
                self.replay(*message);
            }
            self.change_listener_callback();
            handled = true;
        }

        handled
    }

    /// Apply a confirmation the transport may have already moved past
    ///
    /// A start that was confirmed and then ran off the end of a short file
    /// before this poll must still pass through Playing, or the final
    /// not-playing status would leave the editor parked in Starting.
    fn replay(&mut self, message: ChangeMessage) {
        if message == ChangeMessage::Started && self.state == TransportState::Starting {
            self.change_state(TransportState::Playing);
        }
    }

    fn file_chosen(&mut self, result: Option<PathBuf>) {
        let Some(path) = result else {
            debug!("[EDITOR] File chooser dismissed");
            return;
        };

        let Some(reader) = self.format_manager.create_reader_for(&path) else {
            warn!("[EDITOR] Ignoring {}: not a readable audio file", path.display());
            return;
        };

        info!(
            "[EDITOR] Loaded {} ({:.2}s)",
            path.display(),
            reader.duration_secs()
        );
        self.transport
            .set_source(Some(Box::new(ReaderSource::new(reader))));
        self.change_state(TransportState::Stopping);
        self.play_button.set_enabled(true);
        self.play_button.set_label("Play");
        self.current_file = Some(path);
    }
}
