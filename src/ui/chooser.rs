//! Native file dialog via `rfd`

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use eframe::egui;
use futures::executor::block_on;
use log::warn;

use crate::editor::{ChooserCallback, ChooserOptions, FileChooser};

/// Shows the platform open dialog without blocking the UI
///
/// The dialog is created on the calling (UI) thread; a worker waits for it
/// to close, runs the callback and requests a repaint so the editor picks
/// the result up promptly.
pub struct RfdChooser {
    ctx: egui::Context,
}

impl RfdChooser {
    pub fn new(ctx: egui::Context) -> Self {
        Self { ctx }
    }
}

impl FileChooser for RfdChooser {
    fn launch_async(&mut self, options: &ChooserOptions, on_complete: ChooserCallback) {
        let pending = build_dialog(options).pick_file();
        let options = options.clone();
        let ctx = self.ctx.clone();

        // Shared so a failed spawn can still answer the editor
        let callback = Arc::new(Mutex::new(Some(on_complete)));
        let worker_callback = callback.clone();

        let spawned = thread::Builder::new()
            .name("wavdeck-file-chooser".to_string())
            .spawn(move || {
                let picked = block_on(pending).map(|handle| handle.path().to_path_buf());
                if let Some(on_complete) = take(&worker_callback) {
                    on_complete(accept(&options, picked));
                }
                ctx.request_repaint();
            });

        if let Err(e) = spawned {
            warn!("Could not open file chooser: {}", e);
            if let Some(on_complete) = take(&callback) {
                on_complete(None);
            }
        }
    }
}

fn build_dialog(options: &ChooserOptions) -> rfd::AsyncFileDialog {
    let mut dialog = rfd::AsyncFileDialog::new().set_title(options.title.as_str());
    let extensions = options.extensions();
    if !extensions.is_empty() {
        dialog = dialog.add_filter("Audio", extensions.as_slice());
    }
    if let Some(dir) = &options.initial_directory {
        dialog = dialog.set_directory(dir);
    }
    dialog
}

/// Some platforms let a typed name bypass the dialog filter
fn accept(options: &ChooserOptions, picked: Option<PathBuf>) -> Option<PathBuf> {
    let path = picked?;
    if options.matches(&path) {
        Some(path)
    } else {
        warn!(
            "Ignoring {}: does not match {}",
            path.display(),
            options.patterns.join(";")
        );
        None
    }
}

fn take(callback: &Mutex<Option<ChooserCallback>>) -> Option<ChooserCallback> {
    callback
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take()
}
