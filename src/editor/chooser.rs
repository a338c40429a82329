//! File chooser contract
//!
//! Choosers are fire-and-forget: `launch_async` returns at once and the
//! completion callback runs later, possibly on another thread. The editor's
//! callback only posts the result back to the editor, which handles it on
//! the UI thread at its next poll.

use std::path::{Path, PathBuf};

use crate::config::ChooserConfig;

/// Callback receiving the chosen file, or None when the dialog was dismissed
pub type ChooserCallback = Box<dyn FnOnce(Option<PathBuf>) + Send + 'static>;

/// What to ask the user for
#[derive(Debug, Clone, PartialEq)]
pub struct ChooserOptions {
    pub title: String,
    /// Wildcards such as `*.wav`
    pub patterns: Vec<String>,
    pub initial_directory: Option<PathBuf>,
    /// Open an existing file rather than name a new one
    pub open_mode: bool,
    pub can_select_files: bool,
    pub can_select_directories: bool,
}

impl ChooserOptions {
    /// Open-mode, files only
    pub fn open_files(config: &ChooserConfig) -> Self {
        Self {
            title: config.title.clone(),
            patterns: config.patterns.clone(),
            initial_directory: config.initial_directory.clone(),
            open_mode: true,
            can_select_files: true,
            can_select_directories: false,
        }
    }

    /// Extensions from the wildcard patterns, e.g. `*.wav` gives `wav`
    pub fn extensions(&self) -> Vec<String> {
        self.patterns
            .iter()
            .flat_map(|pattern| pattern.split(';'))
            .filter_map(|pattern| pattern.trim().strip_prefix("*."))
            .filter(|ext| !ext.is_empty() && *ext != "*")
            .map(|ext| ext.to_ascii_lowercase())
            .collect()
    }

    /// Whether `path` passes the pattern filter; no patterns matches all
    pub fn matches(&self, path: &Path) -> bool {
        let extensions = self.extensions();
        if extensions.is_empty() {
            return true;
        }
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| extensions.contains(&ext.to_ascii_lowercase()))
            .unwrap_or(false)
    }
}

/// Something that can ask for a file without blocking the caller
pub trait FileChooser {
    fn launch_async(&mut self, options: &ChooserOptions, on_complete: ChooserCallback);
}

/// Answers every request with a fixed result
///
/// Drives the editor headless and in tests.
#[derive(Debug, Clone, Default)]
pub struct PresetChooser {
    result: Option<PathBuf>,
}

impl PresetChooser {
    pub fn selecting(path: impl Into<PathBuf>) -> Self {
        Self {
            result: Some(path.into()),
        }
    }

    /// Behaves like a dismissed dialog
    pub fn cancelled() -> Self {
        Self::default()
    }
}

impl FileChooser for PresetChooser {
    fn launch_async(&mut self, _options: &ChooserOptions, on_complete: ChooserCallback) {
        on_complete(self.result.clone());
    }
}
