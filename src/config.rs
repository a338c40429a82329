//! Player configuration
//!
//! Read from an optional JSON file. Every field has a default, so an empty
//! object (or no file at all) yields the stock 400x300 editor on the null
//! output.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, WavdeckError};

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub editor: EditorConfig,
    pub chooser: ChooserConfig,
    pub output: OutputConfig,
    /// Linear output gain applied by the transport
    pub gain: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            editor: EditorConfig::default(),
            chooser: ChooserConfig::default(),
            output: OutputConfig::default(),
            gain: 1.0,
        }
    }
}

/// Editor window settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub width: u32,
    pub height: u32,
    /// How often the UI drains transport notifications while idle
    pub poll_interval_ms: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            width: 400,
            height: 300,
            poll_interval_ms: 30,
        }
    }
}

/// File chooser settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChooserConfig {
    pub title: String,
    /// Wildcard patterns, e.g. `*.wav`
    pub patterns: Vec<String>,
    pub initial_directory: Option<PathBuf>,
}

impl Default for ChooserConfig {
    fn default() -> Self {
        Self {
            title: "Select a Wave file to play...".to_string(),
            patterns: vec!["*.wav".to_string()],
            initial_directory: None,
        }
    }
}

/// Which output driver pulls audio from the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputBackend {
    /// Paced background thread, no device
    #[default]
    Null,
    /// Default system device via cpal
    Cpal,
}

/// Output driver settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub backend: OutputBackend,
    /// Frames rendered per block
    pub block_size: usize,
    /// Rate used by the null output (cpal uses the device rate)
    pub sample_rate: u32,
    /// Channel count used by the null output
    pub channels: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            backend: OutputBackend::Null,
            block_size: 512,
            sample_rate: 48000,
            channels: 2,
        }
    }
}

impl PlayerConfig {
    /// Load a config file, validating the values serde can't check
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(WavdeckError::FileNotFound {
                path: path.display().to_string(),
                source: None,
            });
        }

        let content = fs::read_to_string(path)?;
        let config: PlayerConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, otherwise the defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Write the config as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.editor.width < 40 || self.editor.height < 100 {
            return Err(WavdeckError::Config {
                reason: format!(
                    "editor size {}x{} is too small (minimum 40x100)",
                    self.editor.width, self.editor.height
                ),
            });
        }
        if self.output.block_size == 0 {
            return Err(WavdeckError::Config {
                reason: "output block_size must be at least 1".to_string(),
            });
        }
        if self.output.sample_rate == 0 || self.output.channels == 0 {
            return Err(WavdeckError::Config {
                reason: "output sample_rate and channels must be non-zero".to_string(),
            });
        }
        if !self.gain.is_finite() || self.gain < 0.0 {
            return Err(WavdeckError::Config {
                reason: format!("gain {} must be a finite, non-negative number", self.gain),
            });
        }
        Ok(())
    }
}
