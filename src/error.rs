//! Error handling for wavdeck
//!
//! Library code returns [`Result`]; every variant carries recovery hints
//! so the CLI can print something useful before exiting.

use thiserror::Error;

/// Result type alias for wavdeck operations
pub type Result<T> = std::result::Result<T, WavdeckError>;

/// Main error type for wavdeck operations
#[derive(Error, Debug)]
pub enum WavdeckError {
    // File Errors
    #[error("File not found: {path}")]
    FileNotFound {
        path: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Invalid audio file: {reason}")]
    InvalidAudio {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Audio contains no samples")]
    EmptyAudio,

    // Playback Errors
    #[error("Audio output failed: {reason}")]
    OutputDevice { reason: String },

    #[error("Window error: {reason}")]
    Window { reason: String },

    #[error("Feature not compiled in: {feature}")]
    FeatureDisabled { feature: &'static str },

    // Configuration Errors
    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl WavdeckError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            WavdeckError::FileNotFound { .. } => "FILE_NOT_FOUND",
            WavdeckError::InvalidAudio { .. } => "INVALID_AUDIO",
            WavdeckError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            WavdeckError::EmptyAudio => "EMPTY_AUDIO",
            WavdeckError::OutputDevice { .. } => "OUTPUT_DEVICE",
            WavdeckError::Window { .. } => "WINDOW",
            WavdeckError::FeatureDisabled { .. } => "FEATURE_DISABLED",
            WavdeckError::Config { .. } => "CONFIG",
            WavdeckError::Io(_) => "IO_ERROR",
            WavdeckError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            WavdeckError::FileNotFound { .. }
                | WavdeckError::InvalidAudio { .. }
                | WavdeckError::UnsupportedFormat { .. }
                | WavdeckError::EmptyAudio
                | WavdeckError::OutputDevice { .. }
        )
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            WavdeckError::FileNotFound { .. } => vec![
                "Check the file path is correct",
                "Verify the file hasn't been moved or deleted",
            ],
            WavdeckError::InvalidAudio { .. } | WavdeckError::EmptyAudio => vec![
                "Check if the file plays in another application",
                "Re-export the file as PCM WAV",
            ],
            WavdeckError::UnsupportedFormat { .. } => vec![
                "Convert to WAV (8/16/24/32-bit integer or 32-bit float)",
            ],
            WavdeckError::OutputDevice { .. } => vec![
                "Check that an output device is connected",
                "Set \"backend\": \"null\" in the output config to run without a device",
            ],
            WavdeckError::FeatureDisabled { feature } => match *feature {
                "gui" => vec!["Rebuild with `--features gui`"],
                "cpal-output" => vec!["Rebuild with `--features cpal-output`"],
                _ => vec![],
            },
            WavdeckError::Config { .. } | WavdeckError::Serialization(_) => vec![
                "Check the configuration file is valid JSON",
                "Delete unknown keys; every field has a default",
            ],
            WavdeckError::Window { .. } => vec![
                "Check that a display is available (DISPLAY or WAYLAND_DISPLAY)",
                "Use `wavdeck play FILE` to play without a window",
            ],
            WavdeckError::Io(_) => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = WavdeckError::FileNotFound {
            path: "test.wav".to_string(),
            source: None,
        };
        assert_eq!(err.error_code(), "FILE_NOT_FOUND");
        assert_eq!(err.to_string(), "File not found: test.wav");
    }

    #[test]
    fn test_recovery_suggestions() {
        let err = WavdeckError::OutputDevice {
            reason: "no device".to_string(),
        };
        assert!(!err.recovery_suggestions().is_empty());
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_feature_disabled_is_not_recoverable() {
        let err = WavdeckError::FeatureDisabled { feature: "gui" };
        assert!(!err.is_recoverable());
        assert_eq!(err.recovery_suggestions(), vec!["Rebuild with `--features gui`"]);
    }
}
