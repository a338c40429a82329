//! CLI Module
//!
//! Command-line interface for wavdeck.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// wavdeck - play WAV files through the Open/Play/Stop editor
#[derive(Parser, Debug)]
#[command(name = "wavdeck")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Open the editor window
    #[command(name = "gui")]
    Gui,

    /// Play a file headless through the editor state machine
    #[command(name = "play")]
    Play {
        /// WAV file to play
        file: PathBuf,

        /// Press Stop after this many seconds instead of playing to the end
        #[arg(short, long)]
        seconds: Option<f64>,
    },

    /// Print format details of an audio file
    #[command(name = "info")]
    Info {
        /// Audio file to inspect
        file: PathBuf,
    },

    /// Write a sine test tone
    #[command(name = "tone")]
    Tone {
        /// Output WAV path
        output: PathBuf,

        /// Frequency in Hz
        #[arg(short, long, default_value_t = 440.0)]
        frequency: f32,

        /// Duration in seconds
        #[arg(short, long, default_value_t = 2.0)]
        duration: f32,

        /// Sample rate in Hz
        #[arg(short = 'r', long, default_value_t = 48000)]
        sample_rate: u32,

        /// Channel count
        #[arg(long, default_value_t = 2)]
        channels: u16,

        /// Bits per sample: 16, 24 or 32 (float)
        #[arg(short, long, default_value_t = 16)]
        bits: u16,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_play() {
        let cli = Cli::parse_from(["wavdeck", "-v", "play", "take.wav", "--seconds", "1.5"]);
        assert!(cli.verbose);
        match cli.command {
            Some(Commands::Play { file, seconds }) => {
                assert_eq!(file, PathBuf::from("take.wav"));
                assert_eq!(seconds, Some(1.5));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_tone_defaults() {
        let cli = Cli::parse_from(["wavdeck", "tone", "out.wav"]);
        match cli.command {
            Some(Commands::Tone {
                frequency,
                duration,
                sample_rate,
                channels,
                bits,
                ..
            }) => {
                assert_eq!(frequency, 440.0);
                assert_eq!(duration, 2.0);
                assert_eq!(sample_rate, 48000);
                assert_eq!(channels, 2);
                assert_eq!(bits, 16);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::parse_from(["wavdeck", "gui", "--config", "deck.json"]);
        assert_eq!(cli.config, Some(PathBuf::from("deck.json")));
    }
}
