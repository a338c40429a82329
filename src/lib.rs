//! wavdeck - WAV Player Editor
//!
//! A small player panel (Open, Play, Stop) over an audio transport.
//!
//! # Architecture
//!
//! - `engine`: WAV decoding, playback sources, the transport and its
//!   output drivers
//! - `editor`: the six-state transport state machine and the button model
//!   it keeps in step with playback
//! - `ui`: the native window (feature `gui`)
//! - `cli`: command-line entry points

pub mod cli;
pub mod config;
pub mod editor;
pub mod engine;
pub mod error;

#[cfg(feature = "gui")]
pub mod ui;

pub use config::PlayerConfig;
pub use editor::{PlayerEditor, TransportState};
pub use engine::{AudioTransport, FormatManager, TransportSource};
pub use error::{Result, WavdeckError};
