//! Audio Engine Module
//!
//! The playback side the editor drives:
//! - Audio buffer management
//! - WAV decoding and the format registry
//! - Playback sources
//! - The transport and its change notifications
//! - Output drivers

pub mod buffer;
pub mod io;
pub mod output;
pub mod source;
pub mod transport;

pub use buffer::AudioBuffer;
pub use io::{
    generate_test_tone, read_wav, write_wav, AudioFormat, AudioFormatReader, FormatManager,
    WavAudioFormat,
};
pub use output::{open_output, AudioOutput, NullOutput};
pub use source::{AudioSource, BufferSource, ReaderSource};
pub use transport::{AudioTransport, ChangeBroadcaster, ChangeMessage, TransportSource};
