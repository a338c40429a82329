//! Playback sources
//!
//! A source is what the transport reads frames from. The only shipped
//! implementation wraps a decoded [`AudioFormatReader`].

use crate::engine::buffer::AudioBuffer;
use crate::engine::io::AudioFormatReader;

/// Random-access audio the transport can render from
pub trait AudioSource: Send {
    fn sample_rate(&self) -> u32;

    fn num_channels(&self) -> usize;

    /// Frames per channel
    fn total_length(&self) -> usize;

    /// Sample at `channel`/`frame`; silence past the end
    fn sample(&self, channel: usize, frame: usize) -> f32;

    fn length_in_seconds(&self) -> f64 {
        if self.sample_rate() == 0 {
            return 0.0;
        }
        self.total_length() as f64 / self.sample_rate() as f64
    }
}

/// Source backed by a reader's decoded buffer
#[derive(Debug)]
pub struct ReaderSource {
    reader: AudioFormatReader,
}

impl ReaderSource {
    /// Take ownership of `reader`
    pub fn new(reader: AudioFormatReader) -> Self {
        Self { reader }
    }

    pub fn reader(&self) -> &AudioFormatReader {
        &self.reader
    }

    fn buffer(&self) -> &AudioBuffer {
        self.reader.buffer()
    }
}

impl AudioSource for ReaderSource {
    fn sample_rate(&self) -> u32 {
        self.reader.sample_rate
    }

    fn num_channels(&self) -> usize {
        self.reader.num_channels
    }

    fn total_length(&self) -> usize {
        self.reader.length_in_samples()
    }

    #[inline]
    fn sample(&self, channel: usize, frame: usize) -> f32 {
        self.buffer().get_sample(channel, frame).unwrap_or(0.0)
    }
}

/// In-memory source, handy when there is no file behind the audio
#[derive(Debug, Clone)]
pub struct BufferSource {
    buffer: AudioBuffer,
}

impl BufferSource {
    pub fn new(buffer: AudioBuffer) -> Self {
        Self { buffer }
    }
}

impl AudioSource for BufferSource {
    fn sample_rate(&self) -> u32 {
        self.buffer.sample_rate
    }

    fn num_channels(&self) -> usize {
        self.buffer.channels()
    }

    fn total_length(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    fn sample(&self, channel: usize, frame: usize) -> f32 {
        self.buffer.get_sample(channel, frame).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::io::{generate_test_tone, read_wav, write_wav};
    use tempfile::tempdir;

    #[test]
    fn test_reader_source_reports_reader_format() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        write_wav(&generate_test_tone(440.0, 0.5, 16000, 2), &path, 16).unwrap();

        let source = ReaderSource::new(read_wav(&path).unwrap());
        assert_eq!(source.sample_rate(), 16000);
        assert_eq!(source.num_channels(), 2);
        assert_eq!(source.total_length(), 8000);
        assert!((source.length_in_seconds() - 0.5).abs() < 1e-9);
        assert_eq!(source.reader().path, path);
    }

    #[test]
    fn test_silence_past_end() {
        let source = BufferSource::new(AudioBuffer::from_interleaved(&[0.25, 0.5], 1, 100).unwrap());
        assert_eq!(source.sample(0, 1), 0.5);
        assert_eq!(source.sample(0, 2), 0.0);
        assert_eq!(source.sample(3, 0), 0.0);
    }
}
