//! Audio file I/O
//!
//! The decoder factory lives here: a [`FormatManager`] holds the registered
//! [`AudioFormat`]s and hands out an [`AudioFormatReader`] for a path. WAV
//! (via `hound`) is the only built-in format. Readers decode the whole file
//! up front; there is no streaming.

use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::{debug, warn};

use crate::engine::buffer::AudioBuffer;
use crate::error::{Result, WavdeckError};

/// A decoded audio file plus the format details it was read with
#[derive(Debug, Clone)]
pub struct AudioFormatReader {
    pub path: PathBuf,
    pub format_name: &'static str,
    pub sample_rate: u32,
    pub num_channels: usize,
    pub bits_per_sample: u16,
    pub is_float: bool,
    buffer: AudioBuffer,
}

impl AudioFormatReader {
    /// Frames per channel
    pub fn length_in_samples(&self) -> usize {
        self.buffer.len()
    }

    pub fn duration_secs(&self) -> f64 {
        self.buffer.duration_secs()
    }

    pub fn buffer(&self) -> &AudioBuffer {
        &self.buffer
    }

    pub fn into_buffer(self) -> AudioBuffer {
        self.buffer
    }
}

/// One decodable file format
pub trait AudioFormat: Send + Sync {
    fn name(&self) -> &'static str;

    /// Lower-case extensions without the dot
    fn extensions(&self) -> &'static [&'static str];

    fn create_reader(&self, path: &Path) -> Result<AudioFormatReader>;

    fn can_handle(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.extensions().iter().any(|known| *known == ext)
            })
            .unwrap_or(false)
    }
}

/// RIFF WAVE via `hound`
#[derive(Debug, Default, Clone, Copy)]
pub struct WavAudioFormat;

impl AudioFormat for WavAudioFormat {
    fn name(&self) -> &'static str {
        "WAV"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["wav", "wave"]
    }

    fn create_reader(&self, path: &Path) -> Result<AudioFormatReader> {
        read_wav(path)
    }
}

/// Registry of formats; the decoder factory the editor talks to
#[derive(Default)]
pub struct FormatManager {
    formats: Vec<Box<dyn AudioFormat>>,
}

impl FormatManager {
    /// Empty manager; nothing can be opened until a format is registered
    pub fn new() -> Self {
        Self::default()
    }

    /// Manager with the built-in formats registered
    pub fn with_basic_formats() -> Self {
        let mut manager = Self::new();
        manager.register_basic_formats();
        manager
    }

    pub fn register_basic_formats(&mut self) {
        self.register_format(Box::new(WavAudioFormat));
    }

    pub fn register_format(&mut self, format: Box<dyn AudioFormat>) {
        debug!("Registered audio format {}", format.name());
        self.formats.push(format);
    }

    pub fn num_formats(&self) -> usize {
        self.formats.len()
    }

    /// Wildcard pattern matching every registered extension, e.g. `*.wav;*.wave`
    pub fn wildcard_for_all_formats(&self) -> String {
        self.formats
            .iter()
            .flat_map(|format| format.extensions().iter())
            .map(|ext| format!("*.{}", ext))
            .collect::<Vec<_>>()
            .join(";")
    }

    /// Open `path` with the first format that can decode it
    ///
    /// Formats claiming the file's extension are tried first, then the rest.
    /// Returns `None` when nothing can decode the file; the reason is logged.
    pub fn create_reader_for(&self, path: &Path) -> Option<AudioFormatReader> {
        if !path.is_file() {
            warn!("Cannot open {}: not a file", path.display());
            return None;
        }

        let (by_extension, others): (Vec<_>, Vec<_>) =
            self.formats.iter().partition(|format| format.can_handle(path));

        for format in by_extension.into_iter().chain(others) {
            match format.create_reader(path) {
                Ok(reader) => {
                    debug!(
                        "Opened {} as {} ({} Hz, {} ch, {} frames)",
                        path.display(),
                        format.name(),
                        reader.sample_rate,
                        reader.num_channels,
                        reader.length_in_samples()
                    );
                    return Some(reader);
                }
                Err(e) => debug!("{} could not decode {}: {}", format.name(), path.display(), e),
            }
        }

        warn!("No registered format could decode {}", path.display());
        None
    }
}

/// Decode a WAV file into memory
///
/// # Errors
/// * `FileNotFound` - If the file does not exist
/// * `InvalidAudio` - If the file is not a valid WAV file
/// * `UnsupportedFormat` - If the bit depth cannot be converted
/// * `EmptyAudio` - If the file has no sample frames
pub fn read_wav(path: &Path) -> Result<AudioFormatReader> {
    if !path.exists() {
        return Err(WavdeckError::FileNotFound {
            path: path.display().to_string(),
            source: None,
        });
    }

    let reader = WavReader::open(path).map_err(|e| WavdeckError::InvalidAudio {
        reason: format!("Failed to open WAV file: {}", e),
        source: Some(Box::new(e)),
    })?;

    let spec = reader.spec();
    let channels = spec.channels as usize;
    if channels == 0 {
        return Err(WavdeckError::InvalidAudio {
            reason: "WAV header declares zero channels".to_string(),
            source: None,
        });
    }

    let interleaved = read_samples_as_f32(reader, spec.bits_per_sample, spec.sample_format)?;
    let buffer = AudioBuffer::from_interleaved(&interleaved, channels, spec.sample_rate)?;

    if buffer.is_empty() {
        return Err(WavdeckError::EmptyAudio);
    }

    Ok(AudioFormatReader {
        path: path.to_path_buf(),
        format_name: "WAV",
        sample_rate: spec.sample_rate,
        num_channels: channels,
        bits_per_sample: spec.bits_per_sample,
        is_float: spec.sample_format == SampleFormat::Float,
        buffer,
    })
}

/// Write a buffer as WAV at 16, 24 or 32 (float) bits
pub fn write_wav(buffer: &AudioBuffer, path: &Path, bits_per_sample: u16) -> Result<()> {
    let spec = WavSpec {
        channels: buffer.channels() as u16,
        sample_rate: buffer.sample_rate,
        bits_per_sample,
        sample_format: if bits_per_sample == 32 {
            SampleFormat::Float
        } else {
            SampleFormat::Int
        },
    };

    if !matches!(bits_per_sample, 16 | 24 | 32) {
        return Err(WavdeckError::UnsupportedFormat {
            format: format!("{}-bit audio (only 16, 24, 32 supported)", bits_per_sample),
        });
    }

    let mut writer = WavWriter::create(path, spec).map_err(write_error)?;

    for sample in buffer.to_interleaved() {
        match bits_per_sample {
            16 => {
                let scaled = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
                writer.write_sample(scaled).map_err(write_error)?;
            }
            24 => {
                // 24-bit stored as i32 in hound
                let scaled = (sample * 8388607.0).clamp(-8388608.0, 8388607.0) as i32;
                writer.write_sample(scaled).map_err(write_error)?;
            }
            _ => writer.write_sample(sample).map_err(write_error)?,
        }
    }

    writer.finalize().map_err(write_error)?;
    Ok(())
}

/// Generate a sine tone on every channel
pub fn generate_test_tone(
    frequency: f32,
    duration_secs: f32,
    sample_rate: u32,
    channels: usize,
) -> AudioBuffer {
    let num_frames = (duration_secs * sample_rate as f32) as usize;
    let mut buffer = AudioBuffer::new(channels, num_frames, sample_rate);

    let angular_freq = 2.0 * std::f32::consts::PI * frequency / sample_rate as f32;

    for channel in buffer.samples.iter_mut() {
        for (i, sample) in channel.iter_mut().enumerate() {
            *sample = 0.5 * (angular_freq * i as f32).sin();
        }
    }

    buffer
}

fn write_error(e: hound::Error) -> WavdeckError {
    match e {
        hound::Error::IoError(io) => WavdeckError::Io(io),
        other => WavdeckError::InvalidAudio {
            reason: format!("Failed to write WAV file: {}", other),
            source: Some(Box::new(other)),
        },
    }
}

/// Read samples from WAV reader and convert to f32
fn read_samples_as_f32<R: std::io::Read>(
    mut reader: WavReader<R>,
    bits_per_sample: u16,
    sample_format: SampleFormat,
) -> Result<Vec<f32>> {
    let invalid = |bits: &str, e: hound::Error| WavdeckError::InvalidAudio {
        reason: format!("Failed to read {} samples: {}", bits, e),
        source: Some(Box::new(e)),
    };

    match sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(|e| invalid("float", e)),
        SampleFormat::Int => match bits_per_sample {
            // hound hands 8-bit unsigned PCM back as signed
            8 => reader
                .samples::<i8>()
                .map(|s| s.map(|v| v as f32 / 128.0))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| invalid("8-bit", e)),
            16 => reader
                .samples::<i16>()
                .map(|s| s.map(|v| v as f32 / 32768.0))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| invalid("16-bit", e)),
            24 => reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / 8388608.0))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| invalid("24-bit", e)),
            32 => reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / 2147483648.0))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| invalid("32-bit int", e)),
            _ => Err(WavdeckError::UnsupportedFormat {
                format: format!("{}-bit integer audio", bits_per_sample),
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_write_then_read_16_bit() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let tone = generate_test_tone(440.0, 0.25, 22050, 2);

        write_wav(&tone, &path, 16).unwrap();
        let reader = read_wav(&path).unwrap();

        assert_eq!(reader.sample_rate, 22050);
        assert_eq!(reader.num_channels, 2);
        assert_eq!(reader.bits_per_sample, 16);
        assert!(!reader.is_float);
        assert_eq!(reader.length_in_samples(), tone.len());
        assert_abs_diff_eq!(reader.duration_secs(), 0.25, epsilon = 1e-3);
        assert_abs_diff_eq!(
            reader.buffer().channel(0)[10],
            tone.channel(0)[10],
            epsilon = 1e-3
        );
    }

    #[test]
    fn test_float_wav() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("float.wav");
        let tone = generate_test_tone(220.0, 0.1, 8000, 1);

        write_wav(&tone, &path, 32).unwrap();
        let reader = read_wav(&path).unwrap();

        assert!(reader.is_float);
        assert_eq!(reader.into_buffer(), tone);
    }

    #[test]
    fn test_unsupported_export_depth() {
        let dir = tempdir().unwrap();
        let tone = generate_test_tone(220.0, 0.1, 8000, 1);
        let err = write_wav(&tone, &dir.path().join("x.wav"), 12).unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_FORMAT");
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_wav(Path::new("/nonexistent/file.wav")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_NOT_FOUND");
    }

    #[test]
    fn test_read_garbage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("garbage.wav");
        fs::write(&path, b"definitely not a riff header").unwrap();

        let err = read_wav(&path).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_AUDIO");
    }

    #[test]
    fn test_empty_wav_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.wav");
        write_wav(&AudioBuffer::new(1, 0, 8000), &path, 16).unwrap();

        let err = read_wav(&path).unwrap_err();
        assert_eq!(err.error_code(), "EMPTY_AUDIO");
    }

    #[test]
    fn test_format_manager_without_formats_opens_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        write_wav(&generate_test_tone(440.0, 0.1, 8000, 1), &path, 16).unwrap();

        assert!(FormatManager::new().create_reader_for(&path).is_none());
        assert!(FormatManager::with_basic_formats().create_reader_for(&path).is_some());
    }

    #[test]
    fn test_format_manager_ignores_extension_case() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("TONE.WAV");
        write_wav(&generate_test_tone(440.0, 0.1, 8000, 1), &path, 16).unwrap();

        assert!(WavAudioFormat.can_handle(&path));
        assert!(FormatManager::with_basic_formats().create_reader_for(&path).is_some());
    }

    #[test]
    fn test_format_manager_falls_back_to_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tone.bin");
        write_wav(&generate_test_tone(440.0, 0.1, 8000, 1), &path, 16).unwrap();

        let reader = FormatManager::with_basic_formats().create_reader_for(&path).unwrap();
        assert_eq!(reader.format_name, "WAV");
    }

    #[test]
    fn test_format_manager_rejects_directories() {
        let dir = tempdir().unwrap();
        assert!(FormatManager::with_basic_formats()
            .create_reader_for(dir.path())
            .is_none());
    }

    #[test]
    fn test_wildcard() {
        assert_eq!(
            FormatManager::with_basic_formats().wildcard_for_all_formats(),
            "*.wav;*.wave"
        );
        assert_eq!(FormatManager::new().wildcard_for_all_formats(), "");
    }
}
