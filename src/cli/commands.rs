//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use log::{info, warn};

use crate::config::PlayerConfig;
use crate::editor::{PlayerEditor, PresetChooser, TransportState};
use crate::engine::buffer::{calculate_peak, calculate_rms};
use crate::engine::io::{generate_test_tone, read_wav, write_wav, FormatManager};
use crate::engine::output::open_output;
use crate::engine::transport::{AudioTransport, TransportSource};
use crate::error::{Result, WavdeckError};

/// Extra time allowed past the file's length before giving up on playback
const PLAYBACK_GRACE: Duration = Duration::from_secs(5);

/// Open the editor window.
#[cfg(feature = "gui")]
pub fn gui(config: &PlayerConfig) -> Result<()> {
    crate::ui::run(config)
}

#[cfg(not(feature = "gui"))]
pub fn gui(_config: &PlayerConfig) -> Result<()> {
    Err(WavdeckError::FeatureDisabled { feature: "gui" })
}

/// Play `file` through the editor as if its buttons were clicked.
///
/// Loads the file, presses Play, optionally presses Stop after `seconds`,
/// and returns once the editor has settled back in Stopped.
pub fn play(file: &Path, seconds: Option<f64>, config: &PlayerConfig) -> Result<()> {
    let transport = AudioTransport::new();
    transport.set_gain(config.gain);
    let output = open_output(&config.output, &transport)?;
    info!(
        "Output '{}' at {} Hz, {} ch",
        output.name(),
        output.sample_rate(),
        output.channels()
    );

    let format_manager = FormatManager::with_basic_formats();
    let supported = format_manager.wildcard_for_all_formats();
    let mut editor = PlayerEditor::new(transport, format_manager, config);
    let poll_interval = Duration::from_millis(config.editor.poll_interval_ms.max(1));

    editor.open_button_clicked(&mut PresetChooser::selecting(file));
    editor.poll();
    if editor.current_file().is_none() {
        return Err(WavdeckError::InvalidAudio {
            reason: format!(
                "{} is not a readable audio file (supported: {})",
                file.display(),
                supported
            ),
            source: None,
        });
    }

    let length = editor.transport().length_in_seconds();
    println!("Loaded {} ({:.2}s)", file.display(), length);

    wait_for(&mut editor, poll_interval, PLAYBACK_GRACE, |state| {
        state == TransportState::Stopped
    })?;

    editor.play_button_clicked();
    let started = Instant::now();
    let mut last_state = editor.state();
    println!("{}", last_state);

    let deadline = started + Duration::from_secs_f64(length) + PLAYBACK_GRACE;
    loop {
        if editor.poll() && editor.state() != last_state {
            last_state = editor.state();
            println!("{}", last_state);
        }

        if last_state == TransportState::Stopped {
            break;
        }

        if let Some(limit) = seconds {
            if last_state == TransportState::Playing && started.elapsed().as_secs_f64() >= limit {
                editor.stop_button_clicked();
                last_state = editor.state();
                println!("{}", last_state);
            }
        }

        if Instant::now() > deadline {
            warn!("Playback did not finish in time, stopping");
            editor.stop_button_clicked();
            wait_for(&mut editor, poll_interval, PLAYBACK_GRACE, |state| {
                state == TransportState::Stopped
            })?;
            println!("{}", editor.state());
            break;
        }

        thread::sleep(poll_interval);
    }

    drop(output);
    Ok(())
}

/// Print format details of an audio file.
pub fn info(file: &Path) -> Result<()> {
    let reader = read_wav(file)?;
    let buffer = reader.buffer();

    println!("File:        {}", file.display());
    println!("Format:      {}", reader.format_name);
    println!("Sample rate: {} Hz", reader.sample_rate);
    println!("Channels:    {}", reader.num_channels);
    println!(
        "Bit depth:   {}{}",
        reader.bits_per_sample,
        if reader.is_float { " (float)" } else { "" }
    );
    println!("Frames:      {}", reader.length_in_samples());
    println!("Duration:    {:.3}s", reader.duration_secs());
    println!("Peak:        {:.1} dBFS", calculate_peak(buffer));
    println!("RMS:         {:.1} dBFS", calculate_rms(buffer));

    Ok(())
}

/// Write a sine test tone.
pub fn tone(
    output: &Path,
    frequency: f32,
    duration: f32,
    sample_rate: u32,
    channels: u16,
    bits: u16,
) -> Result<()> {
    if channels == 0 || sample_rate == 0 || duration <= 0.0 {
        return Err(WavdeckError::UnsupportedFormat {
            format: format!(
                "{} ch, {} Hz, {}s tone",
                channels, sample_rate, duration
            ),
        });
    }

    let buffer = generate_test_tone(frequency, duration, sample_rate, channels as usize);
    write_wav(&buffer, output, bits)?;

    println!(
        "Wrote {} ({} Hz sine, {:.2}s, {} ch, {}-bit)",
        output.display(),
        frequency,
        buffer.duration_secs(),
        channels,
        bits
    );
    Ok(())
}

/// Poll until `done` holds for the editor state or `timeout` passes
fn wait_for<T, F>(
    editor: &mut PlayerEditor<T>,
    poll_interval: Duration,
    timeout: Duration,
    done: F,
) -> Result<()>
where
    T: TransportSource,
    F: Fn(TransportState) -> bool,
{
    let deadline = Instant::now() + timeout;
    loop {
        editor.poll();
        if done(editor.state()) {
            return Ok(());
        }
        if Instant::now() > deadline {
            return Err(WavdeckError::OutputDevice {
                reason: format!("transport stuck in {}", editor.state()),
            });
        }
        thread::sleep(poll_interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_tone_then_info() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tone.wav");

        tone(&path, 440.0, 0.2, 8000, 1, 24).unwrap();
        info(&path).unwrap();

        let reader = read_wav(&path).unwrap();
        assert_eq!(reader.bits_per_sample, 24);
        assert_eq!(reader.num_channels, 1);
    }

    #[test]
    fn test_tone_rejects_zero_channels() {
        let dir = tempdir().unwrap();
        assert!(tone(&dir.path().join("x.wav"), 440.0, 1.0, 8000, 0, 16).is_err());
    }

    #[test]
    fn test_play_rejects_unreadable_file() {
        let err = play(
            Path::new("/nonexistent/file.wav"),
            None,
            &PlayerConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_AUDIO");
        assert!(err.to_string().ends_with("(supported: *.wav;*.wave)"));
    }

    #[test]
    fn test_play_to_end_on_null_output() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("short.wav");
        tone(&path, 440.0, 0.1, 8000, 1, 16).unwrap();

        let mut config = PlayerConfig::default();
        config.output.sample_rate = 8000;
        config.output.block_size = 128;
        config.editor.poll_interval_ms = 5;

        play(&path, None, &config).unwrap();
    }

    #[test]
    fn test_play_with_stop_limit() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("long.wav");
        tone(&path, 440.0, 10.0, 8000, 1, 16).unwrap();

        let mut config = PlayerConfig::default();
        config.editor.poll_interval_ms = 5;

        let started = Instant::now();
        play(&path, Some(0.1), &config).unwrap();
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
