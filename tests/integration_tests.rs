//! Integration Tests
//!
//! The editor driving the real transport. Audio is pulled by hand with
//! `get_next_audio_block`, so every step is deterministic.

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use approx::assert_abs_diff_eq;
use pretty_assertions::assert_eq;
use tempfile::{tempdir, TempDir};

use wavdeck::config::{OutputConfig, PlayerConfig};
use wavdeck::editor::{PlayerEditor, PresetChooser, TransportState};
use wavdeck::engine::{
    generate_test_tone, write_wav, AudioTransport, FormatManager, NullOutput, TransportSource,
};

const RATE: u32 = 8000;

/// Helper to write a mono sine fixture of the given length
fn write_tone(dir: &TempDir, name: &str, duration_secs: f32) -> PathBuf {
    let path = dir.path().join(name);
    write_wav(&generate_test_tone(440.0, duration_secs, RATE, 1), &path, 16).unwrap();
    path
}

fn new_editor(transport: &AudioTransport) -> PlayerEditor<AudioTransport> {
    transport.prepare_to_play(RATE);
    PlayerEditor::new(
        transport.clone(),
        FormatManager::with_basic_formats(),
        &PlayerConfig::default(),
    )
}

fn open(editor: &mut PlayerEditor<AudioTransport>, path: &Path) {
    editor.open_button_clicked(&mut PresetChooser::selecting(path));
    editor.poll();
}

/// Pull `frames` frames of mono audio through the transport
fn render(transport: &AudioTransport, frames: usize) -> Vec<f32> {
    let mut block = vec![0.0_f32; frames];
    transport.get_next_audio_block(&mut block, 1);
    block
}

fn button_text(editor: &PlayerEditor<AudioTransport>) -> (&str, &str) {
    (editor.play_button().label(), editor.stop_button().label())
}

// === Loading ===

#[test]
fn test_open_settles_in_stopped() {
    let dir = tempdir().unwrap();
    let path = write_tone(&dir, "tone.wav", 0.5);
    let transport = AudioTransport::new();
    let mut editor = new_editor(&transport);

    open(&mut editor, &path);

    assert_eq!(editor.state(), TransportState::Stopped);
    assert!(transport.has_source());
    assert_abs_diff_eq!(transport.length_in_seconds(), 0.5);
    assert!(editor.play_button().is_enabled());
    assert!(!editor.stop_button().is_enabled());
}

#[test]
fn test_invalid_file_keeps_current_source() {
    let dir = tempdir().unwrap();
    let good = write_tone(&dir, "good.wav", 0.5);
    let bad = dir.path().join("bad.wav");
    fs::write(&bad, b"RIFF....WAVEjunk").unwrap();

    let transport = AudioTransport::new();
    let mut editor = new_editor(&transport);
    open(&mut editor, &good);
    editor.play_button_clicked();
    editor.poll();
    assert_eq!(editor.state(), TransportState::Playing);
    render(&transport, 100);

    open(&mut editor, &bad);

    assert_eq!(editor.state(), TransportState::Playing);
    assert!(transport.is_playing());
    assert_abs_diff_eq!(transport.length_in_seconds(), 0.5);
    assert_abs_diff_eq!(transport.position(), 100.0 / RATE as f64);
    assert_eq!(editor.current_file(), Some(good.as_path()));
}

#[test]
fn test_replacing_file_while_playing_stops() {
    let dir = tempdir().unwrap();
    let first = write_tone(&dir, "first.wav", 0.5);
    let second = write_tone(&dir, "second.wav", 0.25);

    let transport = AudioTransport::new();
    let mut editor = new_editor(&transport);
    open(&mut editor, &first);
    editor.play_button_clicked();
    editor.poll();
    render(&transport, 400);

    open(&mut editor, &second);

    assert_eq!(editor.state(), TransportState::Stopped);
    assert!(!transport.is_playing());
    assert_eq!(transport.position(), 0.0);
    assert_abs_diff_eq!(transport.length_in_seconds(), 0.25);
    assert_eq!(button_text(&editor), ("Play", "Stop"));
}

// === Playback ===

#[test]
fn test_play_to_end_returns_to_stopped() {
    let dir = tempdir().unwrap();
    let path = write_tone(&dir, "tone.wav", 0.1);
    let transport = AudioTransport::new();
    let mut editor = new_editor(&transport);
    open(&mut editor, &path);

    editor.play_button_clicked();
    assert_eq!(editor.state(), TransportState::Starting);
    editor.poll();
    assert_eq!(editor.state(), TransportState::Playing);
    assert_eq!(button_text(&editor), ("Pause", "Stop"));

    // 800 frames of audio, pulled in 256-frame blocks
    for _ in 0..3 {
        render(&transport, 256);
        editor.poll();
        assert_eq!(editor.state(), TransportState::Playing);
    }
    let tail = render(&transport, 256);
    assert!(tail[32..].iter().all(|&s| s == 0.0));

    assert!(editor.poll());
    assert_eq!(editor.state(), TransportState::Stopped);
    assert_eq!(transport.position(), 0.0);
    assert!(!editor.stop_button().is_enabled());
}

#[test]
fn test_short_file_finishing_before_poll_returns_to_stopped() {
    let dir = tempdir().unwrap();
    let path = write_tone(&dir, "blip.wav", 0.01);
    let transport = AudioTransport::new();
    let mut editor = new_editor(&transport);
    open(&mut editor, &path);

    editor.play_button_clicked();
    // All 80 frames render before the editor gets to poll
    render(&transport, 256);
    assert!(!transport.is_playing());

    assert!(editor.poll());
    assert_eq!(editor.state(), TransportState::Stopped);
    assert_eq!(transport.position(), 0.0);
    assert_eq!(button_text(&editor), ("Play", "Stop"));
    assert!(!editor.stop_button().is_enabled());

    // Play works again afterwards
    editor.play_button_clicked();
    editor.poll();
    assert_eq!(editor.state(), TransportState::Playing);
    render(&transport, 256);
    editor.poll();
    assert_eq!(editor.state(), TransportState::Stopped);
}

#[test]
fn test_pause_keeps_position_and_resume_continues() {
    let dir = tempdir().unwrap();
    let path = write_tone(&dir, "tone.wav", 0.5);
    let transport = AudioTransport::new();
    let mut editor = new_editor(&transport);
    open(&mut editor, &path);
    editor.play_button_clicked();
    editor.poll();
    render(&transport, 1000);

    editor.play_button_clicked();
    assert_eq!(editor.state(), TransportState::Pausing);
    editor.poll();
    assert_eq!(editor.state(), TransportState::Paused);
    assert_eq!(button_text(&editor), ("Resume", "Return to Zero"));
    assert_abs_diff_eq!(transport.position(), 1000.0 / RATE as f64);

    // Silence while paused, position frozen
    assert!(render(&transport, 64).iter().all(|&s| s == 0.0));
    assert_abs_diff_eq!(transport.position(), 1000.0 / RATE as f64);

    editor.play_button_clicked();
    editor.poll();
    assert_eq!(editor.state(), TransportState::Playing);
    render(&transport, 500);
    assert_abs_diff_eq!(transport.position(), 1500.0 / RATE as f64);
}

#[test]
fn test_return_to_zero_from_paused() {
    let dir = tempdir().unwrap();
    let path = write_tone(&dir, "tone.wav", 0.5);
    let transport = AudioTransport::new();
    let mut editor = new_editor(&transport);
    open(&mut editor, &path);
    editor.play_button_clicked();
    editor.poll();
    render(&transport, 1000);
    editor.play_button_clicked();
    editor.poll();

    editor.stop_button_clicked();

    assert_eq!(editor.state(), TransportState::Stopped);
    assert_eq!(transport.position(), 0.0);
    assert_eq!(button_text(&editor), ("Play", "Stop"));
    assert!(!editor.stop_button().is_enabled());
}

#[test]
fn test_stop_while_playing() {
    let dir = tempdir().unwrap();
    let path = write_tone(&dir, "tone.wav", 0.5);
    let transport = AudioTransport::new();
    let mut editor = new_editor(&transport);
    open(&mut editor, &path);
    editor.play_button_clicked();
    editor.poll();
    render(&transport, 1000);

    editor.stop_button_clicked();
    assert_eq!(editor.state(), TransportState::Stopping);
    assert!(!transport.is_playing());

    editor.poll();
    assert_eq!(editor.state(), TransportState::Stopped);
    assert_eq!(transport.position(), 0.0);
}

// === Real-time output ===

#[test]
fn test_null_output_drives_editor_to_the_end() {
    let dir = tempdir().unwrap();
    let path = write_tone(&dir, "tone.wav", 0.1);

    let transport = AudioTransport::new();
    let config = OutputConfig {
        block_size: 128,
        sample_rate: RATE,
        channels: 2,
        ..OutputConfig::default()
    };
    let _output = NullOutput::start(&config, transport.clone()).unwrap();
    let mut editor = PlayerEditor::new(
        transport.clone(),
        FormatManager::with_basic_formats(),
        &PlayerConfig::default(),
    );
    open(&mut editor, &path);
    editor.play_button_clicked();

    let mut seen = vec![editor.state()];
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        editor.poll();
        if seen.last() != Some(&editor.state()) {
            seen.push(editor.state());
        }
        if editor.state() == TransportState::Stopped {
            break;
        }
        thread::sleep(Duration::from_millis(5));
    }

    assert_eq!(
        seen,
        vec![
            TransportState::Starting,
            TransportState::Playing,
            TransportState::Stopped
        ]
    );
}
