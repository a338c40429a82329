//! Audio transport
//!
//! [`TransportSource`] is the contract the editor drives: start, stop,
//! position, source installation and change notifications.
//! [`AudioTransport`] is the shipped implementation. It is a cheap handle
//! around shared state, so the UI thread and an output thread can each hold
//! one; the output side pulls audio with
//! [`AudioTransport::get_next_audio_block`].
//!
//! Every change in playing status or source is announced to listeners as a
//! [`ChangeMessage`] over an `mpsc` channel. Listeners are expected to
//! re-query [`TransportSource::is_playing`] rather than trust the message
//! payload, since several messages can be queued before anyone looks.

use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, info};

use crate::engine::source::AudioSource;

/// Notification sent to transport listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeMessage {
    Started,
    Stopped,
    SourceChanged,
    /// Playback ran off the end of the source
    StreamFinished,
}

impl fmt::Display for ChangeMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeMessage::Started => write!(f, "Started"),
            ChangeMessage::Stopped => write!(f, "Stopped"),
            ChangeMessage::SourceChanged => write!(f, "SourceChanged"),
            ChangeMessage::StreamFinished => write!(f, "StreamFinished"),
        }
    }
}

/// Fans change messages out to any number of channel listeners
///
/// Listeners whose receiver has been dropped are pruned on the next send.
#[derive(Debug, Default)]
pub struct ChangeBroadcaster {
    listeners: Mutex<Vec<Sender<ChangeMessage>>>,
}

impl ChangeBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&self) -> Receiver<ChangeMessage> {
        let (tx, rx) = mpsc::channel();
        lock(&self.listeners).push(tx);
        rx
    }

    pub fn send_change_message(&self, message: ChangeMessage) {
        lock(&self.listeners).retain(|listener| listener.send(message).is_ok());
    }

    pub fn num_listeners(&self) -> usize {
        lock(&self.listeners).len()
    }
}

/// What the editor needs from a playback engine
pub trait TransportSource {
    /// Begin playing the installed source from the current position
    fn start(&self);

    /// Stop playing; the position is kept
    fn stop(&self);

    /// Move the read position, in seconds
    fn set_position(&self, seconds: f64);

    /// Current read position, in seconds
    fn position(&self) -> f64;

    fn is_playing(&self) -> bool;

    /// Install a new source, releasing the previous one
    fn set_source(&self, source: Option<Box<dyn AudioSource>>);

    /// Subscribe to change notifications
    fn add_change_listener(&self) -> Receiver<ChangeMessage>;
}

struct SharedState {
    source: Option<Box<dyn AudioSource>>,
    playing: bool,
    /// Read position in source frames; fractional while resampling
    position: f64,
    output_rate: u32,
    gain: f32,
}

/// Plays one [`AudioSource`] at a time into whatever output pulls from it
#[derive(Clone)]
pub struct AudioTransport {
    state: Arc<Mutex<SharedState>>,
    broadcaster: Arc<ChangeBroadcaster>,
}

impl Default for AudioTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AudioTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = lock(&self.state);
        f.debug_struct("AudioTransport")
            .field("has_source", &state.source.is_some())
            .field("playing", &state.playing)
            .field("position", &state.position)
            .field("output_rate", &state.output_rate)
            .field("gain", &state.gain)
            .finish()
    }
}

impl AudioTransport {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(SharedState {
                source: None,
                playing: false,
                position: 0.0,
                output_rate: 48000,
                gain: 1.0,
            })),
            broadcaster: Arc::new(ChangeBroadcaster::new()),
        }
    }

    /// Tell the transport the rate its output will be pulled at
    pub fn prepare_to_play(&self, output_rate: u32) {
        debug!("[TRANSPORT] Prepared for {} Hz output", output_rate);
        lock(&self.state).output_rate = output_rate.max(1);
    }

    pub fn output_rate(&self) -> u32 {
        lock(&self.state).output_rate
    }

    pub fn set_gain(&self, gain: f32) {
        lock(&self.state).gain = gain.max(0.0);
    }

    pub fn gain(&self) -> f32 {
        lock(&self.state).gain
    }

    pub fn has_source(&self) -> bool {
        lock(&self.state).source.is_some()
    }

    /// Duration of the installed source; 0 without one
    pub fn length_in_seconds(&self) -> f64 {
        lock(&self.state)
            .source
            .as_ref()
            .map(|source| source.length_in_seconds())
            .unwrap_or(0.0)
    }

    /// Fill an interleaved block of `channels`-wide frames
    ///
    /// Outputs silence while stopped. The source is resampled to the output
    /// rate by linear interpolation; a mono source feeds every output
    /// channel and surplus output channels repeat the last source channel.
    /// Reaching the end of the source stops playback and sends
    /// [`ChangeMessage::StreamFinished`].
    pub fn get_next_audio_block(&self, out: &mut [f32], channels: usize) {
        if channels == 0 {
            return;
        }

        let finished = {
            let mut guard = lock(&self.state);
            let state = &mut *guard;

            let source = match (&state.source, state.playing) {
                (Some(source), true) => source,
                _ => {
                    out.fill(0.0);
                    return;
                }
            };

            let length = source.total_length();
            let source_channels = source.num_channels().max(1);
            let step = source.sample_rate() as f64 / state.output_rate as f64;
            let mut position = state.position;
            let mut finished = false;

            for frame in out.chunks_mut(channels) {
                if position >= length as f64 {
                    finished = true;
                    frame.fill(0.0);
                    continue;
                }

                let index = position as usize;
                let frac = (position - index as f64) as f32;

                for (ch, sample) in frame.iter_mut().enumerate() {
                    let source_ch = ch.min(source_channels - 1);
                    let a = source.sample(source_ch, index);
                    let b = if index + 1 < length {
                        source.sample(source_ch, index + 1)
                    } else {
                        a
                    };
                    *sample = (a + (b - a) * frac) * state.gain;
                }

                position += step;
            }

            state.position = position.min(length as f64);
            if finished {
                state.playing = false;
            }
            finished
        };

        if finished {
            debug!("[TRANSPORT] Reached end of source");
            self.broadcaster
                .send_change_message(ChangeMessage::StreamFinished);
        }
    }
}

impl TransportSource for AudioTransport {
    fn start(&self) {
        {
            let mut state = lock(&self.state);
            if state.playing {
                debug!("[TRANSPORT] Already playing");
                return;
            }
            if state.source.is_none() {
                debug!("[TRANSPORT] Start ignored, no source installed");
                return;
            }
            state.playing = true;
            debug!("[TRANSPORT] Play from frame {:.1}", state.position);
        }
        self.broadcaster.send_change_message(ChangeMessage::Started);
    }

    fn stop(&self) {
        {
            let mut state = lock(&self.state);
            if state.playing {
                debug!("[TRANSPORT] Stopped at frame {:.1}", state.position);
            }
            state.playing = false;
        }
        // Sent even when already stopped so a listener waiting in a
        // transitional state always gets its confirmation.
        self.broadcaster.send_change_message(ChangeMessage::Stopped);
    }

    fn set_position(&self, seconds: f64) {
        let mut state = lock(&self.state);
        let (rate, length) = match &state.source {
            Some(source) => (source.sample_rate() as f64, source.total_length() as f64),
            None => {
                state.position = 0.0;
                return;
            }
        };
        state.position = (seconds.max(0.0) * rate).min(length);
        debug!("[TRANSPORT] Seek to {:.3}s", state.position / rate);
    }

    fn position(&self) -> f64 {
        let state = lock(&self.state);
        match &state.source {
            Some(source) if source.sample_rate() > 0 => {
                state.position / source.sample_rate() as f64
            }
            _ => 0.0,
        }
    }

    fn is_playing(&self) -> bool {
        lock(&self.state).playing
    }

    fn set_source(&self, source: Option<Box<dyn AudioSource>>) {
        let previous = {
            let mut state = lock(&self.state);
            state.playing = false;
            state.position = 0.0;
            match &source {
                Some(new) => info!(
                    "[TRANSPORT] Source installed: {} Hz, {} ch, {:.2}s",
                    new.sample_rate(),
                    new.num_channels(),
                    new.length_in_seconds()
                ),
                None => info!("[TRANSPORT] Source cleared"),
            }
            std::mem::replace(&mut state.source, source)
        };
        // Release the old source outside the lock
        drop(previous);
        self.broadcaster
            .send_change_message(ChangeMessage::SourceChanged);
    }

    fn add_change_listener(&self) -> Receiver<ChangeMessage> {
        self.broadcaster.add_listener()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
