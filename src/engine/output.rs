//! Output drivers
//!
//! An output pulls interleaved blocks from an [`AudioTransport`] at its own
//! pace. Dropping the output stops pulling.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, info, warn};

use crate::config::{OutputBackend, OutputConfig};
use crate::engine::transport::AudioTransport;
use crate::error::{Result, WavdeckError};

/// A running output; audio flows until it is dropped
pub trait AudioOutput {
    fn name(&self) -> &str;
    fn sample_rate(&self) -> u32;
    fn channels(&self) -> usize;
}

/// Open the output named by `config`, preparing `transport` for its rate
///
/// Asking for cpal without the `cpal-output` feature falls back to the null
/// output with a warning.
pub fn open_output(config: &OutputConfig, transport: &AudioTransport) -> Result<Box<dyn AudioOutput>> {
    match config.backend {
        OutputBackend::Null => Ok(Box::new(NullOutput::start(config, transport.clone())?)),
        OutputBackend::Cpal => open_cpal(config, transport),
    }
}

#[cfg(feature = "cpal-output")]
fn open_cpal(_config: &OutputConfig, transport: &AudioTransport) -> Result<Box<dyn AudioOutput>> {
    Ok(Box::new(cpal_output::CpalOutput::start(transport.clone())?))
}

#[cfg(not(feature = "cpal-output"))]
fn open_cpal(config: &OutputConfig, transport: &AudioTransport) -> Result<Box<dyn AudioOutput>> {
    warn!("Built without cpal-output; using the null output instead");
    Ok(Box::new(NullOutput::start(config, transport.clone())?))
}

/// Renders into a scratch buffer on a background thread, paced to real time
///
/// Lets playback run (and end) without an audio device.
pub struct NullOutput {
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
    sample_rate: u32,
    channels: usize,
}

impl NullOutput {
    pub fn start(config: &OutputConfig, transport: AudioTransport) -> Result<Self> {
        if config.block_size == 0 || config.channels == 0 || config.sample_rate == 0 {
            return Err(WavdeckError::Config {
                reason: "null output needs a non-zero block size, channel count and rate"
                    .to_string(),
            });
        }

        let sample_rate = config.sample_rate;
        let channels = config.channels;
        let block_size = config.block_size;
        transport.prepare_to_play(sample_rate);

        let running = Arc::new(AtomicBool::new(true));
        let running_ref = running.clone();
        let block_duration = Duration::from_secs_f64(block_size as f64 / sample_rate as f64);

        let worker = thread::Builder::new()
            .name("wavdeck-null-output".to_string())
            .spawn(move || {
                let mut scratch = vec![0.0_f32; block_size * channels];
                while running_ref.load(Ordering::Relaxed) {
                    transport.get_next_audio_block(&mut scratch, channels);
                    thread::sleep(block_duration);
                }
                debug!("Null output thread exiting");
            })?;

        info!(
            "Null output running at {} Hz, {} ch, {} frames per block",
            sample_rate, channels, block_size
        );

        Ok(Self {
            running,
            worker: Some(worker),
            sample_rate,
            channels,
        })
    }
}

impl AudioOutput for NullOutput {
    fn name(&self) -> &str {
        "null"
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn channels(&self) -> usize {
        self.channels
    }
}

impl Drop for NullOutput {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("Null output thread panicked");
            }
        }
    }
}

#[cfg(feature = "cpal-output")]
mod cpal_output {
    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
    use cpal::{FromSample, SampleFormat, SizedSample};
    use log::{info, warn};

    use super::AudioOutput;
    use crate::engine::transport::AudioTransport;
    use crate::error::{Result, WavdeckError};

    /// Default system device through cpal
    pub struct CpalOutput {
        // Kept alive; dropping the stream stops the device callback
        _stream: cpal::Stream,
        device_name: String,
        sample_rate: u32,
        channels: usize,
    }

    impl CpalOutput {
        pub fn start(transport: AudioTransport) -> Result<Self> {
            let host = cpal::default_host();
            let device = host
                .default_output_device()
                .ok_or_else(|| device_error("No output device available"))?;
            let device_name = device.name().unwrap_or_else(|_| "unknown".to_string());

            let supported = device
                .default_output_config()
                .map_err(|e| device_error(format!("Failed to get output config: {}", e)))?;

            let sample_rate = supported.sample_rate().0;
            let channels = supported.channels() as usize;
            let sample_format = supported.sample_format();
            let config: cpal::StreamConfig = supported.into();
            transport.prepare_to_play(sample_rate);

            let stream = match sample_format {
                SampleFormat::F32 => build_stream::<f32>(&device, &config, transport, channels),
                SampleFormat::I16 => build_stream::<i16>(&device, &config, transport, channels),
                SampleFormat::U16 => build_stream::<u16>(&device, &config, transport, channels),
                SampleFormat::I32 => build_stream::<i32>(&device, &config, transport, channels),
                other => {
                    return Err(device_error(format!(
                        "Unsupported device sample format {:?}",
                        other
                    )))
                }
            }
            .map_err(|e| device_error(format!("Failed to build output stream: {}", e)))?;

            stream
                .play()
                .map_err(|e| device_error(format!("Failed to start output: {}", e)))?;

            info!(
                "Audio output on '{}' at {} Hz, {} ch",
                device_name, sample_rate, channels
            );

            Ok(Self {
                _stream: stream,
                device_name,
                sample_rate,
                channels,
            })
        }
    }

    impl AudioOutput for CpalOutput {
        fn name(&self) -> &str {
            &self.device_name
        }

        fn sample_rate(&self) -> u32 {
            self.sample_rate
        }

        fn channels(&self) -> usize {
            self.channels
        }
    }

    /// Output stream in the device's native sample type
    fn build_stream<T>(
        device: &cpal::Device,
        config: &cpal::StreamConfig,
        transport: AudioTransport,
        channels: usize,
    ) -> std::result::Result<cpal::Stream, cpal::BuildStreamError>
    where
        T: SizedSample + FromSample<f32>,
    {
        let mut scratch: Vec<f32> = Vec::new();
        device.build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                render_block(&transport, data, &mut scratch, channels);
            },
            |err| warn!("Output stream error: {}", err),
            None,
        )
    }

    /// Render through an f32 scratch block and convert into `data`
    ///
    /// The scratch block only grows, so steady-state callbacks do not allocate.
    fn render_block<T>(
        transport: &AudioTransport,
        data: &mut [T],
        scratch: &mut Vec<f32>,
        channels: usize,
    ) where
        T: SizedSample + FromSample<f32>,
    {
        if scratch.len() < data.len() {
            scratch.resize(data.len(), 0.0);
        }
        let block = &mut scratch[..data.len()];
        transport.get_next_audio_block(block, channels);
        for (out, &sample) in data.iter_mut().zip(block.iter()) {
            *out = T::from_sample(sample);
        }
    }

    fn device_error(reason: impl Into<String>) -> WavdeckError {
        WavdeckError::OutputDevice {
            reason: reason.into(),
        }
    }

}
