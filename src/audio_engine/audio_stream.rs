//! Audio Stream Module
//!
//! This module handles CPAL audio stream management including:
//! - Stream initialization and configuration
//! - Audio callback setup
//! - Real-time message processing
//! - Publishing the device clock to the control thread

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, Stream, StreamConfig};
use env_logger::{Builder, Env};
use rtrb::{Consumer, Producer, RingBuffer};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::audio_engine::errors::OutputError;
use crate::audio_engine::mixer::RtMixer;
use crate::audio_engine::output::AudioOutput;
use crate::audio_engine::voice::CueVoice;
use crate::config::EngineConfig;
use crate::messages::{AudioMessage, ControlMessage};

/// Handle to the audio stream with associated message channels
pub struct AudioStreamHandle {
    pub stream: Stream,
    pub producer: Producer<ControlMessage>,
    pub consumer: Consumer<AudioMessage>,
    /// Frames rendered by the callback so far.
    pub clock: Arc<AtomicU64>,
    /// Set by the stream error callback.
    pub failed: Arc<AtomicBool>,
    pub output_channels: usize,
    pub output_sample_rate: u32,
}

/// Setup and configure the logger for audio operations
pub fn setup_logger() {
    // Users can override via `RUST_LOG`, e.g. `RUST_LOG=sound_cues=debug`.
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .try_init()
        .unwrap_or(()); // Ignore initialization errors
}

/// Create and configure the audio stream
///
/// This function:
/// 1. Sets up the default audio device
/// 2. Configures the stream with appropriate parameters
/// 3. Creates ring buffers for message passing
/// 4. Initializes the mixer
/// 5. Builds and returns the audio stream (not yet playing)
pub fn create_audio_stream(
    buffer_frames: u32,
    message_capacity: usize,
) -> Result<AudioStreamHandle, OutputError> {
    setup_logger();

    let host = cpal::default_host();
    let device = host.default_output_device().ok_or(OutputError::NoDevice)?;

    let config = device.default_output_config()?;
    let sample_rate = config.sample_rate();
    let channels = config.channels();

    log::info!(
        "Starting sound cue output... ({} ch@{} Hz)",
        channels,
        sample_rate
    );

    // Control -> audio thread
    let (producer_in, mut consumer_in) = RingBuffer::new(message_capacity);

    // Audio thread -> control
    let (mut producer_out, consumer_out) = RingBuffer::new(message_capacity);

    let mut mixer = RtMixer::new(channels as usize);
    let clock = Arc::new(AtomicU64::new(0));
    let callback_clock = Arc::clone(&clock);
    let failed = Arc::new(AtomicBool::new(false));
    let error_flag = Arc::clone(&failed);

    let stream_config = StreamConfig {
        channels,
        sample_rate,
        buffer_size: BufferSize::Fixed(buffer_frames),
    };

    let stream = device.build_output_stream(
        &stream_config,
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            // Process incoming messages in real-time
            while let Ok(message) = consumer_in.pop() {
                mixer.handle(message, |reply| {
                    let _ = producer_out.push(reply);
                });
            }

            mixer.render(data, |finished| {
                let _ = producer_out.push(finished);
            });
            callback_clock.store(mixer.clock(), Ordering::Release);
        },
        move |err| {
            log::error!("Audio stream error: {}", err);
            error_flag.store(true, Ordering::Release);
        },
        None,
    )?;

    Ok(AudioStreamHandle {
        stream,
        producer: producer_in,
        consumer: consumer_out,
        clock,
        failed,
        output_channels: channels as usize,
        output_sample_rate: sample_rate,
    })
}

/// [`AudioOutput`] backed by the default cpal output device.
pub struct CpalOutput {
    buffer_frames: u32,
    message_capacity: usize,
    handle: Option<AudioStreamHandle>,
}

impl CpalOutput {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            buffer_frames: config.buffer_frames,
            message_capacity: config.message_capacity,
            handle: None,
        }
    }

    fn handle_mut(&mut self) -> Result<&mut AudioStreamHandle, OutputError> {
        self.handle.as_mut().ok_or(OutputError::NotOpen)
    }
}

impl AudioOutput for CpalOutput {
    fn open(&mut self) -> Result<(), OutputError> {
        if self.handle.is_none() {
            self.handle = Some(create_audio_stream(
                self.buffer_frames,
                self.message_capacity,
            )?);
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    fn resume(&mut self) -> Result<(), OutputError> {
        self.handle_mut()?.stream.play()?;
        Ok(())
    }

    fn suspend(&mut self) -> Result<(), OutputError> {
        self.handle_mut()?.stream.pause()?;
        Ok(())
    }

    fn close(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            let _ = handle.producer.push(ControlMessage::StopAll());
        }
    }

    fn is_available(&self) -> bool {
        self.handle
            .as_ref()
            .is_none_or(|handle| !handle.failed.load(Ordering::Acquire))
    }

    fn sample_rate(&self) -> u32 {
        self.handle
            .as_ref()
            .map_or(0, |handle| handle.output_sample_rate)
    }

    fn current_frame(&self) -> u64 {
        self.handle
            .as_ref()
            .map_or(0, |handle| handle.clock.load(Ordering::Acquire))
    }

    fn schedule(&mut self, voice: CueVoice) -> Result<(), OutputError> {
        self.handle_mut()?
            .producer
            .push(ControlMessage::PlayCue(voice))
            .map_err(|_| OutputError::QueueFull)
    }

    fn poll_message(&mut self) -> Option<AudioMessage> {
        self.handle.as_mut()?.consumer.pop().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logger_setup() {
        // Multiple calls should be safe (though only the first takes effect)
        setup_logger();
        setup_logger();
    }

    #[test]
    fn test_closed_output_rejects_cues() {
        let output = CpalOutput::new(&EngineConfig::default());

        assert!(!output.is_open());
        assert!(output.is_available());
        assert_eq!(output.sample_rate(), 0);
        assert_eq!(output.current_frame(), 0);
    }

    #[test]
    fn test_audio_stream_creation() {
        // Actual stream creation requires audio hardware
        if cpal::default_host().default_output_device().is_none() {
            return; // Skip test if no audio device available
        }

        let mut output = CpalOutput::new(&EngineConfig::default());
        // May still fail in headless test environments; it must not panic.
        if output.open().is_ok() {
            assert!(output.is_open());
            assert!(output.sample_rate() > 0);
            output.close();
            assert!(!output.is_open());
        }
    }
}
