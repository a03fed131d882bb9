//! The output device seen by the engine.
//!
//! [`AudioOutput`] is the seam between the engine and whatever renders sound:
//! the cpal stream in [`audio_stream`](crate::audio_engine::audio_stream), or
//! the [`OfflineOutput`] here, which drives the same [`RtMixer`] from caller
//! buffers and records every scheduled cue.

use std::collections::VecDeque;

use crate::audio_engine::errors::OutputError;
use crate::audio_engine::mixer::RtMixer;
use crate::audio_engine::voice::CueVoice;
use crate::messages::{AudioMessage, ControlMessage};

/// An audio output device with its own sample clock.
pub trait AudioOutput {
    /// Acquires the device. Opening an already open output is a no-op.
    fn open(&mut self) -> Result<(), OutputError>;

    fn is_open(&self) -> bool;

    /// Starts (or restarts) rendering.
    fn resume(&mut self) -> Result<(), OutputError>;

    /// Pauses rendering without releasing the device.
    fn suspend(&mut self) -> Result<(), OutputError>;

    /// Silences everything and releases the device.
    fn close(&mut self);

    /// `false` once the device reported a failure after being opened.
    fn is_available(&self) -> bool {
        true
    }

    /// Output sample rate in Hz, or 0 while closed.
    fn sample_rate(&self) -> u32;

    /// Current position of the device clock in frames.
    fn current_frame(&self) -> u64;

    /// Hands a built voice to the renderer. Must not block.
    fn schedule(&mut self, voice: CueVoice) -> Result<(), OutputError>;

    /// Next pending message from the renderer, if any.
    fn poll_message(&mut self) -> Option<AudioMessage> {
        None
    }
}

/// Renders into caller-provided buffers instead of a device.
pub struct OfflineOutput {
    sample_rate: u32,
    mixer: RtMixer,
    device_present: bool,
    device_lost: bool,
    open: bool,
    running: bool,
    scheduled: Vec<CueVoice>,
    messages: VecDeque<AudioMessage>,
}

impl OfflineOutput {
    pub fn new(sample_rate: u32, channels: usize) -> Self {
        Self {
            sample_rate,
            mixer: RtMixer::new(channels),
            device_present: true,
            device_lost: false,
            open: false,
            running: false,
            scheduled: Vec::new(),
            messages: VecDeque::new(),
        }
    }

    /// An output whose device cannot be opened until [`connect`](Self::connect) is called.
    pub fn unavailable(sample_rate: u32, channels: usize) -> Self {
        Self {
            device_present: false,
            ..Self::new(sample_rate, channels)
        }
    }

    /// Makes the device available to a later `open`.
    pub fn connect(&mut self) {
        self.device_present = true;
        self.device_lost = false;
    }

    /// Simulates the device failing while open.
    pub fn disconnect(&mut self) {
        self.device_present = false;
        if self.open {
            self.device_lost = true;
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Every voice accepted by `schedule`, in call order.
    pub fn scheduled(&self) -> &[CueVoice] {
        &self.scheduled
    }

    pub fn active_voices(&self) -> usize {
        self.mixer.active_voices()
    }

    /// Renders one interleaved buffer. A suspended output yields silence and
    /// does not advance its clock.
    pub fn render(&mut self, output: &mut [f32]) {
        if !self.running {
            output.fill(0.0);
            return;
        }

        let messages = &mut self.messages;
        self.mixer.render(output, |msg| messages.push_back(msg));
    }
}

impl AudioOutput for OfflineOutput {
    fn open(&mut self) -> Result<(), OutputError> {
        if self.open {
            return Ok(());
        }
        if !self.device_present {
            return Err(OutputError::NoDevice);
        }

        self.open = true;
        self.device_lost = false;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn resume(&mut self) -> Result<(), OutputError> {
        if !self.open {
            return Err(OutputError::NotOpen);
        }

        self.running = true;
        Ok(())
    }

    fn suspend(&mut self) -> Result<(), OutputError> {
        if !self.open {
            return Err(OutputError::NotOpen);
        }

        self.running = false;
        Ok(())
    }

    fn close(&mut self) {
        self.mixer.stop_all();
        self.open = false;
        self.running = false;
    }

    fn is_available(&self) -> bool {
        !self.device_lost
    }

    fn sample_rate(&self) -> u32 {
        if self.open { self.sample_rate } else { 0 }
    }

    fn current_frame(&self) -> u64 {
        self.mixer.clock()
    }

    fn schedule(&mut self, voice: CueVoice) -> Result<(), OutputError> {
        if !self.open {
            return Err(OutputError::NotOpen);
        }

        self.scheduled.push(voice);
        let messages = &mut self.messages;
        self.mixer
            .handle(ControlMessage::PlayCue(voice), |msg| messages.push_back(msg));
        Ok(())
    }

    fn poll_message(&mut self) -> Option<AudioMessage> {
        self.messages.pop_front()
    }
}
