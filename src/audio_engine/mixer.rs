//! Real-time cue mixer.
//!
//! This module provides the [`RtMixer`] struct which owns the device clock and a
//! fixed pool of voice slots. Each [`CueVoice`] renders independently and is summed
//! into the output; voices retire themselves at their stop frame.
//!
//! Gain is baked into each voice's envelope when it is scheduled, so the mixer never
//! re-reads settings while a cue is sounding.

use cpal::Sample;

use crate::audio_engine::constants::MAX_VOICES;
use crate::audio_engine::voice::CueVoice;
use crate::messages::{AudioMessage, ControlMessage};

/// Real-time mixer that manages the voice pool and the device clock.
///
/// All operations are allocation-free and lock-free.
pub struct RtMixer {
    /// Number of output channels (1 for mono, 2 for stereo).
    channels: usize,

    /// Frames rendered so far; the sample-accurate device clock.
    clock: u64,

    /// Active voices with MAX_VOICES slots.
    voices: [Option<CueVoice>; MAX_VOICES],
}

impl RtMixer {
    /// Creates a new RtMixer with the specified number of channels.
    pub fn new(channels: usize) -> Self {
        Self {
            channels,
            clock: 0,
            voices: [None; MAX_VOICES],
        }
    }

    /// Current device clock in frames.
    pub fn clock(&self) -> u64 {
        self.clock
    }

    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|slot| slot.is_some()).count()
    }

    /// Starts a voice in the first free slot.
    ///
    /// A voice whose start frame already passed is moved to the current clock so
    /// it still sounds for its full duration. If no free slot is available, the
    /// voice is dropped and reported.
    pub fn play(&mut self, mut voice: CueVoice) -> Option<AudioMessage> {
        if voice.start_frame < self.clock {
            voice.reschedule(self.clock);
        }

        match self.voices.iter_mut().find(|slot| slot.is_none()) {
            Some(slot) => {
                *slot = Some(voice);
                None
            }
            None => Some(AudioMessage::VoiceDropped { event: voice.event }),
        }
    }

    /// Applies one control message, reporting any reply through `emit`.
    pub fn handle(&mut self, message: ControlMessage, mut emit: impl FnMut(AudioMessage)) {
        match message {
            ControlMessage::Ping() => emit(AudioMessage::Pong()),
            ControlMessage::PlayCue(voice) => {
                if let Some(dropped) = self.play(voice) {
                    emit(dropped);
                }
            }
            ControlMessage::StopAll() => self.stop_all(),
        }
    }

    /// Stops all active voices.
    pub fn stop_all(&mut self) {
        self.voices = [None; MAX_VOICES];
    }

    /// Renders audio frames to the output buffer and advances the clock.
    ///
    /// The output buffer must contain interleaved samples with `channels` per frame.
    /// `on_finished` is called for every voice that retires during this buffer.
    pub fn render(&mut self, output: &mut [f32], mut on_finished: impl FnMut(AudioMessage)) {
        output.fill(Sample::EQUILIBRIUM);

        if self.channels == 0 {
            return;
        }

        let frames = output.len() / self.channels;
        if frames == 0 {
            return;
        }

        let clock = self.clock;
        for slot in &mut self.voices {
            let Some(voice) = slot else {
                continue;
            };

            if voice.render_into(output, self.channels, clock) {
                on_finished(AudioMessage::CueFinished {
                    event: voice.event,
                    frame: voice.stop_frame,
                });
                *slot = None;
            }
        }

        for sample in output.iter_mut() {
            *sample = sample.clamp(-1.0, 1.0);
        }

        self.clock += frames as u64;
    }
}
