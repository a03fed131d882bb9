//! A single scheduled cue and its per-sample signal chain.
//!
//! A [`CueVoice`] is fully built on the control thread (oscillator, optional
//! biquad coefficients, gain envelope, start/stop frames) and then moved into
//! the [`RtMixer`](crate::audio_engine::mixer::RtMixer), which only advances it.

use crate::audio_engine::biquad::{BiquadCoeffs, BiquadState, biquad_process};
use crate::audio_engine::envelope::GainEnvelope;
use crate::audio_engine::oscillator::Oscillator;
use crate::catalog::SoundEvent;

/// oscillator → [biquad] → envelope gain, bounded to `[start_frame, stop_frame)`.
#[derive(Debug, Clone, Copy)]
pub struct CueVoice {
    /// Event that produced this voice.
    pub event: SoundEvent,

    /// Device-clock frame at which the cue starts sounding.
    pub start_frame: u64,

    /// Device-clock frame at which the cue is stopped (exclusive).
    pub stop_frame: u64,

    /// Output sample rate the voice was built for.
    pub sample_rate: u32,

    pub oscillator: Oscillator,

    pub filter: Option<BiquadCoeffs>,

    pub envelope: GainEnvelope,

    filter_state: BiquadState,
}

impl CueVoice {
    pub fn new(
        event: SoundEvent,
        start_frame: u64,
        duration_frames: u64,
        sample_rate: u32,
        oscillator: Oscillator,
        filter: Option<BiquadCoeffs>,
        envelope: GainEnvelope,
    ) -> Self {
        Self {
            event,
            start_frame,
            stop_frame: start_frame + duration_frames,
            sample_rate,
            oscillator,
            filter,
            envelope,
            filter_state: BiquadState::default(),
        }
    }

    pub fn duration_frames(&self) -> u64 {
        self.stop_frame - self.start_frame
    }

    /// Oscillator frequency in Hz.
    pub fn frequency_hz(&self) -> f32 {
        self.oscillator.frequency_hz(self.sample_rate)
    }

    /// Peak of the scheduled gain curve.
    pub fn peak_gain(&self) -> f32 {
        self.envelope.peak()
    }

    /// Moves the whole window so it starts at `frame`, keeping its duration.
    pub fn reschedule(&mut self, frame: u64) {
        let duration = self.duration_frames();
        self.start_frame = frame;
        self.stop_frame = frame + duration;
    }

    pub fn is_finished(&self, clock: u64) -> bool {
        clock >= self.stop_frame
    }

    /// Adds this voice into an interleaved buffer whose first frame is `clock`.
    ///
    /// Returns `true` once the voice has reached its stop frame.
    pub fn render_into(&mut self, output: &mut [f32], channels: usize, clock: u64) -> bool {
        if channels == 0 {
            return self.is_finished(clock);
        }

        let frames = output.len() / channels;
        let sample_rate = self.sample_rate.max(1) as f32;

        for frame in 0..frames {
            let now = clock + frame as u64;
            if now < self.start_frame {
                continue;
            }
            if now >= self.stop_frame {
                return true;
            }

            let mut sample = self.oscillator.next_sample();
            if let Some(coeffs) = self.filter {
                sample = biquad_process(coeffs, &mut self.filter_state, sample);
            }

            let elapsed_s = (now - self.start_frame) as f32 / sample_rate;
            sample *= self.envelope.gain_at(elapsed_s);

            let out_base = frame * channels;
            for out in &mut output[out_base..out_base + channels] {
                *out += sample;
            }
        }

        self.is_finished(clock + frames as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Waveform;

    const SAMPLE_RATE: u32 = 1_000;

    fn square_voice(start_frame: u64, duration_frames: u64) -> CueVoice {
        // 1 Hz square: positive for the whole window after the first frame.
        CueVoice::new(
            SoundEvent::ButtonClick,
            start_frame,
            duration_frames,
            SAMPLE_RATE,
            Oscillator::new(Waveform::Square, 1.0, SAMPLE_RATE),
            None,
            GainEnvelope::fade_out((duration_frames * 1000 / SAMPLE_RATE as u64) as u32, 1.0),
        )
    }

    #[test]
    fn test_voice_window() {
        let voice = square_voice(100, 120);

        assert_eq!(voice.start_frame, 100);
        assert_eq!(voice.stop_frame, 220);
        assert_eq!(voice.duration_frames(), 120);
        assert!(!voice.is_finished(219));
        assert!(voice.is_finished(220));
    }

    #[test]
    fn test_reschedule_keeps_duration() {
        let mut voice = square_voice(10, 50);
        voice.reschedule(64);

        assert_eq!(voice.start_frame, 64);
        assert_eq!(voice.stop_frame, 114);
    }

    #[test]
    fn test_render_respects_start_and_stop() {
        let mut voice = square_voice(4, 8);
        let mut output = vec![0.0; 16];

        let finished = voice.render_into(&mut output, 1, 0);

        assert!(finished);
        assert!(output[..4].iter().all(|&s| s == 0.0));
        assert!(output[5..12].iter().all(|&s| s > 0.0));
        assert!(output[12..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_render_writes_all_channels() {
        let mut voice = square_voice(0, 8);
        let mut output = vec![0.0; 8];

        voice.render_into(&mut output, 2, 0);

        for frame in output.chunks_exact(2) {
            assert_eq!(frame[0], frame[1]);
        }
        assert!(output[2] > 0.8);
    }

    #[test]
    fn test_render_across_buffers_is_continuous() {
        let mut split = square_voice(0, 10);
        let mut whole = square_voice(0, 10);

        let mut first = vec![0.0; 6];
        let mut second = vec![0.0; 6];
        assert!(!split.render_into(&mut first, 1, 0));
        assert!(split.render_into(&mut second, 1, 6));

        let mut reference = vec![0.0; 12];
        whole.render_into(&mut reference, 1, 0);

        let joined: Vec<f32> = first.into_iter().chain(second).collect();
        assert_eq!(joined, reference);
    }

    #[test]
    fn test_peak_and_frequency() {
        let voice = square_voice(0, 100);
        assert!((voice.peak_gain() - 1.0).abs() < f32::EPSILON);
        assert!((voice.frequency_hz() - 1.0).abs() < 1e-4);
    }
}
