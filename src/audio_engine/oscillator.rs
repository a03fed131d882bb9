//! Phase-accumulating oscillator for the four cue waveforms.
//!
//! Square and sawtooth use PolyBLEP correction at their discontinuities so
//! short high-pitched cues do not alias audibly.

use std::f32::consts::TAU;

use crate::catalog::Waveform;

#[derive(Debug, Clone, Copy)]
pub struct Oscillator {
    waveform: Waveform,
    /// Phase in cycles, [0, 1).
    phase: f32,
    /// Phase increment per output frame.
    phase_inc: f32,
}

impl Oscillator {
    pub fn new(waveform: Waveform, frequency_hz: f32, sample_rate: u32) -> Self {
        let phase_inc = if sample_rate == 0 {
            0.0
        } else {
            frequency_hz / sample_rate as f32
        };

        Self {
            waveform,
            phase: 0.0,
            phase_inc,
        }
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Oscillator frequency in Hz at the given sample rate.
    pub fn frequency_hz(&self, sample_rate: u32) -> f32 {
        self.phase_inc * sample_rate as f32
    }

    /// Generate the next sample in [-1, 1] (PolyBLEP may overshoot slightly).
    pub fn next_sample(&mut self) -> f32 {
        let t = self.phase;
        let dt = self.phase_inc;

        let sample = match self.waveform {
            Waveform::Sine => (TAU * t).sin(),
            Waveform::Sawtooth => 2.0 * t - 1.0 - poly_blep(t, dt),
            Waveform::Square => {
                let naive = if t < 0.5 { 1.0 } else { -1.0 };
                naive + poly_blep(t, dt) - poly_blep((t + 0.5) % 1.0, dt)
            }
            Waveform::Triangle => {
                if t < 0.5 {
                    4.0 * t - 1.0
                } else {
                    3.0 - 4.0 * t
                }
            }
        };

        self.phase += dt;
        if self.phase >= 1.0 {
            self.phase -= self.phase.floor();
        }

        sample
    }
}

/// Polynomial band-limited step correction; `t` is the phase, `dt` the increment.
fn poly_blep(t: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        return 0.0;
    }

    if t < dt {
        let t = t / dt;
        2.0 * t - t * t - 1.0
    } else if t > 1.0 - dt {
        let t = (t - 1.0) / dt;
        t * t + 2.0 * t + 1.0
    } else {
        0.0
    }
}
