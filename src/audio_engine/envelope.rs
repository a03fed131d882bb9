//! Scheduled gain envelopes.
//!
//! A [`GainEnvelope`] is a fixed list of linear-ramp breakpoints computed once
//! when a cue is scheduled, in the manner of an audio-param automation curve.
//! Evaluating it is allocation-free so voices can carry it into the audio thread.

use crate::audio_engine::constants::MAX_BREAKPOINTS;
use crate::catalog::Envelope;

/// A point on the gain curve: `gain` is reached exactly at `time_s`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Breakpoint {
    pub time_s: f32,
    pub gain: f32,
}

impl Breakpoint {
    const fn new(time_s: f32, gain: f32) -> Self {
        Self { time_s, gain }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainEnvelope {
    points: [Breakpoint; MAX_BREAKPOINTS],
    len: usize,
    /// Start and end of the sustain hold, when the curve has one.
    hold: Option<(f32, f32)>,
}

impl GainEnvelope {
    /// ADSR shape: 0 → peak over the attack, peak → peak·sustain over the
    /// decay, held until `duration - release`, then ramped to 0 at `duration`.
    ///
    /// Callers guarantee `attack + decay + release <= duration`.
    pub fn adsr(envelope: &Envelope, duration_ms: u32, peak: f32) -> Self {
        let attack = ms_to_s(envelope.attack_ms);
        let decay = ms_to_s(envelope.decay_ms);
        let release = ms_to_s(envelope.release_ms);
        let duration = ms_to_s(duration_ms);
        let sustain = peak * envelope.sustain_level.clamp(0.0, 1.0);

        let hold_start = attack + decay;
        let hold_end = (duration - release).max(hold_start);

        Self {
            points: [
                Breakpoint::new(0.0, 0.0),
                Breakpoint::new(attack, peak),
                Breakpoint::new(hold_start, sustain),
                Breakpoint::new(hold_end, sustain),
                Breakpoint::new(duration, 0.0),
            ],
            len: 5,
            hold: Some((hold_start, hold_end)),
        }
    }

    /// Linear fade from `peak` at 0 to silence at `duration`.
    pub fn fade_out(duration_ms: u32, peak: f32) -> Self {
        let mut points = [Breakpoint::default(); MAX_BREAKPOINTS];
        points[0] = Breakpoint::new(0.0, peak);
        points[1] = Breakpoint::new(ms_to_s(duration_ms), 0.0);

        Self {
            points,
            len: 2,
            hold: None,
        }
    }

    pub fn breakpoints(&self) -> &[Breakpoint] {
        &self.points[..self.len]
    }

    /// Highest gain reached by the curve.
    pub fn peak(&self) -> f32 {
        self.breakpoints()
            .iter()
            .map(|point| point.gain)
            .fold(0.0, f32::max)
    }

    /// Sustain hold window `(start, end)` in seconds, if the curve has one.
    pub fn hold_window(&self) -> Option<(f32, f32)> {
        self.hold
    }

    /// Gain at `t_s` seconds after the cue started.
    pub fn gain_at(&self, t_s: f32) -> f32 {
        let points = self.breakpoints();
        let Some(first) = points.first() else {
            return 0.0;
        };
        if t_s < first.time_s {
            return 0.0;
        }

        // Zero-length segments (e.g. no attack) are stepped over.
        for pair in points.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            if t_s < to.time_s {
                let span = to.time_s - from.time_s;
                let progress = (t_s - from.time_s) / span;
                return from.gain + (to.gain - from.gain) * progress;
            }
        }

        points[points.len() - 1].gain
    }
}

fn ms_to_s(ms: u32) -> f32 {
    ms as f32 / 1000.0
}
