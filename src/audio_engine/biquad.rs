use std::f32::consts::PI;

use crate::audio_engine::errors::SynthesisError;
use crate::catalog::{FilterKind, FilterSpec};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoeffs {
    pub b0: f32,
    pub b1: f32,
    pub b2: f32,
    pub a1: f32,
    pub a2: f32,
}

impl BiquadCoeffs {
    #[cfg(test)]
    fn identity() -> Self {
        Self {
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
        }
    }

    /// Coefficients for `spec` at sample rate `fs_hz` (RBJ audio EQ cookbook).
    ///
    /// The cutoff is clamped below Nyquist. Non-positive or non-finite
    /// cutoff or Q cannot be realised and are rejected.
    pub fn for_filter(spec: &FilterSpec, fs_hz: f32) -> Result<Self, SynthesisError> {
        let invalid = || SynthesisError::InvalidFilter {
            cutoff_hz: spec.cutoff_hz,
            q: spec.q,
        };

        let usable = spec.cutoff_hz.is_finite()
            && spec.cutoff_hz > 0.0
            && spec.q.is_finite()
            && spec.q > 0.0
            && fs_hz.is_finite()
            && fs_hz > 0.0;
        if !usable {
            return Err(invalid());
        }

        let freq_hz = clamp_freq_hz(fs_hz, spec.cutoff_hz);
        let w0 = 2.0 * PI * freq_hz / fs_hz;
        let cos_w0 = w0.cos();
        let alpha = w0.sin() / (2.0 * spec.q);

        let (b0, b1, b2) = match spec.kind {
            FilterKind::Lowpass => ((1.0 - cos_w0) * 0.5, 1.0 - cos_w0, (1.0 - cos_w0) * 0.5),
            FilterKind::Highpass => ((1.0 + cos_w0) * 0.5, -(1.0 + cos_w0), (1.0 + cos_w0) * 0.5),
            // Constant 0 dB peak gain.
            FilterKind::Bandpass => (alpha, 0.0, -alpha),
        };
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_w0;
        let a2 = 1.0 - alpha;

        normalize_biquad(b0, b1, b2, a0, a1, a2).ok_or_else(invalid)
    }
}

/// Direct Form II Transposed delay line.
#[derive(Debug, Clone, Copy, Default)]
pub struct BiquadState {
    z1: f32,
    z2: f32,
}

pub fn biquad_process(coeffs: BiquadCoeffs, state: &mut BiquadState, x: f32) -> f32 {
    let y = coeffs.b0 * x + state.z1;
    state.z1 = coeffs.b1 * x - coeffs.a1 * y + state.z2;
    state.z2 = coeffs.b2 * x - coeffs.a2 * y;
    y
}

fn clamp_freq_hz(fs_hz: f32, freq_hz: f32) -> f32 {
    let nyquist = fs_hz * 0.5;
    let max_hz = (nyquist * 0.9).max(1.0);
    freq_hz.clamp(1.0, max_hz)
}

fn normalize_biquad(b0: f32, b1: f32, b2: f32, a0: f32, a1: f32, a2: f32) -> Option<BiquadCoeffs> {
    if !a0.is_finite() || a0.abs() < 1e-12 {
        return None;
    }

    let inv_a0 = 1.0 / a0;
    let coeffs = BiquadCoeffs {
        b0: b0 * inv_a0,
        b1: b1 * inv_a0,
        b2: b2 * inv_a0,
        a1: a1 * inv_a0,
        a2: a2 * inv_a0,
    };

    [coeffs.b0, coeffs.b1, coeffs.b2, coeffs.a1, coeffs.a2]
        .iter()
        .all(|v| v.is_finite())
        .then_some(coeffs)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FS: f32 = 48_000.0;

    fn steady_state_amplitude(coeffs: BiquadCoeffs, freq_hz: f32) -> f32 {
        let mut state = BiquadState::default();
        let mut peak = 0.0_f32;
        for i in 0..9_600 {
            let x = (2.0 * PI * freq_hz * i as f32 / FS).sin();
            let y = biquad_process(coeffs, &mut state, x);
            if i > 4_800 {
                peak = peak.max(y.abs());
            }
        }
        peak
    }

    #[test]
    fn test_identity_passes_signal() {
        let mut state = BiquadState::default();
        for x in [0.5, -0.25, 1.0, 0.0] {
            assert_eq!(biquad_process(BiquadCoeffs::identity(), &mut state, x), x);
        }
    }

    #[test]
    fn test_lowpass_passes_dc() {
        let coeffs =
            BiquadCoeffs::for_filter(&FilterSpec::new(FilterKind::Lowpass, 2_000.0, 0.707), FS)
                .unwrap();
        let mut state = BiquadState::default();
        let mut y = 0.0;
        for _ in 0..2_000 {
            y = biquad_process(coeffs, &mut state, 1.0);
        }
        assert!((y - 1.0).abs() < 1e-3, "lowpass DC gain {y}");
    }

    #[test]
    fn test_highpass_blocks_dc() {
        let coeffs =
            BiquadCoeffs::for_filter(&FilterSpec::new(FilterKind::Highpass, 800.0, 0.707), FS)
                .unwrap();
        let mut state = BiquadState::default();
        let mut y = 1.0;
        for _ in 0..4_000 {
            y = biquad_process(coeffs, &mut state, 1.0);
        }
        assert!(y.abs() < 1e-3, "highpass DC leak {y}");
    }

    #[test]
    fn test_lowpass_attenuates_high_frequencies() {
        let coeffs =
            BiquadCoeffs::for_filter(&FilterSpec::new(FilterKind::Lowpass, 200.0, 0.707), FS)
                .unwrap();
        assert!(steady_state_amplitude(coeffs, 10_000.0) < 0.01);
    }

    #[test]
    fn test_bandpass_peaks_at_center() {
        let coeffs =
            BiquadCoeffs::for_filter(&FilterSpec::new(FilterKind::Bandpass, 1_000.0, 2.0), FS)
                .unwrap();

        let center = steady_state_amplitude(coeffs, 1_000.0);
        let far = steady_state_amplitude(coeffs, 8_000.0);

        assert!((center - 1.0).abs() < 0.05, "bandpass center gain {center}");
        assert!(far < 0.2, "bandpass stopband gain {far}");
    }

    #[test]
    fn test_cutoff_above_nyquist_is_clamped() {
        let coeffs =
            BiquadCoeffs::for_filter(&FilterSpec::new(FilterKind::Lowpass, 96_000.0, 0.707), FS);
        assert!(coeffs.is_ok());
    }

    #[test]
    fn test_invalid_parameters_are_rejected() {
        for spec in [
            FilterSpec::new(FilterKind::Lowpass, 0.0, 0.707),
            FilterSpec::new(FilterKind::Highpass, f32::NAN, 0.707),
            FilterSpec::new(FilterKind::Bandpass, 1_000.0, 0.0),
            FilterSpec::new(FilterKind::Bandpass, 1_000.0, f32::INFINITY),
        ] {
            assert!(matches!(
                BiquadCoeffs::for_filter(&spec, FS),
                Err(SynthesisError::InvalidFilter { .. })
            ));
        }
    }
}
