//! Turns a sound definition into a scheduled voice.
//!
//! Everything that can fail is checked here, on the control thread, so the
//! audio callback only ever receives voices it can render.

use crate::audio_engine::biquad::BiquadCoeffs;
use crate::audio_engine::category_mixer::PlayOptions;
use crate::audio_engine::constants::{PITCH_MAX, PITCH_MIN};
use crate::audio_engine::envelope::GainEnvelope;
use crate::audio_engine::errors::SynthesisError;
use crate::audio_engine::oscillator::Oscillator;
use crate::audio_engine::output::AudioOutput;
use crate::audio_engine::voice::CueVoice;
use crate::catalog::{SoundDefinition, SoundEvent};

/// Pitch multiplier actually applied for `options`.
pub fn effective_pitch(options: &PlayOptions) -> f32 {
    match options.pitch {
        Some(pitch) if pitch.is_finite() => pitch.clamp(PITCH_MIN, PITCH_MAX),
        _ => 1.0,
    }
}

/// Builds the voice for one cue starting at the output's current frame.
pub fn build_voice(
    event: SoundEvent,
    definition: &SoundDefinition,
    gain: f32,
    options: &PlayOptions,
    sample_rate: u32,
    start_frame: u64,
) -> Result<CueVoice, SynthesisError> {
    let frequency_hz = definition.frequency_hz * effective_pitch(options);
    if !frequency_hz.is_finite() || frequency_hz <= 0.0 {
        return Err(SynthesisError::InvalidFrequency(frequency_hz));
    }

    let envelope = match &definition.envelope {
        Some(envelope) => {
            if envelope.shaped_ms() > u64::from(definition.duration_ms) {
                return Err(SynthesisError::EnvelopeOverrun {
                    envelope_ms: envelope.shaped_ms(),
                    duration_ms: definition.duration_ms,
                });
            }
            GainEnvelope::adsr(envelope, definition.duration_ms, gain)
        }
        None => GainEnvelope::fade_out(definition.duration_ms, gain),
    };

    let filter = definition
        .filter
        .as_ref()
        .map(|spec| BiquadCoeffs::for_filter(spec, sample_rate as f32))
        .transpose()?;

    let duration_frames =
        (f64::from(definition.duration_ms) * f64::from(sample_rate) / 1000.0).round() as u64;

    Ok(CueVoice::new(
        event,
        start_frame,
        duration_frames,
        sample_rate,
        Oscillator::new(definition.waveform, frequency_hz, sample_rate),
        filter,
        envelope,
    ))
}

/// Schedules one instance of `definition` at `gain` on `output`.
///
/// Errors only affect this instance.
pub fn play<O: AudioOutput>(
    output: &mut O,
    event: SoundEvent,
    definition: &SoundDefinition,
    gain: f32,
    options: &PlayOptions,
) -> Result<(), SynthesisError> {
    let voice = build_voice(
        event,
        definition,
        gain,
        options,
        output.sample_rate(),
        output.current_frame(),
    )?;

    log::trace!(
        "Scheduling {} at frame {} ({} Hz, {} frames, peak {:.3})",
        event,
        voice.start_frame,
        voice.frequency_hz(),
        voice.duration_frames(),
        voice.peak_gain()
    );

    output.schedule(voice)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio_engine::output::OfflineOutput;
    use crate::catalog::{
        Envelope, FilterKind, FilterSpec, SoundCatalog, SoundCategory, Waveform,
    };

    fn definition() -> SoundDefinition {
        *SoundCatalog::builtin()
            .lookup(SoundEvent::ButtonClick)
            .unwrap()
    }

    fn ready_output() -> OfflineOutput {
        let mut output = OfflineOutput::new(48_000, 2);
        output.open().unwrap();
        output.resume().unwrap();
        output
    }

    #[test]
    fn test_button_click_voice() {
        let voice = build_voice(
            SoundEvent::ButtonClick,
            &definition(),
            0.126,
            &PlayOptions::default(),
            48_000,
            0,
        )
        .unwrap();

        assert_eq!(voice.start_frame, 0);
        assert_eq!(voice.duration_frames(), 5_760);
        assert!((voice.frequency_hz() - 800.0).abs() < 1e-2);
        assert!((voice.peak_gain() - 0.126).abs() < 1e-6);
        assert!((voice.envelope.gain_at(0.06) - 0.063).abs() < 1e-5);
        assert!(voice.filter.is_none());
    }

    #[test]
    fn test_pitch_scales_frequency() {
        let voice = build_voice(
            SoundEvent::ButtonClick,
            &definition(),
            0.1,
            &PlayOptions::pitch(1.5),
            48_000,
            0,
        )
        .unwrap();

        assert!((voice.frequency_hz() - 1_200.0).abs() < 1e-2);
    }

    #[test]
    fn test_pitch_is_clamped() {
        assert_eq!(effective_pitch(&PlayOptions::default()), 1.0);
        assert_eq!(effective_pitch(&PlayOptions::pitch(10.0)), PITCH_MAX);
        assert_eq!(effective_pitch(&PlayOptions::pitch(0.0)), PITCH_MIN);
        assert_eq!(effective_pitch(&PlayOptions::pitch(-3.0)), PITCH_MIN);
        assert_eq!(effective_pitch(&PlayOptions::pitch(f32::INFINITY)), 1.0);
        assert_eq!(effective_pitch(&PlayOptions::pitch(f32::NAN)), 1.0);
    }

    #[test]
    fn test_invalid_frequency_is_rejected() {
        let mut broken = definition();
        broken.frequency_hz = f32::NAN;

        let result = build_voice(
            SoundEvent::ButtonClick,
            &broken,
            0.1,
            &PlayOptions::default(),
            48_000,
            0,
        );

        assert!(matches!(result, Err(SynthesisError::InvalidFrequency(_))));
    }

    #[test]
    fn test_envelope_overrun_is_rejected() {
        let mut broken = definition();
        broken.envelope = Some(Envelope::new(100, 50, 0.5, 100));

        let result = build_voice(
            SoundEvent::ButtonClick,
            &broken,
            0.1,
            &PlayOptions::default(),
            48_000,
            0,
        );

        assert!(matches!(
            result,
            Err(SynthesisError::EnvelopeOverrun {
                envelope_ms: 250,
                duration_ms: 120
            })
        ));
    }

    #[test]
    fn test_invalid_filter_is_rejected() {
        let mut broken = definition();
        broken.filter = Some(FilterSpec::new(FilterKind::Lowpass, 1_000.0, 0.0));

        let result = build_voice(
            SoundEvent::ButtonClick,
            &broken,
            0.1,
            &PlayOptions::default(),
            48_000,
            0,
        );

        assert!(matches!(result, Err(SynthesisError::InvalidFilter { .. })));
    }

    #[test]
    fn test_adsr_with_filter() {
        let shaped = SoundDefinition {
            category: SoundCategory::Trading,
            frequency_hz: 440.0,
            duration_ms: 250,
            base_volume: 0.5,
            waveform: Waveform::Sawtooth,
            envelope: Some(Envelope::new(10, 50, 0.6, 120)),
            filter: Some(FilterSpec::new(FilterKind::Lowpass, 2_000.0, 0.7)),
        };

        let voice = build_voice(
            SoundEvent::TradeExecuted,
            &shaped,
            0.4,
            &PlayOptions::default(),
            44_100,
            1_000,
        )
        .unwrap();

        assert_eq!(voice.start_frame, 1_000);
        assert_eq!(voice.duration_frames(), 11_025);
        assert!(voice.filter.is_some());
        let (hold_start, hold_end) = voice.envelope.hold_window().unwrap();
        assert!((hold_start - 0.06).abs() < 1e-6);
        assert!((hold_end - 0.13).abs() < 1e-6);
    }

    #[test]
    fn test_play_uses_output_clock() {
        let mut output = ready_output();
        let mut buffer = vec![0.0; 2 * 480];
        output.render(&mut buffer);

        play(
            &mut output,
            SoundEvent::ButtonClick,
            &definition(),
            0.126,
            &PlayOptions::default(),
        )
        .unwrap();

        let scheduled = output.scheduled();
        assert_eq!(scheduled.len(), 1);
        assert_eq!(scheduled[0].start_frame, 480);
        assert_eq!(scheduled[0].stop_frame, 480 + 5_760);
    }

    #[test]
    fn test_play_renders_audible_signal() {
        let mut output = ready_output();
        play(
            &mut output,
            SoundEvent::ButtonClick,
            &definition(),
            0.126,
            &PlayOptions::default(),
        )
        .unwrap();

        let mut buffer = vec![0.0; 2 * 1_024];
        output.render(&mut buffer);

        let peak = buffer.iter().fold(0.0_f32, |acc, s| acc.max(s.abs()));
        assert!(peak > 0.05);
        assert!(peak <= 0.127);
    }

    #[test]
    fn test_play_on_closed_output_fails() {
        let mut output = OfflineOutput::new(48_000, 2);

        let result = play(
            &mut output,
            SoundEvent::ButtonClick,
            &definition(),
            0.126,
            &PlayOptions::default(),
        );

        assert!(matches!(result, Err(SynthesisError::Output(_))));
    }
}
