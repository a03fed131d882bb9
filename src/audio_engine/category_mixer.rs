//! Final playback gain from master, category and per-event volume.

use crate::audio_engine::constants::{VOLUME_MAX, VOLUME_MIN};
use crate::catalog::SoundDefinition;
use crate::settings::SoundSettings;

/// Per-call overrides for a cue.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayOptions {
    /// Replaces the definition's base volume.
    pub volume: Option<f32>,
    /// Multiplies the definition's frequency.
    pub pitch: Option<f32>,
}

impl PlayOptions {
    pub fn volume(volume: f32) -> Self {
        Self {
            volume: Some(volume),
            ..Self::default()
        }
    }

    pub fn pitch(pitch: f32) -> Self {
        Self {
            pitch: Some(pitch),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gain {
    Muted,
    Audible(f32),
}

/// Resolves the gain a cue plays at, or `Muted`.
///
/// Disabled settings and a muted category win over every volume. Otherwise
/// the gain is `event volume × category volume × master volume`, clamped to
/// 0.0..=1.0.
pub fn resolve_gain(
    definition: &SoundDefinition,
    settings: &SoundSettings,
    options: &PlayOptions,
) -> Gain {
    if !settings.enabled || settings.is_muted(definition.category) {
        return Gain::Muted;
    }

    let event_volume = options
        .volume
        .filter(|volume| volume.is_finite())
        .unwrap_or(definition.base_volume);
    let category_volume = settings.category_volumes.get(definition.category);

    let gain = event_volume * category_volume * settings.master_volume;
    Gain::Audible(gain.clamp(VOLUME_MIN, VOLUME_MAX))
}
