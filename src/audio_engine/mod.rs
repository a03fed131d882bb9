//! Audio Engine Module
//!
//! This module turns semantic UI events into short synthesized cues.
//! It is organized into sub-modules, each with a specific responsibility:
//!
//! - [`audio_stream`]: CPAL audio stream management and real-time callback
//! - [`output`]: The [`AudioOutput`] seam and an offline renderer
//! - [`constants`]: Configuration constants and limits
//! - [`errors`]: Audio-specific error types
//! - [`lifecycle`]: Engine states and device availability
//! - [`category_mixer`]: Final gain from master, category and event volume
//! - [`synthesis`]: Building voices from sound definitions
//! - [`oscillator`], [`biquad`], [`envelope`]: The per-voice signal chain
//! - [`voice`]: A single scheduled cue
//! - [`mixer`]: Real-time mixing engine
//!
//! The main [`SoundEngine`] struct orchestrates these components together with
//! the [`SoundCatalog`] and the [`SettingsStore`].

use crate::audio_engine::category_mixer::{Gain, resolve_gain};
use crate::catalog::{SoundCatalog, SoundCategory, SoundEvent};
use crate::config::EngineConfig;
use crate::messages::AudioMessage;
use crate::settings::{SettingsBackend, SettingsStore, SoundSettings, SoundSettingsPatch};
use crate::theme::Theme;

pub mod audio_stream;
pub mod biquad;
pub mod category_mixer;
pub mod constants;
pub mod envelope;
pub mod errors;
pub mod lifecycle;
pub mod mixer;
pub mod oscillator;
pub mod output;
pub mod synthesis;
pub mod voice;

pub use audio_stream::CpalOutput;
pub use category_mixer::PlayOptions;
pub use lifecycle::EngineState;
pub use output::{AudioOutput, OfflineOutput};

use lifecycle::Lifecycle;

/// What happened to a single `play_sound` request.
///
/// Purely informational: nothing in the play path is ever raised to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    /// A voice was handed to the output.
    Scheduled,
    /// The engine is not `Ready`.
    NotReady,
    /// Sound is disabled or the event's category is muted.
    Muted,
    /// The catalog has no definition for the event.
    Missing,
    /// Building or scheduling the voice failed.
    Failed,
}

/// Plays catalog cues through an [`AudioOutput`] according to the current settings.
pub struct SoundEngine<O: AudioOutput = CpalOutput> {
    output: O,
    catalog: SoundCatalog,
    store: SettingsStore,
    lifecycle: Lifecycle,
    start_suspended: bool,
}

impl SoundEngine<CpalOutput> {
    /// Create a new engine on the default audio device.
    ///
    /// The device is not touched until [`initialize`](Self::initialize).
    pub fn new(backend: Box<dyn SettingsBackend>, config: EngineConfig) -> Self {
        let output = CpalOutput::new(&config);
        Self::with_output(output, backend, config)
    }
}

impl<O: AudioOutput> SoundEngine<O> {
    pub fn with_output(output: O, backend: Box<dyn SettingsBackend>, config: EngineConfig) -> Self {
        Self {
            output,
            catalog: SoundCatalog::builtin(),
            store: SettingsStore::open(backend, config.settings_key),
            lifecycle: Lifecycle::new(),
            start_suspended: config.start_suspended,
        }
    }

    /// Replaces the built-in catalog.
    pub fn with_catalog(mut self, catalog: SoundCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn state(&self) -> EngineState {
        self.lifecycle.state()
    }

    pub fn catalog(&self) -> &SoundCatalog {
        &self.catalog
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    /// Opens the audio output. Safe to call repeatedly.
    pub fn initialize(&mut self) {
        self.lifecycle
            .initialize(&mut self.output, self.start_suspended);
    }

    /// Signals that audio output is allowed or available again.
    pub fn resume(&mut self) {
        self.lifecycle.resume(&mut self.output);
    }

    pub fn suspend(&mut self) {
        self.lifecycle.suspend(&mut self.output);
    }

    /// Releases the output for good.
    pub fn dispose(&mut self) {
        self.lifecycle.dispose(&mut self.output);
    }

    /// Plays one instance of `event`.
    ///
    /// Never fails: a cue that cannot sound is skipped and logged, and the
    /// returned [`PlayOutcome`] says why.
    pub fn play_sound(&mut self, event: SoundEvent, options: PlayOptions) -> PlayOutcome {
        self.drain_messages();
        self.lifecycle.check_output(&self.output);
        if !self.lifecycle.is_ready() {
            log::trace!("Skipping {event}: engine is {}", self.lifecycle.state());
            return PlayOutcome::NotReady;
        }

        let Some(definition) = self.catalog.lookup(event) else {
            log::warn!("No sound definition for {event}");
            return PlayOutcome::Missing;
        };

        let gain = match resolve_gain(definition, self.store.current(), &options) {
            Gain::Muted => {
                log::trace!("Skipping {event}: muted");
                return PlayOutcome::Muted;
            }
            Gain::Audible(gain) => gain,
        };

        let outcome = match synthesis::play(&mut self.output, event, definition, gain, &options) {
            Ok(()) => PlayOutcome::Scheduled,
            Err(err) => {
                log::warn!("Could not play {event}: {err}");
                PlayOutcome::Failed
            }
        };

        self.drain_messages();
        outcome
    }

    fn drain_messages(&mut self) {
        while let Some(message) = self.output.poll_message() {
            match message {
                AudioMessage::VoiceDropped { event } => {
                    log::warn!("All voices busy, dropped {event}");
                }
                AudioMessage::CueFinished { event, frame } => {
                    log::trace!("{event} finished at frame {frame}");
                }
                AudioMessage::Pong() => log::debug!("Received pong from audio thread"),
            }
        }
    }

    /// A copy of the current settings.
    pub fn settings(&self) -> SoundSettings {
        self.store.settings()
    }

    /// Applies and persists a partial settings update. Voices already playing
    /// keep the gain they were scheduled with.
    pub fn update_settings(&mut self, patch: SoundSettingsPatch) -> SoundSettings {
        self.store.update(patch)
    }

    pub fn set_theme(&mut self, theme: Theme) -> SoundSettings {
        self.store.set_theme(theme)
    }

    /// Disables all cues.
    pub fn mute(&mut self) -> SoundSettings {
        self.store.update(SoundSettingsPatch::enabled(false))
    }

    pub fn unmute(&mut self) -> SoundSettings {
        self.store.update(SoundSettingsPatch::enabled(true))
    }

    pub fn toggle_mute(&mut self) -> SoundSettings {
        let enabled = self.store.current().enabled;
        self.store.update(SoundSettingsPatch::enabled(!enabled))
    }

    pub fn mute_category(&mut self, category: SoundCategory) -> SoundSettings {
        self.store.mute_category(category)
    }

    pub fn unmute_category(&mut self, category: SoundCategory) -> SoundSettings {
        self.store.unmute_category(category)
    }

    pub fn click(&mut self) -> PlayOutcome {
        self.play_sound(SoundEvent::ButtonClick, PlayOptions::default())
    }

    pub fn hover(&mut self) -> PlayOutcome {
        self.play_sound(SoundEvent::ButtonHover, PlayOptions::default())
    }

    pub fn success(&mut self) -> PlayOutcome {
        self.play_sound(SoundEvent::Success, PlayOptions::default())
    }

    pub fn error(&mut self) -> PlayOutcome {
        self.play_sound(SoundEvent::Error, PlayOptions::default())
    }

    pub fn warning(&mut self) -> PlayOutcome {
        self.play_sound(SoundEvent::Warning, PlayOptions::default())
    }

    pub fn notify(&mut self) -> PlayOutcome {
        self.play_sound(SoundEvent::Notification, PlayOptions::default())
    }

    pub fn price_up(&mut self) -> PlayOutcome {
        self.play_sound(SoundEvent::PriceUp, PlayOptions::default())
    }

    pub fn price_down(&mut self) -> PlayOutcome {
        self.play_sound(SoundEvent::PriceDown, PlayOptions::default())
    }

    pub fn trade_executed(&mut self) -> PlayOutcome {
        self.play_sound(SoundEvent::TradeExecuted, PlayOptions::default())
    }
}
