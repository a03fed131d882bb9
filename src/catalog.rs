//! Sound descriptors and the event → descriptor catalog.
//!
//! Every cue the engine can play is described by a [`SoundDefinition`]: a
//! category, a base pitch and duration, a waveform, and optional envelope and
//! filter stages. The [`SoundCatalog`] maps each [`SoundEvent`] to its
//! definition and is built once by the caller, then shared read-only.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::names::named_enum;

named_enum! {
    /// Semantic grouping of sound events sharing one volume control and one mute flag.
    #[derive(PartialOrd, Ord)]
    pub enum SoundCategory("category") {
        Ui => "ui",
        Trading => "trading",
        Notification => "notification",
        Success => "success",
        Error => "error",
        Ambient => "ambient",
        Navigation => "navigation",
        Data => "data",
    }
}

/// Oscillator waveform shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// ADSR amplitude envelope, all times in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub attack_ms: u32,
    pub decay_ms: u32,
    /// Sustain level relative to the peak gain (0.0 to 1.0).
    pub sustain_level: f32,
    pub release_ms: u32,
}

impl Envelope {
    pub const fn new(attack_ms: u32, decay_ms: u32, sustain_level: f32, release_ms: u32) -> Self {
        Self {
            attack_ms,
            decay_ms,
            sustain_level,
            release_ms,
        }
    }

    /// Total time spent outside the sustain hold.
    pub fn shaped_ms(&self) -> u64 {
        u64::from(self.attack_ms) + u64::from(self.decay_ms) + u64::from(self.release_ms)
    }
}

/// Biquad filter response types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    Lowpass,
    Highpass,
    Bandpass,
}

/// A biquad filter stage inserted between oscillator and envelope.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub kind: FilterKind,
    pub cutoff_hz: f32,
    pub q: f32,
}

impl FilterSpec {
    pub const fn new(kind: FilterKind, cutoff_hz: f32, q: f32) -> Self {
        Self { kind, cutoff_hz, q }
    }
}

/// Immutable description of one procedural sound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoundDefinition {
    pub category: SoundCategory,
    pub frequency_hz: f32,
    pub duration_ms: u32,
    pub base_volume: f32,
    pub waveform: Waveform,
    pub envelope: Option<Envelope>,
    pub filter: Option<FilterSpec>,
}

impl SoundDefinition {
    const fn tone(
        category: SoundCategory,
        frequency_hz: f32,
        duration_ms: u32,
        base_volume: f32,
        waveform: Waveform,
    ) -> Self {
        Self {
            category,
            frequency_hz,
            duration_ms,
            base_volume,
            waveform,
            envelope: None,
            filter: None,
        }
    }

    const fn with_envelope(mut self, envelope: Envelope) -> Self {
        self.envelope = Some(envelope);
        self
    }

    const fn with_filter(mut self, filter: FilterSpec) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Checks the authoring invariants of a definition.
    pub fn validate(&self, event: SoundEvent) -> Result<(), CatalogError> {
        if !self.frequency_hz.is_finite() || self.frequency_hz <= 0.0 {
            return Err(CatalogError::InvalidFrequency {
                event,
                frequency_hz: self.frequency_hz,
            });
        }

        if self.duration_ms == 0 {
            return Err(CatalogError::ZeroDuration { event });
        }

        if !(0.0..=1.0).contains(&self.base_volume) {
            return Err(CatalogError::VolumeOutOfRange {
                event,
                volume: self.base_volume,
            });
        }

        if let Some(envelope) = &self.envelope {
            if !(0.0..=1.0).contains(&envelope.sustain_level) {
                return Err(CatalogError::SustainOutOfRange {
                    event,
                    sustain_level: envelope.sustain_level,
                });
            }

            if envelope.shaped_ms() > u64::from(self.duration_ms) {
                return Err(CatalogError::EnvelopeOverrun {
                    event,
                    envelope_ms: envelope.shaped_ms(),
                    duration_ms: self.duration_ms,
                });
            }
        }

        if let Some(filter) = &self.filter {
            let valid = filter.cutoff_hz.is_finite()
                && filter.cutoff_hz > 0.0
                && filter.q.is_finite()
                && filter.q > 0.0;
            if !valid {
                return Err(CatalogError::InvalidFilter {
                    event,
                    cutoff_hz: filter.cutoff_hz,
                    q: filter.q,
                });
            }
        }

        Ok(())
    }
}

named_enum! {
    /// Declared cue identifiers.
    pub enum SoundEvent("sound event") {
        ButtonClick => "button_click",
        ButtonHover => "button_hover",
        ToggleOn => "toggle_on",
        ToggleOff => "toggle_off",
        ModalOpen => "modal_open",
        ModalClose => "modal_close",
        TabSwitch => "tab_switch",
        MenuOpen => "menu_open",
        PageTransition => "page_transition",
        TradeBuy => "trade_buy",
        TradeSell => "trade_sell",
        TradeExecuted => "trade_executed",
        OrderPlaced => "order_placed",
        OrderCancelled => "order_cancelled",
        PriceUp => "price_up",
        PriceDown => "price_down",
        DataUpdate => "data_update",
        DataRefresh => "data_refresh",
        Notification => "notification",
        Alert => "alert",
        Message => "message",
        Success => "success",
        Achievement => "achievement",
        Error => "error",
        Warning => "warning",
        AmbientPulse => "ambient_pulse",
        AmbientHum => "ambient_hum",
    }
}

/// A string did not name any known identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {name:?}")]
pub struct UnknownName {
    pub kind: &'static str,
    pub name: String,
}

impl UnknownName {
    pub(crate) fn new(kind: &'static str, name: &str) -> Self {
        Self {
            kind,
            name: name.to_string(),
        }
    }
}

/// Authoring errors detected while building a catalog.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    #[error("{event}: frequency must be positive and finite, got {frequency_hz}")]
    InvalidFrequency { event: SoundEvent, frequency_hz: f32 },

    #[error("{event}: duration must be positive")]
    ZeroDuration { event: SoundEvent },

    #[error("{event}: base volume {volume} is outside 0.0..=1.0")]
    VolumeOutOfRange { event: SoundEvent, volume: f32 },

    #[error("{event}: sustain level {sustain_level} is outside 0.0..=1.0")]
    SustainOutOfRange { event: SoundEvent, sustain_level: f32 },

    #[error("{event}: attack + decay + release ({envelope_ms} ms) exceeds duration ({duration_ms} ms)")]
    EnvelopeOverrun {
        event: SoundEvent,
        envelope_ms: u64,
        duration_ms: u32,
    },

    #[error("{event}: invalid filter (cutoff {cutoff_hz} Hz, Q {q})")]
    InvalidFilter {
        event: SoundEvent,
        cutoff_hz: f32,
        q: f32,
    },
}

/// Lookup table from [`SoundEvent`] to [`SoundDefinition`].
#[derive(Debug, Clone)]
pub struct SoundCatalog {
    definitions: [Option<SoundDefinition>; SoundEvent::COUNT],
}

impl SoundCatalog {
    /// The built-in cue set.
    pub fn builtin() -> Self {
        Self {
            definitions: std::array::from_fn(|index| Some(builtin_definition(SoundEvent::ALL[index]))),
        }
    }

    /// Builds a catalog from explicit definitions, validating each one.
    ///
    /// Events that are not given stay unmapped and resolve to nothing.
    /// A later entry for the same event replaces an earlier one.
    pub fn from_definitions<I>(definitions: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = (SoundEvent, SoundDefinition)>,
    {
        let mut table: [Option<SoundDefinition>; SoundEvent::COUNT] = [None; SoundEvent::COUNT];
        for (event, definition) in definitions {
            definition.validate(event)?;
            table[event.index()] = Some(definition);
        }

        Ok(Self { definitions: table })
    }

    pub fn lookup(&self, event: SoundEvent) -> Option<&SoundDefinition> {
        self.definitions[event.index()].as_ref()
    }

    /// Iterates over mapped events and their definitions.
    pub fn iter(&self) -> impl Iterator<Item = (SoundEvent, &SoundDefinition)> {
        SoundEvent::ALL
            .into_iter()
            .filter_map(|event| self.lookup(event).map(|definition| (event, definition)))
    }
}

impl Default for SoundCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn builtin_definition(event: SoundEvent) -> SoundDefinition {
    use FilterKind::{Bandpass, Highpass, Lowpass};
    use SoundCategory as C;
    use Waveform::{Sawtooth, Sine, Square, Triangle};

    match event {
        SoundEvent::ButtonClick => SoundDefinition::tone(C::Ui, 800.0, 120, 0.3, Sine),
        SoundEvent::ButtonHover => SoundDefinition::tone(C::Ui, 1200.0, 50, 0.1, Sine),
        SoundEvent::ToggleOn => SoundDefinition::tone(C::Ui, 1000.0, 90, 0.25, Triangle)
            .with_envelope(Envelope::new(5, 20, 0.6, 40)),
        SoundEvent::ToggleOff => SoundDefinition::tone(C::Ui, 700.0, 90, 0.25, Triangle)
            .with_envelope(Envelope::new(5, 20, 0.6, 40)),
        SoundEvent::ModalOpen => SoundDefinition::tone(C::Ui, 600.0, 200, 0.25, Sine)
            .with_envelope(Envelope::new(20, 40, 0.7, 100)),
        SoundEvent::ModalClose => SoundDefinition::tone(C::Ui, 500.0, 150, 0.2, Sine)
            .with_envelope(Envelope::new(10, 30, 0.6, 80)),

        SoundEvent::TabSwitch => SoundDefinition::tone(C::Navigation, 900.0, 80, 0.2, Triangle),
        SoundEvent::MenuOpen => SoundDefinition::tone(C::Navigation, 660.0, 140, 0.2, Triangle)
            .with_envelope(Envelope::new(10, 30, 0.7, 60)),
        SoundEvent::PageTransition => SoundDefinition::tone(C::Navigation, 440.0, 300, 0.2, Sine)
            .with_envelope(Envelope::new(50, 50, 0.6, 150))
            .with_filter(FilterSpec::new(Lowpass, 2000.0, 1.0)),

        SoundEvent::TradeBuy => SoundDefinition::tone(C::Trading, 880.0, 250, 0.5, Square)
            .with_envelope(Envelope::new(10, 50, 0.6, 120))
            .with_filter(FilterSpec::new(Lowpass, 3000.0, 1.0)),
        SoundEvent::TradeSell => SoundDefinition::tone(C::Trading, 660.0, 250, 0.5, Square)
            .with_envelope(Envelope::new(10, 50, 0.6, 120))
            .with_filter(FilterSpec::new(Lowpass, 2500.0, 1.0)),
        SoundEvent::TradeExecuted => SoundDefinition::tone(C::Trading, 1046.5, 400, 0.5, Sine)
            .with_envelope(Envelope::new(10, 80, 0.7, 200)),
        SoundEvent::OrderPlaced => SoundDefinition::tone(C::Trading, 740.0, 180, 0.4, Triangle)
            .with_envelope(Envelope::new(5, 40, 0.6, 80)),
        SoundEvent::OrderCancelled => SoundDefinition::tone(C::Trading, 330.0, 220, 0.4, Sawtooth)
            .with_envelope(Envelope::new(10, 40, 0.5, 120))
            .with_filter(FilterSpec::new(Lowpass, 1200.0, 0.8)),

        SoundEvent::PriceUp => SoundDefinition::tone(C::Data, 1200.0, 100, 0.2, Sine)
            .with_envelope(Envelope::new(5, 20, 0.5, 50)),
        SoundEvent::PriceDown => SoundDefinition::tone(C::Data, 600.0, 100, 0.2, Sine)
            .with_envelope(Envelope::new(5, 20, 0.5, 50)),
        SoundEvent::DataUpdate => SoundDefinition::tone(C::Data, 1500.0, 60, 0.1, Sine),
        SoundEvent::DataRefresh => SoundDefinition::tone(C::Data, 1000.0, 150, 0.15, Triangle)
            .with_envelope(Envelope::new(10, 30, 0.5, 80))
            .with_filter(FilterSpec::new(Highpass, 800.0, 0.7)),

        SoundEvent::Notification => SoundDefinition::tone(C::Notification, 880.0, 300, 0.4, Sine)
            .with_envelope(Envelope::new(10, 60, 0.6, 150)),
        SoundEvent::Alert => SoundDefinition::tone(C::Notification, 1000.0, 500, 0.5, Square)
            .with_envelope(Envelope::new(10, 100, 0.7, 250))
            .with_filter(FilterSpec::new(Bandpass, 1000.0, 2.0)),
        SoundEvent::Message => SoundDefinition::tone(C::Notification, 720.0, 200, 0.3, Triangle)
            .with_envelope(Envelope::new(10, 40, 0.6, 100)),

        SoundEvent::Success => SoundDefinition::tone(C::Success, 1046.5, 300, 0.4, Sine)
            .with_envelope(Envelope::new(10, 50, 0.7, 150)),
        SoundEvent::Achievement => SoundDefinition::tone(C::Success, 1318.5, 600, 0.5, Triangle)
            .with_envelope(Envelope::new(20, 100, 0.7, 300)),

        SoundEvent::Error => SoundDefinition::tone(C::Error, 200.0, 400, 0.4, Sawtooth)
            .with_envelope(Envelope::new(10, 50, 0.8, 200))
            .with_filter(FilterSpec::new(Lowpass, 800.0, 1.0)),
        SoundEvent::Warning => SoundDefinition::tone(C::Error, 440.0, 300, 0.35, Square)
            .with_envelope(Envelope::new(10, 50, 0.6, 150))
            .with_filter(FilterSpec::new(Bandpass, 440.0, 1.5)),

        SoundEvent::AmbientPulse => SoundDefinition::tone(C::Ambient, 110.0, 2000, 0.1, Sine)
            .with_envelope(Envelope::new(500, 500, 0.5, 800)),
        SoundEvent::AmbientHum => SoundDefinition::tone(C::Ambient, 55.0, 3000, 0.05, Triangle)
            .with_envelope(Envelope::new(800, 400, 0.6, 1200))
            .with_filter(FilterSpec::new(Lowpass, 200.0, 0.7)),
    }
}
