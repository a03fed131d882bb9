//! Procedural audio cues for interactive applications.
//!
//! Semantic events (`button_click`, `price_up`, ...) are looked up in a
//! [`SoundCatalog`], weighted by the user's [`SoundSettings`] and synthesized
//! on the fly by the [`SoundEngine`]. No audio assets are involved.

pub mod audio_engine;
pub mod catalog;
pub mod config;
pub mod messages;
mod names;
pub mod settings;
pub mod theme;

#[cfg(feature = "python")]
mod python;

pub use audio_engine::audio_stream::setup_logger;
pub use audio_engine::{
    AudioOutput, CpalOutput, EngineState, OfflineOutput, PlayOptions, PlayOutcome, SoundEngine,
};
pub use catalog::{SoundCatalog, SoundCategory, SoundDefinition, SoundEvent};
pub use config::EngineConfig;
pub use settings::{
    FileBackend, MemoryBackend, SettingsBackend, SettingsStore, SoundSettings, SoundSettingsPatch,
};
pub use theme::Theme;

/// The Python module implemented in Rust.
#[cfg(feature = "python")]
#[pyo3::pymodule]
mod sound_cues {
    #[pymodule_export]
    use super::python::CueEngine;
}
