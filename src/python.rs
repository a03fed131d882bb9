//! Python bindings for the sound engine.

use std::str::FromStr;

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::audio_engine::{CpalOutput, PlayOptions, SoundEngine};
use crate::catalog::{SoundCategory, SoundEvent};
use crate::config::EngineConfig;
use crate::settings::{FileBackend, MemoryBackend, SettingsBackend, SoundSettingsPatch};
use crate::theme::Theme;

/// CueEngine plays procedural sound cues on the default audio device
#[pyclass(unsendable)]
pub struct CueEngine {
    engine: SoundEngine<CpalOutput>,
}

fn parse<T: FromStr>(value: &str) -> Option<T>
where
    T::Err: std::fmt::Display,
{
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            log::warn!("Ignoring request: {err}");
            None
        }
    }
}

#[pymethods]
impl CueEngine {
    /// Create a new CueEngine. Settings are kept in memory unless
    /// `settings_dir` is given.
    #[new]
    #[pyo3(signature = (settings_dir=None, gesture_gated=false))]
    pub fn new(settings_dir: Option<String>, gesture_gated: bool) -> Self {
        let backend: Box<dyn SettingsBackend> = match settings_dir {
            Some(dir) => Box::new(FileBackend::new(dir)),
            None => Box::new(MemoryBackend::new()),
        };
        let config = if gesture_gated {
            EngineConfig::gesture_gated()
        } else {
            EngineConfig::default()
        };

        CueEngine {
            engine: SoundEngine::new(backend, config),
        }
    }

    pub fn initialize(&mut self) {
        self.engine.initialize();
    }

    pub fn resume(&mut self) {
        self.engine.resume();
    }

    pub fn suspend(&mut self) {
        self.engine.suspend();
    }

    pub fn dispose(&mut self) {
        self.engine.dispose();
    }

    /// Current lifecycle state name.
    pub fn state(&self) -> String {
        self.engine.state().to_string()
    }

    /// Play a cue by id. Unknown ids are ignored.
    #[pyo3(signature = (event, volume=None, pitch=None))]
    pub fn play_sound(&mut self, event: &str, volume: Option<f32>, pitch: Option<f32>) {
        if let Some(event) = parse::<SoundEvent>(event) {
            self.engine
                .play_sound(event, PlayOptions { volume, pitch });
        }
    }

    pub fn set_theme(&mut self, theme: &str) {
        if let Some(theme) = parse::<Theme>(theme) {
            self.engine.set_theme(theme);
        }
    }

    pub fn set_master_volume(&mut self, volume: f32) {
        self.engine
            .update_settings(SoundSettingsPatch::master_volume(volume));
    }

    pub fn set_category_volume(&mut self, category: &str, volume: f32) {
        if let Some(category) = parse::<SoundCategory>(category) {
            self.engine
                .update_settings(SoundSettingsPatch::category_volume(category, volume));
        }
    }

    /// Apply a partial settings update given as JSON.
    pub fn update_settings(&mut self, patch_json: &str) -> PyResult<()> {
        let patch: SoundSettingsPatch = serde_json::from_str(patch_json)
            .map_err(|e| PyValueError::new_err(format!("invalid settings patch: {e}")))?;
        self.engine.update_settings(patch);
        Ok(())
    }

    /// Current settings as JSON.
    pub fn settings(&self) -> PyResult<String> {
        serde_json::to_string(&self.engine.settings())
            .map_err(|e| PyValueError::new_err(format!("failed to serialize settings: {e}")))
    }

    pub fn mute(&mut self) {
        self.engine.mute();
    }

    pub fn unmute(&mut self) {
        self.engine.unmute();
    }

    pub fn toggle_mute(&mut self) {
        self.engine.toggle_mute();
    }

    pub fn mute_category(&mut self, category: &str) {
        if let Some(category) = parse::<SoundCategory>(category) {
            self.engine.mute_category(category);
        }
    }

    pub fn unmute_category(&mut self, category: &str) {
        if let Some(category) = parse::<SoundCategory>(category) {
            self.engine.unmute_category(category);
        }
    }

    pub fn click(&mut self) {
        self.engine.click();
    }

    pub fn hover(&mut self) {
        self.engine.hover();
    }

    pub fn success(&mut self) {
        self.engine.success();
    }

    pub fn error(&mut self) {
        self.engine.error();
    }

    pub fn warning(&mut self) {
        self.engine.warning();
    }

    pub fn notify(&mut self) {
        self.engine.notify();
    }

    pub fn price_up(&mut self) {
        self.engine.price_up();
    }

    pub fn price_down(&mut self) {
        self.engine.price_down();
    }

    pub fn trade_executed(&mut self) {
        self.engine.trade_executed();
    }
}
