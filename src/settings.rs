//! User sound preferences and their persistence.
//!
//! [`SoundSettings`] is the full preference record. It is only ever changed
//! through [`SettingsStore`], which merges a typed [`SoundSettingsPatch`],
//! writes the whole record back through a [`SettingsBackend`], and hands out
//! copies. Reading never fails: an absent, unreadable or malformed record
//! yields the factory defaults.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::audio_engine::constants::{DEFAULT_MASTER_VOLUME, VOLUME_MAX, VOLUME_MIN};
use crate::catalog::SoundCategory;
use crate::theme::{self, Theme};

/// Errors raised by a persistence backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("settings storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings storage unavailable: {0}")]
    Unavailable(String),
}

/// Errors while reading or writing the persisted settings record.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("malformed settings record: {0}")]
    Format(#[from] serde_json::Error),
}

/// Minimal key-value contract used to persist settings.
pub trait SettingsBackend {
    /// Returns the stored value for `key`, or `None` if nothing was stored.
    fn load(&self, key: &str) -> Result<Option<String>, BackendError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn save(&mut self, key: &str, value: &str) -> Result<(), BackendError>;
}

/// In-process backend. Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend pre-populated with one record.
    pub fn with_entry(key: &str, value: &str) -> Self {
        let backend = Self::new();
        if let Ok(mut entries) = backend.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
        backend
    }
}

impl SettingsBackend for MemoryBackend {
    fn load(&self, key: &str) -> Result<Option<String>, BackendError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| BackendError::Unavailable("memory storage lock poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), BackendError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| BackendError::Unavailable("memory storage lock poisoned".to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SettingsBackend for FileBackend {
    fn load(&self, key: &str) -> Result<Option<String>, BackendError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), BackendError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), value)?;
        Ok(())
    }
}

fn clamp_volume(volume: f32) -> Option<f32> {
    volume
        .is_finite()
        .then(|| volume.clamp(VOLUME_MIN, VOLUME_MAX))
}

/// Per-category volume table. Always holds one entry per category.
///
/// Serialized as a map keyed by category name; categories missing from a
/// serialized map take their default volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<SoundCategory, f32>",
    into = "BTreeMap<SoundCategory, f32>"
)]
pub struct CategoryVolumes([f32; SoundCategory::COUNT]);

impl CategoryVolumes {
    pub fn default_for(category: SoundCategory) -> f32 {
        match category {
            SoundCategory::Ui => 0.6,
            SoundCategory::Trading => 0.8,
            SoundCategory::Notification => 0.7,
            SoundCategory::Success => 0.7,
            SoundCategory::Error => 0.8,
            SoundCategory::Ambient => 0.3,
            SoundCategory::Navigation => 0.5,
            SoundCategory::Data => 0.4,
        }
    }

    pub fn get(&self, category: SoundCategory) -> f32 {
        self.0[category.index()]
    }

    /// Sets a volume, clamped to 0.0..=1.0. Non-finite values are ignored.
    pub fn set(&mut self, category: SoundCategory, volume: f32) {
        if let Some(volume) = clamp_volume(volume) {
            self.0[category.index()] = volume;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (SoundCategory, f32)> + '_ {
        SoundCategory::ALL
            .into_iter()
            .map(|category| (category, self.get(category)))
    }
}

impl Default for CategoryVolumes {
    fn default() -> Self {
        Self(SoundCategory::ALL.map(Self::default_for))
    }
}

impl From<BTreeMap<SoundCategory, f32>> for CategoryVolumes {
    fn from(map: BTreeMap<SoundCategory, f32>) -> Self {
        let mut volumes = Self::default();
        for (category, volume) in map {
            volumes.set(category, volume);
        }
        volumes
    }
}

impl From<CategoryVolumes> for BTreeMap<SoundCategory, f32> {
    fn from(volumes: CategoryVolumes) -> Self {
        volumes.iter().collect()
    }
}

/// The full sound preference record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SoundSettings {
    /// Global kill switch.
    pub enabled: bool,
    pub master_volume: f32,
    pub category_volumes: CategoryVolumes,
    pub muted_categories: BTreeSet<SoundCategory>,
    /// Reserved for gain-shaping policies; stored but not applied.
    pub adaptive_mode: bool,
    /// Reserved for gain-shaping policies; stored but not applied.
    pub spatial_audio: bool,
    pub theme: Theme,
}

impl Default for SoundSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            master_volume: DEFAULT_MASTER_VOLUME,
            category_volumes: CategoryVolumes::default(),
            muted_categories: BTreeSet::new(),
            adaptive_mode: true,
            spatial_audio: false,
            theme: Theme::default(),
        }
    }
}

impl SoundSettings {
    pub fn is_muted(&self, category: SoundCategory) -> bool {
        self.muted_categories.contains(&category)
    }

    /// Returns a copy with `patch` applied.
    ///
    /// Scalars and the mute set are replaced; category volumes merge key by key.
    pub fn merged(&self, patch: &SoundSettingsPatch) -> Self {
        let mut next = self.clone();

        if let Some(enabled) = patch.enabled {
            next.enabled = enabled;
        }
        if let Some(volume) = patch.master_volume.and_then(clamp_volume) {
            next.master_volume = volume;
        }
        if let Some(volumes) = &patch.category_volumes {
            for (&category, &volume) in volumes {
                next.category_volumes.set(category, volume);
            }
        }
        if let Some(muted) = &patch.muted_categories {
            next.muted_categories = muted.clone();
        }
        if let Some(adaptive_mode) = patch.adaptive_mode {
            next.adaptive_mode = adaptive_mode;
        }
        if let Some(spatial_audio) = patch.spatial_audio {
            next.spatial_audio = spatial_audio;
        }
        if let Some(theme) = patch.theme {
            next.theme = theme;
        }

        next
    }

    fn sanitized(mut self) -> Self {
        self.master_volume = clamp_volume(self.master_volume).unwrap_or(DEFAULT_MASTER_VOLUME);
        self
    }
}

/// Partial update of [`SoundSettings`]. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SoundSettingsPatch {
    pub enabled: Option<bool>,
    pub master_volume: Option<f32>,
    /// Merged key by key into the current table.
    pub category_volumes: Option<BTreeMap<SoundCategory, f32>>,
    /// Replaces the whole mute set.
    pub muted_categories: Option<BTreeSet<SoundCategory>>,
    pub adaptive_mode: Option<bool>,
    pub spatial_audio: Option<bool>,
    pub theme: Option<Theme>,
}

impl SoundSettingsPatch {
    pub fn category_volume(category: SoundCategory, volume: f32) -> Self {
        Self {
            category_volumes: Some(BTreeMap::from([(category, volume)])),
            ..Self::default()
        }
    }

    pub fn master_volume(volume: f32) -> Self {
        Self {
            master_volume: Some(volume),
            ..Self::default()
        }
    }

    pub fn enabled(enabled: bool) -> Self {
        Self {
            enabled: Some(enabled),
            ..Self::default()
        }
    }
}

/// Owner of the live [`SoundSettings`], writing every change through to a backend.
pub struct SettingsStore {
    backend: Box<dyn SettingsBackend>,
    key: String,
    current: SoundSettings,
    save_failing: bool,
}

impl SettingsStore {
    /// Opens the store and loads the persisted record (or defaults).
    pub fn open(backend: Box<dyn SettingsBackend>, key: impl Into<String>) -> Self {
        let mut store = Self {
            backend,
            key: key.into(),
            current: SoundSettings::default(),
            save_failing: false,
        };
        store.current = store.load();
        store
    }

    /// Reads the persisted record, falling back to defaults on any failure.
    pub fn load(&self) -> SoundSettings {
        match self.read() {
            Ok(Some(settings)) => settings,
            Ok(None) => {
                log::debug!("No stored sound settings under {:?}, using defaults", self.key);
                SoundSettings::default()
            }
            Err(err) => {
                log::warn!("Ignoring stored sound settings ({err}), using defaults");
                SoundSettings::default()
            }
        }
    }

    fn read(&self) -> Result<Option<SoundSettings>, SettingsError> {
        let Some(raw) = self.backend.load(&self.key)? else {
            return Ok(None);
        };
        let settings: SoundSettings = serde_json::from_str(&raw)?;
        Ok(Some(settings.sanitized()))
    }

    /// A copy of the current settings.
    pub fn settings(&self) -> SoundSettings {
        self.current.clone()
    }

    pub(crate) fn current(&self) -> &SoundSettings {
        &self.current
    }

    /// Merges `patch`, writes the result back and returns it.
    ///
    /// The merged value is kept even if the write-back fails.
    pub fn update(&mut self, patch: SoundSettingsPatch) -> SoundSettings {
        self.current = self.current.merged(&patch);
        self.persist();
        self.current.clone()
    }

    pub fn mute_category(&mut self, category: SoundCategory) -> SoundSettings {
        let mut muted = self.current.muted_categories.clone();
        muted.insert(category);
        self.update(SoundSettingsPatch {
            muted_categories: Some(muted),
            ..SoundSettingsPatch::default()
        })
    }

    pub fn unmute_category(&mut self, category: SoundCategory) -> SoundSettings {
        let mut muted = self.current.muted_categories.clone();
        muted.remove(&category);
        self.update(SoundSettingsPatch {
            muted_categories: Some(muted),
            ..SoundSettingsPatch::default()
        })
    }

    pub fn set_theme(&mut self, theme: Theme) -> SoundSettings {
        self.update(theme::patch_for(theme))
    }

    fn persist(&mut self) {
        match self.write() {
            Ok(()) => {
                if self.save_failing {
                    log::info!("Sound settings storage recovered");
                }
                self.save_failing = false;
            }
            Err(err) => {
                // Only the first failure of a streak is reported.
                if !self.save_failing {
                    log::warn!("Failed to persist sound settings: {err}");
                }
                self.save_failing = true;
            }
        }
    }

    fn write(&mut self) -> Result<(), SettingsError> {
        let raw = serde_json::to_string(&self.current)?;
        self.backend.save(&self.key, &raw)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "test.settings";

    struct FailingBackend;

    impl SettingsBackend for FailingBackend {
        fn load(&self, _key: &str) -> Result<Option<String>, BackendError> {
            Err(BackendError::Unavailable("offline".to_string()))
        }

        fn save(&mut self, _key: &str, _value: &str) -> Result<(), BackendError> {
            Err(BackendError::Unavailable("offline".to_string()))
        }
    }

    fn memory_store() -> (SettingsStore, MemoryBackend) {
        let backend = MemoryBackend::new();
        let store = SettingsStore::open(Box::new(backend.clone()), KEY);
        (store, backend)
    }

    #[test]
    fn test_factory_defaults() {
        let settings = SoundSettings::default();

        assert!(settings.enabled);
        assert!((settings.master_volume - 0.7).abs() < f32::EPSILON);
        assert!((settings.category_volumes.get(SoundCategory::Ui) - 0.6).abs() < f32::EPSILON);
        assert!(settings.muted_categories.is_empty());
        assert_eq!(settings.theme, Theme::Futuristic);
        assert_eq!(settings.category_volumes.iter().count(), SoundCategory::COUNT);
    }

    #[test]
    fn test_open_without_record_uses_defaults() {
        let (store, backend) = memory_store();

        assert_eq!(store.settings(), SoundSettings::default());
        assert!(backend.load(KEY).unwrap().is_none());
    }

    #[test]
    fn test_malformed_record_uses_defaults() {
        let backend = MemoryBackend::with_entry(KEY, "{not json");
        let store = SettingsStore::open(Box::new(backend), KEY);

        assert_eq!(store.settings(), SoundSettings::default());
    }

    #[test]
    fn test_unreadable_backend_uses_defaults() {
        let store = SettingsStore::open(Box::new(FailingBackend), KEY);
        assert_eq!(store.settings(), SoundSettings::default());
    }

    #[test]
    fn test_partial_record_fills_missing_fields() {
        let backend = MemoryBackend::with_entry(
            KEY,
            r#"{"masterVolume":0.5,"categoryVolumes":{"ui":0.2},"mutedCategories":["ambient"]}"#,
        );
        let settings = SettingsStore::open(Box::new(backend), KEY).settings();

        assert!((settings.master_volume - 0.5).abs() < f32::EPSILON);
        assert!((settings.category_volumes.get(SoundCategory::Ui) - 0.2).abs() < f32::EPSILON);
        assert!(
            (settings.category_volumes.get(SoundCategory::Trading) - 0.8).abs() < f32::EPSILON
        );
        assert!(settings.is_muted(SoundCategory::Ambient));
        assert!(settings.enabled);
    }

    #[test]
    fn test_out_of_range_stored_volume_is_clamped() {
        let backend = MemoryBackend::with_entry(KEY, r#"{"masterVolume":3.0}"#);
        let settings = SettingsStore::open(Box::new(backend), KEY).settings();

        assert!((settings.master_volume - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_update_replaces_only_patched_fields() {
        let (mut store, _backend) = memory_store();
        let before = store.settings();

        let after = store.update(SoundSettingsPatch {
            master_volume: Some(0.4),
            spatial_audio: Some(true),
            ..SoundSettingsPatch::default()
        });

        let mut expected = before;
        expected.master_volume = 0.4;
        expected.spatial_audio = true;
        assert_eq!(after, expected);
        assert_eq!(store.settings(), expected);
    }

    #[test]
    fn test_category_volumes_merge_key_by_key() {
        let (mut store, _backend) = memory_store();

        store.update(SoundSettingsPatch::category_volume(SoundCategory::Ui, 0.1));
        let settings = store.update(SoundSettingsPatch::category_volume(SoundCategory::Data, 0.9));

        assert!((settings.category_volumes.get(SoundCategory::Ui) - 0.1).abs() < f32::EPSILON);
        assert!((settings.category_volumes.get(SoundCategory::Data) - 0.9).abs() < f32::EPSILON);
        assert!(
            (settings.category_volumes.get(SoundCategory::Error) - 0.8).abs() < f32::EPSILON
        );
    }

    #[test]
    fn test_update_is_idempotent() {
        let (mut store, _backend) = memory_store();
        let patch = SoundSettingsPatch {
            enabled: Some(false),
            category_volumes: Some(BTreeMap::from([(SoundCategory::Trading, 0.25)])),
            ..SoundSettingsPatch::default()
        };

        let first = store.update(patch.clone());
        let second = store.update(patch);

        assert_eq!(first, second);
    }

    #[test]
    fn test_patch_volumes_are_clamped_and_nan_ignored() {
        let (mut store, _backend) = memory_store();

        let settings = store.update(SoundSettingsPatch::master_volume(1.7));
        assert!((settings.master_volume - 1.0).abs() < f32::EPSILON);

        let settings = store.update(SoundSettingsPatch::master_volume(f32::NAN));
        assert!((settings.master_volume - 1.0).abs() < f32::EPSILON);

        let settings = store.update(SoundSettingsPatch::category_volume(SoundCategory::Ui, -0.5));
        assert_eq!(settings.category_volumes.get(SoundCategory::Ui), 0.0);
    }

    #[test]
    fn test_update_writes_full_record() {
        let (mut store, backend) = memory_store();

        let settings = store.update(SoundSettingsPatch::enabled(false));

        let raw = backend.load(KEY).unwrap().unwrap();
        let stored: SoundSettings = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored, settings);
        assert!(raw.contains("\"masterVolume\""));
        assert!(raw.contains("\"categoryVolumes\""));
    }

    #[test]
    fn test_update_survives_write_failure() {
        let mut store = SettingsStore::open(Box::new(FailingBackend), KEY);

        let settings = store.update(SoundSettingsPatch::master_volume(0.2));

        assert!((settings.master_volume - 0.2).abs() < f32::EPSILON);
        assert_eq!(store.settings(), settings);
    }

    #[test]
    fn test_mute_category_is_idempotent() {
        let (mut store, _backend) = memory_store();

        let once = store.mute_category(SoundCategory::Trading);
        let twice = store.mute_category(SoundCategory::Trading);

        assert_eq!(once.muted_categories, twice.muted_categories);
        assert_eq!(twice.muted_categories.len(), 1);
    }

    #[test]
    fn test_unmute_category_when_not_muted() {
        let (mut store, _backend) = memory_store();
        store.mute_category(SoundCategory::Ui);

        let settings = store.unmute_category(SoundCategory::Ui);
        assert!(!settings.is_muted(SoundCategory::Ui));

        let settings = store.unmute_category(SoundCategory::Ui);
        assert!(settings.muted_categories.is_empty());
    }

    #[test]
    fn test_set_theme_is_deterministic() {
        let (mut store, _backend) = memory_store();
        store.update(SoundSettingsPatch::category_volume(SoundCategory::Trading, 0.33));

        let first = store.set_theme(Theme::Cyberpunk);
        let second = store.set_theme(Theme::Cyberpunk);

        assert_eq!(first, second);
        assert_eq!(first.theme, Theme::Cyberpunk);
        assert!((first.category_volumes.get(SoundCategory::Ui) - 0.8).abs() < f32::EPSILON);
        assert!((first.category_volumes.get(SoundCategory::Data) - 0.6).abs() < f32::EPSILON);
        assert!(
            (first.category_volumes.get(SoundCategory::Ambient) - 0.5).abs() < f32::EPSILON
        );
        assert!(
            (first.category_volumes.get(SoundCategory::Trading) - 0.33).abs() < f32::EPSILON
        );
    }

    #[test]
    fn test_futuristic_theme_keeps_volumes() {
        let (mut store, _backend) = memory_store();
        let before = store.set_theme(Theme::Minimal);

        let after = store.set_theme(Theme::Futuristic);

        assert_eq!(after.category_volumes, before.category_volumes);
        assert_eq!(after.theme, Theme::Futuristic);
    }

    #[test]
    fn test_file_backend_persists_across_stores() {
        let dir = tempfile::tempdir().unwrap();
        let settings_dir = dir.path().join("nested");

        let mut store = SettingsStore::open(Box::new(FileBackend::new(&settings_dir)), KEY);
        store.mute_category(SoundCategory::Ambient);
        store.set_theme(Theme::Classic);

        let reopened = SettingsStore::open(Box::new(FileBackend::new(&settings_dir)), KEY);
        let settings = reopened.settings();

        assert!(settings.is_muted(SoundCategory::Ambient));
        assert_eq!(settings.theme, Theme::Classic);
        assert!(
            (settings.category_volumes.get(SoundCategory::Trading) - 0.9).abs() < f32::EPSILON
        );
    }

    #[test]
    fn test_file_backend_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path());

        assert!(backend.load(KEY).unwrap().is_none());
    }
}
