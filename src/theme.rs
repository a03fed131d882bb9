//! Named bulk presets for category volumes.
//!
//! A theme never touches synthesis directly: applying one produces a
//! [`SoundSettingsPatch`] that overrides a fixed set of category volumes and
//! records the theme name. Categories a theme does not list keep their values.

use std::collections::BTreeMap;

use crate::catalog::SoundCategory;
use crate::names::named_enum;
use crate::settings::SoundSettingsPatch;

named_enum! {
    /// A named set of category volume overrides.
    #[derive(Default)]
    pub enum Theme("theme") {
        Minimal => "minimal",
        #[default]
        Futuristic => "futuristic",
        Classic => "classic",
        Cyberpunk => "cyberpunk",
    }
}

const MINIMAL: &[(SoundCategory, f32)] = &[(SoundCategory::Ui, 0.3), (SoundCategory::Ambient, 0.1)];

const CLASSIC: &[(SoundCategory, f32)] = &[
    (SoundCategory::Trading, 0.9),
    (SoundCategory::Notification, 0.8),
];

const CYBERPUNK: &[(SoundCategory, f32)] = &[
    (SoundCategory::Ui, 0.8),
    (SoundCategory::Data, 0.6),
    (SoundCategory::Ambient, 0.5),
];

/// Category volume overrides applied by `theme`.
pub fn overrides(theme: Theme) -> &'static [(SoundCategory, f32)] {
    match theme {
        Theme::Minimal => MINIMAL,
        Theme::Futuristic => &[],
        Theme::Classic => CLASSIC,
        Theme::Cyberpunk => CYBERPUNK,
    }
}

/// Settings patch equivalent to switching to `theme`.
pub fn patch_for(theme: Theme) -> SoundSettingsPatch {
    let category_volumes: BTreeMap<SoundCategory, f32> = overrides(theme).iter().copied().collect();

    SoundSettingsPatch {
        theme: Some(theme),
        category_volumes: (!category_volumes.is_empty()).then_some(category_volumes),
        ..SoundSettingsPatch::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_futuristic_is_identity() {
        assert!(overrides(Theme::Futuristic).is_empty());

        let patch = patch_for(Theme::Futuristic);
        assert_eq!(patch.theme, Some(Theme::Futuristic));
        assert!(patch.category_volumes.is_none());
    }

    #[test]
    fn test_cyberpunk_patch() {
        let patch = patch_for(Theme::Cyberpunk);
        let volumes = patch.category_volumes.unwrap();

        assert_eq!(volumes.len(), 3);
        assert_eq!(volumes[&SoundCategory::Ui], 0.8);
        assert_eq!(volumes[&SoundCategory::Data], 0.6);
        assert_eq!(volumes[&SoundCategory::Ambient], 0.5);
        assert!(patch.master_volume.is_none());
        assert!(patch.enabled.is_none());
    }

    #[test]
    fn test_minimal_and_classic_tables() {
        assert_eq!(
            overrides(Theme::Minimal),
            &[(SoundCategory::Ui, 0.3), (SoundCategory::Ambient, 0.1)]
        );
        assert_eq!(
            overrides(Theme::Classic),
            &[(SoundCategory::Trading, 0.9), (SoundCategory::Notification, 0.8)]
        );
    }

    #[test]
    fn test_theme_names_parse() {
        for theme in Theme::ALL {
            assert_eq!(theme.as_str().parse::<Theme>(), Ok(theme));
        }
        assert!("vaporwave".parse::<Theme>().is_err());
    }
}
