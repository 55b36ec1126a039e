//! Game settings and preferences
//!
//! Persisted separately from the leaderboard through the JSON store.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::consts::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::persistence::JsonStore;
use crate::sim::projection::RoadGeometry;
use crate::tuning::{Difficulty, Tuning};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Balance preset
    pub difficulty: Difficulty,

    // === Display ===
    /// Screen size the road is laid out for
    pub screen_width: f32,
    pub screen_height: f32,

    /// Seed override for reproducible runs (None = clock-seeded)
    pub seed: Option<u64>,

    /// Partial tuning table merged over the difficulty preset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tuning: Option<Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,
            screen_width: SCREEN_WIDTH,
            screen_height: SCREEN_HEIGHT,
            seed: None,
            tuning: None,
        }
    }
}

impl Settings {
    /// Store key
    const STORAGE_KEY: &'static str = "settings";

    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }

    /// Tuning table for the chosen difficulty, with any stored overrides
    /// applied. Overrides that don't fit the table are ignored.
    pub fn tuning(&self) -> Tuning {
        let preset = self.difficulty.tuning();
        let Some(overrides) = &self.tuning else {
            return preset;
        };
        match preset.clone().with_overrides(overrides) {
            Ok(tuning) => {
                log::info!("Applied tuning overrides over {} preset", self.difficulty.as_str());
                tuning
            }
            Err(e) => {
                log::warn!("Ignoring invalid tuning overrides: {}", e);
                preset
            }
        }
    }

    /// Road layout for the configured screen (falls back to the default size
    /// when the stored one is unusable)
    pub fn geometry(&self) -> RoadGeometry {
        let usable = |v: f32| v.is_finite() && v >= 200.0;
        if usable(self.screen_width) && usable(self.screen_height) {
            RoadGeometry::for_screen(self.screen_width, self.screen_height)
        } else {
            RoadGeometry::default()
        }
    }

    /// Load settings, or defaults when missing or unreadable
    pub fn load(store: &JsonStore) -> Self {
        match store.load::<Self>(Self::STORAGE_KEY) {
            Ok(Some(settings)) => {
                log::info!("Loaded settings ({})", settings.difficulty.as_str());
                settings
            }
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Failed to load settings, using defaults: {}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &JsonStore) {
        match store.save(Self::STORAGE_KEY, self) {
            Ok(()) => log::info!("Settings saved"),
            Err(e) => log::warn!("Failed to save settings: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::test_support::temp_store;

    #[test]
    fn test_defaults_use_normal_difficulty() {
        let settings = Settings::default();
        assert_eq!(settings.difficulty, Difficulty::Normal);
        assert_eq!(settings.tuning(), Difficulty::Normal.tuning());
        assert_eq!(settings.geometry(), RoadGeometry::default());
    }

    #[test]
    fn test_bad_screen_size_falls_back() {
        let settings = Settings {
            screen_width: 0.0,
            ..Settings::default()
        };
        assert_eq!(settings.geometry(), RoadGeometry::default());

        let wide = Settings {
            screen_width: 1600.0,
            screen_height: 900.0,
            ..Settings::default()
        };
        assert_eq!(wide.geometry(), RoadGeometry::for_screen(1600.0, 900.0));
    }

    #[test]
    fn test_save_and_load() {
        let store = temp_store("settings");
        let settings = Settings {
            seed: Some(42),
            ..Settings::from_difficulty(Difficulty::Hard)
        };
        settings.save(&store);
        assert_eq!(Settings::load(&store), settings);
    }

    #[test]
    fn test_missing_or_corrupt_loads_defaults() {
        let store = temp_store("settings-corrupt");
        assert_eq!(Settings::load(&store), Settings::default());

        std::fs::create_dir_all(store.dir()).unwrap();
        std::fs::write(store.path_for("settings"), "garbage").unwrap();
        assert_eq!(Settings::load(&store), Settings::default());
    }

    #[test]
    fn test_stored_tuning_overrides_preset() {
        use crate::sim::spawner::SpawnPolicy;

        let store = temp_store("settings-tuning");
        std::fs::create_dir_all(store.dir()).unwrap();
        std::fs::write(
            store.path_for("settings"),
            r#"{"version": 1, "payload": {"difficulty": "Hard", "tuning": {"spawn": {"policy": "Simple"}}}}"#,
        )
        .unwrap();
        let settings = Settings::load(&store);
        let tuning = settings.tuning();
        assert_eq!(tuning.spawn.policy, SpawnPolicy::Simple);
        assert_eq!(tuning.base_speed, Difficulty::Hard.tuning().base_speed);

        settings.save(&store);
        assert_eq!(Settings::load(&store), settings);
    }

    #[test]
    fn test_invalid_tuning_falls_back_to_preset() {
        let settings = Settings {
            tuning: Some(serde_json::json!({ "magazine_size": -3 })),
            ..Settings::from_difficulty(Difficulty::Easy)
        };
        assert_eq!(settings.tuning(), Difficulty::Easy.tuning());
    }

    #[test]
    fn test_partial_document_fills_defaults() {
        let store = temp_store("settings-partial");
        std::fs::create_dir_all(store.dir()).unwrap();
        std::fs::write(
            store.path_for("settings"),
            r#"{"version": 1, "payload": {"difficulty": "Easy"}}"#,
        )
        .unwrap();
        let settings = Settings::load(&store);
        assert_eq!(settings.difficulty, Difficulty::Easy);
        assert_eq!(settings.screen_width, SCREEN_WIDTH);
    }
}
