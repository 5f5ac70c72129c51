//! Game settings and preferences
//!
//! Persisted separately from progress under their own key.

use serde::{Deserialize, Serialize};

use crate::platform::KeyValueStore;
use crate::platform::input::HOLD_TO_DUCK_MS;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    /// Particles drawn per frame for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 32,
            QualityPreset::Medium => 96,
            QualityPreset::High => 128,
        }
    }

    /// Whether to draw the parallax starfield
    pub fn starfield_enabled(&self) -> bool {
        !matches!(self, QualityPreset::Low)
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,
    /// Pass particles
    pub particles: bool,
    /// Show FPS counter
    pub show_fps: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,

    // === Controls ===
    /// Press length (ms) after which a touch ducks instead of jumping
    pub hold_to_duck_ms: f64,

    // === Accessibility ===
    /// Reduced motion (no starfield twinkle, fewer particles)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            particles: true,
            show_fps: false,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            hold_to_duck_ms: HOLD_TO_DUCK_MS,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "kings_dash_settings";

    /// Effective particle cap
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else if self.reduced_motion {
            self.quality.max_particles() / 4
        } else {
            self.quality.max_particles()
        }
    }

    /// Effective cue volume
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
        }
    }

    /// Clamp values loaded from storage into sane ranges
    fn sanitized(mut self) -> Self {
        self.master_volume = self.master_volume.clamp(0.0, 1.0);
        self.sfx_volume = self.sfx_volume.clamp(0.0, 1.0);
        if !self.hold_to_duck_ms.is_finite() || self.hold_to_duck_ms <= 0.0 {
            self.hold_to_duck_ms = HOLD_TO_DUCK_MS;
        }
        self
    }

    /// Load settings; defaults on missing or malformed data
    pub fn load(store: &dyn KeyValueStore) -> Self {
        if let Some(json) = store.get(Self::STORAGE_KEY) {
            match serde_json::from_str::<Settings>(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings");
                    return settings.sanitized();
                }
                Err(err) => log::warn!("Ignoring malformed settings: {err}"),
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) {
        match serde_json::to_string(self) {
            Ok(json) => {
                if store.set(Self::STORAGE_KEY, &json) {
                    log::info!("Settings saved");
                } else {
                    log::warn!("Failed to save settings");
                }
            }
            Err(err) => log::warn!("Failed to encode settings: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStore;

    #[test]
    fn test_load_defaults_when_missing() {
        let store = MemoryStore::new();
        assert_eq!(Settings::load(&store), Settings::default());
    }

    #[test]
    fn test_save_then_load() {
        let mut store = MemoryStore::new();
        let settings = Settings {
            quality: QualityPreset::High,
            muted: true,
            ..Settings::default()
        };
        settings.save(&mut store);
        assert_eq!(Settings::load(&store), settings);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let mut store = MemoryStore::new();
        store.set(Settings::STORAGE_KEY, r#"{"muted":true}"#);
        let settings = Settings::load(&store);
        assert!(settings.muted);
        assert_eq!(settings.hold_to_duck_ms, HOLD_TO_DUCK_MS);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let mut store = MemoryStore::new();
        store.set(
            Settings::STORAGE_KEY,
            r#"{"master_volume":4.0,"hold_to_duck_ms":-3.0}"#,
        );
        let settings = Settings::load(&store);
        assert_eq!(settings.master_volume, 1.0);
        assert_eq!(settings.hold_to_duck_ms, HOLD_TO_DUCK_MS);
    }

    #[test]
    fn test_malformed_falls_back() {
        let mut store = MemoryStore::new();
        store.set(Settings::STORAGE_KEY, "nope");
        assert_eq!(Settings::load(&store), Settings::default());
    }

    #[test]
    fn test_effective_volume() {
        let mut settings = Settings::default();
        assert!((settings.effective_volume() - 0.8).abs() < 1e-6);
        settings.muted = true;
        assert_eq!(settings.effective_volume(), 0.0);
    }

    #[test]
    fn test_particle_cap() {
        let mut settings = Settings::default();
        assert_eq!(settings.max_particles(), 96);
        settings.reduced_motion = true;
        assert_eq!(settings.max_particles(), 24);
        settings.particles = false;
        assert_eq!(settings.max_particles(), 0);
    }
}
