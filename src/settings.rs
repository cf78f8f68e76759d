//! Player preferences
//!
//! Persisted separately from replays in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::theme::Theme;

/// Allowed simulation speed range, percent of base speed.
pub const MIN_SPEED_PERCENT: u32 = 50;
pub const MAX_SPEED_PERCENT: u32 = 200;

/// Player preferences. Speed is fixed for the duration of a session so that
/// a recorded replay has a single authoritative step interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Simulation speed, percent of base (100 = normal)
    pub speed_percent: u32,
    /// Preferred color theme
    pub theme: Theme,
    /// Sound effects on/off
    pub sound: bool,
    /// Start new sessions with the autopilot driving
    pub autopilot: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            speed_percent: 100,
            theme: Theme::Classic,
            sound: true,
            autopilot: false,
        }
    }
}

impl Settings {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "snake_settings";

    /// Clamp speed into the supported range.
    pub fn set_speed_percent(&mut self, pct: u32) {
        self.speed_percent = pct.clamp(MIN_SPEED_PERCENT, MAX_SPEED_PERCENT);
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str::<Settings>(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    let mut settings = settings;
                    settings.set_speed_percent(settings.speed_percent);
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.speed_percent, 100);
        assert_eq!(s.theme, Theme::Classic);
        assert!(s.sound);
        assert!(!s.autopilot);
    }

    #[test]
    fn test_speed_clamped() {
        let mut s = Settings::default();
        s.set_speed_percent(10);
        assert_eq!(s.speed_percent, MIN_SPEED_PERCENT);
        s.set_speed_percent(10_000);
        assert_eq!(s.speed_percent, MAX_SPEED_PERCENT);
        s.set_speed_percent(130);
        assert_eq!(s.speed_percent, 130);
    }

    #[test]
    fn test_json_round_trip() {
        let mut s = Settings::default();
        s.theme = Theme::Neon;
        s.sound = false;
        let json = serde_json::to_string(&s).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
