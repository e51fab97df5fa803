//! Player preferences
//!
//! Volumes and the music preference persist between sessions (LocalStorage
//! as JSON).

use serde::{Deserialize, Serialize};

/// Volume and music preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Background music volume (0-100)
    pub music_volume: u8,
    /// Sound effects volume (0-100)
    pub sfx_volume: u8,
    /// Background music requested on
    ///
    /// A request, not a guarantee: the browser may still block playback
    /// until the next user gesture.
    pub music_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            music_volume: 50,
            sfx_volume: 70,
            music_enabled: true,
        }
    }
}

impl Settings {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "moonward_settings";

    pub fn set_music_volume(&mut self, volume: u8) {
        self.music_volume = volume.min(100);
    }

    pub fn set_sfx_volume(&mut self, volume: u8) {
        self.sfx_volume = volume.min(100);
    }

    /// Handle a music toggle press, returning whether music is now requested
    ///
    /// Keyed on what is actually `playing` rather than the stored request, so
    /// a press after a blocked autoplay asks for music again instead of
    /// turning the preference off.
    pub fn toggle_music(&mut self, playing: bool) -> bool {
        self.music_enabled = !playing;
        self.music_enabled
    }

    /// Music gain in 0.0..=1.0
    pub fn music_gain(&self) -> f32 {
        f32::from(self.music_volume.min(100)) / 100.0
    }

    /// Effects gain in 0.0..=1.0
    pub fn sfx_gain(&self) -> f32 {
        f32::from(self.sfx_volume.min(100)) / 100.0
    }

    /// Parse stored JSON, clamping out-of-range volumes
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Settings = serde_json::from_str(json)?;
        settings.music_volume = settings.music_volume.min(100);
        settings.sfx_volume = settings.sfx_volume.min(100);
        Ok(settings)
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Discarding stored settings: {e}"),
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

        let Some(storage) = storage else {
            log::warn!("LocalStorage unavailable, settings not saved");
            return;
        };
        match serde_json::to_string(self) {
            Ok(json) => {
                if storage.set_item(Self::STORAGE_KEY, &json).is_err() {
                    log::warn!("Failed to write settings to LocalStorage");
                } else {
                    log::debug!("Settings saved");
                }
            }
            Err(e) => log::warn!("Failed to serialize settings: {e}"),
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        log::debug!("No storage on native, using default settings ({})", Self::STORAGE_KEY);
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
        let settings = Settings::default();
        assert_eq!(settings.music_volume, 50);
        assert_eq!(settings.sfx_volume, 70);
        assert!(settings.music_enabled);
        assert!((settings.sfx_gain() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_volume_clamped() {
        let mut settings = Settings::default();
        settings.set_music_volume(250);
        assert_eq!(settings.music_volume, 100);
        assert_eq!(settings.music_gain(), 1.0);
    }

    #[test]
    fn test_json_roundtrip_and_partial() {
        let mut settings = Settings::default();
        settings.set_sfx_volume(15);
        settings.toggle_music(true);
        let json = serde_json::to_string(&settings).unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), settings);

        let partial = Settings::from_json(r#"{ "music_volume": 200 }"#).unwrap();
        assert_eq!(partial.music_volume, 100);
        assert_eq!(partial.sfx_volume, 70);

        assert!(Settings::from_json("garbage").is_err());
    }

    #[test]
    fn test_toggle_follows_audible_state() {
        let mut settings = Settings::default();
        assert!(!settings.toggle_music(true));
        assert!(!settings.music_enabled);
        assert!(settings.toggle_music(false));

        // Requested but blocked by the browser: the press asks again
        assert!(settings.music_enabled);
        assert!(settings.toggle_music(false));
        assert!(settings.music_enabled);
    }
}
