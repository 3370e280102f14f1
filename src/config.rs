use std::{fs, path::Path};

use serde::Deserialize;

/// Optional player settings loaded from `config.yaml` next to the
/// executable. Every field falls back to a sane default, so a missing or
/// partial file is never an error.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub debug: bool,
    pub log_level: String,
    pub volume: f64,
    pub frame_rate: i32,
    pub tick_sleep_ms: u64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            debug: false,
            log_level: "info".to_string(),
            volume: 1.0,
            frame_rate: 30,
            tick_sleep_ms: 8,
        }
    }
}

impl PlayerConfig {
    pub fn load(path: &Path) -> Option<Self> {
        let text = fs::read_to_string(path).ok()?;
        Self::from_yaml_str(&text)
    }

    pub fn from_yaml_str(text: &str) -> Option<Self> {
        let parsed: PlayerConfig = serde_yaml::from_str(text).ok()?;
        Some(parsed.normalized())
    }

    fn normalized(mut self) -> Self {
        if self.frame_rate <= 0 {
            self.frame_rate = Self::default().frame_rate;
        }
        if !self.volume.is_finite() || self.volume < 0.0 {
            self.volume = 0.0;
        }
        self.tick_sleep_ms = self.tick_sleep_ms.max(1);
        self.log_level = self.log_level.to_lowercase();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_empty() {
        let config = PlayerConfig::from_yaml_str("{}").unwrap();
        assert!(!config.debug);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.volume, 1.0);
        assert_eq!(config.frame_rate, 30);
        assert_eq!(config.tick_sleep_ms, 8);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = PlayerConfig::from_yaml_str("debug: true\nvolume: 0.25\n").unwrap();
        assert!(config.debug);
        assert_eq!(config.volume, 0.25);
        assert_eq!(config.frame_rate, 30);
    }

    #[test]
    fn bad_values_are_normalized() {
        let config =
            PlayerConfig::from_yaml_str("frame_rate: -5\nvolume: -1.0\ntick_sleep_ms: 0\n")
                .unwrap();
        assert_eq!(config.frame_rate, 30);
        assert_eq!(config.volume, 0.0);
        assert_eq!(config.tick_sleep_ms, 1);
    }

    #[test]
    fn log_level_is_lowercased() {
        let config = PlayerConfig::from_yaml_str("log_level: WARN\n").unwrap();
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn garbage_yaml_is_rejected() {
        assert!(PlayerConfig::from_yaml_str(": : :").is_none());
    }
}
