//! TOML-based application configuration.
//!
//! Stores user preferences at `~/.config/studytrack/config.toml`:
//! - Study defaults (goal hours for new subjects)
//! - Notification/status-surface preferences
//!
//! Every field carries a serde default, so a missing or partial file
//! loads cleanly.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::ConfigError;

/// Study defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyConfig {
    /// Goal hours assigned to a new subject when none is given.
    #[serde(default = "default_goal_hours")]
    pub default_goal_hours: f64,
}

/// Notification / status-surface preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// When false, the session command runs without a live status line.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Application configuration, serialized to/from TOML.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub study: StudyConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

fn default_goal_hours() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            default_goal_hours: default_goal_hours(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
        }
    }
}

impl Config {
    /// Load the configuration, falling back to defaults when the file is
    /// missing or unreadable.
    pub fn load() -> Self {
        match config_path() {
            Ok(path) => Self::load_from(&path),
            Err(_) => Self::default(),
        }
    }

    fn load_from(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|raw| toml::from_str(&raw).ok())
            .unwrap_or_default()
    }

    /// Persist the configuration.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = config_path().map_err(|e| ConfigError::SaveFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        self.save_to(&path)
    }

    fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let raw = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        std::fs::write(path, raw).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Read a value by dotted key.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "study.default_goal_hours" => Some(self.study.default_goal_hours.to_string()),
            "notifications.enabled" => Some(self.notifications.enabled.to_string()),
            _ => None,
        }
    }

    /// Set a value by dotted key.
    ///
    /// # Errors
    /// Returns an error for an unknown key or an unparseable value.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "study.default_goal_hours" => {
                self.study.default_goal_hours =
                    value.parse().map_err(|_| ConfigError::InvalidValue {
                        key: key.to_string(),
                        message: format!("expected a number, got '{value}'"),
                    })?;
            }
            "notifications.enabled" => {
                self.notifications.enabled =
                    value.parse().map_err(|_| ConfigError::InvalidValue {
                        key: key.to_string(),
                        message: format!("expected true or false, got '{value}'"),
                    })?;
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }
}

fn config_path() -> crate::error::Result<PathBuf> {
    Ok(data_dir()?.join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml"));
        assert!((config.study.default_goal_hours - 1.0).abs() < f64::EPSILON);
        assert!(config.notifications.enabled);
    }

    #[test]
    fn save_and_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.set("study.default_goal_hours", "6.5").unwrap();
        config.set("notifications.enabled", "false").unwrap();
        config.save_to(&path).unwrap();

        let reloaded = Config::load_from(&path);
        assert_eq!(reloaded.get("study.default_goal_hours").unwrap(), "6.5");
        assert_eq!(reloaded.get("notifications.enabled").unwrap(), "false");
    }

    #[test]
    fn unknown_key_is_rejected() {
        let mut config = Config::default();
        assert!(matches!(
            config.set("study.nope", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(config.get("study.nope").is_none());
    }

    #[test]
    fn bad_value_is_rejected() {
        let mut config = Config::default();
        assert!(matches!(
            config.set("notifications.enabled", "sometimes"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
