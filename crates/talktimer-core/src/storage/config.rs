//! TOML-based application configuration.
//!
//! Stores user preferences:
//! - Talk duration and warning thresholds (whole minutes, the granularity
//!   settings surfaces present)
//! - Finish-sound playback
//!
//! Configuration is stored at `~/.config/talktimer/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use super::config_dir;
use crate::error::ConfigError;
use crate::timer::TimerConfig;

/// Talk duration and warning thresholds, in minutes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerSection {
    #[serde(default = "default_total_minutes")]
    pub total_minutes: u32,
    /// Minutes remaining at which the display turns yellow.
    #[serde(default = "default_yellow_minutes")]
    pub yellow_threshold_minutes: u32,
    /// Minutes remaining at which the display turns red.
    #[serde(default = "default_red_minutes")]
    pub red_threshold_minutes: u32,
}

/// Notification/feedback preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsSection {
    /// Play the finish sound when the countdown reaches zero.
    #[serde(default = "default_true")]
    pub sound: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/talktimer/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerSection,
    #[serde(default)]
    pub notifications: NotificationsSection,
}

fn default_total_minutes() -> u32 {
    20
}
fn default_yellow_minutes() -> u32 {
    5
}
fn default_red_minutes() -> u32 {
    2
}
fn default_true() -> bool {
    true
}

impl Default for TimerSection {
    fn default() -> Self {
        Self {
            total_minutes: default_total_minutes(),
            yellow_threshold_minutes: default_yellow_minutes(),
            red_threshold_minutes: default_red_minutes(),
        }
    }
}

impl Default for NotificationsSection {
    fn default() -> Self {
        Self { sound: true }
    }
}

impl Config {
    fn path() -> Result<PathBuf, ConfigError> {
        Ok(config_dir()?.join("config.toml"))
    }

    /// Load from disk, writing the default config on first run.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from disk, falling back to defaults on any error.
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("falling back to default configuration: {e}");
                Self::default()
            }
        }
    }

    fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Render the configuration as pretty TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: PathBuf::new(),
            message: e.to_string(),
        })
    }

    /// Engine-level durations in seconds, with the threshold ordering
    /// clamped the same way the settings surface does.
    pub fn timer_config(&self) -> TimerConfig {
        TimerConfig::new(
            self.timer.total_minutes.saturating_mul(60),
            self.timer.yellow_threshold_minutes.saturating_mul(60),
            self.timer.red_threshold_minutes.saturating_mul(60),
        )
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed
    /// for the key's type, or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.set_in_memory(key, value)?;
        self.save()
    }

    fn set_in_memory(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    fn value_by_path<'a>(root: &'a serde_json::Value, key: &str) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }
        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());

        let (parent_path, leaf) = match key.rsplit_once('.') {
            Some((parent, leaf)) => (Some(parent), leaf),
            None => (None, key),
        };
        if leaf.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        if let Some(parent_path) = parent_path {
            for part in parent_path.split('.') {
                current = current.get_mut(part).ok_or_else(unknown)?;
            }
        }

        let obj = current.as_object_mut().ok_or_else(unknown)?;
        let existing = obj.get(leaf).ok_or_else(unknown)?;

        let new_value = match existing {
            serde_json::Value::Bool(_) => {
                serde_json::Value::Bool(value.parse::<bool>().map_err(|_| {
                    ConfigError::InvalidValue {
                        key: key.to_string(),
                        message: format!("cannot parse '{value}' as bool"),
                    }
                })?)
            }
            serde_json::Value::Number(_) => {
                serde_json::Value::Number(value.parse::<u64>().map_err(|_| {
                    ConfigError::InvalidValue {
                        key: key.to_string(),
                        message: format!("cannot parse '{value}' as number"),
                    }
                })?.into())
            }
            _ => serde_json::Value::String(value.into()),
        };

        obj.insert(leaf.to_string(), new_value);
        Ok(())
    }
}
