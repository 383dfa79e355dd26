//! TOML-based application configuration.
//!
//! Stores planning defaults:
//! - Day bounds and sleep window
//! - Minimum free slot length and "start from now" behavior
//! - Priority weights and the time-of-day scoring table
//!
//! Configuration is stored at `~/.config/dayslot/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::{ConfigError, Result, ValidationError};
use crate::scheduler::ScoringConfig;
use crate::timeline::{parse_clock, DayWindow, SleepWindow, DEFAULT_MIN_SLOT_MINUTES};

/// Day bounds and sleep settings, kept as `HH:MM` strings on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayConfig {
    #[serde(default = "default_day_start")]
    pub day_start: String,
    #[serde(default = "default_day_end")]
    pub day_end: String,
    #[serde(default = "default_sleep_start")]
    pub sleep_start: String,
    #[serde(default = "default_sleep_end")]
    pub sleep_end: String,
    #[serde(default = "default_min_slot_minutes")]
    pub min_slot_minutes: i64,
    #[serde(default)]
    pub start_from_now: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/dayslot/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub day: DayConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
}

// Default functions
fn default_day_start() -> String {
    "00:00".into()
}
fn default_day_end() -> String {
    "23:59".into()
}
fn default_sleep_start() -> String {
    "23:00".into()
}
fn default_sleep_end() -> String {
    "07:00".into()
}
fn default_min_slot_minutes() -> i64 {
    DEFAULT_MIN_SLOT_MINUTES
}

impl Default for DayConfig {
    fn default() -> Self {
        Self {
            day_start: default_day_start(),
            day_end: default_day_end(),
            sleep_start: default_sleep_start(),
            sleep_end: default_sleep_end(),
            min_slot_minutes: default_min_slot_minutes(),
            start_from_now: false,
        }
    }
}

impl DayConfig {
    /// Parse into a [`DayWindow`].
    ///
    /// # Errors
    ///
    /// Returns an error if a clock time is not `HH:MM`, the day ends before
    /// it starts, or the minimum slot length is not positive.
    pub fn to_window(&self) -> std::result::Result<DayWindow, ValidationError> {
        let clock = |field: &str, value: &str| {
            parse_clock(value)
                .ok_or_else(|| ValidationError::invalid(field, format!("'{value}' is not HH:MM")))
        };

        let day_start = clock("day_start", &self.day_start)?;
        let day_end = clock("day_end", &self.day_end)?;
        let sleep_start = clock("sleep_start", &self.sleep_start)?;
        let sleep_end = clock("sleep_end", &self.sleep_end)?;

        if day_end <= day_start {
            return Err(ValidationError::InvalidTimeRange {
                start: self.day_start.clone(),
                end: self.day_end.clone(),
            });
        }
        if self.min_slot_minutes < 1 {
            return Err(ValidationError::invalid(
                "min_slot_minutes",
                "must be at least 1",
            ));
        }

        Ok(DayWindow {
            day_start,
            day_end,
            sleep: SleepWindow::new(sleep_start, sleep_end),
            min_slot_minutes: self.min_slot_minutes,
            start_from_now: self.start_from_now,
        })
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = match current {
                serde_json::Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
                other => other.get(part)?,
            };
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> std::result::Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let parts: Vec<&str> = key.split('.').filter(|p| !p.is_empty()).collect();
        let Some((leaf, path)) = parts.split_last() else {
            return Err(unknown());
        };

        let mut current = root;
        for part in path {
            current = match current {
                serde_json::Value::Array(items) => {
                    let index = part.parse::<usize>().map_err(|_| unknown())?;
                    items.get_mut(index).ok_or_else(unknown)?
                }
                other => other.get_mut(*part).ok_or_else(unknown)?,
            };
        }

        let slot = match current {
            serde_json::Value::Array(items) => {
                let index = leaf.parse::<usize>().map_err(|_| unknown())?;
                items.get_mut(index).ok_or_else(unknown)?
            }
            serde_json::Value::Object(obj) => obj.get_mut(*leaf).ok_or_else(unknown)?,
            _ => return Err(unknown()),
        };

        let new_value = match slot {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value
                    .parse::<bool>()
                    .map_err(|e| invalid(e.to_string()))?,
            ),
            serde_json::Value::Number(_) => {
                if let Ok(n) = value.parse::<i64>() {
                    serde_json::Value::Number(n.into())
                } else if let Ok(n) = value.parse::<f64>() {
                    serde_json::Number::from_f64(n)
                        .map(serde_json::Value::Number)
                        .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                } else {
                    return Err(invalid(format!("cannot parse '{value}' as number")));
                }
            }
            serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
            }
            _ => serde_json::Value::String(value.into()),
        };

        *slot = new_value;
        Ok(())
    }

    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        if !path.exists() {
            let cfg = Self::default();
            cfg.save_to(&path)?;
            return Ok(cfg);
        }
        Self::load_from(&path)
    }

    /// Load from `path`, returning defaults if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::LoadFailed`] if the file cannot be read and
    /// [`ConfigError::ParseFailed`] if it is not a valid config.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => {
                return Err(ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: err.to_string(),
                }
                .into())
            }
        };

        Ok(toml::from_str(&content)?)
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    /// Persist to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    ///
    /// Array elements are addressed by index, e.g.
    /// `scoring.time_of_day.categories.0.penalty`.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed
    /// as the existing field's type.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Set a config value by key and save. Returns error if key is unknown.
    ///
    /// Nothing is changed or written when the update would leave the
    /// `[day]` section unusable.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// the resulting day window is invalid, or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = Self::path()?;
        self.set_at(&path, key, value)
    }

    fn set_at(&mut self, path: &Path, key: &str, value: &str) -> Result<()> {
        let mut updated = self.clone();
        updated.apply(key, value)?;
        updated.day_window()?;
        updated.save_to(path)?;
        *self = updated;
        Ok(())
    }

    /// Day window from the `[day]` section.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored values are invalid.
    pub fn day_window(&self) -> Result<DayWindow> {
        Ok(self.day.to_window()?)
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|err| {
            tracing::warn!(%err, "falling back to default configuration");
            Self::default()
        })
    }
}
