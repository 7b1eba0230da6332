//! TOML-based application configuration.
//!
//! Stores user preferences:
//! - Reminder interval and break duration
//! - Display work areas for the static display provider
//! - Optional theme seed for reproducible overlay colors
//!
//! Configuration is stored at `~/.config/restbreak/config.toml`.

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::{ConfigError, ValidationError};
use crate::overlay::{Display, Rect};

/// Allowed reminder interval, in seconds.
pub const INTERVAL_RANGE: RangeInclusive<u32> = 60..=3600;
/// Allowed break duration, in seconds.
pub const BREAK_RANGE: RangeInclusive<u32> = 10..=300;

/// Timing values the scheduler runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderConfig {
    /// Time between break events.
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u32,
    /// Length of each break overlay.
    #[serde(default = "default_break_seconds")]
    pub break_seconds: u32,
}

/// One display's visible work area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub id: String,
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Overlay appearance configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Seed for the theme RNG. Unset means a fresh random seed per process.
    /// TOML has no null, so an unset seed is simply left out of the file.
    #[serde(default)]
    pub theme_seed: Option<u64>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/restbreak/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub reminder: ReminderConfig,
    #[serde(default)]
    pub overlay: OverlayConfig,
    #[serde(default = "default_displays")]
    pub displays: Vec<DisplayConfig>,
}

fn default_interval_seconds() -> u32 {
    120
}
fn default_break_seconds() -> u32 {
    60
}
fn default_displays() -> Vec<DisplayConfig> {
    vec![DisplayConfig {
        id: "primary".into(),
        x: 0,
        y: 0,
        width: 1920,
        height: 1080,
    }]
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_interval_seconds(),
            break_seconds: default_break_seconds(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reminder: ReminderConfig::default(),
            overlay: OverlayConfig::default(),
            displays: default_displays(),
        }
    }
}

impl ReminderConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.interval_seconds))
    }

    /// Check both values against their allowed ranges.
    ///
    /// # Errors
    ///
    /// Returns the first value found outside its range.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_range("reminder.interval_seconds", self.interval_seconds, &INTERVAL_RANGE)?;
        check_range("reminder.break_seconds", self.break_seconds, &BREAK_RANGE)?;
        Ok(())
    }

    /// Interval rendered in whole minutes, e.g. `"2 min"`.
    pub fn interval_label(&self) -> String {
        format!("{} min", self.interval_seconds / 60)
    }

    /// Break duration rendered in seconds, e.g. `"60 sec"`.
    pub fn break_label(&self) -> String {
        format!("{} sec", self.break_seconds)
    }
}

fn check_range(
    field: &str,
    value: u32,
    range: &RangeInclusive<u32>,
) -> Result<(), ValidationError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field: field.to_string(),
            value: u64::from(value),
            min: u64::from(*range.start()),
            max: u64::from(*range.end()),
        })
    }
}

impl DisplayConfig {
    pub fn to_display(&self) -> Display {
        Display {
            id: self.id.clone(),
            work_area: Rect {
                x: f64::from(self.x),
                y: f64::from(self.y),
                width: f64::from(self.width),
                height: f64::from(self.height),
            },
        }
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
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;

            let new_value = match existing {
                serde_json::Value::Null | serde_json::Value::Number(_) if value == "null" => {
                    serde_json::Value::Null
                }
                serde_json::Value::Null => {
                    if let Ok(n) = value.parse::<u64>() {
                        serde_json::Value::Number(n.into())
                    } else if let Ok(b) = value.parse::<bool>() {
                        serde_json::Value::Bool(b)
                    } else {
                        serde_json::Value::String(value.into())
                    }
                }
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value
                        .parse::<bool>()
                        .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
                ),
                serde_json::Value::Number(_) => {
                    let n = value
                        .parse::<u64>()
                        .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                    serde_json::Value::Number(n.into())
                }
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                _ => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    /// Default config file location.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be resolved or created.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from `path`, writing defaults there if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed or fails
    /// validation, or if the default config cannot be written.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate().map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Load from the default location.
    ///
    /// # Errors
    ///
    /// See [`Config::load_from`].
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key. The result must pass validation;
    /// on any error `self` is left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the resulting config is invalid.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate().map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        *self = updated;
        Ok(())
    }

    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns the first invalid value found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.reminder.validate()?;
        for display in &self.displays {
            if display.id.is_empty() {
                return Err(ValidationError::InvalidValue {
                    field: "displays.id".into(),
                    message: "display id must not be empty".into(),
                });
            }
            if display.width == 0 || display.height == 0 {
                return Err(ValidationError::InvalidValue {
                    field: format!("displays.{}", display.id),
                    message: "width and height must be positive".into(),
                });
            }
        }
        Ok(())
    }

    pub fn displays(&self) -> Vec<Display> {
        self.displays.iter().map(DisplayConfig::to_display).collect()
    }
}
