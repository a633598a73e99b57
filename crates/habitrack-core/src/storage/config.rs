//! TOML-based application configuration.
//!
//! Stores:
//! - The time zone that decides what "today" is
//! - The default user for CLI commands
//! - Habit name and description length limits
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::clock::{SystemClock, TimeZoneSetting};
use crate::error::ConfigError;
use crate::habit::{HabitLimits, DEFAULT_DESCRIPTION_MAX_LEN, DEFAULT_NAME_MAX_LEN};
use crate::user::normalize_email;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClockConfig {
    /// "local", "utc", or a fixed offset such as "+05:30".
    #[serde(default)]
    pub timezone: TimeZoneSetting,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserConfig {
    /// Used when a command is run without `--user`.
    #[serde(default)]
    pub default_email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitsConfig {
    #[serde(default = "default_name_max_len")]
    pub name_max_len: usize,
    #[serde(default = "default_description_max_len")]
    pub description_max_len: usize,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub clock: ClockConfig,
    #[serde(default)]
    pub user: UserConfig,
    #[serde(default)]
    pub habits: HabitsConfig,
}

fn default_name_max_len() -> usize {
    DEFAULT_NAME_MAX_LEN
}
fn default_description_max_len() -> usize {
    DEFAULT_DESCRIPTION_MAX_LEN
}

impl Default for HabitsConfig {
    fn default() -> Self {
        Self {
            name_max_len: default_name_max_len(),
            description_max_len: default_description_max_len(),
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
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => value
                        .parse::<bool>()
                        .map(serde_json::Value::Bool)
                        .map_err(|e| invalid(e.to_string()))?,
                    serde_json::Value::Number(_) => value
                        .parse::<u64>()
                        .map(|n| serde_json::Value::Number(n.into()))
                        .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?,
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        return Err(invalid("not a leaf key".to_string()));
                    }
                    // Strings and unset optionals; an empty value clears an optional.
                    serde_json::Value::Null if value.is_empty() => serde_json::Value::Null,
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Path of the config file inside the data directory.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the data directory, writing defaults if no file exists yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                tracing::info!(path = %path.display(), "wrote default config");
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Null => Some(String::new()),
            serde_json::Value::Object(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key, in memory only.
    ///
    /// The config is left untouched if the result would not validate.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed
    /// into the key's type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let mut updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        if updated.user.default_email.as_deref() == Some("") {
            updated.user.default_email = None;
        }
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Check values that serde alone accepts but the rest of the crate cannot use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.habits.name_max_len == 0 {
            return Err(ConfigError::InvalidValue {
                key: "habits.name_max_len".into(),
                message: "must be at least 1".into(),
            });
        }
        if let Some(ref email) = self.user.default_email {
            normalize_email(email).map_err(|e| ConfigError::InvalidValue {
                key: "user.default_email".into(),
                message: e.to_string(),
            })?;
        }
        Ok(())
    }

    pub fn clock(&self) -> SystemClock {
        SystemClock::new(self.clock.timezone)
    }

    pub fn habit_limits(&self) -> HabitLimits {
        HabitLimits {
            name_max_len: self.habits.name_max_len,
            description_max_len: self.habits.description_max_len,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.clock.timezone, TimeZoneSetting::Local);
        assert_eq!(parsed.habits.name_max_len, 100);
        assert_eq!(parsed.user.default_email, None);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[clock]\ntimezone = \"+09:00\"\n").unwrap();
        assert_eq!(
            parsed.clock.timezone,
            TimeZoneSetting::Fixed(FixedOffset::east_opt(9 * 3600).unwrap())
        );
        assert_eq!(parsed.habits.description_max_len, 255);
    }

    #[test]
    fn bad_timezone_in_file_fails_to_parse() {
        assert!(toml::from_str::<Config>("[clock]\ntimezone = \"Moon\"\n").is_err());
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("clock.timezone").as_deref(), Some("local"));
        assert_eq!(cfg.get("habits.name_max_len").as_deref(), Some("100"));
        assert_eq!(cfg.get("user.default_email").as_deref(), Some(""));
        assert!(cfg.get("habits.missing_key").is_none());
        assert!(cfg.get("habits").is_none());
    }

    #[test]
    fn set_updates_string_number_and_optional() {
        let mut cfg = Config::default();
        cfg.set("clock.timezone", "utc").unwrap();
        cfg.set("habits.name_max_len", "40").unwrap();
        cfg.set("user.default_email", "me@example.com").unwrap();
        assert_eq!(cfg.clock.timezone, TimeZoneSetting::Utc);
        assert_eq!(cfg.habits.name_max_len, 40);
        assert_eq!(cfg.user.default_email.as_deref(), Some("me@example.com"));

        cfg.set("user.default_email", "").unwrap();
        assert_eq!(cfg.user.default_email, None);
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        let err = cfg.set("clock.nonexistent_key", "value").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownKey(_)));
        assert!(cfg.set("", "value").is_err());
    }

    #[test]
    fn set_rejects_invalid_values_and_keeps_old_state() {
        let mut cfg = Config::default();
        assert!(cfg.set("clock.timezone", "Mars/Olympus").is_err());
        assert!(cfg.set("habits.name_max_len", "lots").is_err());
        assert!(cfg.set("habits.name_max_len", "0").is_err());
        assert!(cfg.set("user.default_email", "not-an-email").is_err());
        assert_eq!(cfg.clock.timezone, TimeZoneSetting::Local);
        assert_eq!(cfg.habits.name_max_len, 100);
        assert!(cfg.user.default_email.is_none());
    }

    #[test]
    fn load_from_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.habits.name_max_len, 100);
        assert!(path.exists());
    }

    #[test]
    fn save_then_load_preserves_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.set("clock.timezone", "-03:00").unwrap();
        cfg.set("user.default_email", "a@b.io").unwrap();
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.clock.timezone, cfg.clock.timezone);
        assert_eq!(loaded.user.default_email.as_deref(), Some("a@b.io"));
    }

    #[test]
    fn load_from_corrupt_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "this is = = not toml").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }
}
