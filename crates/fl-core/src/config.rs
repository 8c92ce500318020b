use crate::error::ConfigError;
use crate::followup::{DEFAULT_FOLLOWUP_POLL, DEFAULT_FOLLOWUP_TIMEOUT};
use crate::notifications::{DEFAULT_CAPACITY, DEFAULT_TTL};
use crate::sync::DEFAULT_POLL_INTERVAL;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "frontloop.toml";
pub const DEFAULT_DB_PATH: &str = ".frontloop/frontloop.db";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub db_path: PathBuf,
    pub port: u16,
    pub api_url: String,
    pub poll_interval: Duration,
    pub notification_ttl: Duration,
    pub notification_capacity: usize,
    pub followup_poll: Duration,
    pub followup_timeout: Duration,
}

/// Shape of `frontloop.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    db_path: Option<PathBuf>,
    port: Option<u16>,
    api_url: Option<String>,
    poll_interval_secs: Option<u64>,
    notification_ttl_secs: Option<u64>,
    notification_capacity: Option<usize>,
    followup_poll_secs: Option<u64>,
    followup_timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            port: DEFAULT_PORT,
            api_url: DEFAULT_API_URL.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            notification_ttl: DEFAULT_TTL,
            notification_capacity: DEFAULT_CAPACITY,
            followup_poll: DEFAULT_FOLLOWUP_POLL,
            followup_timeout: DEFAULT_FOLLOWUP_TIMEOUT,
        }
    }
}

impl Settings {
    /// Defaults, then the config file, then `FRONTLOOP_*` environment variables.
    ///
    /// An explicit `path` must exist. Without one, `FRONTLOOP_CONFIG` or
    /// `frontloop.toml` is used when present.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let lookup = |key: &str| std::env::var(key).ok();
        let mut settings = Self::default();
        match path {
            Some(path) => settings.merge_file(path, true)?,
            None => {
                let path = lookup("FRONTLOOP_CONFIG")
                    .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from);
                settings.merge_file(&path, false)?;
            }
        }
        settings.apply_env(lookup)?;
        settings.validate()?;
        Ok(settings)
    }

    fn merge_file(&mut self, path: &Path, required: bool) -> Result<(), ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if !required && err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(err) => {
                return Err(ConfigError::Read {
                    path: path.display().to_string(),
                    message: err.to_string(),
                });
            }
        };
        self.merge_toml(&content, &path.display().to_string())
    }

    pub fn merge_toml(&mut self, content: &str, origin: &str) -> Result<(), ConfigError> {
        let file: SettingsFile = toml::from_str(content).map_err(|err| ConfigError::Parse {
            path: origin.to_string(),
            message: err.to_string(),
        })?;
        if let Some(db_path) = file.db_path {
            self.db_path = db_path;
        }
        if let Some(port) = file.port {
            self.port = port;
        }
        if let Some(api_url) = file.api_url {
            self.api_url = api_url;
        }
        if let Some(secs) = file.poll_interval_secs {
            self.poll_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = file.notification_ttl_secs {
            self.notification_ttl = Duration::from_secs(secs);
        }
        if let Some(capacity) = file.notification_capacity {
            self.notification_capacity = capacity;
        }
        if let Some(secs) = file.followup_poll_secs {
            self.followup_poll = Duration::from_secs(secs);
        }
        if let Some(secs) = file.followup_timeout_secs {
            self.followup_timeout = Duration::from_secs(secs);
        }
        Ok(())
    }

    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("FRONTLOOP_DB_PATH") {
            self.db_path = PathBuf::from(value);
        }
        if let Some(value) = lookup("FRONTLOOP_PORT") {
            self.port = parse("FRONTLOOP_PORT", &value)?;
        }
        if let Some(value) = lookup("FRONTLOOP_API_URL") {
            self.api_url = value;
        }
        if let Some(value) = lookup("FRONTLOOP_POLL_INTERVAL_SECS") {
            self.poll_interval = Duration::from_secs(parse("FRONTLOOP_POLL_INTERVAL_SECS", &value)?);
        }
        if let Some(value) = lookup("FRONTLOOP_NOTIFICATION_TTL_SECS") {
            self.notification_ttl =
                Duration::from_secs(parse("FRONTLOOP_NOTIFICATION_TTL_SECS", &value)?);
        }
        if let Some(value) = lookup("FRONTLOOP_NOTIFICATION_CAPACITY") {
            self.notification_capacity = parse("FRONTLOOP_NOTIFICATION_CAPACITY", &value)?;
        }
        if let Some(value) = lookup("FRONTLOOP_FOLLOWUP_POLL_SECS") {
            self.followup_poll = Duration::from_secs(parse("FRONTLOOP_FOLLOWUP_POLL_SECS", &value)?);
        }
        if let Some(value) = lookup("FRONTLOOP_FOLLOWUP_TIMEOUT_SECS") {
            self.followup_timeout =
                Duration::from_secs(parse("FRONTLOOP_FOLLOWUP_TIMEOUT_SECS", &value)?);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let zero = |key: &'static str| ConfigError::InvalidValue {
            key,
            value: "0".to_string(),
        };
        if self.poll_interval.is_zero() {
            return Err(zero("poll_interval_secs"));
        }
        if self.notification_ttl.is_zero() {
            return Err(zero("notification_ttl_secs"));
        }
        if self.notification_capacity == 0 {
            return Err(zero("notification_capacity"));
        }
        if self.followup_poll.is_zero() {
            return Err(zero("followup_poll_secs"));
        }
        Ok(())
    }
}

fn parse<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_documented_values() {
        let settings = Settings::default();
        assert_eq!(settings.port, 8000);
        assert_eq!(settings.poll_interval, Duration::from_secs(5));
        assert_eq!(settings.notification_ttl, Duration::from_secs(5));
        assert_eq!(settings.notification_capacity, 50);
        assert_eq!(settings.followup_poll, Duration::from_secs(2));
        assert_eq!(settings.followup_timeout, Duration::from_secs(30));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn env_overrides_file_which_overrides_defaults() {
        let mut settings = Settings::default();
        settings
            .merge_toml("port = 9000\npoll_interval_secs = 10\n", "test.toml")
            .expect("valid toml");
        settings
            .apply_env(env(&[("FRONTLOOP_PORT", "9100")]))
            .expect("valid env");

        assert_eq!(settings.port, 9100);
        assert_eq!(settings.poll_interval, Duration::from_secs(10));
        assert_eq!(settings.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn unknown_keys_and_bad_values_are_rejected() {
        let mut settings = Settings::default();
        assert!(matches!(
            settings.merge_toml("polling = 3\n", "test.toml"),
            Err(ConfigError::Parse { .. })
        ));
        assert!(matches!(
            settings.apply_env(env(&[("FRONTLOOP_PORT", "eighty")])),
            Err(ConfigError::InvalidValue { key: "FRONTLOOP_PORT", .. })
        ));
    }

    #[test]
    fn zero_interval_fails_validation() {
        let mut settings = Settings::default();
        settings
            .apply_env(env(&[("FRONTLOOP_POLL_INTERVAL_SECS", "0")]))
            .expect("parses");
        assert!(settings.validate().is_err());
    }

    #[test]
    fn explicit_config_file_is_read_and_must_exist() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("frontloop.toml");
        fs::write(&path, "db_path = \"/tmp/fl.db\"\nnotification_capacity = 10\n").expect("write");

        let mut settings = Settings::default();
        settings.merge_file(&path, true).expect("file loads");
        assert_eq!(settings.db_path, PathBuf::from("/tmp/fl.db"));
        assert_eq!(settings.notification_capacity, 10);

        let missing = dir.path().join("absent.toml");
        assert!(matches!(
            settings.merge_file(&missing, true),
            Err(ConfigError::Read { .. })
        ));
        assert!(settings.merge_file(&missing, false).is_ok());
    }
}
