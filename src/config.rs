use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::timeline::DEFAULT_PAGE_SIZE;
use crate::validation::DEFAULT_MAX_MESSAGE_LEN;

// Default configuration
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_LOG_FILTER: &str = "devchat_client=info";
pub const DEFAULT_NOTICE_TTL_SECS: u64 = 5;

/// Client settings persisted as JSON
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Messages per history page
    pub page_size: usize,
    pub request_timeout_secs: u64,
    /// `tracing` filter used when `RUST_LOG` is not set
    pub log_filter: String,
    /// How long error notices stay visible
    pub notice_ttl_secs: u64,
    pub max_message_len: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            notice_ttl_secs: DEFAULT_NOTICE_TTL_SECS,
            max_message_len: DEFAULT_MAX_MESSAGE_LEN,
        }
    }
}

impl Settings {
    pub fn page_size(&self) -> usize {
        self.page_size.max(1)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

pub fn settings_path() -> Result<PathBuf, ConfigError> {
    let proj = ProjectDirs::from("com", "devchat", "devchat-client").ok_or(ConfigError::NoConfigDir)?;
    let dir = proj.config_dir();
    fs::create_dir_all(dir)?;
    Ok(dir.join("settings.json"))
}

/// Load settings from the platform config dir, or defaults if none exist.
pub fn load_settings() -> Result<Settings, ConfigError> {
    load_settings_from(&settings_path()?)
}

pub fn load_settings_from(path: &Path) -> Result<Settings, ConfigError> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn save_settings(settings: &Settings) -> Result<(), ConfigError> {
    save_settings_to(&settings_path()?, settings)
}

pub fn save_settings_to(path: &Path, settings: &Settings) -> Result<(), ConfigError> {
    let data = serde_json::to_string_pretty(settings)?;
    let mut file = fs::File::create(path)?;
    file.write_all(data.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings_from(&dir.path().join("settings.json")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.page_size, 50);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            page_size: 20,
            log_filter: "debug".into(),
            ..Settings::default()
        };
        save_settings_to(&path, &settings).unwrap();
        assert_eq!(load_settings_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "page_size": 0 }"#).unwrap();
        let settings = load_settings_from(&path).unwrap();
        assert_eq!(settings.page_size(), 1);
        assert_eq!(settings.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(load_settings_from(&path), Err(ConfigError::Parse(_))));
    }
}
