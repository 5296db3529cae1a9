//! Configuration loaded from ~/.advisor-dashboard/config.json.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable that overrides `instanceUrl`.
pub const INSTANCE_URL_ENV: &str = "ADVISOR_INSTANCE_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Base URL of the record store, e.g. `https://example.service-now.com`.
    pub instance_url: String,
    /// Per-request transport timeout applied by the HTTP client.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Show the built-in demo data set when a load fails.
    #[serde(default = "default_true")]
    pub fallback_on_error: bool,
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

impl Config {
    pub fn new(instance_url: impl Into<String>) -> Self {
        Self {
            instance_url: instance_url.into(),
            request_timeout_secs: default_request_timeout_secs(),
            fallback_on_error: true,
        }
    }

    /// Parsed instance URL.
    pub fn instance(&self) -> Result<url::Url, ConfigError> {
        url::Url::parse(&self.instance_url)
            .map_err(|e| ConfigError::InvalidInstanceUrl(format!("{}: {}", self.instance_url, e)))
    }
}

/// Get the canonical config file path (~/.advisor-dashboard/config.json)
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
    Ok(home.join(".advisor-dashboard").join("config.json"))
}

/// Load configuration from the canonical path, applying env overrides.
pub fn load_config() -> Result<Config, ConfigError> {
    let mut config = load_config_from(&config_path()?)?;
    apply_env_overrides(&mut config, std::env::var(INSTANCE_URL_ENV).ok());
    config.instance()?;
    Ok(config)
}

/// Load configuration from an explicit path.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let content = fs::read_to_string(path)?;
    let config: Config = serde_json::from_str(&content)?;
    Ok(config)
}

/// Write config as pretty JSON, creating the parent directory if needed.
pub fn save_config_to(path: &Path, config: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let content = serde_json::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}

fn apply_env_overrides(config: &mut Config, instance_url: Option<String>) {
    if let Some(url) = instance_url.filter(|u| !u.trim().is_empty()) {
        log::info!("Using instance URL from {}", INSTANCE_URL_ENV);
        config.instance_url = url;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_applies_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        fs::write(&path, r#"{ "instanceUrl": "https://dev.example.com" }"#).unwrap();

        let config = load_config_from(&path).unwrap();

        assert_eq!(config.instance_url, "https://dev.example.com");
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.fallback_on_error);
    }

    #[test]
    fn test_load_fallback_can_be_disabled() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        fs::write(
            &path,
            r#"{ "instanceUrl": "https://dev.example.com", "fallbackOnError": false }"#,
        )
        .unwrap();

        assert!(!load_config_from(&path).unwrap().fallback_on_error);
    }

    #[test]
    fn test_load_missing_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nope.json");

        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(p) if p == path));
    }

    #[test]
    fn test_load_rejects_malformed_json() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        fs::write(&path, "{ instanceUrl: ").unwrap();

        assert!(matches!(
            load_config_from(&path),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_save_creates_parent_and_round_trips() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.json");
        let mut config = Config::new("https://prod.example.com");
        config.request_timeout_secs = 5;
        config.fallback_on_error = false;

        save_config_to(&path, &config).unwrap();

        assert_eq!(load_config_from(&path).unwrap(), config);
    }

    #[test]
    fn test_env_override_ignores_blank() {
        let mut config = Config::new("https://a.example.com");
        apply_env_overrides(&mut config, Some("  ".to_string()));
        assert_eq!(config.instance_url, "https://a.example.com");

        apply_env_overrides(&mut config, Some("https://b.example.com".to_string()));
        assert_eq!(config.instance_url, "https://b.example.com");
    }

    #[test]
    fn test_instance_rejects_relative_url() {
        let config = Config::new("not a url");
        assert!(matches!(
            config.instance(),
            Err(ConfigError::InvalidInstanceUrl(_))
        ));
    }
}
