use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

use crate::client::DEFAULT_ENDPOINT;

/// Environment variable that overrides the configured endpoint.
pub const ENDPOINT_ENV: &str = "ASSISTANT_ENDPOINT";

const APP_DIR: &str = "business-assistant";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub endpoint: Option<String>,
    pub log_filter: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    pub fn save_endpoint(endpoint: &str) -> Result<()> {
        let mut config = Self::load().unwrap_or_else(|_| Self::new());
        config.endpoint = Some(endpoint.to_string());
        config.save()
    }

    /// Pick the endpoint: explicit flag, then environment, then config file,
    /// then the built-in default.
    pub fn resolve_endpoint(&self, flag: Option<&str>) -> String {
        let env = std::env::var(ENDPOINT_ENV).ok();
        self.resolve_endpoint_with(flag, env.as_deref())
    }

    fn resolve_endpoint_with(&self, flag: Option<&str>, env: Option<&str>) -> String {
        [flag, env, self.endpoint.as_deref()]
            .into_iter()
            .flatten()
            .find(|e| !e.trim().is_empty())
            .unwrap_or(DEFAULT_ENDPOINT)
            .to_string()
    }

    pub fn app_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join(APP_DIR))
    }

    fn get_config_path() -> Result<PathBuf> {
        Ok(Self::app_dir()?.join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::new());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            endpoint: Some("http://127.0.0.1:5000/chat".to_string()),
            log_filter: Some("debug".to_string()),
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_endpoint_resolution_order() {
        let config = Config {
            endpoint: Some("http://from-file/chat".to_string()),
            log_filter: None,
        };
        assert_eq!(
            config.resolve_endpoint_with(Some("http://from-flag/chat"), Some("http://from-env/chat")),
            "http://from-flag/chat"
        );
        assert_eq!(
            config.resolve_endpoint_with(None, Some("http://from-env/chat")),
            "http://from-env/chat"
        );
        assert_eq!(config.resolve_endpoint_with(None, None), "http://from-file/chat");
        assert_eq!(Config::new().resolve_endpoint_with(None, None), DEFAULT_ENDPOINT);
    }
}
