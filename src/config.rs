use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Environment variable that overrides the configured API base URI
pub const API_BASE_URI_ENV: &str = "LIBRARIUM_API_BASE_URI";

const DEFAULT_API_BASE_URI: &str = "http://localhost:8080";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_uri: String,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_uri: DEFAULT_API_BASE_URI.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl AppConfig {
    /// Get the path to the config file in the user's home directory
    pub fn config_path() -> Result<PathBuf> {
        let home_dir =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Could not find home directory"))?;

        Ok(home_dir.join(".librarium").join("config.json"))
    }

    /// Load the user's configuration and apply the environment override
    pub fn load() -> Result<Self> {
        let config = Self::load_from(&Self::config_path()?)?;
        Ok(config.with_base_uri_override(std::env::var(API_BASE_URI_ENV).ok()))
    }

    /// Load configuration from `path`, writing the default there if the file doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)?;
            let config: AppConfig = serde_json::from_str(&contents)
                .map_err(|e| anyhow::anyhow!("Failed to parse config file: {}", e))?;
            Ok(config)
        } else {
            let default_config = AppConfig::default();
            default_config.save_to(path)?;
            log::info!("Wrote default configuration to {}", path.display());
            Ok(default_config)
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    pub fn with_base_uri_override(mut self, base_uri: Option<String>) -> Self {
        if let Some(uri) = base_uri.filter(|uri| !uri.trim().is_empty()) {
            log::info!("API base URI overridden by {}: {}", API_BASE_URI_ENV, uri);
            self.api_base_uri = uri;
        }
        self
    }

    pub fn api_base_url(&self) -> Result<Url> {
        Url::parse(self.api_base_uri.trim())
            .map_err(|e| anyhow::anyhow!("Invalid API base URI '{}': {}", self.api_base_uri, e))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_writes_default_when_missing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(path.exists());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        let config = AppConfig {
            api_base_uri: "https://books.example.com/api".to_string(),
            request_timeout_secs: 5,
        };
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"api_base_uri": "http://10.0.0.2:3000"}"#).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.api_base_uri, "http://10.0.0.2:3000");
        assert_eq!(loaded.request_timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(AppConfig::load_from(&path).is_err());
    }

    #[test]
    fn test_base_uri_override() {
        let config = AppConfig::default()
            .with_base_uri_override(Some("http://override:9000".to_string()));
        assert_eq!(config.api_base_uri, "http://override:9000");

        let config = AppConfig::default().with_base_uri_override(Some("  ".to_string()));
        assert_eq!(config.api_base_uri, DEFAULT_API_BASE_URI);

        let config = AppConfig::default().with_base_uri_override(None);
        assert_eq!(config.api_base_uri, DEFAULT_API_BASE_URI);
    }

    #[test]
    fn test_api_base_url_validation() {
        assert!(AppConfig::default().api_base_url().is_ok());

        let bad = AppConfig {
            api_base_uri: "not a url".to_string(),
            ..AppConfig::default()
        };
        assert!(bad.api_base_url().is_err());
    }
}
