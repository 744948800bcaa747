//! Configuration management for TutorHub

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::discovery::DEFAULT_PAGE_SIZE;

/// Environment variable overriding the stored remote API key
pub const API_KEY_ENV: &str = "TUTORHUB_API_KEY";

/// Where catalog and progress data live
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Backend {
    /// JSON files on this machine
    Local {
        /// Data directory (platform data dir when unset)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data_dir: Option<PathBuf>,
    },
    /// Hosted REST backend
    Remote {
        /// Project URL
        url: String,
        /// Public API key
        #[serde(default, skip_serializing_if = "Option::is_none")]
        api_key: Option<String>,
        /// Access token of the signed-in user
        #[serde(default, skip_serializing_if = "Option::is_none")]
        access_token: Option<String>,
    },
}

impl Default for Backend {
    fn default() -> Self {
        Backend::Local { data_dir: None }
    }
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Tutorials per listing page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Signed-in user (if any)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Storage backend
    #[serde(default)]
    pub backend: Backend,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for Config {
    fn default() -> Self {
        Self { page_size: DEFAULT_PAGE_SIZE, user_id: None, backend: Backend::default() }
    }
}

impl Config {
    /// Load configuration from disk, or create default if not exists
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from a specific file, creating it with defaults if missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {:?}", path))?;
            serde_json::from_str(&contents).with_context(|| "Failed to parse config.json")
        } else {
            let config = Self::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let contents =
            serde_json::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config to {:?}", path))?;

        Ok(())
    }

    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let proj_dirs =
            ProjectDirs::from("", "", "tutorhub").context("Failed to determine config directory")?;
        Ok(proj_dirs.config_dir().join("config.json"))
    }

    /// Get the default data directory path
    pub fn data_dir() -> Result<PathBuf> {
        let proj_dirs =
            ProjectDirs::from("", "", "tutorhub").context("Failed to determine data directory")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    /// Data directory for the local backend
    pub fn local_data_dir(&self) -> Result<PathBuf> {
        match &self.backend {
            Backend::Local { data_dir: Some(dir) } => Ok(dir.clone()),
            _ => Self::data_dir(),
        }
    }

    /// API key for the remote backend, preferring the environment
    pub fn remote_api_key(&self) -> Option<String> {
        std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty()).or_else(|| match &self.backend {
            Backend::Remote { api_key, .. } => api_key.clone(),
            Backend::Local { .. } => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_uses_local_backend() {
        let config = Config::default();
        assert_eq!(config.backend, Backend::Local { data_dir: None });
        assert_eq!(config.page_size, 6);
        assert!(config.user_id.is_none());
    }

    #[test]
    fn config_serializes_backend_kind() {
        let config = Config {
            backend: Backend::Remote {
                url: "https://example.co".into(),
                api_key: None,
                access_token: None,
            },
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains(r#""kind":"remote""#));
        assert!(!json.contains("api_key"));
    }

    #[test]
    fn config_deserializes_with_missing_fields() {
        let json = r#"{"user_id":"alice"}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.user_id.as_deref(), Some("alice"));
        assert_eq!(config.page_size, 6);
        assert_eq!(config.backend, Backend::default());
    }

    #[test]
    fn load_from_creates_default_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        let config = Config {
            page_size: 12,
            user_id: Some("bob".into()),
            backend: Backend::Local { data_dir: Some(dir.path().join("data")) },
        };
        config.save_to(&path).unwrap();

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded, config);
        assert_eq!(reloaded.local_data_dir().unwrap(), dir.path().join("data"));
    }
}
