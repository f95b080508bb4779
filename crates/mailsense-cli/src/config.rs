//! TOML configuration with environment overrides
//!
//! Lives at `~/.mailsense/config.toml`; every key is optional and defaults
//! to a local single-user setup.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llama3.1:8b";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8787;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Model retried once when the primary fails; when equal to `model`
    /// only a single attempt is made
    #[serde(default = "default_model")]
    pub fallback_model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_db_path() -> String {
    "~/.mailsense/analysis.db".to_string()
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            fallback_model: default_model(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { db_path: default_db_path() }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Per-user config directory, `~/.mailsense`
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".mailsense")
}

/// Expand a leading `~/` against the home directory
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

impl Config {
    /// Load from `path` (or the default location), then apply environment
    /// overrides. A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => config_dir().join("config.toml"),
        };

        let mut config = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config at {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config at {}", path.display()))?
        } else {
            Config::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(base_url) = std::env::var("MAILSENSE_BASE_URL") {
            self.model.base_url = base_url;
        }
        if let Ok(model) = std::env::var("MAILSENSE_MODEL") {
            self.model.model = model;
        }
        if let Ok(db) = std::env::var("MAILSENSE_DB") {
            self.storage.db_path = db;
        }
        if let Ok(port) = std::env::var("MAILSENSE_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
    }

    /// Database path with tilde expansion applied
    pub fn db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.model.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.model.model, DEFAULT_MODEL);
        assert_eq!(config.model.fallback_model, DEFAULT_MODEL);
        assert_eq!(config.storage.db_path, "~/.mailsense/analysis.db");
        assert_eq!(config.server.host, DEFAULT_HOST);
        assert_eq!(config.server.port, DEFAULT_PORT);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            "[model]\nmodel = \"qwen2.5:7b\"\n\n[server]\nport = 9000\n",
        )
        .unwrap();
        assert_eq!(config.model.model, "qwen2.5:7b");
        assert_eq!(config.model.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.model.fallback_model, DEFAULT_MODEL);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, DEFAULT_HOST);
    }

    #[test]
    fn test_empty_toml_is_all_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.model.model, Config::default().model.model);
    }

    #[test]
    fn test_expand_tilde() {
        let expanded = expand_tilde("~/.mailsense/analysis.db");
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.ends_with(".mailsense/analysis.db"));

        assert_eq!(expand_tilde("/tmp/a.db"), PathBuf::from("/tmp/a.db"));
    }
}
