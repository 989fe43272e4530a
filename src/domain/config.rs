//! # Configuration
//!
//! Manages the loading and parsing of the bot's configuration file (`config.yaml`).
//! Defines the structs for the Matrix connection, bot behaviour and log output.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::domain::types::Credentials;

pub const DEFAULT_CONFIG_PATH: &str = "data/config.yaml";

/// Main application configuration structure.
/// Matches the layout of `data/config.yaml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub services: ServicesConfig,
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Reads and parses the YAML file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse YAML")
    }
}

/// Configuration for the connected chat services.
#[derive(Debug, Deserialize, Clone)]
pub struct ServicesConfig {
    pub matrix: MatrixConfig,
}

/// Specific configuration for the Matrix service.
#[derive(Debug, Deserialize, Clone)]
pub struct MatrixConfig {
    pub homeserver: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl MatrixConfig {
    pub fn credentials(&self) -> Credentials {
        Credentials {
            homeserver: self.homeserver.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

/// Behaviour switches. Fixed for the lifetime of the process.
#[derive(Debug, Deserialize, Clone)]
pub struct BotConfig {
    /// When false, replies are computed and logged but never sent.
    #[serde(default = "default_true")]
    pub auto_reply_enabled: bool,
    #[serde(default = "default_true")]
    pub auto_join_invites: bool,
    /// Drop messages that were sent before the bot started listening.
    #[serde(default = "default_true")]
    pub skip_backlog: bool,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            auto_reply_enabled: true,
            auto_join_invites: true,
            skip_backlog: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_directory")]
    pub directory: String,
    #[serde(default = "default_log_file")]
    pub file: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_log_directory(),
            file: default_log_file(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_log_directory() -> String {
    "data".to_string()
}

fn default_log_file() -> String {
    "session.log".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL: &str = "
services:
  matrix:
    homeserver: https://matrix.example.org
    username: menubot
    password: hunter2
";

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = AppConfig::parse(MINIMAL).unwrap();
        assert_eq!(config.services.matrix.username, "menubot");
        assert!(config.services.matrix.display_name.is_none());
        assert!(config.bot.auto_reply_enabled);
        assert!(config.bot.auto_join_invites);
        assert!(config.bot.skip_backlog);
        assert_eq!(config.logging.directory, "data");
        assert_eq!(config.logging.file, "session.log");
    }

    #[test]
    fn test_bot_section_overrides() {
        let yaml = format!("{MINIMAL}bot:\n  auto_reply_enabled: false\n  skip_backlog: false\n");
        let config = AppConfig::parse(&yaml).unwrap();
        assert!(!config.bot.auto_reply_enabled);
        assert!(!config.bot.skip_backlog);
        assert!(config.bot.auto_join_invites);
    }

    #[test]
    fn test_missing_matrix_section_is_an_error() {
        assert!(AppConfig::parse("bot:\n  auto_reply_enabled: true\n").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();

        let config = AppConfig::load(&path).unwrap();
        let credentials = config.services.matrix.credentials();
        assert_eq!(credentials.homeserver, "https://matrix.example.org");
        assert_eq!(credentials.password, "hunter2");
    }

    #[test]
    fn test_load_missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");
        let err = AppConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("absent.yaml"));
    }
}
