//! Configuration loaded from `config.toml`
//!
//! Every field has a default, so a missing file or a partial file is fine:
//!
//! ```toml
//! target_size = 10
//! data_dir = "/home/me/.local/share/spaced"
//!
//! [bootstrap]
//! url = "https://example.com/assets/cards.json"
//! timeout_secs = 2
//!
//! [scheduler]
//! learning_step_minutes = 10
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::flashcards::Sm2Scheduler;
use crate::storage::{FileGateway, StorageError};

pub const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of cards drawn into a new session
    pub target_size: usize,
    /// Where the persisted blobs live (defaults to the platform data dir)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    pub bootstrap: BootstrapConfig,
    pub scheduler: SchedulerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_size: 10,
            data_dir: None,
            bootstrap: BootstrapConfig::default(),
            scheduler: SchedulerConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Endpoint serving the initial card list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Delay before a card rated Again comes back
    pub learning_step_minutes: i64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            learning_step_minutes: 10,
        }
    }
}

impl Config {
    /// Load from a file; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.target_size == 0 {
            return Err(ConfigError::Invalid("target_size must be at least 1".to_string()));
        }
        if self.bootstrap.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "bootstrap.timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.scheduler.learning_step_minutes < 1 {
            return Err(ConfigError::Invalid(
                "scheduler.learning_step_minutes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve the data directory, falling back to the platform default
    pub fn data_dir(&self) -> Result<PathBuf, StorageError> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => FileGateway::default_data_dir(),
        }
    }

    pub fn bootstrap_timeout(&self) -> Duration {
        Duration::from_secs(self.bootstrap.timeout_secs)
    }

    pub fn scheduler(&self) -> Sm2Scheduler {
        Sm2Scheduler::new(chrono::Duration::minutes(
            self.scheduler.learning_step_minutes,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load(&temp_dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.target_size, 10);
        assert_eq!(config.bootstrap_timeout(), Duration::from_secs(2));
    }

    #[test]
    fn test_partial_file() {
        let config = Config::from_toml_str(
            r#"
            target_size = 25

            [bootstrap]
            url = "http://localhost:8080/assets/cards.json"
            "#,
        )
        .unwrap();
        assert_eq!(config.target_size, 25);
        assert_eq!(
            config.bootstrap.url.as_deref(),
            Some("http://localhost:8080/assets/cards.json")
        );
        assert_eq!(config.bootstrap.timeout_secs, 2);
        assert_eq!(config.scheduler.learning_step_minutes, 10);
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "data_dir = \"/tmp/spaced\"\n[scheduler]\nlearning_step_minutes = 1\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.data_dir().unwrap(), PathBuf::from("/tmp/spaced"));
        assert_eq!(config.scheduler.learning_step_minutes, 1);
    }

    #[test]
    fn test_rejects_zero_target() {
        assert!(matches!(
            Config::from_toml_str("target_size = 0"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_rejects_unknown_types() {
        assert!(matches!(
            Config::from_toml_str("target_size = \"ten\""),
            Err(ConfigError::Toml(_))
        ));
    }
}
