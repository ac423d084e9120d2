use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use spaced_lib::config::{Config, CONFIG_FILE_NAME};
use spaced_lib::session::SessionEngine;
use spaced_lib::storage::FileGateway;

/// Shared application state for CLI commands
pub struct App {
    pub config: Config,
    pub data_dir: PathBuf,
    pub engine: SessionEngine,
}

impl App {
    /// Resolve configuration and open the engine over the data directory.
    ///
    /// `--data-dir` wins over the config file, which wins over the platform
    /// default.
    pub fn new(data_dir: Option<&Path>, config_path: Option<&Path>) -> Result<Self> {
        let (config, data_dir) = Self::load_config(data_dir, config_path)?;

        let gateway = FileGateway::new(data_dir.clone())
            .with_context(|| format!("Failed to open data directory {}", data_dir.display()))?;
        let engine = SessionEngine::open(Arc::new(gateway), Box::new(config.scheduler()))
            .context("Failed to load saved cards and sessions")?;

        Ok(Self {
            config,
            data_dir,
            engine,
        })
    }

    fn load_config(
        data_dir: Option<&Path>,
        config_path: Option<&Path>,
    ) -> Result<(Config, PathBuf)> {
        let config = match (config_path, data_dir) {
            (Some(path), _) => Config::load(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?,
            (None, Some(dir)) => Config::load(&dir.join(CONFIG_FILE_NAME))
                .context("Failed to read config")?,
            (None, None) => {
                let default_dir = FileGateway::default_data_dir()
                    .context("Failed to get data directory")?;
                Config::load(&default_dir.join(CONFIG_FILE_NAME))
                    .context("Failed to read config")?
            }
        };

        let data_dir = match data_dir {
            Some(dir) => dir.to_path_buf(),
            None => config.data_dir().context("Failed to get data directory")?,
        };
        Ok((config, data_dir))
    }

    /// Session size from the flag, falling back to the config
    pub fn target_size(&self, size: Option<usize>) -> usize {
        size.unwrap_or(self.config.target_size)
    }

    /// Hand the engine over to a lock for use from background tasks
    pub fn into_shared(self) -> (Config, PathBuf, spaced_lib::SharedEngine) {
        (self.config, self.data_dir, self.engine.into_shared())
    }
}
