//! Application configuration management.
//!
//! This module handles loading and saving application-wide defaults: worker
//! count, the file size ceiling, and the persisted index location. CLI flags
//! override whatever is loaded here. The single engine is configured by
//! these knobs (index persistence on/off, worker count) rather than
//! existing as separate program variants.

use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Default number of parallel deletion workers.
pub const DEFAULT_WORKER_COUNT: usize = 4;

/// Default file size ceiling in bytes. Files above this never enter the
/// engine; it also sizes the per-worker comparison buffers, so raising it
/// costs memory.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 75_000_000;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Number of parallel deletion workers.
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    /// Maximum file size eligible for scanning and comparison, in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// Location of the persisted index. `None` means the platform default.
    #[serde(default)]
    pub index_path: Option<PathBuf>,
}

fn default_worker_count() -> usize {
    DEFAULT_WORKER_COUNT
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

impl Default for Config {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            index_path: None,
        }
    }
}

impl Config {
    /// Load the configuration from the default platform-specific path.
    pub fn load() -> Self {
        match Self::load_internal() {
            Ok(config) => config,
            Err(e) => {
                log::debug!("Failed to load config, using defaults: {}", e);
                Self::default()
            }
        }
    }

    fn load_internal() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save the configuration to the default platform-specific path.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get the default platform-specific configuration path.
    fn config_path() -> Result<PathBuf> {
        let project_dirs = Self::project_dirs()?;
        Ok(project_dirs.config_dir().join("config.json"))
    }

    /// Get the default platform-specific index path.
    pub fn default_index_path() -> Result<PathBuf> {
        let project_dirs = Self::project_dirs()?;
        Ok(project_dirs.data_dir().join("media-index.txt"))
    }

    /// Resolve the configured index path, falling back to the platform
    /// default.
    pub fn resolve_index_path(&self) -> Result<PathBuf> {
        match &self.index_path {
            Some(path) => Ok(path.clone()),
            None => Self::default_index_path(),
        }
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("com", "mediadupe", "mediadupe")
            .ok_or_else(|| anyhow::anyhow!("Failed to determine project directories"))
    }
}
