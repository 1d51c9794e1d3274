//! tablegrab configuration
//!
//! Stored as TOML. Every field is optional on disk and falls back to the
//! platform defaults below.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::CoreError;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite file holding persisted capture sessions
    pub database_path: PathBuf,
    /// Where exported CSV files are written
    pub download_dir: PathBuf,
    /// Delay unit between files of a bulk export, in milliseconds
    pub export_stagger_ms: u64,
}

impl Config {
    pub fn new(data_dir: PathBuf) -> Self {
        let download_dir = dirs::download_dir().unwrap_or_else(|| data_dir.join("Downloads"));

        Self {
            database_path: data_dir.join("tablegrab.db"),
            download_dir,
            export_stagger_ms: 100,
        }
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|d| d.join("tablegrab"))
            .unwrap_or_else(|| PathBuf::from(".tablegrab"))
    }

    /// Default location of the config file
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("tablegrab").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".tablegrab/config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text)
            .map_err(|e| CoreError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Like [`load`](Self::load), but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }

    pub fn export_stagger(&self) -> Duration {
        Duration::from_millis(self.export_stagger_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::data_dir())
    }
}
