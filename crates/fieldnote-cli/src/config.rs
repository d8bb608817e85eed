//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// CLI configuration, stored as TOML under `~/.fieldnote/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the SQLite database file
    #[serde(default = "default_database")]
    pub database: PathBuf,

    /// User id engine sessions are keyed by
    #[serde(default = "default_user")]
    pub user_id: String,

    /// Directory for plain-text exports
    #[serde(default = "default_txt_dir")]
    pub txt_dir: PathBuf,

    /// Directory for PDF exports
    #[serde(default = "default_pdf_dir")]
    pub pdf_dir: PathBuf,

    /// Seconds a queued request may wait before eviction
    #[serde(default = "default_timeout_secs")]
    pub queue_timeout_secs: u64,

    /// Seconds between queue position polls
    #[serde(default = "default_poll_secs")]
    pub queue_poll_secs: u64,
}

impl Config {
    /// Get the configuration file path.
    pub fn path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".fieldnote").join("config.toml"))
    }

    /// Load configuration from file or create default.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;

        if path.exists() {
            let contents = fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file.
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(&path, contents)?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            user_id: default_user(),
            txt_dir: default_txt_dir(),
            pdf_dir: default_pdf_dir(),
            queue_timeout_secs: default_timeout_secs(),
            queue_poll_secs: default_poll_secs(),
        }
    }
}

fn default_database() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".fieldnote").join("notes.db"))
        .unwrap_or_else(|| PathBuf::from("notes.db"))
}

fn default_user() -> String {
    "default".to_string()
}

fn default_txt_dir() -> PathBuf {
    PathBuf::from("notes_txt")
}

fn default_pdf_dir() -> PathBuf {
    PathBuf::from("notes_pdf")
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_poll_secs() -> u64 {
    2
}
