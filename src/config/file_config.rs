//! Configuration file support for tome-harvest.
//!
//! # Configuration File Format
//!
//! ```toml
//! [http]
//! user_agent = "tome-harvest/0.1.0"
//! request_timeout_secs = 30
//! call_deadline_secs = 120
//!
//! [providers.kodansha]
//! enabled = true
//! fetch_series_covers = true
//! fetch_book_covers = false
//!
//! [providers.kodansha.rate_limit]
//! permits_per_period = 10
//! period_ms = 1000
//! admission_timeout_ms = 5000
//!
//! [providers.kodansha.retry]
//! max_attempts = 3
//! initial_delay_ms = 500
//! retry_on_status = [429, 500, 502, 503, 504]
//!
//! [providers.nautiljon]
//! enabled = true
//!
//! [matching]
//! mode = "close"
//! threshold = 0.9
//! ```

use std::path::{Path, PathBuf};

use super::{load_config, Config};

/// Standard location of the config file, if the platform has one
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tome-harvest").join("config.toml"))
}

/// Resolve the config file to use: an explicit path wins, otherwise the
/// standard location if a file exists there
pub fn find_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => default_config_path().filter(|path| path.is_file()),
    }
}

/// Reading and writing a config file on disk
#[derive(Debug)]
pub struct ConfigFile;

impl ConfigFile {
    /// Load configuration from a TOML file, applying environment overrides
    pub fn load(path: &Path) -> Result<Config, ConfigFileError> {
        if !path.is_file() {
            return Err(ConfigFileError::Io(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        load_config(path).map_err(|e| ConfigFileError::Parse(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories
    pub fn save(config: &Config, path: &Path) -> Result<(), ConfigFileError> {
        let content =
            toml::to_string_pretty(config).map_err(|e| ConfigFileError::Serialize(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigFileError::Io(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| ConfigFileError::Io(e.to_string()))
    }
}

/// Configuration file errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialize error: {0}")]
    Serialize(String),
}
