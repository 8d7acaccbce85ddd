//! Configuration for the terminal emulator

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Terminal configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Grid width in columns
    pub columns: u16,
    /// Grid height in rows
    pub rows: u16,
    /// Cell width in pixels, reported to the shell
    pub cell_width_px: u16,
    /// Cell height in pixels, reported to the shell
    pub cell_height_px: u16,
    /// Place raw control bytes into the grid instead of dropping them
    pub display_control_chars: bool,
    /// Shell to spawn
    pub shell: String,
    /// Value of `TERM` in the child
    pub term: String,
    /// Target dispatch cycles per second
    pub frame_rate: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            columns: 80,
            rows: 20,
            cell_width_px: 10,
            cell_height_px: 25,
            display_control_chars: false,
            shell: "/bin/bash".to_string(),
            term: "linux".to_string(),
            frame_rate: 60,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from default location or return default config
    pub fn load_or_default() -> Self {
        let Some(path) = default_config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Reject settings the emulator cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns == 0 || self.rows == 0 {
            return Err(ConfigError::Invalid("grid dimensions must be non-zero"));
        }
        if self.frame_rate == 0 {
            return Err(ConfigError::Invalid("frame_rate must be non-zero"));
        }
        Ok(())
    }
}

/// Path of `~/.config/gridterm/config.json`
pub fn default_config_path() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(|home| {
        PathBuf::from(home)
            .join(".config")
            .join("gridterm")
            .join("config.json")
    })
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}
