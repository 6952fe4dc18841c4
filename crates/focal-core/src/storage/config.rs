//! TOML-based application configuration.
//!
//! Stored at `~/.config/focal/config.toml`. Every field has a serde default
//! so files written by older versions keep loading as the set grows.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Target duration preselected when starting a timer, in seconds.
    #[serde(default = "default_timer_seconds")]
    pub default_timer_seconds: i64,
    /// Prolong shortcuts offered on the timer screen, in minutes.
    #[serde(default = "default_prolong_hint_minutes")]
    pub prolong_hint_minutes: Vec<i64>,
}

fn default_timer_seconds() -> i64 {
    25 * 60
}

fn default_prolong_hint_minutes() -> Vec<i64> {
    vec![5, 15, 30, 60]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_timer_seconds: default_timer_seconds(),
            prolong_hint_minutes: default_prolong_hint_minutes(),
        }
    }
}

impl Config {
    pub fn config_path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load the configuration, falling back to defaults when no file exists.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path)?;
        toml::from_str(&raw).map_err(|err| {
            ConfigError::LoadFailed {
                path,
                message: err.to_string(),
            }
            .into()
        })
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        let raw = toml::to_string_pretty(self).map_err(|err| ConfigError::SaveFailed {
            path: path.clone(),
            message: err.to_string(),
        })?;
        std::fs::write(&path, raw)?;
        Ok(())
    }
}
