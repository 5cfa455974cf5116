//! User settings loaded from `config.yaml` in the config directory.
//!
//! Every field has a default, so a missing file or a partial file is fine.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::payload::JsonStyle;

pub const CONFIG_FILE: &str = "config.yaml";


#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Initial contents of the baud rate field.
    pub baud_rate: u32,
    /// Serial read timeout.
    pub read_timeout_ms: u64,
    /// Interval between receive polls while the port is open.
    pub poll_interval_ms: u64,
    /// Separator style of the sent JSON.
    pub json_style: JsonStyle,
    /// Receive log cap in bytes; 0 keeps everything.
    pub receive_log_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            baud_rate: 115_200,
            read_timeout_ms: 100,
            poll_interval_ms: 200,
            json_style: JsonStyle::Compact,
            receive_log_limit: 64 * 1024,
        }
    }
}

impl Settings {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}


/// Path of the settings file inside `config_dir`.
pub fn config_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE)
}


/// Load settings from `config_dir`, falling back to defaults when the file
/// does not exist.
pub fn load(config_dir: &Path) -> Result<Settings, ConfigError> {
    let path = config_path(config_dir);
    match std::fs::read_to_string(&path) {
        Ok(content) => parse(&content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Settings::default()),
        Err(error) => Err(ConfigError::Io { path, error }),
    }
}


/// Parse settings from a YAML string. An empty document yields defaults.
pub fn parse(content: &str) -> Result<Settings, ConfigError> {
    if content.trim().is_empty() {
        return Ok(Settings::default());
    }
    let settings: Settings =
        serde_yaml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
    if settings.poll_interval_ms == 0 {
        return Err(ConfigError::Parse("poll_interval_ms must be positive".into()));
    }
    Ok(settings)
}
