//! Configuration file handling

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use super::paths::{config_override, config_path};
use super::Result;

/// Built-in local development address (`hugo server` default)
pub const DEFAULT_LOCAL_URL: &str = "http://localhost:1313/";

/// Main configuration structure
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    /// Target site settings
    #[serde(default)]
    pub target: TargetSettings,

    /// Timeout settings
    #[serde(default)]
    pub timeouts: Timeouts,
}

/// Target site settings
#[derive(Debug, Deserialize, Clone)]
pub struct TargetSettings {
    /// URL used when neither `--url` nor `URL` is given
    #[serde(default = "default_url")]
    pub default_url: String,

    /// The local development URL; any other target counts as production
    #[serde(default = "default_url")]
    pub local_url: String,
}

impl Default for TargetSettings {
    fn default() -> Self {
        Self {
            default_url: default_url(),
            local_url: default_url(),
        }
    }
}

fn default_url() -> String {
    DEFAULT_LOCAL_URL.to_string()
}

/// Timeout settings
#[derive(Debug, Deserialize, Clone)]
pub struct Timeouts {
    /// Timeout for a single page load, in seconds
    #[serde(default = "default_page_load")]
    pub page_load_secs: u64,

    /// How long element lookups keep polling, in seconds
    #[serde(default = "default_element")]
    pub element_secs: u64,

    /// Delay between element lookup attempts, in milliseconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            page_load_secs: default_page_load(),
            element_secs: default_element(),
            poll_interval_ms: default_poll_interval(),
        }
    }
}

fn default_page_load() -> u64 {
    30
}
fn default_element() -> u64 {
    4
}
fn default_poll_interval() -> u64 {
    100
}

impl Timeouts {
    pub fn page_load(&self) -> Duration {
        Duration::from_secs(self.page_load_secs)
    }

    pub fn element(&self) -> Duration {
        Duration::from_secs(self.element_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

impl Config {
    /// Load configuration from `SITE_CHECKS_CONFIG` or the platform config file
    ///
    /// An explicit `SITE_CHECKS_CONFIG` must exist. A missing platform config
    /// file yields the default configuration.
    pub fn load() -> Result<Self> {
        if let Some(path) = config_override() {
            return Self::load_from(&path);
        }
        match config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| super::Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| super::Error::ConfigParse(e.to_string()))
    }
}
