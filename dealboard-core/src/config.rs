//! Serializable dashboard configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Dashboard configuration, loaded from TOML.
///
/// Defaults mirror the production spreadsheet layout, so an empty file (or
/// no file at all) is a valid configuration apart from the spreadsheet key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    /// Spreadsheet to open, by key.
    pub spreadsheet_key: String,

    /// Worksheet names within the spreadsheet.
    pub worksheets: Worksheets,

    /// Cell window of the stage reference table (headerless, id + name).
    pub stage_range: String,

    /// Retry behavior on rate limits.
    pub retry: RetrySettings,

    /// How long a fetched table set stays fresh, in seconds.
    pub cache_ttl_secs: u64,

    /// First month of the fiscal year (4 = April).
    pub fiscal_start_month: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Worksheets {
    pub deals: String,
    pub stages: String,
    pub users: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub delay_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            spreadsheet_key: String::new(),
            worksheets: Worksheets::default(),
            stage_range: "A2:B12".to_string(),
            retry: RetrySettings::default(),
            cache_ttl_secs: 300,
            fiscal_start_month: 4,
        }
    }
}

impl Default for Worksheets {
    fn default() -> Self {
        Self {
            deals: "Deals".to_string(),
            stages: "OtherParams".to_string(),
            users: "Users".to_string(),
        }
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_secs: 5,
        }
    }
}

impl RetrySettings {
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }
}

impl DashboardConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(ConfigError::Parse)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.display().to_string(), e))?;
        Self::from_toml_str(&text)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {0}: {1}")]
    Io(String, #[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}
