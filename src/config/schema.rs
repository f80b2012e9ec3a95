use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::provider::client::DEFAULT_BASE_URL;
use crate::provider::SessionKind;
use crate::scoring::ScoringStrategy;

/// Top-level configuration file.
///
/// Every field has a default, so an empty file (or none at all) is valid.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Seasons offered by the selectors, newest first
    #[serde(default = "default_seasons")]
    pub seasons: Vec<u16>,

    #[serde(default = "default_season")]
    pub default_season: u16,

    #[serde(default)]
    pub strategy: ScoringStrategy,

    #[serde(default)]
    pub session: SessionKind,

    /// Rows shown in the results table
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Response cache location (defaults to the platform cache dir)
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    #[serde(default)]
    pub provider: ProviderConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout, humantime format ("10s", "1m")
    #[serde(default = "default_timeout")]
    pub timeout: String,
}

fn default_seasons() -> Vec<u16> {
    vec![2025, 2024, 2023]
}

fn default_season() -> u16 {
    2025
}

fn default_top_n() -> usize {
    10
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> String {
    "10s".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seasons: default_seasons(),
            default_season: default_season(),
            strategy: ScoringStrategy::default(),
            session: SessionKind::default(),
            top_n: default_top_n(),
            cache_dir: None,
            provider: ProviderConfig::default(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout: default_timeout(),
        }
    }
}

impl ProviderConfig {
    /// Parsed request timeout. Call after validation.
    pub fn timeout_duration(&self) -> anyhow::Result<Duration> {
        humantime::parse_duration(self.timeout.trim())
            .map_err(|e| anyhow::anyhow!("invalid provider.timeout '{}': {}", self.timeout, e))
    }
}
