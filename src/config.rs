use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::utils;

/// Scrape settings. Every field has a default, so the config file is
/// optional and may be partial.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Legacy-backfill wart: when true, `backfill` may substitute a
    /// synthetic near-future date for stored events with no date. Never
    /// affects scraping itself.
    pub allow_synthetic_dates: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            user_agent: "EnergyEvents/0.1 (+https://github.com/energy-events/energy-events)"
                .to_string(),
            timeout_secs: 10,
            allow_synthetic_dates: false,
        }
    }
}

impl AppConfig {
    pub fn load() -> Self {
        let path = utils::config_path();
        match read_config(&path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = ?path, error = %err, "unreadable config, using defaults");
                Self::default()
            }
        }
    }
}

fn read_config(path: &Path) -> Result<AppConfig, String> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents = fs::read_to_string(path).map_err(|err| err.to_string())?;
    serde_json::from_str(&contents).map_err(|err| err.to_string())
}
