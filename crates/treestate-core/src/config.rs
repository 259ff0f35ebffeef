//! Engine configuration.
//!
//! Everything has a sensible default; applications typically construct
//! `EngineConfig::default()` or deserialize a `[sync]` table from their
//! own TOML configuration.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Result;

/// Tunables for the synchronization engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Quiet period for the change debounce, in milliseconds.
    pub quiet_period_ms: u64,

    /// Exclusion globs for the filesystem watch (gitignore syntax).
    pub ignore_globs: Vec<String>,

    /// Per-subscriber event buffer; a lagging subscriber loses the oldest
    /// buffered events first.
    pub event_buffer: usize,

    /// Cap on commits returned by log queries; `None` means full history.
    pub log_limit: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            quiet_period_ms: 300,
            ignore_globs: vec![
                ".*".to_string(),
                ".git/".to_string(),
                "node_modules/".to_string(),
            ],
            event_buffer: 16,
            log_limit: None,
        }
    }
}

impl EngineConfig {
    /// The debounce quiet period as a [`Duration`].
    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.quiet_period_ms.max(1))
    }

    /// Parse a TOML document into a config; absent keys keep defaults.
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        Ok(toml::from_str(toml)?)
    }

    /// Load a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        Self::from_toml_str(&fs::read_to_string(path)?)
    }
}
