//! Transport timing configuration.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Timing of report writes and the interrupt drain that follows each one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Timeout of a single report write.
    pub write_timeout_ms: u64,
    /// Pause between a write and the drain read.
    pub settle_delay_ms: u64,
    /// Timeout of the drain read.
    pub drain_timeout_ms: u64,
    /// Bytes requested by the drain read.
    pub drain_len: usize,
    /// Whether to drain the interrupt endpoint after every write.
    pub drain: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            write_timeout_ms: 2000,
            settle_delay_ms: 1,
            drain_timeout_ms: 1,
            drain_len: 64,
            drain: true,
        }
    }
}

impl TransportConfig {
    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_millis(self.drain_timeout_ms)
    }

    /// Parse a JSON document; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }
}
