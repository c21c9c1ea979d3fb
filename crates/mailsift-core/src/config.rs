//! Poll loop configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Result;

/// Default seconds between passes.
pub const DEFAULT_INTERVAL_SECS: u64 = 5;

/// Timing and budget of a scheduler run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Seconds to wait between passes.
    pub interval_secs: u64,
    /// Number of passes to run; `None` runs until cancelled.
    pub max_iterations: Option<u64>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_INTERVAL_SECS,
            max_iterations: None,
        }
    }
}

impl PollConfig {
    /// Parses a JSON document; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Serde`] for malformed input.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Runs exactly `n` passes.
    #[must_use]
    pub const fn with_max_iterations(mut self, n: u64) -> Self {
        self.max_iterations = Some(n);
        self
    }

    /// The wait between passes.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}
