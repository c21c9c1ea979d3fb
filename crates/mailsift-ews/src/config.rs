//! Adapter options.

use serde::{Deserialize, Serialize};

/// Default number of items per GetItem request.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Options of the Exchange adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EwsOptions {
    /// Items per GetItem request. Zero is treated as one.
    pub batch_size: usize,
}

impl Default for EwsOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl EwsOptions {
    pub(crate) fn chunk_len(&self) -> usize {
        self.batch_size.max(1)
    }
}
