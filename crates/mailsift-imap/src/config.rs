//! Adapter options.

use serde::{Deserialize, Serialize};

/// Options of the IMAP adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImapOptions {
    /// Hierarchy delimiter used until LIST reported the server's own.
    pub default_delimiter: char,
}

impl Default for ImapOptions {
    fn default() -> Self {
        Self {
            default_delimiter: '/',
        }
    }
}
