//! Error types for the core library.

use thiserror::Error;

use crate::types::{Directory, Flags, Uid};

/// Errors that can occur while evaluating rules.
#[derive(Debug, Error)]
pub enum Error {
    /// `ChangeFlags` was given overlapping add and remove sets.
    #[error("set and clear flags must not intersect: {0}")]
    AmbiguousFlags(Flags),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// An action failed for the message it was applied to.
    #[error("Action {action} failed: {reason}")]
    Action {
        /// Name of the failing action.
        action: String,
        /// What went wrong.
        reason: String,
    },

    /// The backend has no such directory.
    #[error("Unknown directory: {0}")]
    UnknownDirectory(Directory),

    /// The backend has no such message.
    #[error("Unknown message: {0}")]
    UnknownMessage(Uid),

    /// The Uid was not minted by this backend.
    #[error("Uid not issued by this backend: {0}")]
    ForeignUid(Uid),

    /// Backend operation failed.
    #[error("Remote error: {0}")]
    Remote(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wraps a backend error.
    pub fn remote(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Remote(err.into())
    }

    /// Creates an action failure.
    pub fn action(action: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Action {
            action: action.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if the error only concerns the message being processed.
    ///
    /// Such errors end that message's pipeline; the scan carries on with the
    /// next message. Everything else aborts the scheduler run.
    #[must_use]
    pub const fn is_message_scoped(&self) -> bool {
        matches!(self, Self::Action { .. } | Self::UnknownMessage(_))
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
