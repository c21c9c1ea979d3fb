//! Error types for the Exchange adapter.

use thiserror::Error;

/// Errors reported by an EWS session.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error during network operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A response message with `ResponseClass="Error"`.
    #[error("EWS {code}: {message}")]
    Response {
        /// `ResponseCode`, e.g. `ErrorItemNotFound`.
        code: String,
        /// `MessageText`.
        message: String,
    },

    /// The server answered with something the session could not interpret.
    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl Error {
    /// Creates an error from a failed response message.
    pub fn response(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Response {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for mailsift_core::Error {
    fn from(err: Error) -> Self {
        Self::remote(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_conversion() {
        let err = Error::response(
            "ErrorFolderNotFound",
            "The specified folder could not be found",
        );
        assert_eq!(
            err.to_string(),
            "EWS ErrorFolderNotFound: The specified folder could not be found"
        );
        let core: mailsift_core::Error = err.into();
        assert!(matches!(core, mailsift_core::Error::Remote(_)));
    }
}
