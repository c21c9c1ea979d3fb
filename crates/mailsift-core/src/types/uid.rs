//! Message identifiers.

use std::num::NonZeroU32;
use std::sync::Arc;

use super::Directory;

/// Backend-native part of a [`Uid`].
///
/// IMAP hands out numeric UIDs that are only unique within one folder;
/// Exchange hands out opaque item id strings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LocalId {
    /// Numeric identifier (IMAP UID).
    Number(NonZeroU32),
    /// Opaque textual identifier (Exchange item id).
    Text(Arc<str>),
}

impl LocalId {
    /// Returns the numeric id, if this is one.
    #[must_use]
    pub fn as_number(&self) -> Option<u32> {
        match self {
            Self::Number(n) => Some(n.get()),
            Self::Text(_) => None,
        }
    }

    /// Returns the textual id, if this is one.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Number(_) => None,
            Self::Text(s) => Some(s),
        }
    }
}

impl std::fmt::Display for LocalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Identifier for one message, unique across the whole mailbox.
///
/// Always qualified with the directory the id was minted in, so backends
/// whose native ids are folder-scoped still give mailbox-wide uniqueness.
/// A Uid is only meaningful to the backend session that produced it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Uid {
    directory: Directory,
    local: LocalId,
}

impl Uid {
    /// Creates a directory-qualified identifier.
    #[must_use]
    pub fn new(directory: Directory, local: LocalId) -> Self {
        Self { directory, local }
    }

    /// Creates an identifier from a numeric local id.
    ///
    /// Returns `None` if `n` is 0.
    #[must_use]
    pub fn numeric(directory: Directory, n: u32) -> Option<Self> {
        NonZeroU32::new(n).map(|n| Self::new(directory, LocalId::Number(n)))
    }

    /// Creates an identifier from a textual local id.
    #[must_use]
    pub fn text(directory: Directory, id: impl Into<Arc<str>>) -> Self {
        Self::new(directory, LocalId::Text(id.into()))
    }

    /// The directory this id was minted in.
    #[must_use]
    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// The backend-native part.
    #[must_use]
    pub fn local(&self) -> &LocalId {
        &self.local
    }
}

impl std::fmt::Display for Uid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.directory, self.local)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn numeric_zero_is_rejected() {
        assert!(Uid::numeric(Directory::inbox(), 0).is_none());
        let uid = Uid::numeric(Directory::inbox(), 7).unwrap();
        assert_eq!(uid.local().as_number(), Some(7));
    }

    #[test]
    fn same_local_id_in_other_directory_differs() {
        let a = Uid::numeric(Directory::inbox(), 42).unwrap();
        let b = Uid::numeric(Directory::new(["Archive"]), 42).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn text_ids() {
        let uid = Uid::text(Directory::inbox(), "AAMkAD=");
        assert_eq!(uid.local().as_text(), Some("AAMkAD="));
        assert_eq!(uid.local().as_number(), None);
    }

    #[test]
    fn display() {
        let uid = Uid::numeric(Directory::new(["INBOX", "Work"]), 12).unwrap();
        assert_eq!(uid.to_string(), "INBOX/Work#12");
    }
}
