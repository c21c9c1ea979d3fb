//! Directory validity watermarks.

use bytes::Bytes;

/// Opaque token summarising a directory's change state.
///
/// Backends decide what goes inside (IMAP packs `UIDVALIDITY`/`UIDNEXT`,
/// Exchange keeps its sync state). Callers only ever compare watermarks for
/// equality. [`Watermark::unseen`] is distinct from every token a backend
/// can produce and always makes [`crate::Remote::dir_validity`] report a
/// change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Watermark(Option<Bytes>);

impl Watermark {
    /// The "not yet seen" sentinel.
    #[must_use]
    pub const fn unseen() -> Self {
        Self(None)
    }

    /// Wraps a backend-defined token.
    #[must_use]
    pub fn new(token: impl Into<Bytes>) -> Self {
        Self(Some(token.into()))
    }

    /// Returns true for the sentinel.
    #[must_use]
    pub const fn is_unseen(&self) -> bool {
        self.0.is_none()
    }

    /// Returns the raw token for the backend that produced it.
    #[must_use]
    pub fn token(&self) -> Option<&[u8]> {
        self.0.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unseen_differs_from_every_token() {
        assert!(Watermark::unseen().is_unseen());
        assert_ne!(Watermark::unseen(), Watermark::new(Bytes::new()));
        assert_ne!(Watermark::unseen(), Watermark::new("1:1"));
    }

    #[test]
    fn equality_is_by_token() {
        assert_eq!(Watermark::new("7:12"), Watermark::new(b"7:12".to_vec()));
        assert_ne!(Watermark::new("7:12"), Watermark::new("7:13"));
        assert_eq!(Watermark::new("abc").token(), Some(&b"abc"[..]));
    }
}
