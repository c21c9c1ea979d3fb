//! Mailbox directories.

use std::sync::Arc;

/// A mailbox folder, identified by its path components.
///
/// `["INBOX", "Work"]` is the `Work` folder below `INBOX`. Equality and
/// hashing are component-wise; the hierarchy delimiter a backend uses on the
/// wire is not part of the value.
///
/// Directories are immutable. Cloning is cheap since the components are
/// shared.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Directory(Arc<[String]>);

impl Directory {
    /// Creates a directory from its path components.
    #[must_use]
    pub fn new<I, S>(components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(components.into_iter().map(Into::into).collect())
    }

    /// The `INBOX` directory.
    #[must_use]
    pub fn inbox() -> Self {
        Self::new(["INBOX"])
    }

    /// Splits a backend folder name on `delimiter`.
    ///
    /// A name without any delimiter yields a single-component directory.
    #[must_use]
    pub fn parse(name: &str, delimiter: char) -> Self {
        Self::new(name.split(delimiter))
    }

    /// Returns the path components.
    #[must_use]
    pub fn components(&self) -> &[String] {
        &self.0
    }

    /// Returns the last path component, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Returns the number of path components.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Joins the components with `delimiter`.
    #[must_use]
    pub fn join(&self, delimiter: char) -> String {
        let mut out = String::new();
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                out.push(delimiter);
            }
            out.push_str(part);
        }
        out
    }

    /// Returns a directory one level below this one.
    #[must_use]
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut parts = self.0.to_vec();
        parts.push(name.into());
        Self(parts.into())
    }
}

impl std::fmt::Display for Directory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.join('/'))
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for Directory {
    fn from(components: [S; N]) -> Self {
        Self::new(components)
    }
}

impl From<Vec<String>> for Directory {
    fn from(components: Vec<String>) -> Self {
        Self(components.into())
    }
}
