//! Message participants and pattern matching over them.

use regex::Regex;

use crate::{Error, Result};

/// A message participant: display name, local part and host.
///
/// Any component may be absent, e.g. group syntax in an IMAP envelope or
/// an Exchange recipient without a display name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Address {
    /// Display name.
    pub name: Option<String>,
    /// Mailbox name (local part).
    pub mailbox: Option<String>,
    /// Host name (domain part).
    pub host: Option<String>,
}

impl Address {
    /// Creates an address from its components.
    #[must_use]
    pub fn new(
        name: Option<impl Into<String>>,
        mailbox: Option<impl Into<String>>,
        host: Option<impl Into<String>>,
    ) -> Self {
        Self {
            name: name.map(Into::into),
            mailbox: mailbox.map(Into::into),
            host: host.map(Into::into),
        }
    }

    /// Builds an address from a display name and a plain `local@host` string.
    ///
    /// The string is split at its last `@`. Without any `@` the whole string
    /// becomes the mailbox.
    #[must_use]
    pub fn from_email(name: Option<&str>, email: &str) -> Self {
        let (mailbox, host) = match email.rsplit_once('@') {
            Some((mailbox, host)) => (mailbox.to_string(), Some(host.to_string())),
            None => (email.to_string(), None),
        };
        Self {
            name: name.filter(|n| !n.is_empty()).map(str::to_string),
            mailbox: Some(mailbox),
            host,
        }
    }

    /// Returns the full email address.
    #[must_use]
    pub fn email(&self) -> Option<String> {
        match (&self.mailbox, &self.host) {
            (Some(m), Some(h)) => Some(format!("{m}@{h}")),
            _ => None,
        }
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.name, self.email()) {
            (Some(name), Some(email)) => write!(f, "{name} <{email}>"),
            (None, Some(email)) => write!(f, "{email}"),
            (Some(name), None) => write!(f, "{name}"),
            (None, None) => write!(f, "{}", self.mailbox.as_deref().unwrap_or_default()),
        }
    }
}

/// Matches addresses against per-component regular expressions.
///
/// Each present component is a pattern that must match the whole
/// corresponding subject component. An absent pattern component matches
/// anything. An absent subject component is matched as empty text, so
/// `AddressMatcher::new(Some(".+"), None, None)` rejects participants
/// without a display name.
#[derive(Debug, Clone)]
pub struct AddressMatcher {
    name: Option<Regex>,
    mailbox: Option<Regex>,
    host: Option<Regex>,
}

impl AddressMatcher {
    /// Compiles a matcher.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a pattern is not a valid regex.
    pub fn new(name: Option<&str>, mailbox: Option<&str>, host: Option<&str>) -> Result<Self> {
        Ok(Self {
            name: name.map(anchored).transpose()?,
            mailbox: mailbox.map(anchored).transpose()?,
            host: host.map(anchored).transpose()?,
        })
    }

    /// Compiles a matcher from an [`Address`] whose components are patterns.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a pattern is not a valid regex.
    pub fn from_pattern(pattern: &Address) -> Result<Self> {
        Self::new(
            pattern.name.as_deref(),
            pattern.mailbox.as_deref(),
            pattern.host.as_deref(),
        )
    }

    /// Returns true if `address` matches every present pattern component.
    #[must_use]
    pub fn matches(&self, address: &Address) -> bool {
        component_matches(self.name.as_ref(), address.name.as_deref())
            && component_matches(self.mailbox.as_ref(), address.mailbox.as_deref())
            && component_matches(self.host.as_ref(), address.host.as_deref())
    }

    /// Returns true if any of `addresses` matches.
    pub fn matches_any<'a>(&self, addresses: impl IntoIterator<Item = &'a Address>) -> bool {
        addresses.into_iter().any(|addr| self.matches(addr))
    }
}

fn anchored(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{pattern})$"))
        .map_err(|e| Error::Config(format!("invalid address pattern '{pattern}': {e}")))
}

fn component_matches(pattern: Option<&Regex>, subject: Option<&str>) -> bool {
    pattern.is_none_or(|re| re.is_match(subject.unwrap_or_default()))
}
