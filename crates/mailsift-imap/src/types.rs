//! IMAP data as delivered by a session.

use std::num::NonZeroU32;

use mailsift_core::{Address, Envelope};

/// Unique identifier of a message within one mailbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ImapUid(pub NonZeroU32);

impl ImapUid {
    /// Creates a new UID.
    ///
    /// Returns `None` if the value is 0.
    #[must_use]
    pub fn new(n: u32) -> Option<Self> {
        NonZeroU32::new(n).map(Self)
    }

    /// Returns the underlying value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

impl std::fmt::Display for ImapUid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// UIDVALIDITY value for a mailbox.
///
/// If this value changes, all previously seen UIDs are invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UidValidity(pub NonZeroU32);

impl UidValidity {
    /// Creates a new UIDVALIDITY.
    #[must_use]
    pub fn new(n: u32) -> Option<Self> {
        NonZeroU32::new(n).map(Self)
    }

    /// Returns the underlying value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

/// Mailbox status from SELECT.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailboxStatus {
    /// Number of messages in the mailbox.
    pub exists: u32,
    /// Next UID to be assigned.
    pub uid_next: Option<ImapUid>,
    /// UIDVALIDITY value.
    pub uid_validity: Option<UidValidity>,
}

/// Mailbox attributes from LIST.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MailboxAttribute {
    /// Mailbox cannot be selected.
    NoSelect,
    /// Mailbox does not exist (RFC 9051).
    NonExistent,
    /// Mailbox has children.
    HasChildren,
    /// Mailbox has no children.
    HasNoChildren,
    /// Any other attribute.
    Unknown(String),
}

impl MailboxAttribute {
    /// Parses a mailbox attribute string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "\\NOSELECT" => Self::NoSelect,
            "\\NONEXISTENT" => Self::NonExistent,
            "\\HASCHILDREN" => Self::HasChildren,
            "\\HASNOCHILDREN" => Self::HasNoChildren,
            _ => Self::Unknown(s.to_string()),
        }
    }

    /// Whether a mailbox carrying this attribute cannot be selected.
    #[must_use]
    pub const fn prevents_selection(&self) -> bool {
        matches!(self, Self::NoSelect | Self::NonExistent)
    }
}

/// One LIST response line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    /// Full mailbox name.
    pub name: String,
    /// Hierarchy delimiter, `None` for a flat namespace.
    pub delimiter: Option<char>,
    /// Mailbox attributes.
    pub attributes: Vec<MailboxAttribute>,
}

impl ListEntry {
    /// Whether the mailbox can be selected.
    #[must_use]
    pub fn is_selectable(&self) -> bool {
        !self
            .attributes
            .iter()
            .any(MailboxAttribute::prevents_selection)
    }
}

/// Email address from an ENVELOPE.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImapAddress {
    /// Display name.
    pub name: Option<String>,
    /// Source route (obsolete).
    pub adl: Option<String>,
    /// Mailbox name (local part).
    pub mailbox: Option<String>,
    /// Host name (domain part).
    pub host: Option<String>,
}

impl ImapAddress {
    /// Group syntax markers have no host.
    #[must_use]
    pub const fn is_group_marker(&self) -> bool {
        self.host.is_none()
    }
}

/// ENVELOPE data item of a FETCH response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImapEnvelope {
    /// Date header.
    pub date: Option<String>,
    /// Subject header.
    pub subject: Option<String>,
    /// From addresses.
    pub from: Vec<ImapAddress>,
    /// Sender addresses.
    pub sender: Vec<ImapAddress>,
    /// Reply-To addresses.
    pub reply_to: Vec<ImapAddress>,
    /// To addresses.
    pub to: Vec<ImapAddress>,
    /// Cc addresses.
    pub cc: Vec<ImapAddress>,
    /// Bcc addresses.
    pub bcc: Vec<ImapAddress>,
    /// In-Reply-To header.
    pub in_reply_to: Option<String>,
    /// Message-ID header.
    pub message_id: Option<String>,
}

/// Direction of a UID STORE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreAction {
    /// `+FLAGS`
    Add,
    /// `-FLAGS`
    Remove,
}

fn addresses(list: Vec<ImapAddress>) -> Vec<Address> {
    list.into_iter()
        .filter(|a| !a.is_group_marker())
        .map(|a| Address {
            name: a.name,
            mailbox: a.mailbox,
            host: a.host,
        })
        .collect()
}

impl From<ImapEnvelope> for Envelope {
    fn from(env: ImapEnvelope) -> Self {
        Self {
            date: env.date.as_deref().and_then(Self::parse_date),
            subject: env.subject,
            message_id: env.message_id,
            in_reply_to: env.in_reply_to,
            from: addresses(env.from),
            sender: addresses(env.sender),
            reply_to: addresses(env.reply_to),
            to: addresses(env.to),
            cc: addresses(env.cc),
            bcc: addresses(env.bcc),
        }
    }
}
