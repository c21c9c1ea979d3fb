//! Exchange Web Services data as delivered by a session.

use chrono::{DateTime, Utc};
use mailsift_core::{Address, Envelope, Flag, Flags};

/// Exchange item id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ItemId(pub String);

impl ItemId {
    /// Creates an item id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A `Mailbox` element: display name and SMTP address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EwsMailbox {
    /// Display name.
    pub name: Option<String>,
    /// SMTP address.
    pub email_address: Option<String>,
}

impl EwsMailbox {
    /// Creates a mailbox element.
    #[must_use]
    pub fn new(name: Option<&str>, email_address: &str) -> Self {
        Self {
            name: name.map(str::to_string),
            email_address: Some(email_address.to_string()),
        }
    }

    fn to_address(&self) -> Option<Address> {
        self.email_address
            .as_deref()
            .map(|email| Address::from_email(self.name.as_deref(), email))
    }
}

/// A message item from GetItem.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Item {
    /// Item id.
    pub id: ItemId,
    /// `DateTimeReceived`.
    pub datetime_received: Option<DateTime<Utc>>,
    /// Subject.
    pub subject: Option<String>,
    /// `From`.
    pub author: Option<EwsMailbox>,
    /// `Sender`.
    pub sender: Option<EwsMailbox>,
    /// `ReplyTo`.
    pub reply_to: Vec<EwsMailbox>,
    /// `ToRecipients`.
    pub to: Vec<EwsMailbox>,
    /// `CcRecipients`.
    pub cc: Vec<EwsMailbox>,
    /// `BccRecipients`.
    pub bcc: Vec<EwsMailbox>,
    /// `InReplyTo`.
    pub in_reply_to: Option<String>,
    /// `InternetMessageId`.
    pub message_id: Option<String>,
    /// `IsRead`.
    pub is_read: bool,
    /// `Categories`.
    pub categories: Vec<String>,
}

impl Item {
    /// The item's state as flags: categories plus `\Seen` when read.
    ///
    /// Read state comes from `IsRead` alone. A category spelled like the
    /// seen flag stays a keyword.
    #[must_use]
    pub fn flags(&self) -> Flags {
        let mut flags: Flags = self.categories.iter().map(|c| category_flag(c)).collect();
        if self.is_read {
            flags.insert(Flag::Seen);
        }
        flags
    }

    /// The header summary of the item.
    #[must_use]
    pub fn envelope(&self) -> Envelope {
        Envelope {
            date: self.datetime_received,
            subject: self.subject.clone(),
            message_id: self.message_id.clone(),
            in_reply_to: self.in_reply_to.clone(),
            from: addresses(self.author.as_slice()),
            sender: addresses(self.sender.as_slice()),
            reply_to: addresses(&self.reply_to),
            to: addresses(&self.to),
            cc: addresses(&self.cc),
            bcc: addresses(&self.bcc),
        }
    }
}

fn addresses(list: &[EwsMailbox]) -> Vec<Address> {
    list.iter().filter_map(EwsMailbox::to_address).collect()
}

fn category_flag(category: &str) -> Flag {
    match Flag::parse(category) {
        Flag::Seen => Flag::keyword(category),
        flag => flag,
    }
}

/// Result of SyncFolderItems.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncResult {
    /// Number of create, update, delete and read-flag changes reported.
    pub changes: usize,
    /// State to pass to the next sync.
    pub sync_state: String,
}

/// Field changes of an UpdateItem call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemUpdate {
    /// New `IsRead` value.
    pub is_read: Option<bool>,
    /// New `Categories` value.
    pub categories: Option<Vec<String>>,
}

impl ItemUpdate {
    /// The update that turns `current` into `desired`, `None` if they agree.
    ///
    /// `\Seen` maps onto `IsRead` and never becomes a category.
    #[must_use]
    pub fn between(current: &Flags, desired: &Flags) -> Option<Self> {
        let is_read = (current.is_seen() != desired.is_seen()).then_some(desired.is_seen());
        let names = |flags: &Flags| -> Vec<String> {
            flags
                .iter()
                .filter(|f| **f != Flag::Seen)
                .map(|f| f.as_str().to_string())
                .collect()
        };
        let wanted = names(desired);
        let categories = (names(current) != wanted).then_some(wanted);

        if is_read.is_none() && categories.is_none() {
            None
        } else {
            Some(Self {
                is_read,
                categories,
            })
        }
    }
}
