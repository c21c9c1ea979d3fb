//! Normalized message header metadata.

use chrono::{DateTime, Utc};

use crate::address::Address;

/// Header summary of a message.
///
/// Participant lists are always present; a header without addresses is an
/// empty list. The subject is kept exactly as the backend delivered it,
/// which for IMAP means still RFC 2047 encoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Envelope {
    /// Date of the message.
    pub date: Option<DateTime<Utc>>,
    /// Subject header, undecoded.
    pub subject: Option<String>,
    /// Message-ID header.
    pub message_id: Option<String>,
    /// In-Reply-To header.
    pub in_reply_to: Option<String>,
    /// From addresses.
    pub from: Vec<Address>,
    /// Sender addresses.
    pub sender: Vec<Address>,
    /// Reply-To addresses.
    pub reply_to: Vec<Address>,
    /// To addresses.
    pub to: Vec<Address>,
    /// Cc addresses.
    pub cc: Vec<Address>,
    /// Bcc addresses.
    pub bcc: Vec<Address>,
}

/// Selects a participant list of an [`Envelope`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Participants {
    /// From header.
    From,
    /// Sender header.
    Sender,
    /// Reply-To header.
    ReplyTo,
    /// To header.
    To,
    /// Cc header.
    Cc,
    /// Bcc header.
    Bcc,
    /// To followed by Cc.
    Recipients,
}

impl Envelope {
    /// Parses an RFC 2822 date header into UTC.
    ///
    /// Returns `None` for dates that do not parse; servers are lax here.
    #[must_use]
    pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc2822(raw.trim())
            .ok()
            .map(|d| d.with_timezone(&Utc))
    }

    /// Returns the addresses of the selected participant list, in order.
    #[must_use]
    pub fn participants(&self, which: Participants) -> Vec<&Address> {
        match which {
            Participants::From => self.from.iter().collect(),
            Participants::Sender => self.sender.iter().collect(),
            Participants::ReplyTo => self.reply_to.iter().collect(),
            Participants::To => self.to.iter().collect(),
            Participants::Cc => self.cc.iter().collect(),
            Participants::Bcc => self.bcc.iter().collect(),
            Participants::Recipients => self.to.iter().chain(&self.cc).collect(),
        }
    }
}
