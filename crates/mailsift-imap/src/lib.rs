//! # mailsift-imap
//!
//! IMAP backend for `mailsift-core`.
//!
//! [`Imap`] implements [`mailsift_core::Remote`] on top of any
//! [`ImapSession`], an already authenticated connection. Connecting,
//! authenticating and the wire protocol belong to the session
//! implementation.
//!
//! ## Identifiers and change detection
//!
//! - Message ids are server UIDs qualified by their directory, since UIDs
//!   are only unique within one mailbox.
//! - A directory's watermark is its `UIDVALIDITY:UIDNEXT` pair as reported
//!   by SELECT. Any arrival or a recreated mailbox changes it.
//! - Directory names are LIST names split on the server's hierarchy
//!   delimiter.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod config;
mod error;
mod remote;
pub mod session;
pub mod types;

pub use config::ImapOptions;
pub use error::{Error, Result};
pub use remote::Imap;
pub use session::ImapSession;
pub use types::{
    ImapAddress, ImapEnvelope, ImapUid, ListEntry, MailboxAttribute, MailboxStatus, StoreAction,
    UidValidity,
};
