//! The IMAP connection the adapter drives.

use async_trait::async_trait;
use bytes::Bytes;
use mailsift_core::Flags;

use crate::Result;
use crate::types::{ImapEnvelope, ImapUid, ListEntry, MailboxStatus, StoreAction};

/// An authenticated IMAP connection.
///
/// Commands other than LIST and SELECT act on the currently selected
/// mailbox. The adapter always selects before issuing them.
#[async_trait]
pub trait ImapSession: Send {
    /// `LIST "" "*"`.
    async fn list(&mut self) -> Result<Vec<ListEntry>>;

    /// `SELECT mailbox`.
    async fn select(&mut self, mailbox: &str) -> Result<MailboxStatus>;

    /// `UID SEARCH ALL`.
    async fn uid_search_all(&mut self) -> Result<Vec<ImapUid>>;

    /// `UID FETCH uids (UID ENVELOPE)`.
    ///
    /// Expunged messages are simply missing from the result.
    async fn uid_fetch_envelopes(
        &mut self,
        uids: &[ImapUid],
    ) -> Result<Vec<(ImapUid, ImapEnvelope)>>;

    /// `UID FETCH uid BODY.PEEK[]`, `None` if the message is gone.
    async fn uid_fetch_body(&mut self, uid: ImapUid) -> Result<Option<Bytes>>;

    /// `UID FETCH uid FLAGS`, `None` if the message is gone.
    async fn uid_fetch_flags(&mut self, uid: ImapUid) -> Result<Option<Flags>>;

    /// `UID STORE uid +FLAGS/-FLAGS (flags)`.
    ///
    /// Returns the flags of the untagged FETCH response, if the server sent
    /// one.
    async fn uid_store(
        &mut self,
        uid: ImapUid,
        action: StoreAction,
        flags: &Flags,
    ) -> Result<Option<Flags>>;

    /// `UID MOVE uid mailbox`.
    ///
    /// Returns the destination UID from the COPYUID response code, if the
    /// server supports UIDPLUS.
    async fn uid_move(&mut self, uid: ImapUid, mailbox: &str) -> Result<Option<ImapUid>>;
}
