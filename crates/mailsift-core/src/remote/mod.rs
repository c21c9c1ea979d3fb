//! The backend abstraction.
//!
//! A backend adapter implements the [`Remote`] primitives. The generic
//! compositions built on top of them, [`get_messages`] and
//! [`move_message`], are free functions so no adapter can change their
//! meaning.

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::Result;
use crate::envelope::Envelope;
use crate::message::Message;
use crate::types::{Directory, Flags, Uid, Watermark};

pub mod memory;

pub use memory::{MemoryRemote, MemoryStats};

/// Result of a directory validity check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirValidity {
    /// Whether the directory changed since the watermark passed in.
    pub changed: bool,
    /// Watermark describing the directory's current state.
    pub watermark: Watermark,
}

impl DirValidity {
    /// The directory changed; `watermark` is its new state.
    #[must_use]
    pub const fn changed(watermark: Watermark) -> Self {
        Self {
            changed: true,
            watermark,
        }
    }

    /// The directory is as `watermark` describes.
    #[must_use]
    pub const fn unchanged(watermark: Watermark) -> Self {
        Self {
            changed: false,
            watermark,
        }
    }
}

/// Capability set every mail store backend provides.
///
/// Implementations wrap a stateful, already authenticated connection, so
/// every method takes `&mut self` and a single instance must not be shared
/// between concurrent schedulers.
///
/// Flag operations return the flags the backend reports after the call.
/// Backends may coerce or drop individual flags, so callers must not
/// compute the result themselves.
#[async_trait]
pub trait Remote: Send {
    /// Lists every directory in the mailbox.
    async fn list_dirs(&mut self) -> Result<Vec<Directory>>;

    /// Compares the current state of `dir` with `watermark`.
    ///
    /// [`Watermark::unseen`] always reports a change. Two calls without an
    /// intervening change report unchanged and return the same watermark.
    async fn dir_validity(&mut self, dir: &Directory, watermark: &Watermark) -> Result<DirValidity>;

    /// Lists the ids of all messages in `dir`.
    async fn list_messages(&mut self, dir: &Directory) -> Result<Vec<Uid>>;

    /// Fetches the envelope of one message.
    async fn fetch_envelope(&mut self, uid: &Uid) -> Result<Envelope>;

    /// Fetches several envelopes in as few round trips as the backend allows.
    ///
    /// Messages that disappeared in the meantime are left out of the result.
    async fn fetch_multiple_envelopes(&mut self, uids: &[Uid]) -> Result<Vec<(Uid, Envelope)>>;

    /// Fetches the full raw message.
    async fn fetch_body(&mut self, uid: &Uid) -> Result<Bytes>;

    /// Moves a message to `target` and returns its id there.
    async fn move_message_id(&mut self, uid: &Uid, target: &Directory) -> Result<Uid>;

    /// Fetches the flags of a message.
    async fn fetch_flags(&mut self, uid: &Uid) -> Result<Flags>;

    /// Adds flags to a message.
    async fn add_flags(&mut self, uid: &Uid, flags: &Flags) -> Result<Flags>;

    /// Removes flags from a message.
    async fn remove_flags(&mut self, uid: &Uid, flags: &Flags) -> Result<Flags>;
}

/// Fetches every message currently in `dir`.
///
/// Lists the ids, then fetches all envelopes with one batched call.
///
/// # Errors
///
/// Propagates any backend error.
pub async fn get_messages(remote: &mut dyn Remote, dir: &Directory) -> Result<Vec<Message>> {
    let uids = remote.list_messages(dir).await?;
    if uids.is_empty() {
        return Ok(Vec::new());
    }

    let envelopes = remote.fetch_multiple_envelopes(&uids).await?;
    debug!(dir = %dir, listed = uids.len(), fetched = envelopes.len(), "fetched envelopes");

    Ok(envelopes
        .into_iter()
        .map(|(uid, envelope)| Message::new(uid, dir.clone(), envelope))
        .collect())
}

/// Moves `message` to `target`, updating its id and directory in place.
///
/// # Errors
///
/// Propagates any backend error; the message is left untouched then.
pub async fn move_message(
    remote: &mut dyn Remote,
    message: &mut Message,
    target: &Directory,
) -> Result<()> {
    let new_uid = remote.move_message_id(message.uid(), target).await?;
    debug!(from = %message.uid(), to = %new_uid, "moved message");
    message.relocate(new_uid, target.clone());
    Ok(())
}

/// Groups ids by directory, keeping the order in which directories first
/// appear and the order of ids within each group.
///
/// Helper for batched backend calls that must select a folder first.
#[must_use]
pub fn group_by_directory(uids: &[Uid]) -> Vec<(&Directory, Vec<&Uid>)> {
    let mut groups: Vec<(&Directory, Vec<&Uid>)> = Vec::new();
    for uid in uids {
        match groups.iter_mut().find(|(dir, _)| *dir == uid.directory()) {
            Some((_, members)) => members.push(uid),
            None => groups.push((uid.directory(), vec![uid])),
        }
    }
    groups
}
