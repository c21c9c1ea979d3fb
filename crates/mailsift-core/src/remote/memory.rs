//! In-memory mail store.
//!
//! Behaves like an IMAP server: every directory has a validity id and a
//! next-id counter, ids are directory scoped, and a moved message gets a
//! fresh id in its new directory. Useful for exercising rules without a
//! network connection.

use std::collections::BTreeMap;
use std::num::NonZeroU32;

use async_trait::async_trait;
use bytes::Bytes;

use super::{DirValidity, Remote};
use crate::envelope::Envelope;
use crate::types::{Directory, Flags, LocalId, Uid, Watermark};
use crate::{Error, Result};

/// Counters of the operations a [`MemoryRemote`] has served.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryStats {
    /// `dir_validity` calls.
    pub validity_checks: usize,
    /// `list_messages` calls.
    pub listings: usize,
    /// `fetch_multiple_envelopes` calls.
    pub envelope_batches: usize,
    /// Envelopes handed out, single or batched.
    pub envelopes_fetched: usize,
    /// `fetch_body` calls.
    pub body_fetches: usize,
    /// Successful moves.
    pub moves: usize,
    /// `add_flags` and `remove_flags` calls.
    pub flag_writes: usize,
}

#[derive(Debug, Clone)]
struct StoredMessage {
    envelope: Envelope,
    body: Bytes,
    flags: Flags,
}

#[derive(Debug, Clone)]
struct Folder {
    uid_validity: u32,
    uid_next: NonZeroU32,
    messages: BTreeMap<NonZeroU32, StoredMessage>,
}

impl Folder {
    fn new(uid_validity: u32) -> Self {
        Self {
            uid_validity,
            uid_next: NonZeroU32::MIN,
            messages: BTreeMap::new(),
        }
    }

    fn watermark(&self) -> Watermark {
        Watermark::new(format!("{}:{}", self.uid_validity, self.uid_next))
    }

    fn insert(&mut self, message: StoredMessage) -> NonZeroU32 {
        let id = self.uid_next;
        self.uid_next = id.saturating_add(1);
        self.messages.insert(id, message);
        id
    }
}

/// A [`Remote`] backed by plain maps.
#[derive(Debug, Clone, Default)]
pub struct MemoryRemote {
    folders: BTreeMap<Directory, Folder>,
    validity_counter: u32,
    stats: MemoryStats,
}

impl MemoryRemote {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates `dir` if it does not exist yet.
    pub fn create_dir(&mut self, dir: &Directory) {
        self.folder_or_create(dir);
    }

    /// Empties `dir` and gives it a new validity id, invalidating its ids.
    pub fn recreate_dir(&mut self, dir: &Directory) {
        self.validity_counter += 1;
        self.folders
            .insert(dir.clone(), Folder::new(self.validity_counter));
    }

    /// Delivers a message into `dir`, creating the directory if needed.
    pub fn add_message(
        &mut self,
        dir: &Directory,
        envelope: Envelope,
        body: impl Into<Bytes>,
    ) -> Uid {
        self.add_message_with_flags(dir, envelope, body, Flags::new())
    }

    /// Delivers a message with initial flags.
    pub fn add_message_with_flags(
        &mut self,
        dir: &Directory,
        envelope: Envelope,
        body: impl Into<Bytes>,
        flags: Flags,
    ) -> Uid {
        let id = self.folder_or_create(dir).insert(StoredMessage {
            envelope,
            body: body.into(),
            flags,
        });
        local_uid(dir, id)
    }

    /// Ids of the messages currently in `dir`, in ascending order.
    #[must_use]
    pub fn messages(&self, dir: &Directory) -> Vec<Uid> {
        self.folders
            .get(dir)
            .map(|folder| folder.messages.keys().map(|&id| local_uid(dir, id)).collect())
            .unwrap_or_default()
    }

    /// Current flags of a message, without touching the counters.
    #[must_use]
    pub fn flags_of(&self, uid: &Uid) -> Option<&Flags> {
        self.lookup(uid).ok().map(|m| &m.flags)
    }

    /// Operation counters.
    #[must_use]
    pub const fn stats(&self) -> MemoryStats {
        self.stats
    }

    fn folder_or_create(&mut self, dir: &Directory) -> &mut Folder {
        let counter = &mut self.validity_counter;
        self.folders.entry(dir.clone()).or_insert_with(|| {
            *counter += 1;
            Folder::new(*counter)
        })
    }

    fn folder(&self, dir: &Directory) -> Result<&Folder> {
        self.folders
            .get(dir)
            .ok_or_else(|| Error::UnknownDirectory(dir.clone()))
    }

    fn folder_mut(&mut self, dir: &Directory) -> Result<&mut Folder> {
        self.folders
            .get_mut(dir)
            .ok_or_else(|| Error::UnknownDirectory(dir.clone()))
    }

    fn lookup(&self, uid: &Uid) -> Result<&StoredMessage> {
        let id = local_number(uid)?;
        self.folder(uid.directory())?
            .messages
            .get(&id)
            .ok_or_else(|| Error::UnknownMessage(uid.clone()))
    }

    fn lookup_mut(&mut self, uid: &Uid) -> Result<&mut StoredMessage> {
        let id = local_number(uid)?;
        self.folder_mut(uid.directory())?
            .messages
            .get_mut(&id)
            .ok_or_else(|| Error::UnknownMessage(uid.clone()))
    }
}

fn local_number(uid: &Uid) -> Result<NonZeroU32> {
    match uid.local() {
        LocalId::Number(n) => Ok(*n),
        LocalId::Text(_) => Err(Error::ForeignUid(uid.clone())),
    }
}

fn local_uid(dir: &Directory, id: NonZeroU32) -> Uid {
    Uid::new(dir.clone(), LocalId::Number(id))
}

#[async_trait]
impl Remote for MemoryRemote {
    async fn list_dirs(&mut self) -> Result<Vec<Directory>> {
        Ok(self.folders.keys().cloned().collect())
    }

    async fn dir_validity(
        &mut self,
        dir: &Directory,
        watermark: &Watermark,
    ) -> Result<DirValidity> {
        self.stats.validity_checks += 1;
        let current = self.folder(dir)?.watermark();
        if &current == watermark {
            Ok(DirValidity::unchanged(current))
        } else {
            Ok(DirValidity::changed(current))
        }
    }

    async fn list_messages(&mut self, dir: &Directory) -> Result<Vec<Uid>> {
        self.stats.listings += 1;
        self.folder(dir)?;
        Ok(self.messages(dir))
    }

    async fn fetch_envelope(&mut self, uid: &Uid) -> Result<Envelope> {
        let envelope = self.lookup(uid)?.envelope.clone();
        self.stats.envelopes_fetched += 1;
        Ok(envelope)
    }

    async fn fetch_multiple_envelopes(&mut self, uids: &[Uid]) -> Result<Vec<(Uid, Envelope)>> {
        self.stats.envelope_batches += 1;
        let mut out = Vec::with_capacity(uids.len());
        for uid in uids {
            match self.lookup(uid) {
                Ok(message) => out.push((uid.clone(), message.envelope.clone())),
                Err(Error::UnknownMessage(_)) => {}
                Err(e) => return Err(e),
            }
        }
        self.stats.envelopes_fetched += out.len();
        Ok(out)
    }

    async fn fetch_body(&mut self, uid: &Uid) -> Result<Bytes> {
        let body = self.lookup(uid)?.body.clone();
        self.stats.body_fetches += 1;
        Ok(body)
    }

    async fn move_message_id(&mut self, uid: &Uid, target: &Directory) -> Result<Uid> {
        let id = local_number(uid)?;
        self.folder(target)?;
        let message = self
            .folder_mut(uid.directory())?
            .messages
            .remove(&id)
            .ok_or_else(|| Error::UnknownMessage(uid.clone()))?;

        let new_id = self.folder_mut(target)?.insert(message);
        self.stats.moves += 1;
        Ok(local_uid(target, new_id))
    }

    async fn fetch_flags(&mut self, uid: &Uid) -> Result<Flags> {
        Ok(self.lookup(uid)?.flags.clone())
    }

    async fn add_flags(&mut self, uid: &Uid, flags: &Flags) -> Result<Flags> {
        self.stats.flag_writes += 1;
        let message = self.lookup_mut(uid)?;
        message.flags = message.flags.union(flags);
        Ok(message.flags.clone())
    }

    async fn remove_flags(&mut self, uid: &Uid, flags: &Flags) -> Result<Flags> {
        self.stats.flag_writes += 1;
        let message = self.lookup_mut(uid)?;
        message.flags = message.flags.difference(flags);
        Ok(message.flags.clone())
    }
}
