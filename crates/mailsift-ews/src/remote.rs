//! [`Remote`] implementation over an [`EwsSession`].

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use mailsift_core::{
    DirValidity, Directory, Envelope, Error, Flags, LocalId, Remote, Result, Uid, Watermark,
};

use crate::config::EwsOptions;
use crate::session::EwsSession;
use crate::types::{Item, ItemId, ItemUpdate};

/// Exchange backend.
///
/// Item ids are mailbox-wide, so the directory part of a [`Uid`] only
/// records where the message was listed. Change detection uses the folder
/// sync state; the read state is presented as the `\Seen` flag and the
/// categories as keywords.
#[derive(Debug)]
pub struct Ews<S> {
    session: S,
    options: EwsOptions,
}

impl<S: EwsSession> Ews<S> {
    /// Wraps an authenticated session.
    #[must_use]
    pub fn new(session: S) -> Self {
        Self::with_options(session, EwsOptions::default())
    }

    /// Wraps an authenticated session with explicit options.
    #[must_use]
    pub const fn with_options(session: S, options: EwsOptions) -> Self {
        Self { session, options }
    }

    /// The underlying session.
    #[must_use]
    pub const fn session(&self) -> &S {
        &self.session
    }

    /// Returns the session.
    #[must_use]
    pub fn into_session(self) -> S {
        self.session
    }

    async fn item(&mut self, uid: &Uid) -> Result<Item> {
        let id = item_id(uid)?;
        self.session
            .get_items(std::slice::from_ref(&id))
            .await?
            .into_iter()
            .find(|item| item.id == id)
            .ok_or_else(|| Error::UnknownMessage(uid.clone()))
    }

    async fn change_flags(
        &mut self,
        uid: &Uid,
        desired: impl FnOnce(&Flags) -> Flags + Send,
    ) -> Result<Flags> {
        let item = self.item(uid).await?;
        let current = item.flags();
        let Some(update) = ItemUpdate::between(&current, &desired(&current)) else {
            return Ok(current);
        };
        debug!(uid = %uid, ?update, "UpdateItem");
        self.session.update_item(&item.id, &update).await?;
        Ok(self.item(uid).await?.flags())
    }
}

fn item_id(uid: &Uid) -> Result<ItemId> {
    match uid.local() {
        LocalId::Text(id) => Ok(ItemId::new(&**id)),
        LocalId::Number(_) => Err(Error::ForeignUid(uid.clone())),
    }
}

fn qualified(dir: &Directory, id: &ItemId) -> Uid {
    Uid::text(dir.clone(), id.as_str())
}

#[async_trait]
impl<S: EwsSession> Remote for Ews<S> {
    async fn list_dirs(&mut self) -> Result<Vec<Directory>> {
        Ok(self
            .session
            .folders()
            .await?
            .into_iter()
            .map(Directory::from)
            .collect())
    }

    async fn dir_validity(&mut self, dir: &Directory, previous: &Watermark) -> Result<DirValidity> {
        let state = previous.token().and_then(|t| std::str::from_utf8(t).ok());
        let sync = self.session.sync_items(dir.components(), state).await?;
        debug!(dir = %dir, changes = sync.changes, initial = state.is_none(), "SyncFolderItems");

        if state.is_some() && sync.changes == 0 {
            Ok(DirValidity::unchanged(previous.clone()))
        } else {
            Ok(DirValidity::changed(Watermark::new(sync.sync_state)))
        }
    }

    async fn list_messages(&mut self, dir: &Directory) -> Result<Vec<Uid>> {
        let ids = self.session.find_items(dir.components()).await?;
        Ok(ids.iter().map(|id| qualified(dir, id)).collect())
    }

    async fn fetch_envelope(&mut self, uid: &Uid) -> Result<Envelope> {
        Ok(self.item(uid).await?.envelope())
    }

    async fn fetch_multiple_envelopes(&mut self, uids: &[Uid]) -> Result<Vec<(Uid, Envelope)>> {
        let mut by_id: HashMap<ItemId, &Uid> = HashMap::with_capacity(uids.len());
        let mut ids = Vec::with_capacity(uids.len());
        for uid in uids {
            let id = item_id(uid)?;
            by_id.insert(id.clone(), uid);
            ids.push(id);
        }

        let mut out = Vec::with_capacity(uids.len());
        for chunk in ids.chunks(self.options.chunk_len()) {
            let items = self.session.get_items(chunk).await?;
            debug!(requested = chunk.len(), fetched = items.len(), "GetItem");
            for item in items {
                if let Some(uid) = by_id.get(&item.id) {
                    out.push(((*uid).clone(), item.envelope()));
                }
            }
        }
        Ok(out)
    }

    async fn fetch_body(&mut self, uid: &Uid) -> Result<Bytes> {
        let id = item_id(uid)?;
        self.session
            .mime_content(&id)
            .await?
            .ok_or_else(|| Error::UnknownMessage(uid.clone()))
    }

    async fn move_message_id(&mut self, uid: &Uid, target: &Directory) -> Result<Uid> {
        let id = item_id(uid)?;
        let moved = self.session.move_item(&id, target.components()).await?;
        Ok(qualified(target, &moved))
    }

    async fn fetch_flags(&mut self, uid: &Uid) -> Result<Flags> {
        Ok(self.item(uid).await?.flags())
    }

    async fn add_flags(&mut self, uid: &Uid, flags: &Flags) -> Result<Flags> {
        self.change_flags(uid, |current| current.union(flags)).await
    }

    async fn remove_flags(&mut self, uid: &Uid, flags: &Flags) -> Result<Flags> {
        self.change_flags(uid, |current| current.difference(flags))
            .await
    }
}
