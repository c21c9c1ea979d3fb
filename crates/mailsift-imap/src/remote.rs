//! [`Remote`] implementation over an [`ImapSession`].

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, warn};

use mailsift_core::{
    DirValidity, Directory, Envelope, Error, Flags, LocalId, Remote, Result, Uid, Watermark,
    group_by_directory,
};

use crate::config::ImapOptions;
use crate::session::ImapSession;
use crate::types::{ImapUid, MailboxStatus, StoreAction};

/// IMAP backend.
///
/// Message ids are the server UIDs qualified by their directory. The
/// adapter remembers the selected mailbox and only re-selects when a call
/// targets another one; validity checks always select to see fresh
/// UIDNEXT values.
///
/// Moves trust the COPYUID response code. Until the server has shown it
/// sends one, the target's UIDNEXT is read before each move so the new uid
/// can be found by searching the target afterwards.
#[derive(Debug)]
pub struct Imap<S> {
    session: S,
    options: ImapOptions,
    delimiter: Option<char>,
    selected: Option<Directory>,
    copyuid: Option<bool>,
}

impl<S: ImapSession> Imap<S> {
    /// Wraps an authenticated session.
    #[must_use]
    pub fn new(session: S) -> Self {
        Self::with_options(session, ImapOptions::default())
    }

    /// Wraps an authenticated session with explicit options.
    #[must_use]
    pub const fn with_options(session: S, options: ImapOptions) -> Self {
        Self {
            session,
            options,
            delimiter: None,
            selected: None,
            copyuid: None,
        }
    }

    /// The underlying session.
    #[must_use]
    pub const fn session(&self) -> &S {
        &self.session
    }

    /// Returns the session, dropping the adapter state.
    #[must_use]
    pub fn into_session(self) -> S {
        self.session
    }

    fn delimiter(&self) -> char {
        self.delimiter.unwrap_or(self.options.default_delimiter)
    }

    fn mailbox_name(&self, dir: &Directory) -> String {
        dir.join(self.delimiter())
    }

    async fn select(&mut self, dir: &Directory) -> Result<MailboxStatus> {
        let name = self.mailbox_name(dir);
        self.selected = None;
        let status = self.session.select(&name).await?;
        self.selected = Some(dir.clone());
        Ok(status)
    }

    async fn ensure_selected(&mut self, dir: &Directory) -> Result<()> {
        if self.selected.as_ref() != Some(dir) {
            self.select(dir).await?;
        }
        Ok(())
    }

    async fn store(&mut self, uid: &Uid, action: StoreAction, flags: &Flags) -> Result<Flags> {
        let imap_uid = imap_uid(uid)?;
        self.ensure_selected(uid.directory()).await?;
        if let Some(flags) = self.session.uid_store(imap_uid, action, flags).await? {
            return Ok(flags);
        }
        self.session
            .uid_fetch_flags(imap_uid)
            .await?
            .ok_or_else(|| Error::UnknownMessage(uid.clone()))
    }

    /// Finds the uid a message got in `target` when the server did not
    /// report it. `floor` is the target's UIDNEXT from before the move; the
    /// moved message is the only one at or above it.
    async fn locate_moved(
        &mut self,
        uid: &Uid,
        target: &Directory,
        floor: Option<ImapUid>,
    ) -> Result<Uid> {
        let Some(floor) = floor else {
            warn!(uid = %uid, dir = %target, "no COPYUID or UIDNEXT, moved uid unknown");
            return Err(Error::UnknownMessage(uid.clone()));
        };
        self.select(target).await?;
        let arrived: Vec<ImapUid> = self
            .session
            .uid_search_all()
            .await?
            .into_iter()
            .filter(|candidate| *candidate >= floor)
            .collect();
        if let [new_uid] = arrived[..] {
            return Ok(qualified(target, new_uid));
        }
        warn!(
            uid = %uid,
            dir = %target,
            arrived = arrived.len(),
            "cannot tell the moved message apart from other arrivals"
        );
        Err(Error::UnknownMessage(uid.clone()))
    }
}

fn imap_uid(uid: &Uid) -> Result<ImapUid> {
    match uid.local() {
        LocalId::Number(n) => Ok(ImapUid(*n)),
        LocalId::Text(_) => Err(Error::ForeignUid(uid.clone())),
    }
}

fn qualified(dir: &Directory, uid: ImapUid) -> Uid {
    Uid::new(dir.clone(), LocalId::Number(uid.0))
}

fn watermark(status: &MailboxStatus) -> Option<Watermark> {
    let validity = status.uid_validity?;
    let next = status.uid_next?;
    Some(Watermark::new(format!("{}:{}", validity.get(), next.get())))
}

#[async_trait]
impl<S: ImapSession> Remote for Imap<S> {
    async fn list_dirs(&mut self) -> Result<Vec<Directory>> {
        let entries = self.session.list().await?;
        let mut dirs = Vec::with_capacity(entries.len());
        for entry in entries {
            if let Some(delimiter) = entry.delimiter {
                self.delimiter.get_or_insert(delimiter);
            }
            if !entry.is_selectable() {
                debug!(mailbox = %entry.name, "skipping unselectable mailbox");
                continue;
            }
            let delimiter = entry.delimiter.unwrap_or_else(|| self.delimiter());
            dirs.push(Directory::parse(&entry.name, delimiter));
        }
        Ok(dirs)
    }

    async fn dir_validity(&mut self, dir: &Directory, previous: &Watermark) -> Result<DirValidity> {
        let status = self.select(dir).await?;
        let Some(current) = watermark(&status) else {
            warn!(dir = %dir, "server reported no UIDVALIDITY/UIDNEXT, rescanning");
            return Ok(DirValidity::changed(Watermark::unseen()));
        };
        if &current != previous {
            Ok(DirValidity::changed(current))
        } else {
            Ok(DirValidity::unchanged(current))
        }
    }

    async fn list_messages(&mut self, dir: &Directory) -> Result<Vec<Uid>> {
        self.ensure_selected(dir).await?;
        let uids = self.session.uid_search_all().await?;
        Ok(uids.into_iter().map(|uid| qualified(dir, uid)).collect())
    }

    async fn fetch_envelope(&mut self, uid: &Uid) -> Result<Envelope> {
        self.fetch_multiple_envelopes(std::slice::from_ref(uid))
            .await?
            .pop()
            .map(|(_, envelope)| envelope)
            .ok_or_else(|| Error::UnknownMessage(uid.clone()))
    }

    async fn fetch_multiple_envelopes(&mut self, uids: &[Uid]) -> Result<Vec<(Uid, Envelope)>> {
        let mut out = Vec::with_capacity(uids.len());
        for (dir, group) in group_by_directory(uids) {
            let wanted = group
                .iter()
                .map(|uid| imap_uid(uid))
                .collect::<Result<Vec<_>>>()?;
            self.ensure_selected(dir).await?;
            let fetched = self.session.uid_fetch_envelopes(&wanted).await?;
            debug!(
                dir = %dir,
                requested = wanted.len(),
                fetched = fetched.len(),
                "UID FETCH ENVELOPE"
            );
            out.extend(
                fetched
                    .into_iter()
                    .map(|(uid, envelope)| (qualified(dir, uid), Envelope::from(envelope))),
            );
        }
        Ok(out)
    }

    async fn fetch_body(&mut self, uid: &Uid) -> Result<Bytes> {
        let imap_uid = imap_uid(uid)?;
        self.ensure_selected(uid.directory()).await?;
        self.session
            .uid_fetch_body(imap_uid)
            .await?
            .ok_or_else(|| Error::UnknownMessage(uid.clone()))
    }

    async fn move_message_id(&mut self, uid: &Uid, target: &Directory) -> Result<Uid> {
        let imap_uid = imap_uid(uid)?;
        let floor = if self.copyuid == Some(true) {
            None
        } else {
            self.select(target).await?.uid_next
        };
        self.ensure_selected(uid.directory()).await?;
        let mailbox = self.mailbox_name(target);
        if let Some(new_uid) = self.session.uid_move(imap_uid, &mailbox).await? {
            self.copyuid = Some(true);
            return Ok(qualified(target, new_uid));
        }
        self.copyuid = Some(false);
        debug!(uid = %uid, target = %mailbox, "no COPYUID in MOVE response");
        self.locate_moved(uid, target, floor).await
    }

    async fn fetch_flags(&mut self, uid: &Uid) -> Result<Flags> {
        let imap_uid = imap_uid(uid)?;
        self.ensure_selected(uid.directory()).await?;
        self.session
            .uid_fetch_flags(imap_uid)
            .await?
            .ok_or_else(|| Error::UnknownMessage(uid.clone()))
    }

    async fn add_flags(&mut self, uid: &Uid, flags: &Flags) -> Result<Flags> {
        self.store(uid, StoreAction::Add, flags).await
    }

    async fn remove_flags(&mut self, uid: &Uid, flags: &Flags) -> Result<Flags> {
        self.store(uid, StoreAction::Remove, flags).await
    }
}
