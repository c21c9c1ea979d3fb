//! Tests for the IMAP adapter.
//!
//! These tests drive the adapter against a scripted in-memory session that
//! keeps mailboxes the way a server would and records every command.

#![allow(clippy::unwrap_used)]

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio_test::assert_ok;
use tokio_util::sync::CancellationToken;

use mailsift_core::{
    Action, ChangeFlags, Directory, Error as CoreError, Flag, Flags, Move, Remote, Stop, Uid,
    Watermark, get_messages, run, run_pipeline,
};
use mailsift_imap::{
    Error, Imap, ImapAddress, ImapEnvelope, ImapOptions, ImapSession, ImapUid, ListEntry,
    MailboxAttribute, MailboxStatus, Result, StoreAction, UidValidity,
};

#[derive(Debug)]
struct StoredMessage {
    envelope: ImapEnvelope,
    body: Bytes,
    flags: Flags,
}

#[derive(Debug)]
struct FakeMailbox {
    validity: u32,
    next: u32,
    messages: BTreeMap<u32, StoredMessage>,
}

/// In-memory server behind the [`ImapSession`] trait.
#[derive(Debug)]
struct FakeSession {
    delimiter: char,
    mailboxes: BTreeMap<String, FakeMailbox>,
    unselectable: Vec<String>,
    selected: Option<String>,
    uidplus: bool,
    quiet_store: bool,
    report_status: bool,
    commands: Vec<String>,
}

impl FakeSession {
    fn new(delimiter: char) -> Self {
        Self {
            delimiter,
            mailboxes: BTreeMap::new(),
            unselectable: Vec::new(),
            selected: None,
            uidplus: true,
            quiet_store: false,
            report_status: true,
            commands: Vec::new(),
        }
    }

    fn create(&mut self, name: &str) {
        let validity = u32::try_from(self.mailboxes.len()).unwrap() + 100;
        self.mailboxes.entry(name.to_string()).or_insert(FakeMailbox {
            validity,
            next: 1,
            messages: BTreeMap::new(),
        });
    }

    fn deliver(&mut self, name: &str, subject: &str) -> u32 {
        self.create(name);
        let mailbox = self.mailboxes.get_mut(name).unwrap();
        let uid = mailbox.next;
        mailbox.next += 1;
        mailbox.messages.insert(
            uid,
            StoredMessage {
                envelope: envelope(subject),
                body: Bytes::from(format!("Subject: {subject}\r\n\r\nbody\r\n")),
                flags: Flags::new(),
            },
        );
        uid
    }

    fn current(&mut self) -> Result<&mut FakeMailbox> {
        let name = self
            .selected
            .clone()
            .ok_or_else(|| Error::Bad("No mailbox selected".into()))?;
        self.mailboxes
            .get_mut(&name)
            .ok_or_else(|| Error::No(format!("Mailbox doesn't exist: {name}")))
    }

    fn record(&mut self, command: impl Into<String>) {
        self.commands.push(command.into());
    }

    fn sent(&self, command: &str) -> bool {
        self.commands.iter().any(|c| c == command)
    }

    fn count(&self, prefix: &str) -> usize {
        self.commands
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }
}

fn envelope(subject: &str) -> ImapEnvelope {
    ImapEnvelope {
        date: Some("Mon, 7 Feb 1994 21:52:25 -0800".to_string()),
        subject: Some(subject.to_string()),
        from: vec![ImapAddress {
            name: Some("Fred Foobar".to_string()),
            adl: None,
            mailbox: Some("foobar".to_string()),
            host: Some("blurdybloop.example".to_string()),
        }],
        ..ImapEnvelope::default()
    }
}

#[async_trait]
impl ImapSession for FakeSession {
    async fn list(&mut self) -> Result<Vec<ListEntry>> {
        self.record("LIST");
        let mut entries: Vec<ListEntry> = self
            .unselectable
            .iter()
            .map(|name| ListEntry {
                name: name.clone(),
                delimiter: Some(self.delimiter),
                attributes: vec![MailboxAttribute::NoSelect, MailboxAttribute::HasChildren],
            })
            .collect();
        entries.extend(self.mailboxes.keys().map(|name| ListEntry {
            name: name.clone(),
            delimiter: Some(self.delimiter),
            attributes: vec![MailboxAttribute::HasNoChildren],
        }));
        Ok(entries)
    }

    async fn select(&mut self, mailbox: &str) -> Result<MailboxStatus> {
        self.record(format!("SELECT {mailbox}"));
        let report = self.report_status;
        let status = self
            .mailboxes
            .get(mailbox)
            .map(|m| MailboxStatus {
                exists: u32::try_from(m.messages.len()).unwrap(),
                uid_next: ImapUid::new(m.next).filter(|_| report),
                uid_validity: UidValidity::new(m.validity).filter(|_| report),
            })
            .ok_or_else(|| Error::No(format!("Mailbox doesn't exist: {mailbox}")))?;
        self.selected = Some(mailbox.to_string());
        Ok(status)
    }

    async fn uid_search_all(&mut self) -> Result<Vec<ImapUid>> {
        self.record("UID SEARCH ALL");
        Ok(self
            .current()?
            .messages
            .keys()
            .filter_map(|&n| ImapUid::new(n))
            .collect())
    }

    async fn uid_fetch_envelopes(
        &mut self,
        uids: &[ImapUid],
    ) -> Result<Vec<(ImapUid, ImapEnvelope)>> {
        self.record(format!("UID FETCH ENVELOPE x{}", uids.len()));
        let mailbox = self.current()?;
        Ok(uids
            .iter()
            .filter_map(|uid| {
                mailbox
                    .messages
                    .get(&uid.get())
                    .map(|m| (*uid, m.envelope.clone()))
            })
            .collect())
    }

    async fn uid_fetch_body(&mut self, uid: ImapUid) -> Result<Option<Bytes>> {
        self.record(format!("UID FETCH {uid} BODY.PEEK[]"));
        let mailbox = self.current()?;
        Ok(mailbox.messages.get(&uid.get()).map(|m| m.body.clone()))
    }

    async fn uid_fetch_flags(&mut self, uid: ImapUid) -> Result<Option<Flags>> {
        self.record(format!("UID FETCH {uid} FLAGS"));
        let mailbox = self.current()?;
        Ok(mailbox.messages.get(&uid.get()).map(|m| m.flags.clone()))
    }

    async fn uid_store(
        &mut self,
        uid: ImapUid,
        action: StoreAction,
        flags: &Flags,
    ) -> Result<Option<Flags>> {
        self.record(format!("UID STORE {uid} {action:?} {flags}"));
        let quiet = self.quiet_store;
        let message = self
            .current()?
            .messages
            .get_mut(&uid.get())
            .ok_or_else(|| Error::No("No such message".into()))?;
        message.flags = match action {
            StoreAction::Add => message.flags.union(flags),
            StoreAction::Remove => message.flags.difference(flags),
        };
        Ok((!quiet).then(|| message.flags.clone()))
    }

    async fn uid_move(&mut self, uid: ImapUid, mailbox: &str) -> Result<Option<ImapUid>> {
        self.record(format!("UID MOVE {uid} {mailbox}"));
        if !self.mailboxes.contains_key(mailbox) {
            let reason = format!("[TRYCREATE] Mailbox doesn't exist: {mailbox}");
            return Err(Error::No(reason));
        }
        let message = self
            .current()?
            .messages
            .remove(&uid.get())
            .ok_or_else(|| Error::No("No such message".into()))?;
        let target = self.mailboxes.get_mut(mailbox).unwrap();
        let new_uid = target.next;
        target.next += 1;
        target.messages.insert(new_uid, message);
        Ok(ImapUid::new(new_uid).filter(|_| self.uidplus))
    }
}

fn inbox_child(name: &str) -> Directory {
    Directory::new(["INBOX", name])
}

mod directory_tests {
    use super::*;

    #[tokio::test]
    async fn list_splits_on_server_delimiter() {
        let mut session = FakeSession::new('.');
        session.create("INBOX");
        session.create("INBOX.Archive");
        session.unselectable.push("Shared".into());
        let mut imap = Imap::new(session);

        let dirs = imap.list_dirs().await.unwrap();
        assert_eq!(dirs, [Directory::inbox(), inbox_child("Archive")]);
    }

    #[tokio::test]
    async fn delimiter_defaults_before_list() {
        let mut session = FakeSession::new('.');
        session.create("INBOX.Archive");
        let options = ImapOptions {
            default_delimiter: '.',
        };
        let mut imap = Imap::with_options(session, options);

        imap.list_messages(&inbox_child("Archive")).await.unwrap();
        assert!(imap.session().sent("SELECT INBOX.Archive"));
    }
}

mod validity_tests {
    use super::*;

    #[tokio::test]
    async fn unseen_then_unchanged_then_changed() {
        let mut session = FakeSession::new('/');
        session.deliver("INBOX", "one");
        let mut imap = Imap::new(session);

        let first = imap
            .dir_validity(&Directory::inbox(), &Watermark::unseen())
            .await
            .unwrap();
        assert!(first.changed);
        assert_eq!(first.watermark.token(), Some(&b"100:2"[..]));

        let second = imap
            .dir_validity(&Directory::inbox(), &first.watermark)
            .await
            .unwrap();
        assert!(!second.changed);
        assert_eq!(second.watermark, first.watermark);

        let mut session = imap.into_session();
        session.deliver("INBOX", "two");
        let mut imap = Imap::new(session);
        let third = imap
            .dir_validity(&Directory::inbox(), &second.watermark)
            .await
            .unwrap();
        assert!(third.changed);
    }

    #[tokio::test]
    async fn missing_status_always_rescans() {
        let mut session = FakeSession::new('/');
        session.create("INBOX");
        session.report_status = false;
        let mut imap = Imap::new(session);

        let first = imap
            .dir_validity(&Directory::inbox(), &Watermark::unseen())
            .await
            .unwrap();
        assert!(first.changed);
        assert!(first.watermark.is_unseen());
        let second = imap
            .dir_validity(&Directory::inbox(), &first.watermark)
            .await
            .unwrap();
        assert!(second.changed);
    }

    #[tokio::test]
    async fn unknown_mailbox_is_remote_error() {
        let mut imap = Imap::new(FakeSession::new('/'));
        let err = imap
            .dir_validity(&Directory::new(["Nope"]), &Watermark::unseen())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Remote(_)));
    }
}

mod message_tests {
    use super::*;

    #[tokio::test]
    async fn get_messages_uses_one_fetch() {
        let mut session = FakeSession::new('/');
        session.deliver("INBOX", "one");
        session.deliver("INBOX", "two");
        let mut imap = Imap::new(session);

        let messages = get_messages(&mut imap, &Directory::inbox()).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].subject(), Some("two"));
        assert_eq!(
            messages[0].from()[0].email().as_deref(),
            Some("foobar@blurdybloop.example")
        );
        assert!(messages[0].envelope().date.is_some());
        assert_eq!(imap.session().count("UID FETCH ENVELOPE"), 1);
        assert_eq!(imap.session().count("SELECT"), 1);
    }

    #[tokio::test]
    async fn batch_selects_each_directory_once() {
        let mut session = FakeSession::new('/');
        let a = session.deliver("INBOX", "a");
        let b = session.deliver("Work", "b");
        let c = session.deliver("INBOX", "c");
        let mut imap = Imap::new(session);
        let uids = [
            Uid::numeric(Directory::inbox(), a).unwrap(),
            Uid::numeric(Directory::new(["Work"]), b).unwrap(),
            Uid::numeric(Directory::inbox(), c).unwrap(),
        ];

        let fetched = imap.fetch_multiple_envelopes(&uids).await.unwrap();
        assert_eq!(fetched.len(), 3);
        assert_eq!(imap.session().count("SELECT"), 2);
        assert_eq!(imap.session().count("UID FETCH ENVELOPE"), 2);
    }

    #[tokio::test]
    async fn body_and_missing_message() {
        let mut session = FakeSession::new('/');
        let n = session.deliver("INBOX", "hello");
        let mut imap = Imap::new(session);

        let body = imap
            .fetch_body(&Uid::numeric(Directory::inbox(), n).unwrap())
            .await
            .unwrap();
        assert!(body.starts_with(b"Subject: hello"));

        let err = imap
            .fetch_envelope(&Uid::numeric(Directory::inbox(), 99).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::UnknownMessage(_)));
    }

    #[tokio::test]
    async fn text_uid_is_foreign() {
        let mut imap = Imap::new(FakeSession::new('/'));
        let err = imap
            .fetch_flags(&Uid::text(Directory::inbox(), "AAMkAD"))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ForeignUid(_)));
    }
}

mod move_tests {
    use super::*;

    #[tokio::test]
    async fn move_uses_copyuid() {
        let mut session = FakeSession::new('.');
        session.create("INBOX.Archive");
        session.deliver("INBOX.Archive", "older");
        let n = session.deliver("INBOX", "m");
        let mut imap = Imap::new(session);
        imap.list_dirs().await.unwrap();
        let uid = Uid::numeric(Directory::inbox(), n).unwrap();
        let before = imap.fetch_envelope(&uid).await.unwrap();

        let archive = inbox_child("Archive");
        let moved = imap.move_message_id(&uid, &archive).await.unwrap();
        assert_eq!(moved.directory(), &archive);
        assert_eq!(moved.local().as_number(), Some(2));
        assert_eq!(imap.fetch_envelope(&moved).await.unwrap(), before);
        assert!(imap.session().sent("UID MOVE 1 INBOX.Archive"));
    }

    #[tokio::test]
    async fn move_without_uidplus_finds_new_uid() {
        let mut session = FakeSession::new('/');
        session.deliver("Archive", "older archived mail");
        session.deliver("INBOX", "incoming");
        session.uidplus = false;
        let mut imap = Imap::new(session);

        let mut message = get_messages(&mut imap, &Directory::inbox())
            .await
            .unwrap()
            .remove(0);
        let actions: Vec<Arc<dyn Action>> = vec![
            Arc::new(Move::new(["Archive"])),
            Arc::new(ChangeFlags::add([Flag::Flagged])),
        ];
        assert_ok!(run_pipeline(&mut imap, &mut message, &actions).await);

        let expected = Uid::numeric(Directory::new(["Archive"]), 2).unwrap();
        assert_eq!(message.uid(), &expected);
        let archive = &imap.session().mailboxes["Archive"].messages;
        assert!(archive[&1].flags.is_empty());
        assert!(archive[&2].flags.contains(&Flag::Flagged));
        assert_eq!(archive[&2].envelope.subject.as_deref(), Some("incoming"));
    }

    #[tokio::test]
    async fn move_without_copyuid_or_uidnext_is_unknown() {
        let mut session = FakeSession::new('/');
        session.create("Archive");
        let n = session.deliver("INBOX", "m");
        session.uidplus = false;
        session.report_status = false;
        let mut imap = Imap::new(session);

        let uid = Uid::numeric(Directory::inbox(), n).unwrap();
        let err = imap
            .move_message_id(&uid, &Directory::new(["Archive"]))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::UnknownMessage(_)));
        assert_eq!(imap.session().mailboxes["Archive"].messages.len(), 1);
    }

    #[tokio::test]
    async fn copyuid_once_seen_skips_target_select() {
        let mut session = FakeSession::new('/');
        session.create("Archive");
        let first = session.deliver("INBOX", "one");
        let second = session.deliver("INBOX", "two");
        let mut imap = Imap::new(session);
        let archive = Directory::new(["Archive"]);

        for n in [first, second] {
            imap.move_message_id(&Uid::numeric(Directory::inbox(), n).unwrap(), &archive)
                .await
                .unwrap();
        }
        assert_eq!(imap.session().count("SELECT Archive"), 1);
        assert_eq!(imap.session().count("UID SEARCH ALL"), 0);
    }
}

mod flag_tests {
    use super::*;

    #[tokio::test]
    async fn store_returns_server_flags() {
        let mut session = FakeSession::new('/');
        let n = session.deliver("INBOX", "m");
        let mut imap = Imap::new(session);
        let uid = Uid::numeric(Directory::inbox(), n).unwrap();
        let before = imap.fetch_flags(&uid).await.unwrap();

        let change = Flags::from([Flag::Seen, Flag::keyword("$Label1")]);
        let added = imap.add_flags(&uid, &change).await.unwrap();
        assert_eq!(added, change);
        let removed = imap.remove_flags(&uid, &change).await.unwrap();
        assert_eq!(removed, before);
    }

    #[tokio::test]
    async fn quiet_store_refetches_flags() {
        let mut session = FakeSession::new('/');
        let n = session.deliver("INBOX", "m");
        session.quiet_store = true;
        let mut imap = Imap::new(session);
        let uid = Uid::numeric(Directory::inbox(), n).unwrap();

        let change = Flags::from([Flag::Flagged]);
        let flags = imap.add_flags(&uid, &change).await.unwrap();
        assert!(flags.contains(&Flag::Flagged));
        assert_eq!(imap.session().count("UID FETCH 1 FLAGS"), 1);
    }
}

#[tokio::test]
async fn scheduler_files_inbox_into_archive() {
    let mut session = FakeSession::new('/');
    session.create("Archive");
    session.deliver("INBOX", "file me");
    let mut imap = Imap::new(session);

    let actions: Vec<Arc<dyn Action>> = vec![Arc::new(Move::new(["Archive"])), Arc::new(Stop)];
    let rules = HashMap::from([(Directory::inbox(), actions)]);
    let interval = Duration::from_secs(1);
    let cancel = CancellationToken::new();
    let result = run(&mut imap, rules, interval, Some(1), &cancel).await;
    assert_ok!(result);

    let session = imap.into_session();
    assert!(session.mailboxes["INBOX"].messages.is_empty());
    assert_eq!(session.mailboxes["Archive"].messages.len(), 1);
}
