//! A message being processed by the rules.

use bytes::Bytes;
use mail_parser::MessageParser;

use crate::Result;
use crate::address::Address;
use crate::envelope::Envelope;
use crate::remote::Remote;
use crate::types::{Directory, Flags, Uid};

/// Handle on one message of a remote mailbox.
///
/// The envelope is fixed once fetched. Body and flags are fetched lazily
/// through the [`Remote`] passed in, at most once per handle; flag changes
/// made through actions refresh the cached flags with what the backend
/// reported.
#[derive(Debug, Clone)]
pub struct Message {
    uid: Uid,
    directory: Directory,
    envelope: Envelope,
    flags: Option<Flags>,
    raw: Option<Bytes>,
}

impl Message {
    /// Creates a handle for a message located in `directory`.
    #[must_use]
    pub fn new(uid: Uid, directory: Directory, envelope: Envelope) -> Self {
        Self {
            uid,
            directory,
            envelope,
            flags: None,
            raw: None,
        }
    }

    /// Attaches an already known raw body.
    #[must_use]
    pub fn with_body(mut self, raw: impl Into<Bytes>) -> Self {
        self.raw = Some(raw.into());
        self
    }

    /// Attaches already known flags.
    #[must_use]
    pub fn with_flags(mut self, flags: Flags) -> Self {
        self.flags = Some(flags);
        self
    }

    /// The message id.
    #[must_use]
    pub const fn uid(&self) -> &Uid {
        &self.uid
    }

    /// The directory the message currently lives in.
    #[must_use]
    pub const fn directory(&self) -> &Directory {
        &self.directory
    }

    /// The header summary.
    #[must_use]
    pub const fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// From addresses.
    #[must_use]
    pub fn from(&self) -> &[Address] {
        &self.envelope.from
    }

    /// To addresses.
    #[must_use]
    pub fn to(&self) -> &[Address] {
        &self.envelope.to
    }

    /// Cc addresses.
    #[must_use]
    pub fn cc(&self) -> &[Address] {
        &self.envelope.cc
    }

    /// To followed by Cc.
    pub fn recipients(&self) -> impl Iterator<Item = &Address> {
        self.envelope.to.iter().chain(&self.envelope.cc)
    }

    /// The subject header as delivered, possibly RFC 2047 encoded.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.envelope.subject.as_deref()
    }

    /// The subject with encoded words decoded.
    #[must_use]
    pub fn decoded_subject(&self) -> Option<String> {
        let raw = self.subject()?;
        let header = format!("Subject: {raw}\r\n\r\n");
        MessageParser::default()
            .parse(header.as_bytes())
            .and_then(|parsed| parsed.subject().map(str::to_string))
            .or_else(|| Some(raw.to_string()))
    }

    /// Flags as last seen, without contacting the backend.
    #[must_use]
    pub const fn cached_flags(&self) -> Option<&Flags> {
        self.flags.as_ref()
    }

    /// The raw body, already fetched or not.
    #[must_use]
    pub const fn cached_body(&self) -> Option<&Bytes> {
        self.raw.as_ref()
    }

    /// The full raw message, fetched on first use.
    ///
    /// # Errors
    ///
    /// Propagates the backend error of the first fetch.
    pub async fn body(&mut self, remote: &mut dyn Remote) -> Result<&Bytes> {
        let raw = match self.raw.take() {
            Some(raw) => raw,
            None => remote.fetch_body(&self.uid).await?,
        };
        Ok(self.raw.insert(raw))
    }

    /// The first `text/plain` part of the body, if there is one.
    ///
    /// # Errors
    ///
    /// Propagates the backend error of the body fetch.
    pub async fn body_text(&mut self, remote: &mut dyn Remote) -> Result<Option<String>> {
        let raw = self.body(remote).await?;
        Ok(MessageParser::default()
            .parse(&raw[..])
            .and_then(|parsed| parsed.body_text(0).map(std::borrow::Cow::into_owned)))
    }

    /// The message flags, fetched on first use.
    ///
    /// # Errors
    ///
    /// Propagates the backend error of the first fetch.
    pub async fn flags(&mut self, remote: &mut dyn Remote) -> Result<&Flags> {
        let flags = match self.flags.take() {
            Some(flags) => flags,
            None => remote.fetch_flags(&self.uid).await?,
        };
        Ok(self.flags.insert(flags))
    }

    pub(crate) fn relocate(&mut self, uid: Uid, directory: Directory) {
        self.uid = uid;
        self.directory = directory;
    }

    pub(crate) fn record_flags(&mut self, flags: Flags) {
        self.flags = Some(flags);
    }
}
