//! Built-in actions.

use async_trait::async_trait;
use tracing::debug;

use super::{Action, Outcome};
use crate::message::Message;
use crate::remote::{Remote, move_message};
use crate::types::{Directory, Flags};
use crate::{Error, Result};

/// Ends processing of the current message.
#[derive(Debug, Clone, Copy, Default)]
pub struct Stop;

#[async_trait]
impl Action for Stop {
    async fn apply(&self, _remote: &mut dyn Remote, _message: &mut Message) -> Result<Outcome> {
        Ok(Outcome::Stop)
    }
}

/// Moves the message to a fixed directory.
///
/// The message's id and directory are updated to the new location, so
/// later actions operate on the moved message.
#[derive(Debug, Clone)]
pub struct Move {
    target: Directory,
}

impl Move {
    /// Creates a move to `target`.
    #[must_use]
    pub fn new(target: impl Into<Directory>) -> Self {
        Self {
            target: target.into(),
        }
    }

    /// The destination directory.
    #[must_use]
    pub const fn target(&self) -> &Directory {
        &self.target
    }
}

#[async_trait]
impl Action for Move {
    async fn apply(&self, remote: &mut dyn Remote, message: &mut Message) -> Result<Outcome> {
        move_message(remote, message, &self.target).await?;
        Ok(Outcome::done())
    }
}

/// Adds and removes flags.
///
/// The message's cached flags are replaced by what the backend reports
/// after the change.
#[derive(Debug, Clone)]
pub struct ChangeFlags {
    add: Flags,
    remove: Flags,
}

impl ChangeFlags {
    /// Creates the action.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AmbiguousFlags`] if a flag is both added and removed.
    pub fn new(add: impl Into<Flags>, remove: impl Into<Flags>) -> Result<Self> {
        let add = add.into();
        let remove = remove.into();
        if !add.is_disjoint(&remove) {
            return Err(Error::AmbiguousFlags(add.intersection(&remove)));
        }
        Ok(Self { add, remove })
    }

    /// Only adds `flags`.
    #[must_use]
    pub fn add(flags: impl Into<Flags>) -> Self {
        Self {
            add: flags.into(),
            remove: Flags::new(),
        }
    }

    /// Only removes `flags`.
    #[must_use]
    pub fn remove(flags: impl Into<Flags>) -> Self {
        Self {
            add: Flags::new(),
            remove: flags.into(),
        }
    }

    /// Flags to add.
    #[must_use]
    pub const fn added(&self) -> &Flags {
        &self.add
    }

    /// Flags to remove.
    #[must_use]
    pub const fn removed(&self) -> &Flags {
        &self.remove
    }
}

#[async_trait]
impl Action for ChangeFlags {
    async fn apply(&self, remote: &mut dyn Remote, message: &mut Message) -> Result<Outcome> {
        if !self.add.is_empty() {
            let flags = remote.add_flags(message.uid(), &self.add).await?;
            message.record_flags(flags);
        }
        if !self.remove.is_empty() {
            let flags = remote.remove_flags(message.uid(), &self.remove).await?;
            message.record_flags(flags);
        }
        debug!(uid = %message.uid(), add = %self.add, remove = %self.remove, "changed flags");
        Ok(Outcome::done())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::envelope::Envelope;
    use crate::remote::{MemoryRemote, get_messages};
    use crate::types::Flag;

    async fn setup() -> (MemoryRemote, Message) {
        let mut remote = MemoryRemote::new();
        remote.create_dir(&Directory::new(["Archive"]));
        remote.add_message_with_flags(
            &Directory::inbox(),
            Envelope::default(),
            "body",
            Flags::from([Flag::Recent]),
        );
        let message = get_messages(&mut remote, &Directory::inbox())
            .await
            .unwrap()
            .pop()
            .unwrap();
        (remote, message)
    }

    mod stop_tests {
        use super::*;

        #[tokio::test]
        async fn stop_terminates() {
            let (mut remote, mut message) = setup().await;
            let outcome = Stop.apply(&mut remote, &mut message).await.unwrap();
            assert!(outcome.is_stop());
            assert_eq!(Stop.name(), "Stop");
        }
    }

    mod move_tests {
        use super::*;

        #[tokio::test]
        async fn move_relocates_message() {
            let (mut remote, mut message) = setup().await;
            let action = Move::new(["Archive"]);

            let outcome = action.apply(&mut remote, &mut message).await.unwrap();
            assert!(matches!(outcome, Outcome::Continue(next) if next.is_empty()));
            let archive = Directory::new(["Archive"]);
            assert_eq!(message.directory(), &archive);
            assert_eq!(remote.messages(&archive), [message.uid().clone()]);
        }

        #[tokio::test]
        async fn move_to_missing_directory_fails() {
            let (mut remote, mut message) = setup().await;
            let err = Move::new(["Missing"])
                .apply(&mut remote, &mut message)
                .await
                .unwrap_err();
            assert!(matches!(err, Error::UnknownDirectory(_)));
        }
    }

    mod change_flags_tests {
        use super::*;

        #[test]
        fn overlapping_sets_rejected() {
            let err = ChangeFlags::new([Flag::keyword("a")], [Flag::keyword("a")]).unwrap_err();
            match err {
                Error::AmbiguousFlags(overlap) => {
                    assert_eq!(overlap, Flags::from([Flag::keyword("a")]));
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[tokio::test]
        async fn applies_both_sets_and_caches_result() {
            let (mut remote, mut message) = setup().await;
            let action = ChangeFlags::new([Flag::Seen, Flag::Flagged], [Flag::Recent]).unwrap();

            action.apply(&mut remote, &mut message).await.unwrap();
            let expected = Flags::from([Flag::Seen, Flag::Flagged]);
            assert_eq!(message.cached_flags(), Some(&expected));
            assert_eq!(remote.flags_of(message.uid()), Some(&expected));
            assert_eq!(remote.stats().flag_writes, 2);
        }

        #[tokio::test]
        async fn empty_set_is_skipped() {
            let (mut remote, mut message) = setup().await;
            ChangeFlags::add([Flag::Seen])
                .apply(&mut remote, &mut message)
                .await
                .unwrap();
            assert_eq!(remote.stats().flag_writes, 1);
            assert!(message.cached_flags().unwrap().is_seen());
        }
    }
}
