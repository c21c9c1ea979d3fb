//! Rule steps applied to messages.
//!
//! An [`Action`] receives the backend and the message it works on and
//! returns an [`Outcome`]: either the actions to run right after itself, or
//! the end of processing for this message.

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;

use crate::Result;
use crate::message::Message;
use crate::remote::Remote;

mod builtin;
mod custom;

pub use builtin::{ChangeFlags, Move, Stop};
pub use custom::{FnAction, Predicate, When};

/// Result of applying one action.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Keep going. The actions run before whatever was queued after the
    /// current one; an empty list just continues with the queue.
    Continue(Vec<Arc<dyn Action>>),
    /// Stop processing this message. Nothing queued runs anymore.
    Stop,
}

impl Outcome {
    /// Continue without injecting anything.
    #[must_use]
    pub const fn done() -> Self {
        Self::Continue(Vec::new())
    }

    /// Continue with `actions` next.
    #[must_use]
    pub fn then(actions: impl IntoIterator<Item = Arc<dyn Action>>) -> Self {
        Self::Continue(actions.into_iter().collect())
    }

    /// Returns true for [`Outcome::Stop`].
    #[must_use]
    pub const fn is_stop(&self) -> bool {
        matches!(self, Self::Stop)
    }
}

/// A configured rule step.
///
/// Actions hold only their construction-time configuration; the same
/// instance is applied to every message of a directory.
#[async_trait]
pub trait Action: Send + Sync + Debug {
    /// Name used in logs and error reports. Defaults to the type name.
    fn name(&self) -> &str {
        let full = std::any::type_name::<Self>();
        let base = full.split('<').next().unwrap_or(full);
        base.rsplit("::").next().unwrap_or(base)
    }

    /// Applies the action to `message` through `remote`.
    ///
    /// # Errors
    ///
    /// Backend failures propagate. Failures that only concern `message`
    /// should be reported as [`crate::Error::Action`].
    async fn apply(&self, remote: &mut dyn Remote, message: &mut Message) -> Result<Outcome>;
}
