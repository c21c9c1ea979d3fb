//! Actions built from closures.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use super::{Action, Outcome};
use crate::Result;
use crate::address::AddressMatcher;
use crate::envelope::Participants;
use crate::message::Message;
use crate::remote::Remote;

/// Condition evaluated against a message envelope.
pub type Predicate = Arc<dyn Fn(&Message) -> bool + Send + Sync>;

type Handler = Arc<dyn Fn(&Message) -> Outcome + Send + Sync>;

/// Runs a synchronous closure on each message.
///
/// The closure sees the message read-only and decides how the pipeline
/// goes on, e.g. logging the envelope and returning [`Outcome::done`].
#[derive(Clone)]
pub struct FnAction {
    name: String,
    handler: Handler,
}

impl FnAction {
    /// Wraps `handler` under `name`.
    pub fn new<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Message) -> Outcome + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            handler: Arc::new(handler),
        }
    }
}

impl fmt::Debug for FnAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnAction")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Action for FnAction {
    fn name(&self) -> &str {
        &self.name
    }

    async fn apply(&self, _remote: &mut dyn Remote, message: &mut Message) -> Result<Outcome> {
        Ok((self.handler)(message))
    }
}

/// Runs follow-up actions for messages that satisfy a predicate.
///
/// The follow-ups are injected right after the `When`, ahead of the rest of
/// the directory's actions. Messages failing the predicate get the
/// `otherwise` actions, which are empty unless configured.
#[derive(Clone)]
pub struct When {
    name: String,
    predicate: Predicate,
    then: Vec<Arc<dyn Action>>,
    otherwise: Vec<Arc<dyn Action>>,
}

impl When {
    /// Creates a conditional over an arbitrary predicate.
    pub fn new<F>(name: impl Into<String>, predicate: F, then: Vec<Arc<dyn Action>>) -> Self
    where
        F: Fn(&Message) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            predicate: Arc::new(predicate),
            then,
            otherwise: Vec::new(),
        }
    }

    /// Holds when any address in the selected participant list matches.
    #[must_use]
    pub fn address(
        matcher: AddressMatcher,
        field: Participants,
        then: Vec<Arc<dyn Action>>,
    ) -> Self {
        Self::new(
            format!("When({field:?})"),
            move |message: &Message| matcher.matches_any(message.envelope().participants(field)),
            then,
        )
    }

    /// Actions for messages that do not satisfy the predicate.
    #[must_use]
    pub fn otherwise(mut self, actions: Vec<Arc<dyn Action>>) -> Self {
        self.otherwise = actions;
        self
    }
}

impl fmt::Debug for When {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("When")
            .field("name", &self.name)
            .field("then", &self.then)
            .field("otherwise", &self.otherwise)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Action for When {
    fn name(&self) -> &str {
        &self.name
    }

    async fn apply(&self, _remote: &mut dyn Remote, message: &mut Message) -> Result<Outcome> {
        let branch = if (self.predicate)(message) {
            &self.then
        } else {
            &self.otherwise
        };
        Ok(Outcome::Continue(branch.clone()))
    }
}
