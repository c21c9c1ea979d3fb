//! Runs an action sequence against one message.

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::debug;

use crate::Result;
use crate::action::{Action, Outcome};
use crate::message::Message;
use crate::remote::Remote;

/// How a pipeline run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// Every queued action ran.
    Exhausted,
    /// An action returned [`Outcome::Stop`].
    Terminated,
}

/// Applies `actions` to `message` in order.
///
/// Actions returned by a step run immediately after it, before the rest of
/// the queue. A runaway chain that keeps injecting itself never finishes.
///
/// # Errors
///
/// The first failing action's error is returned and no further actions run.
pub async fn run_pipeline(
    remote: &mut dyn Remote,
    message: &mut Message,
    actions: &[Arc<dyn Action>],
) -> Result<PipelineOutcome> {
    let mut queue: VecDeque<Arc<dyn Action>> = actions.iter().cloned().collect();

    while let Some(action) = queue.pop_front() {
        debug!(action = action.name(), uid = %message.uid(), "applying action");
        match action.apply(remote, message).await? {
            Outcome::Stop => {
                debug!(action = action.name(), uid = %message.uid(), "pipeline stopped");
                return Ok(PipelineOutcome::Terminated);
            }
            Outcome::Continue(next) => {
                for injected in next.into_iter().rev() {
                    queue.push_front(injected);
                }
            }
        }
    }

    Ok(PipelineOutcome::Exhausted)
}
