//! The polling loop.
//!
//! Each pass walks the backend's directories, skips the ones without rules
//! or without changes since the last successful scan, and runs the
//! directory's actions on every message of the others.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::Result;
use crate::action::Action;
use crate::config::PollConfig;
use crate::pipeline::run_pipeline;
use crate::remote::{Remote, get_messages};
use crate::types::{Directory, Watermark};

/// Ordered actions per directory of interest.
pub type DirActions = HashMap<Directory, Vec<Arc<dyn Action>>>;

/// Summary of one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Directories scanned to the end. A scan cut short by cancellation is
    /// not counted.
    pub scanned: usize,
    /// Configured directories skipped because nothing changed.
    pub unchanged: usize,
    /// Messages whose pipeline completed.
    pub messages: usize,
    /// Messages whose pipeline failed with a message-scoped error.
    pub failed: usize,
    /// The pass ended early because of cancellation.
    pub cancelled: bool,
}

/// Polling scheduler over one backend connection.
///
/// Watermarks live only as long as the scheduler; a fresh scheduler scans
/// every configured directory on its first pass.
#[derive(Debug)]
pub struct Scheduler {
    rules: DirActions,
    watermarks: HashMap<Directory, Watermark>,
    interval: Duration,
    max_iterations: Option<u64>,
    passes: u64,
}

impl Scheduler {
    /// Creates a scheduler; every configured directory starts out unseen.
    #[must_use]
    pub fn new(rules: DirActions, interval: Duration, max_iterations: Option<u64>) -> Self {
        let watermarks = rules
            .keys()
            .map(|dir| (dir.clone(), Watermark::unseen()))
            .collect();
        Self {
            rules,
            watermarks,
            interval,
            max_iterations,
            passes: 0,
        }
    }

    /// Creates a scheduler with timing taken from `config`.
    #[must_use]
    pub fn from_config(rules: DirActions, config: &PollConfig) -> Self {
        Self::new(rules, config.interval(), config.max_iterations)
    }

    /// The watermark recorded for `dir` after its last complete scan.
    #[must_use]
    pub fn watermark(&self, dir: &Directory) -> Option<&Watermark> {
        self.watermarks.get(dir)
    }

    /// Number of passes started so far.
    #[must_use]
    pub const fn passes(&self) -> u64 {
        self.passes
    }

    /// Runs one pass over all directories.
    ///
    /// The watermark of a directory is only committed once all its messages
    /// were processed, so an interrupted scan is repeated on the next pass.
    ///
    /// # Errors
    ///
    /// Backend errors abort the pass. Message-scoped errors are logged and
    /// counted in [`PassReport::failed`].
    pub async fn pass(
        &mut self,
        remote: &mut dyn Remote,
        cancel: &CancellationToken,
    ) -> Result<PassReport> {
        self.passes += 1;
        let mut report = PassReport::default();

        for dir in remote.list_dirs().await? {
            if cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }
            let Some(actions) = self.rules.get(&dir) else {
                continue;
            };

            let previous = self
                .watermarks
                .get(&dir)
                .cloned()
                .unwrap_or_else(Watermark::unseen);
            let validity = remote.dir_validity(&dir, &previous).await?;
            if !validity.changed {
                debug!(dir = %dir, "directory unchanged");
                report.unchanged += 1;
                continue;
            }

            let messages = get_messages(remote, &dir).await?;
            debug!(dir = %dir, count = messages.len(), "scanning directory");
            let mut complete = true;
            for mut message in messages {
                if cancel.is_cancelled() {
                    complete = false;
                    report.cancelled = true;
                    break;
                }
                match run_pipeline(remote, &mut message, actions).await {
                    Ok(_) => report.messages += 1,
                    Err(err) if err.is_message_scoped() => {
                        error!(
                            dir = %dir,
                            uid = %message.uid(),
                            error = %err,
                            "rule failed for message"
                        );
                        report.failed += 1;
                    }
                    Err(err) => return Err(err),
                }
            }

            if complete {
                report.scanned += 1;
                self.watermarks.insert(dir, validity.watermark);
            }
        }

        Ok(report)
    }

    /// Runs passes until the iteration budget is spent or `cancel` fires.
    ///
    /// Waits the configured interval between passes, waking early on
    /// cancellation. No wait follows the last budgeted pass.
    ///
    /// # Errors
    ///
    /// Returns the first error that aborted a pass.
    pub async fn run(&mut self, remote: &mut dyn Remote, cancel: &CancellationToken) -> Result<()> {
        let mut remaining = self.max_iterations;

        while remaining != Some(0) && !cancel.is_cancelled() {
            let report = self.pass(remote, cancel).await?;
            info!(
                pass = self.passes,
                scanned = report.scanned,
                unchanged = report.unchanged,
                messages = report.messages,
                failed = report.failed,
                "pass finished"
            );

            if let Some(left) = remaining.as_mut() {
                *left = left.saturating_sub(1);
                if *left == 0 {
                    break;
                }
            }

            tokio::select! {
                () = cancel.cancelled() => {}
                () = tokio::time::sleep(self.interval) => {}
            }
        }

        if cancel.is_cancelled() {
            info!(passes = self.passes, "scheduler cancelled");
        }
        Ok(())
    }
}

/// Polls `remote` with `dir_actions` until `max_iterations` passes ran or
/// `cancel` fires.
///
/// # Errors
///
/// Returns the first error that aborted a pass.
pub async fn run(
    remote: &mut dyn Remote,
    dir_actions: DirActions,
    interval: Duration,
    max_iterations: Option<u64>,
    cancel: &CancellationToken,
) -> Result<()> {
    Scheduler::new(dir_actions, interval, max_iterations)
        .run(remote, cancel)
        .await
}
