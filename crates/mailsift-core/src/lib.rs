//! # mailsift-core
//!
//! Rule engine for remote mailboxes.
//!
//! This crate provides:
//! - A uniform directory/message/flag model over mail backends ([`Remote`])
//! - Actions and the pipeline that chains them per message
//! - A polling scheduler that skips directories without changes
//! - Address pattern matching for rule predicates
//! - An in-memory backend ([`MemoryRemote`]) for trying rules out
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! use mailsift_core::{Action, Directory, MemoryRemote, Move, PollConfig, Scheduler, Stop};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> mailsift_core::Result<()> {
//!     let mut remote = MemoryRemote::new();
//!     let actions: Vec<Arc<dyn Action>> = vec![Arc::new(Move::new(["Archive"])), Arc::new(Stop)];
//!     let rules = HashMap::from([(Directory::inbox(), actions)]);
//!
//!     let config = PollConfig::default().with_max_iterations(1);
//!     Scheduler::from_config(rules, &config)
//!         .run(&mut remote, &CancellationToken::new())
//!         .await
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod action;
pub mod address;
pub mod config;
pub mod envelope;
mod error;
pub mod message;
pub mod pipeline;
pub mod remote;
pub mod scheduler;
pub mod types;

pub use action::{Action, ChangeFlags, FnAction, Move, Outcome, Predicate, Stop, When};
pub use address::{Address, AddressMatcher};
pub use config::PollConfig;
pub use envelope::{Envelope, Participants};
pub use error::{Error, Result};
pub use message::Message;
pub use pipeline::{PipelineOutcome, run_pipeline};
pub use remote::{
    DirValidity, MemoryRemote, MemoryStats, Remote, get_messages, group_by_directory, move_message,
};
pub use scheduler::{DirActions, PassReport, Scheduler, run};
pub use types::{Directory, Flag, Flags, LocalId, Uid, Watermark};
