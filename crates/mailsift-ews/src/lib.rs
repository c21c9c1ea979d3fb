//! # mailsift-ews
//!
//! Exchange Web Services backend for `mailsift-core`.
//!
//! [`Ews`] implements [`mailsift_core::Remote`] on top of any
//! [`EwsSession`], an already authenticated connection. Token acquisition
//! and the SOAP transport belong to the session implementation.
//!
//! ## Mapping
//!
//! - Folders are directories named by their display-name path.
//! - Message ids are Exchange item ids.
//! - The watermark of a directory is its `SyncFolderItems` sync state; a
//!   sync without changes keeps the previous watermark.
//! - Categories are flags. The read state is the synthetic `\Seen` flag,
//!   which is written back as `IsRead` and never stored as a category.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod config;
mod error;
mod remote;
pub mod session;
pub mod types;

pub use config::EwsOptions;
pub use error::{Error, Result};
pub use remote::Ews;
pub use session::EwsSession;
pub use types::{EwsMailbox, Item, ItemId, ItemUpdate, SyncResult};
