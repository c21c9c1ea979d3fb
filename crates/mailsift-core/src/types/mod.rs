//! Core value types shared by backends, actions and the scheduler.

#![allow(clippy::missing_const_for_fn)]

mod directory;
mod flags;
mod uid;
mod watermark;

pub use directory::Directory;
pub use flags::{Flag, Flags};
pub use uid::{LocalId, Uid};
pub use watermark::Watermark;
