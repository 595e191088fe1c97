//! notetree-core - client library for the notetree note service
//!
//! This crate contains the authenticated HTTP transport, the note and user
//! resource clients, the flat-to-tree builder, the editor's content sync
//! scheduler and session state used by every notetree front-end.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod session;
pub mod sync;
pub mod transport;
pub mod tree;
pub mod util;

#[cfg(test)]
mod test_support;

pub use client::NoteTreeClient;
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use models::{Note, NoteId, User, UserId};
pub use tree::{build_tree, TreeNode, TreeOptions};
