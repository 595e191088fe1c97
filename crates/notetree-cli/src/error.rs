use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] notetree_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Note title cannot be empty")]
    EmptyTitle,
    #[error("Nothing to update; pass --username and/or --email")]
    EmptyProfileUpdate,
    #[error(
        "No service configured. Run `notetree config init --base-url URL` or set NOTETREE_BASE_URL."
    )]
    NotConfigured,
}
