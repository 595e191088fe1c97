//! Sync state of the note open in the editor.

/// Persistence state of the open note's content.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncState {
    /// Local content matches the last successful flush
    Clean,
    /// Local edits are waiting for the next flush
    Dirty,
    /// A flush is in flight
    Flushing,
}

impl SyncState {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Clean => "saved",
            Self::Dirty => "unsaved",
            Self::Flushing => "saving",
        }
    }
}

/// Result of one scheduler tick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Nothing to do: no open note, nothing dirty, or a flush already in flight
    Skipped,
    Flushed,
    /// The save failed; the content stays dirty for the next tick
    Failed,
    /// The note was switched or closed while the save was in flight
    Superseded,
}
