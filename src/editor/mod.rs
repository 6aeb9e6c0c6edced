//! Host text model.
//!
//! Provides a rope-backed text buffer that segments its content into line
//! terminator occurrences and applies repair plans as one atomic edit.

mod buffer;

pub use buffer::EditorBuffer;

use thiserror::Error;

use crate::eol::{LineTerminatorOccurrence, Replacement};

/// Occurrences of one buffer revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Buffer revision the occurrences were taken at.
    pub revision: u64,
    /// One entry per physical line, in document order.
    pub occurrences: Vec<LineTerminatorOccurrence>,
}

/// Yields the current line terminators of a document.
pub trait SnapshotSource {
    fn snapshot(&self) -> Snapshot;
}

/// Applies a list of replacements as a single transaction.
pub trait EditSink {
    /// Apply `replacements`, computed against `base_revision`, all or nothing.
    ///
    /// # Errors
    /// Returns an [`EditError`] and leaves the buffer untouched when the
    /// revision is stale or any span is invalid.
    fn apply(&mut self, base_revision: u64, replacements: &[Replacement]) -> Result<(), EditError>;
}

/// Reasons an edit transaction is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("stale snapshot: edits computed at revision {expected}, buffer is at {actual}")]
    StaleSnapshot { expected: u64, actual: u64 },
    #[error("replacement {start}..{end} is out of bounds (buffer length {len})")]
    OutOfBounds { start: usize, end: usize, len: usize },
    #[error("replacement at {start} overlaps or follows the previous one")]
    Unordered { start: usize },
}
