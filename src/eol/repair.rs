use std::borrow::Borrow;
use std::cmp::Reverse;

use serde::Serialize;
use thiserror::Error;

use super::{LineTerminatorKind, LineTerminatorOccurrence};

/// Errors raised when planning a repair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RepairError {
    /// The requested target is not a single concrete terminator.
    #[error("invalid repair target {0:?}: expected a concrete line terminator")]
    InvalidTargetKind(LineTerminatorKind),
}

/// Replace `remove_len` chars at `start` with `insert`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Replacement {
    /// Char offset of the span to replace.
    pub start: usize,
    /// Number of chars removed.
    pub remove_len: usize,
    /// Text inserted in their place.
    pub insert: &'static str,
}

impl Replacement {
    /// End of the replaced span (exclusive), saturating at `usize::MAX`.
    pub const fn end(&self) -> usize {
        self.start.saturating_add(self.remove_len)
    }

    /// End of the replaced span, or `None` if it overflows.
    pub const fn checked_end(&self) -> Option<usize> {
        self.start.checked_add(self.remove_len)
    }
}

/// Plan the replacements that rewrite every terminator to `target`.
///
/// One replacement is produced per occurrence whose kind is neither
/// `target` nor `None`. The list is sorted by strictly descending `start`
/// and must be applied in that order: rewriting a later line never moves an
/// earlier one, so every offset stays valid against the original snapshot.
///
/// An empty list means the snapshot already uses `target` throughout.
///
/// # Errors
/// Returns [`RepairError::InvalidTargetKind`] when `target` is `None`.
pub fn plan_repair<I>(
    occurrences: I,
    target: LineTerminatorKind,
) -> Result<Vec<Replacement>, RepairError>
where
    I: IntoIterator,
    I::Item: Borrow<LineTerminatorOccurrence>,
{
    if target.is_none() {
        return Err(RepairError::InvalidTargetKind(target));
    }

    let mut plan: Vec<Replacement> = occurrences
        .into_iter()
        .map(|o| *o.borrow())
        .filter(|o| !o.kind.is_none() && o.kind != target)
        .map(|o| Replacement {
            start: o.start,
            remove_len: o.len,
            insert: target.as_str(),
        })
        .collect();
    plan.sort_by_key(|r| Reverse(r.start));

    tracing::trace!(target_kind = ?target, replacements = plan.len(), "planned line break repair");
    Ok(plan)
}
