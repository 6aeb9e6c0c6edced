use ropey::Rope;

use super::{EditError, EditSink, Snapshot, SnapshotSource};
use crate::eol::{LineTerminatorKind, LineTerminatorOccurrence, Replacement};

/// A text buffer backed by a rope data structure.
///
/// Offsets handed out and accepted by the buffer are char indices. Every
/// applied transaction bumps the revision, which invalidates snapshots
/// taken before it.
pub struct EditorBuffer {
    rope: Rope,
    revision: u64,
    dirty: bool,
}

impl EditorBuffer {
    /// Create a new buffer from a string.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            revision: 0,
            dirty: false,
        }
    }

    /// Create an empty buffer.
    pub fn empty() -> Self {
        Self::from_text("")
    }

    /// Current revision; starts at 0.
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether the buffer has been modified since creation or last save.
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark the buffer as clean (e.g., after saving).
    pub const fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Length of the buffer in chars.
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Number of physical lines, counting only the terminators this crate
    /// recognizes. An empty buffer has one line.
    pub fn line_count(&self) -> usize {
        self.line_terminators().len()
    }

    /// Get the content of a line (without its terminator).
    pub fn line_at(&self, line_idx: usize) -> Option<String> {
        let terminators = self.line_terminators();
        let end = terminators.get(line_idx)?.start;
        let start = match line_idx.checked_sub(1) {
            Some(prev) => terminators.get(prev).map_or(0, |o| o.start + o.len),
            None => 0,
        };
        Some(self.rope.slice(start..end).to_string())
    }

    /// The full text content of the buffer.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Segment the buffer into one occurrence per physical line.
    ///
    /// The last entry is always the unterminated final line, which is empty
    /// when the buffer ends with a terminator.
    pub fn line_terminators(&self) -> Vec<LineTerminatorOccurrence> {
        let mut out = Vec::new();
        let mut chars = self.rope.chars().enumerate().peekable();
        while let Some((idx, ch)) = chars.next() {
            let Some(mut kind) = LineTerminatorKind::from_char(ch) else {
                continue;
            };
            if kind == LineTerminatorKind::Cr && chars.next_if(|&(_, next)| next == '\n').is_some() {
                kind = LineTerminatorKind::Crlf;
            }
            out.push(LineTerminatorOccurrence::new(kind, idx));
        }
        out.push(LineTerminatorOccurrence::unterminated(self.rope.len_chars()));
        out
    }

    fn validate(&self, base_revision: u64, replacements: &[Replacement]) -> Result<(), EditError> {
        if base_revision != self.revision {
            return Err(EditError::StaleSnapshot {
                expected: base_revision,
                actual: self.revision,
            });
        }
        let len = self.rope.len_chars();
        let mut floor = len;
        for r in replacements {
            let end = match r.checked_end() {
                Some(end) if end <= len => end,
                _ => {
                    return Err(EditError::OutOfBounds {
                        start: r.start,
                        end: r.end(),
                        len,
                    });
                }
            };
            // Each span must end at or before the start of the one applied
            // before it.
            if end > floor {
                return Err(EditError::Unordered { start: r.start });
            }
            floor = r.start;
        }
        Ok(())
    }
}

impl Default for EditorBuffer {
    fn default() -> Self {
        Self::empty()
    }
}

impl SnapshotSource for EditorBuffer {
    fn snapshot(&self) -> Snapshot {
        Snapshot {
            revision: self.revision,
            occurrences: self.line_terminators(),
        }
    }
}

impl EditSink for EditorBuffer {
    fn apply(&mut self, base_revision: u64, replacements: &[Replacement]) -> Result<(), EditError> {
        self.validate(base_revision, replacements)?;
        if replacements.is_empty() {
            return Ok(());
        }
        for r in replacements {
            self.rope.remove(r.start..r.end());
            self.rope.insert(r.start, r.insert);
        }
        self.revision += 1;
        self.dirty = true;
        Ok(())
    }
}

impl std::fmt::Debug for EditorBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorBuffer")
            .field(
                "rope",
                &format_args!("Rope({} chars)", self.rope.len_chars()),
            )
            .field("revision", &self.revision)
            .field("dirty", &self.dirty)
            .finish()
    }
}
