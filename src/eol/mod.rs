//! Line terminator analysis.
//!
//! This module handles:
//! - The recognized terminator kinds and their per-line occurrences
//! - Classifying a snapshot's terminators into a dominant kind and label
//! - Planning the replacements that normalize a snapshot to one terminator
//!
//! Everything here is pure. Segmenting text into occurrences is the host
//! text model's job (see [`crate::editor`]).

mod classify;
mod repair;

pub use classify::{AnalysisResult, classify, deviating_lines};
pub use repair::{RepairError, Replacement, plan_repair};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A recognized line terminator sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LineTerminatorKind {
    /// Carriage return + line feed, `"\r\n"`.
    Crlf,
    /// Carriage return, `"\r"`.
    Cr,
    /// Line feed, `"\n"`.
    Lf,
    /// Next line, U+0085.
    Nel,
    /// Line separator, U+2028.
    Ls,
    /// Paragraph separator, U+2029.
    Ps,
    /// The line has no trailing terminator (e.g. the final line).
    None,
}

impl LineTerminatorKind {
    /// Every kind that denotes an actual terminator, i.e. all but `None`.
    pub const TERMINATORS: [Self; 6] = [Self::Crlf, Self::Cr, Self::Lf, Self::Nel, Self::Ls, Self::Ps];

    /// The terminator text.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Crlf => "\r\n",
            Self::Cr => "\r",
            Self::Lf => "\n",
            Self::Nel => "\u{0085}",
            Self::Ls => "\u{2028}",
            Self::Ps => "\u{2029}",
            Self::None => "",
        }
    }

    /// Length of the terminator in chars: 2 for CRLF, 0 for `None`, 1 otherwise.
    pub const fn len(self) -> usize {
        match self {
            Self::Crlf => 2,
            Self::None => 0,
            _ => 1,
        }
    }

    /// Whether this is the `None` (unterminated) kind.
    pub const fn is_none(self) -> bool {
        matches!(self, Self::None)
    }

    /// Short human-readable name, as shown in a status bar.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Crlf => "CR/LF",
            Self::Cr => "CR",
            Self::Lf => "LF",
            Self::Nel => "NEL",
            Self::Ls => "LS",
            Self::Ps => "PS",
            Self::None => "",
        }
    }

    /// Classify a single-char terminator. CR is reported as `Cr`; callers
    /// that see a following LF fold the pair into `Crlf` themselves.
    pub const fn from_char(ch: char) -> Option<Self> {
        match ch {
            '\r' => Some(Self::Cr),
            '\n' => Some(Self::Lf),
            '\u{0085}' => Some(Self::Nel),
            '\u{2028}' => Some(Self::Ls),
            '\u{2029}' => Some(Self::Ps),
            _ => None,
        }
    }

    // Dense slot used by the classifier's counters.
    const fn slot(self) -> Option<usize> {
        match self {
            Self::Crlf => Some(0),
            Self::Cr => Some(1),
            Self::Lf => Some(2),
            Self::Nel => Some(3),
            Self::Ls => Some(4),
            Self::Ps => Some(5),
            Self::None => None,
        }
    }
}

impl fmt::Display for LineTerminatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when parsing a [`LineTerminatorKind`] from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown line terminator `{0}` (expected crlf, cr, lf, nel, ls or ps)")]
pub struct ParseKindError(String);

impl FromStr for LineTerminatorKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "crlf" | "cr/lf" | "\\r\\n" => Ok(Self::Crlf),
            "cr" | "\\r" => Ok(Self::Cr),
            "lf" | "\\n" => Ok(Self::Lf),
            "nel" => Ok(Self::Nel),
            "ls" => Ok(Self::Ls),
            "ps" => Ok(Self::Ps),
            _ => Err(ParseKindError(s.to_string())),
        }
    }
}

/// The terminator of one physical line within a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineTerminatorOccurrence {
    /// Which terminator ends the line.
    pub kind: LineTerminatorKind,
    /// Char offset of the terminator (for `None`, the end of the line).
    pub start: usize,
    /// Terminator length in chars, always `kind.len()`.
    pub len: usize,
}

impl LineTerminatorOccurrence {
    /// Occurrence of `kind` starting at `start`.
    pub const fn new(kind: LineTerminatorKind, start: usize) -> Self {
        Self {
            kind,
            start,
            len: kind.len(),
        }
    }

    /// A line that ends at `end` with no terminator.
    pub const fn unterminated(end: usize) -> Self {
        Self::new(LineTerminatorKind::None, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lengths_match_terminator_text() {
        for kind in LineTerminatorKind::TERMINATORS {
            assert_eq!(kind.len(), kind.as_str().chars().count(), "{kind:?}");
        }
        assert_eq!(LineTerminatorKind::None.len(), 0);
    }

    #[test]
    fn test_occurrence_len_follows_kind() {
        assert_eq!(LineTerminatorOccurrence::new(LineTerminatorKind::Crlf, 4).len, 2);
        assert_eq!(LineTerminatorOccurrence::new(LineTerminatorKind::Ls, 4).len, 1);
        assert_eq!(LineTerminatorOccurrence::unterminated(9).len, 0);
    }

    #[test]
    fn test_from_char_recognizes_unicode_separators() {
        assert_eq!(LineTerminatorKind::from_char('\u{85}'), Some(LineTerminatorKind::Nel));
        assert_eq!(LineTerminatorKind::from_char('\u{2028}'), Some(LineTerminatorKind::Ls));
        assert_eq!(LineTerminatorKind::from_char('\u{2029}'), Some(LineTerminatorKind::Ps));
        // Vertical tab and form feed are not line terminators here
        assert_eq!(LineTerminatorKind::from_char('\u{0B}'), None);
        assert_eq!(LineTerminatorKind::from_char('\u{0C}'), None);
    }

    #[test]
    fn test_parse_accepts_names_and_labels() {
        assert_eq!("crlf".parse(), Ok(LineTerminatorKind::Crlf));
        assert_eq!("CR/LF".parse(), Ok(LineTerminatorKind::Crlf));
        assert_eq!(" LF ".parse(), Ok(LineTerminatorKind::Lf));
        assert_eq!("nel".parse(), Ok(LineTerminatorKind::Nel));
        assert!("none".parse::<LineTerminatorKind>().is_err());
        assert!("".parse::<LineTerminatorKind>().is_err());
    }

    #[test]
    fn test_display_uses_label() {
        assert_eq!(LineTerminatorKind::Crlf.to_string(), "CR/LF");
        assert_eq!(LineTerminatorKind::None.to_string(), "");
    }
}
