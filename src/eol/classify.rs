use std::borrow::Borrow;

use serde::{Deserialize, Serialize};

use super::{LineTerminatorKind, LineTerminatorOccurrence};

/// Summary of one snapshot's line terminators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Most frequent terminator; ties go to the one seen first.
    pub dominant_kind: LineTerminatorKind,
    /// More than one distinct terminator appears.
    pub is_mixture: bool,
    /// Status label, e.g. `"CR/LF"` or `"LF+"` for a mixture.
    pub display_label: String,
}

impl AnalysisResult {
    /// Result for a document without any terminated line.
    pub const fn empty() -> Self {
        Self {
            dominant_kind: LineTerminatorKind::None,
            is_mixture: false,
            display_label: String::new(),
        }
    }

    /// Build a result, deriving the label from the kind and mixture flag.
    pub fn new(dominant_kind: LineTerminatorKind, is_mixture: bool) -> Self {
        Self {
            dominant_kind,
            is_mixture,
            display_label: display_label(dominant_kind, is_mixture),
        }
    }

    /// No terminated line was seen.
    pub const fn is_empty(&self) -> bool {
        self.dominant_kind.is_none()
    }
}

impl Default for AnalysisResult {
    fn default() -> Self {
        Self::empty()
    }
}

fn display_label(kind: LineTerminatorKind, is_mixture: bool) -> String {
    let mut label = kind.label().to_string();
    if is_mixture {
        label.push('+');
    }
    label
}

/// Classify the terminators of one snapshot in a single pass.
///
/// `None` occurrences are ignored. The dominant kind is the one with the
/// highest count; on a tie the kind whose first occurrence comes earliest
/// in the sequence wins.
pub fn classify<I>(occurrences: I) -> AnalysisResult
where
    I: IntoIterator,
    I::Item: Borrow<LineTerminatorOccurrence>,
{
    let mut counts = [0usize; LineTerminatorKind::TERMINATORS.len()];
    let mut first_seen: Vec<LineTerminatorKind> = Vec::with_capacity(counts.len());

    for occurrence in occurrences {
        let kind = occurrence.borrow().kind;
        let Some(slot) = kind.slot() else {
            continue;
        };
        if counts[slot] == 0 {
            first_seen.push(kind);
        }
        counts[slot] += 1;
    }

    // `first_seen` holds at most six kinds in document order, so a strict
    // comparison keeps the earliest on ties.
    let mut dominant: Option<(LineTerminatorKind, usize)> = None;
    for &kind in &first_seen {
        let count = kind.slot().map_or(0, |slot| counts[slot]);
        if dominant.is_none_or(|(_, best)| count > best) {
            dominant = Some((kind, count));
        }
    }

    match dominant {
        Some((kind, _)) => AnalysisResult::new(kind, first_seen.len() > 1),
        None => AnalysisResult::empty(),
    }
}

/// Zero-based indices of the lines whose terminator differs from `reference`.
///
/// Unterminated lines never deviate.
pub fn deviating_lines<I>(occurrences: I, reference: LineTerminatorKind) -> Vec<usize>
where
    I: IntoIterator,
    I::Item: Borrow<LineTerminatorOccurrence>,
{
    occurrences
        .into_iter()
        .enumerate()
        .filter_map(|(line, occurrence)| {
            let kind = occurrence.borrow().kind;
            (!kind.is_none() && kind != reference).then_some(line)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use LineTerminatorKind::{Cr, Crlf, Lf, Ls, Nel, None as Unterminated, Ps};

    fn occ(kind: LineTerminatorKind, start: usize) -> LineTerminatorOccurrence {
        LineTerminatorOccurrence::new(kind, start)
    }

    /// Lay kinds out back to back, as if every line were empty.
    fn lines(kinds: &[LineTerminatorKind]) -> Vec<LineTerminatorOccurrence> {
        let mut offset = 0;
        kinds
            .iter()
            .map(|&kind| {
                let o = occ(kind, offset);
                offset += kind.len().max(1);
                o
            })
            .collect()
    }

    #[test]
    fn test_empty_sequence_is_empty_result() {
        let result = classify(Vec::<LineTerminatorOccurrence>::new());
        assert_eq!(result, AnalysisResult::empty());
        assert_eq!(result.display_label, "");
        assert!(!result.is_mixture);
    }

    #[test]
    fn test_only_unterminated_lines_is_empty_result() {
        let result = classify(lines(&[Unterminated, Unterminated]));
        assert_eq!(result, AnalysisResult::empty());
    }

    #[test]
    fn test_single_kind_labels() {
        let cases = [
            (Crlf, "CR/LF"),
            (Cr, "CR"),
            (Lf, "LF"),
            (Nel, "NEL"),
            (Ls, "LS"),
            (Ps, "PS"),
        ];
        for (kind, label) in cases {
            let result = classify(lines(&[kind, kind, Unterminated]));
            assert_eq!(result.dominant_kind, kind);
            assert!(!result.is_mixture);
            assert_eq!(result.display_label, label);
        }
    }

    #[test]
    fn test_mixture_appends_plus() {
        let input = [occ(Crlf, 0), occ(Lf, 10), occ(Crlf, 20), occ(Unterminated, 30)];
        let result = classify(&input);
        assert_eq!(result.dominant_kind, Crlf);
        assert!(result.is_mixture);
        assert_eq!(result.display_label, "CR/LF+");
    }

    #[test]
    fn test_tie_breaks_to_first_seen() {
        let input = lines(&[Cr, Lf, Lf, Cr]);
        for _ in 0..16 {
            assert_eq!(classify(&input).dominant_kind, Cr);
        }

        let input = lines(&[Lf, Cr, Cr, Lf]);
        assert_eq!(classify(&input).dominant_kind, Lf);
    }

    #[test]
    fn test_majority_beats_first_seen() {
        let result = classify(lines(&[Cr, Lf, Lf, Ps]));
        assert_eq!(result.dominant_kind, Lf);
        assert_eq!(result.display_label, "LF+");
    }

    #[test]
    fn test_unterminated_does_not_make_mixture() {
        let result = classify(lines(&[Lf, Unterminated, Lf, Unterminated]));
        assert!(!result.is_mixture);
        assert_eq!(result.display_label, "LF");
    }

    #[test]
    fn test_classify_accepts_owned_and_borrowed() {
        let input = lines(&[Nel, Nel]);
        assert_eq!(classify(input.iter()), classify(input.clone()));
    }

    #[test]
    fn test_deviating_lines_skips_reference_and_unterminated() {
        let input = lines(&[Crlf, Lf, Crlf, Cr, Unterminated]);
        assert_eq!(deviating_lines(&input, Crlf), vec![1, 3]);
        assert_eq!(deviating_lines(&input, Lf), vec![0, 2, 3]);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn any_kind() -> impl Strategy<Value = LineTerminatorKind> {
            prop::sample::select(vec![Crlf, Cr, Lf, Nel, Ls, Ps, Unterminated])
        }

        proptest! {
            #[test]
            fn mixture_iff_two_distinct_terminators(kinds in prop::collection::vec(any_kind(), 0..64)) {
                let mut distinct: Vec<LineTerminatorKind> = kinds
                    .iter()
                    .copied()
                    .filter(|k| !k.is_none())
                    .collect();
                distinct.sort_by_key(|k| k.slot());
                distinct.dedup();

                let result = classify(lines(&kinds));
                prop_assert_eq!(result.is_mixture, distinct.len() > 1);
                prop_assert_eq!(result.display_label.ends_with('+'), distinct.len() > 1);
                prop_assert_eq!(result.is_empty(), distinct.is_empty());
            }

            #[test]
            fn dominant_has_maximal_count(kinds in prop::collection::vec(any_kind(), 1..64)) {
                let result = classify(lines(&kinds));
                let count = |kind| kinds.iter().filter(|&&k| k == kind).count();
                if !result.is_empty() {
                    let best = count(result.dominant_kind);
                    for kind in LineTerminatorKind::TERMINATORS {
                        prop_assert!(count(kind) <= best);
                    }
                }
            }
        }
    }
}
