//! Line break status indicator.
//!
//! Subscribes to a document's analysis cell and keeps the text and
//! highlight a status bar would show for it.

use std::sync::{Arc, Mutex, PoisonError};

use crate::cache::{AnalysisCell, Subscription};
use crate::eol::{AnalysisResult, LineTerminatorKind};

/// How strongly the indicator should stand out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Highlight {
    /// Canonical terminator, or nothing analyzed yet.
    #[default]
    None,
    /// A single terminator other than the canonical one.
    NonCanonical,
    /// More than one terminator kind in the document.
    Mixture,
}

impl Highlight {
    /// Highlight for `result` given the project's canonical terminator.
    pub fn for_result(result: &AnalysisResult, canonical: LineTerminatorKind) -> Self {
        if result.is_empty() {
            Self::None
        } else if result.is_mixture {
            Self::Mixture
        } else if result.dominant_kind == canonical {
            Self::None
        } else {
            Self::NonCanonical
        }
    }
}

#[derive(Debug, Default, Clone)]
struct State {
    label: String,
    highlight: Highlight,
}

/// One view's line break indicator.
#[derive(Debug)]
pub struct StatusIndicator {
    state: Arc<Mutex<State>>,
    _subscription: Subscription,
}

impl StatusIndicator {
    /// Attach to `cell`, picking up its current value if it has one.
    pub fn attach(cell: &Arc<AnalysisCell>, canonical: LineTerminatorKind) -> Self {
        let state = Arc::new(Mutex::new(State::default()));
        let subscription = {
            let state = Arc::clone(&state);
            cell.subscribe(move |result| apply(&state, result, canonical))
        };
        // Seed under the lock: a publish racing with this read either lands
        // in `get` or is delivered after the seed.
        {
            let mut seeded = state.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(result) = cell.get() {
                seeded.update(&result, canonical);
            }
        }
        Self {
            state,
            _subscription: subscription,
        }
    }

    /// Text to display, e.g. `"LF+"`. Empty before the first analysis.
    pub fn label(&self) -> String {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .label
            .clone()
    }

    pub fn highlight(&self) -> Highlight {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).highlight
    }
}

impl State {
    fn update(&mut self, result: &AnalysisResult, canonical: LineTerminatorKind) {
        self.label.clone_from(&result.display_label);
        self.highlight = Highlight::for_result(result, canonical);
    }
}

fn apply(state: &Mutex<State>, result: &AnalysisResult, canonical: LineTerminatorKind) {
    state
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .update(result, canonical);
}
