use anyhow::Result;

use crate::app::model::{Document, Session};
use crate::editor::{EditSink, SnapshotSource};
use crate::eol::{AnalysisResult, LineTerminatorKind, plan_repair};

/// Lifecycle events and actions for one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    /// Content was (re)loaded from storage.
    LoadedFromDisk,
    /// Content was written to storage.
    SavedToDisk,
    /// The last view of the document closed.
    Closed,
    /// Rewrite every terminator to the given kind.
    RepairLineBreaks(LineTerminatorKind),
}

/// What processing a [`Message`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The document was classified and the result published.
    Analyzed(AnalysisResult),
    /// `replaced` terminators were rewritten; `result` is the new analysis.
    Repaired { replaced: usize, result: AnalysisResult },
    /// The document closed; `evicted` tells whether its cell was dropped.
    Closed { evicted: bool },
}

/// Process `msg` for `doc`.
///
/// Load and save re-classify and publish. A repair plans against one
/// snapshot and applies the whole plan as a single edit transaction; an
/// empty plan leaves the buffer alone.
///
/// # Errors
/// Propagates [`crate::eol::RepairError`] for an invalid target and
/// [`crate::editor::EditError`] when the buffer rejects the transaction.
pub fn update(session: &Session, doc: &mut Document, msg: Message) -> Result<Outcome> {
    match msg {
        Message::LoadedFromDisk | Message::SavedToDisk => {
            let result = publish(session, doc);
            tracing::debug!(path = %doc.path().display(), ?msg, label = %result.display_label, "analyzed");
            Ok(Outcome::Analyzed(result))
        }
        Message::Closed => {
            let evicted = session.evict_on_close && session.cache.evict(doc.path());
            Ok(Outcome::Closed { evicted })
        }
        Message::RepairLineBreaks(target) => {
            let snapshot = doc.buffer().snapshot();
            let plan = plan_repair(&snapshot.occurrences, target)?;
            if plan.is_empty() {
                tracing::debug!(path = %doc.path().display(), "line breaks already normalized");
            } else {
                doc.buffer_mut().apply(snapshot.revision, &plan)?;
                tracing::info!(
                    path = %doc.path().display(),
                    replaced = plan.len(),
                    kind = %target,
                    "repaired line breaks"
                );
            }
            let result = publish(session, doc);
            Ok(Outcome::Repaired {
                replaced: plan.len(),
                result,
            })
        }
    }
}

fn publish(session: &Session, doc: &Document) -> AnalysisResult {
    let result = doc.analyze();
    session.cache.publish(doc.path(), result.clone());
    result
}
