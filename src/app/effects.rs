use anyhow::Result;

use crate::app::model::{Document, Session};
use crate::app::{Message, Outcome, update};

/// Re-read `doc` from disk and re-analyze it.
///
/// Returns `None` when the file still holds the buffer's text.
pub(super) fn reload(session: &Session, doc: &mut Document) -> Result<Option<Outcome>> {
    if !doc.reload_from_disk()? {
        return Ok(None);
    }
    update(session, doc, Message::LoadedFromDisk).map(Some)
}

/// Repair `doc` to the session's target and write it back when anything
/// changed.
pub(super) fn repair_and_save(session: &Session, doc: &mut Document) -> Result<Outcome> {
    let outcome = update(session, doc, Message::RepairLineBreaks(session.target))?;
    if doc.buffer().is_dirty() {
        doc.save_to_disk()?;
        update(session, doc, Message::SavedToDisk)?;
    }
    Ok(outcome)
}
