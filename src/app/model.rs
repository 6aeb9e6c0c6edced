use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cache::AnalysisCache;
use crate::editor::EditorBuffer;
use crate::eol::{AnalysisResult, LineTerminatorKind, classify};
use crate::status::StatusIndicator;

/// An open document: its path, its text, and the view's status indicator.
#[derive(Debug)]
pub struct Document {
    path: PathBuf,
    buffer: EditorBuffer,
    indicator: StatusIndicator,
}

impl Document {
    /// Open `path` from disk and attach a status indicator to its cell.
    ///
    /// The document is not analyzed until a [`super::Message::LoadedFromDisk`]
    /// is processed for it.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read as UTF-8 text.
    pub fn open(path: impl Into<PathBuf>, session: &Session) -> Result<Self> {
        let path = path.into();
        let buffer = read_buffer(&path)?;
        Ok(Self::from_buffer(path, buffer, session))
    }

    /// Wrap an in-memory buffer as if it had been opened from `path`.
    pub fn from_buffer(path: impl Into<PathBuf>, buffer: EditorBuffer, session: &Session) -> Self {
        let path = path.into();
        let indicator = StatusIndicator::attach(&session.cache.get_or_create(&path), session.target);
        Self {
            path,
            buffer,
            indicator,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub const fn buffer(&self) -> &EditorBuffer {
        &self.buffer
    }

    pub(super) const fn buffer_mut(&mut self) -> &mut EditorBuffer {
        &mut self.buffer
    }

    pub const fn indicator(&self) -> &StatusIndicator {
        &self.indicator
    }

    /// Classify the buffer's current terminators.
    pub fn analyze(&self) -> AnalysisResult {
        classify(self.buffer.line_terminators())
    }

    /// Replace the buffer with the file's current content.
    ///
    /// Returns `false` and keeps the buffer when the file matches it, as it
    /// does after the document's own save.
    pub(super) fn reload_from_disk(&mut self) -> Result<bool> {
        let buffer = read_buffer(&self.path)?;
        if buffer.text() == self.buffer.text() {
            return Ok(false);
        }
        self.buffer = buffer;
        Ok(true)
    }

    /// Write the buffer back byte for byte.
    pub(super) fn save_to_disk(&mut self) -> Result<()> {
        std::fs::write(&self.path, self.buffer.text())
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        self.buffer.mark_clean();
        Ok(())
    }
}

fn read_buffer(path: &Path) -> Result<EditorBuffer> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(EditorBuffer::from_text(&text))
}

/// State shared by every open document.
#[derive(Debug, Clone)]
pub struct Session {
    pub(super) cache: Arc<AnalysisCache>,
    /// Canonical terminator: the repair target and the "no highlight" kind.
    pub target: LineTerminatorKind,
    /// Drop a document's cached analysis when it is closed.
    pub evict_on_close: bool,
}

impl Session {
    pub fn new(cache: Arc<AnalysisCache>, target: LineTerminatorKind) -> Self {
        Self {
            cache,
            target,
            evict_on_close: false,
        }
    }

    #[must_use]
    pub const fn with_evict_on_close(mut self, evict: bool) -> Self {
        self.evict_on_close = evict;
        self
    }

    pub fn cache(&self) -> &AnalysisCache {
        &self.cache
    }
}
