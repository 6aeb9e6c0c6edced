//! Document sessions and the command-line runner.
//!
//! This module follows The Elm Architecture (TEA):
//! - [`Document`] and [`Session`]: the state
//! - [`Message`]: lifecycle events and actions
//! - [`update`]: analysis, publishing and repair for one message
//! - [`App::run`]: disk effects, reporting and the watch loop

mod effects;
mod event_loop;
mod model;
mod update;

pub use model::{Document, Session};
pub use update::{Message, Outcome, update};

use std::path::PathBuf;

use crate::eol::LineTerminatorKind;

/// Runs one analysis pass over a set of files, optionally repairing and
/// watching them.
pub struct App {
    files: Vec<PathBuf>,
    target: LineTerminatorKind,
    watch_enabled: bool,
    fix_enabled: bool,
    json_output: bool,
    lines_enabled: bool,
}

impl App {
    /// Create a new application for the given files.
    pub const fn new(files: Vec<PathBuf>) -> Self {
        Self {
            files,
            target: LineTerminatorKind::Crlf,
            watch_enabled: false,
            fix_enabled: false,
            json_output: false,
            lines_enabled: false,
        }
    }

    /// Canonical terminator used for repairs and highlighting.
    pub const fn with_target(mut self, target: LineTerminatorKind) -> Self {
        self.target = target;
        self
    }

    /// Enable or disable file watching.
    pub const fn with_watch(mut self, enabled: bool) -> Self {
        self.watch_enabled = enabled;
        self
    }

    /// Rewrite files to the target terminator.
    pub const fn with_fix(mut self, enabled: bool) -> Self {
        self.fix_enabled = enabled;
        self
    }

    /// Emit one JSON object per file instead of text.
    pub const fn with_json(mut self, enabled: bool) -> Self {
        self.json_output = enabled;
        self
    }

    /// List the lines whose terminator differs from the target.
    pub const fn with_lines(mut self, enabled: bool) -> Self {
        self.lines_enabled = enabled;
        self
    }
}
