// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. eol::LineTerminatorKind)
    clippy::module_name_repetitions
)]

//! # linebreak
//!
//! Line-ending analysis and normalization for text documents.
//!
//! linebreak inspects a document's line terminators with:
//! - Classification into a dominant kind, with mixture detection
//! - A stable status label (`CR/LF`, `LF`, `CR`, `NEL`, `LS`, `PS`, `+` for mixed)
//! - Repair plans that rewrite every terminator to one kind without
//!   invalidating offsets
//! - A per-document cache that broadcasts results to every open view
//!
//! ## Modules
//!
//! - [`eol`]: Terminator kinds, classifier and repair planner
//! - [`editor`]: Rope-backed text model, snapshots and edit transactions
//! - [`cache`]: Per-path observable analysis cells
//! - [`status`]: Status indicator fed by the cache
//! - [`app`]: Document lifecycle and the command-line runner
//! - [`config`]: Saved command-line defaults
//! - [`logging`]: Tracing setup
//! - [`watcher`]: File watching

pub mod app;
pub mod cache;
pub mod config;
pub mod editor;
pub mod eol;
pub mod logging;
pub mod status;
pub mod watcher;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::cache::{AnalysisCache, ObservableCell, Subscription};
    pub use crate::editor::{EditSink, EditorBuffer, Snapshot, SnapshotSource};
    pub use crate::eol::{
        AnalysisResult, LineTerminatorKind, LineTerminatorOccurrence, Replacement, classify,
        plan_repair,
    };
}
