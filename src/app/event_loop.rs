use std::io::{Write, stdout};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::app::model::{Document, Session};
use crate::app::{App, Message, Outcome, effects, update};
use crate::cache::AnalysisCache;
use crate::eol::{LineTerminatorKind, deviating_lines};
use crate::status::Highlight;
use crate::watcher::DocumentWatcher;

const WATCH_DEBOUNCE: Duration = Duration::from_millis(200);
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// One document's line in the report.
#[derive(Debug, Serialize)]
pub(super) struct Report<'a> {
    pub path: &'a Path,
    pub dominant_kind: LineTerminatorKind,
    pub is_mixture: bool,
    pub display_label: String,
    pub highlight: Highlight,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deviating_lines: Option<Vec<usize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replaced: Option<usize>,
}

impl App {
    /// Analyze (and optionally repair) every file, then watch if enabled.
    ///
    /// # Errors
    /// Returns an error if a file cannot be read or written, or the watcher
    /// cannot be started.
    pub fn run(&self) -> Result<()> {
        let session = Session::new(Arc::new(AnalysisCache::new()), self.target);
        let mut out = stdout().lock();
        let mut docs = Vec::with_capacity(self.files.len());

        for path in &self.files {
            let mut doc = Document::open(path.clone(), &session)?;
            self.process(&session, &mut doc, &mut out, false)?;
            docs.push(doc);
        }

        if !self.watch_enabled {
            return Ok(());
        }

        let mut watcher = DocumentWatcher::new(&self.files, WATCH_DEBOUNCE)
            .context("Failed to start file watcher")?;
        tracing::info!(documents = watcher.len(), "watching for changes");
        loop {
            for changed in watcher.take_changed() {
                let Some(doc) = docs.iter_mut().find(|d| d.path() == changed.as_path()) else {
                    continue;
                };
                match effects::reload(&session, doc) {
                    Ok(Some(_)) => self.process(&session, doc, &mut out, true)?,
                    Ok(None) => tracing::debug!(path = %changed.display(), "content unchanged"),
                    Err(err) => tracing::warn!(path = %changed.display(), "reload failed: {err:#}"),
                }
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }

    /// Analyze or repair `doc` and write its report line.
    ///
    /// `reloaded` documents were already analyzed by the reload effect.
    pub(super) fn process(
        &self,
        session: &Session,
        doc: &mut Document,
        out: &mut impl Write,
        reloaded: bool,
    ) -> Result<()> {
        if !reloaded {
            update(session, doc, Message::LoadedFromDisk)?;
        }
        let replaced = if self.fix_enabled {
            match effects::repair_and_save(session, doc)? {
                Outcome::Repaired { replaced, .. } => Some(replaced),
                _ => None,
            }
        } else {
            None
        };
        let report = self.report(doc, replaced);
        self.write_report(out, &report)
    }

    pub(super) fn report<'a>(&self, doc: &'a Document, replaced: Option<usize>) -> Report<'a> {
        let result = doc.analyze();
        let deviating = self.lines_enabled.then(|| {
            deviating_lines(doc.buffer().line_terminators(), self.target)
                .into_iter()
                .map(|line| line + 1)
                .collect()
        });
        Report {
            path: doc.path(),
            dominant_kind: result.dominant_kind,
            is_mixture: result.is_mixture,
            display_label: doc.indicator().label(),
            highlight: doc.indicator().highlight(),
            deviating_lines: deviating,
            replaced,
        }
    }

    pub(super) fn write_report(&self, out: &mut impl Write, report: &Report<'_>) -> Result<()> {
        if self.json_output {
            serde_json::to_writer(&mut *out, report).context("Failed to encode report")?;
            writeln!(out)?;
            return Ok(());
        }

        let label = if report.display_label.is_empty() {
            "-"
        } else {
            report.display_label.as_str()
        };
        let note = match report.highlight {
            Highlight::None => "",
            Highlight::NonCanonical => "  [non-canonical]",
            Highlight::Mixture => "  [mixed]",
        };
        write!(out, "{}: {label}{note}", report.path.display())?;
        if let Some(replaced) = report.replaced {
            write!(out, "  (fixed {replaced})")?;
        }
        if let Some(lines) = report.deviating_lines.as_ref().filter(|l| !l.is_empty()) {
            let list = lines.iter().map(ToString::to_string).collect::<Vec<_>>().join(",");
            write!(out, "  lines {list}")?;
        }
        writeln!(out)?;
        Ok(())
    }
}
