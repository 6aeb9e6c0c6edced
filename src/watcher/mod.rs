//! File watching for re-analysis on disk changes.
//!
//! Uses notify crate for cross-platform file system events. A debounced
//! change to a watched document is reported as "loaded from disk".
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};

/// Watches a set of documents and emits debounced change notifications.
pub struct DocumentWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
    // canonical path -> path as given by the caller
    targets: BTreeMap<PathBuf, PathBuf>,
    debounce: Duration,
    pending: BTreeMap<PathBuf, Instant>,
}

impl DocumentWatcher {
    /// Create a watcher for `paths`.
    ///
    /// # Errors
    /// Returns an error if the file watcher cannot be created or a parent
    /// directory cannot be watched.
    pub fn new<I, P>(paths: I, debounce: Duration) -> notify::Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })?;

        // Canonicalize so event paths from the OS (which are always absolute
        // and canonical) match our stored paths.
        let mut targets = BTreeMap::new();
        let mut roots = BTreeSet::new();
        for path in paths {
            let given = path.as_ref().to_path_buf();
            let canonical = given.canonicalize().unwrap_or_else(|_| given.clone());
            roots.insert(watch_root_for(&canonical));
            targets.insert(canonical, given);
        }
        for root in &roots {
            watcher.watch(root, RecursiveMode::NonRecursive)?;
        }
        tracing::debug!(documents = targets.len(), roots = roots.len(), "watching documents");

        Ok(Self {
            _watcher: watcher,
            rx,
            targets,
            debounce,
            pending: BTreeMap::new(),
        })
    }

    /// Number of watched documents.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Documents whose debounced change is ready, as the caller named them.
    pub fn take_changed(&mut self) -> Vec<PathBuf> {
        let now = Instant::now();
        while let Ok(event) = self.rx.try_recv() {
            match event {
                Ok(ev) => {
                    let hits = self.relevant_targets(&ev);
                    if hits.is_empty() {
                        tracing::trace!(kind = ?ev.kind, paths = ?ev.paths, "irrelevant watch event");
                    }
                    for target in hits {
                        self.pending.insert(target, now);
                    }
                }
                Err(err) => tracing::warn!(%err, "file watcher error"),
            }
        }

        let ready: Vec<PathBuf> = self
            .pending
            .iter()
            .filter(|(_, since)| since.elapsed() >= self.debounce)
            .map(|(path, _)| path.clone())
            .collect();
        ready
            .into_iter()
            .filter_map(|canonical| {
                self.pending.remove(&canonical);
                self.targets.get(&canonical).cloned()
            })
            .collect()
    }

    fn relevant_targets(&self, event: &Event) -> Vec<PathBuf> {
        let mut hits = BTreeSet::new();
        for path in &event.paths {
            for target in self.targets.keys() {
                let same_file = path == target
                    || path.file_name().is_some_and(|f| Some(f) == target.file_name())
                        && path.parent() == target.parent();
                // Some backends only report the directory.
                let parent_dir = Some(path.as_path()) == target.parent();
                if same_file || parent_dir {
                    hits.insert(target.clone());
                }
            }
        }
        hits.into_iter().collect()
    }
}

impl std::fmt::Debug for DocumentWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentWatcher")
            .field("targets", &self.targets.keys().collect::<Vec<_>>())
            .field("debounce", &self.debounce)
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}

fn watch_root_for(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::EventKind;
    use tempfile::tempdir;

    fn event(paths: Vec<PathBuf>) -> Event {
        Event {
            kind: EventKind::Any,
            paths,
            attrs: notify::event::EventAttributes::new(),
        }
    }

    #[test]
    fn test_directory_level_event_is_relevant_for_watched_file() {
        let dir = tempdir().expect("tempdir");
        let canonical_dir = dir.path().canonicalize().expect("canonicalize");
        let path = canonical_dir.join("doc.txt");
        std::fs::write(&path, "hi\r\n").expect("write");
        let watcher = DocumentWatcher::new([&path], Duration::from_millis(10)).expect("watcher");

        assert_eq!(watcher.relevant_targets(&event(vec![canonical_dir])), vec![path]);
    }

    #[test]
    fn test_event_for_sibling_is_ignored() {
        let dir = tempdir().expect("tempdir");
        let canonical_dir = dir.path().canonicalize().expect("canonicalize");
        let watched = canonical_dir.join("a.txt");
        let sibling = canonical_dir.join("b.txt");
        std::fs::write(&watched, "a\n").expect("write");
        std::fs::write(&sibling, "b\n").expect("write");
        let watcher = DocumentWatcher::new([&watched], Duration::from_millis(10)).expect("watcher");

        assert!(watcher.relevant_targets(&event(vec![sibling])).is_empty());
    }

    #[test]
    fn test_watch_root_for_relative_file_is_dot() {
        let root = watch_root_for(Path::new("notes.txt"));
        assert_eq!(root, PathBuf::from("."));
    }

    #[test]
    fn test_changed_paths_are_reported_as_given() {
        let dir = tempdir().expect("tempdir");
        let given = dir.path().join("given.txt");
        std::fs::write(&given, "x\n").expect("write");
        let mut watcher = DocumentWatcher::new([&given], Duration::ZERO).expect("watcher");
        assert_eq!(watcher.len(), 1);

        let canonical = given.canonicalize().expect("canonicalize");
        watcher.pending.insert(canonical, Instant::now());
        assert_eq!(watcher.take_changed(), vec![given]);
        assert!(watcher.take_changed().is_empty());
    }

    #[test]
    fn test_real_file_modification_detected() {
        let dir = tempdir().expect("tempdir");
        let canonical_dir = dir.path().canonicalize().expect("canonicalize");
        let path = canonical_dir.join("watched.txt");
        std::fs::write(&path, "original\n").expect("write");

        let mut watcher = DocumentWatcher::new([&path], Duration::from_millis(50)).expect("watcher");

        // Give the backend time to register the watch
        std::thread::sleep(Duration::from_millis(500));

        std::fs::write(&path, "modified\r\n").expect("write");

        // Poll until the change is ready or timeout after 5 seconds
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut detected = false;
        while Instant::now() < deadline {
            if watcher.take_changed().contains(&path) {
                detected = true;
                break;
            }
            std::thread::sleep(Duration::from_millis(50));
        }

        assert!(
            detected,
            "watcher should detect real file modification within 5 seconds"
        );
    }
}
