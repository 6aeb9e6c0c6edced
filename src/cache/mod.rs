//! Per-document analysis cache.
//!
//! A keyed registry of observable cells. Every view of the same document
//! shares one cell, so they all observe the same classification. Keys are
//! case-folded paths.

mod cell;

pub use cell::{ObservableCell, Subscription};

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use crate::eol::AnalysisResult;

/// Cell type stored for each document.
pub type AnalysisCell = ObservableCell<AnalysisResult>;

/// Normalize a document path into a cache key.
pub fn cache_key(path: &Path) -> String {
    path.to_string_lossy().to_lowercase()
}

/// Registry of analysis cells keyed by document path.
///
/// The owner decides the registry's lifetime; cells are created lazily and
/// stay until [`AnalysisCache::evict`] is called for their path.
#[derive(Default)]
pub struct AnalysisCache {
    cells: RwLock<HashMap<String, Arc<AnalysisCell>>>,
}

impl AnalysisCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cell for `path`, creating an empty one if none exists.
    ///
    /// Concurrent callers for the same unseen path all receive the same cell.
    pub fn get_or_create(&self, path: &Path) -> Arc<AnalysisCell> {
        let key = cache_key(path);
        if let Some(cell) = self
            .cells
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Arc::clone(cell);
        }

        let mut cells = self.cells.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(cells.entry(key).or_insert_with_key(|key| {
            tracing::debug!(key = %key, "created analysis cell");
            Arc::new(AnalysisCell::new())
        }))
    }

    /// Store `result` for `path` and notify its subscribers.
    pub fn publish(&self, path: &Path, result: AnalysisResult) {
        tracing::debug!(
            path = %path.display(),
            label = %result.display_label,
            mixture = result.is_mixture,
            "publishing line break analysis"
        );
        self.get_or_create(path).publish(result);
    }

    /// Current result for `path`, if it has been analyzed.
    pub fn get(&self, path: &Path) -> Option<AnalysisResult> {
        self.cells
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&cache_key(path))
            .and_then(|cell| cell.get())
    }

    /// Drop the cell for `path`. Existing handles keep working but are no
    /// longer reachable through the cache.
    pub fn evict(&self, path: &Path) -> bool {
        let removed = self
            .cells
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&cache_key(path))
            .is_some();
        if removed {
            tracing::debug!(path = %path.display(), "evicted analysis cell");
        }
        removed
    }

    /// Number of cached documents.
    pub fn len(&self) -> usize {
        self.cells.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for AnalysisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisCache")
            .field("documents", &self.len())
            .finish()
    }
}
