use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::loader::{load_dataset, LoadOptions, LoadedDataset};
use crate::DashboardResult;

/// Parsed tables keyed by source file.
///
/// The cache is created empty and filled on first access. `refresh` drops
/// every entry before reloading, so derived state computed from an old table
/// can never be mixed with a new one.
#[derive(Debug, Default)]
pub struct DatasetCache {
    options: LoadOptions,
    entries: HashMap<PathBuf, Arc<LoadedDataset>>,
}

impl DatasetCache {
    pub fn new(options: LoadOptions) -> Self {
        DatasetCache {
            options,
            entries: HashMap::new(),
        }
    }

    /// Return the cached table for `path`, loading it on a miss.
    pub fn get_or_load(&mut self, path: &Path) -> DashboardResult<Arc<LoadedDataset>> {
        let key = source_key(path);
        if let Some(hit) = self.entries.get(&key) {
            tracing::debug!("dataset cache hit for {}", key.display());
            return Ok(Arc::clone(hit));
        }

        let loaded = Arc::new(load_dataset(path, &self.options)?);
        self.entries.insert(key, Arc::clone(&loaded));
        Ok(loaded)
    }

    /// Invalidate everything and reload `path` from disk.
    pub fn refresh(&mut self, path: &Path) -> DashboardResult<Arc<LoadedDataset>> {
        self.invalidate();
        tracing::info!("dataset cache cleared; reloading {}", path.display());
        self.get_or_load(path)
    }

    pub fn invalidate(&mut self) {
        self.entries.clear();
    }

    pub fn is_cached(&self, path: &Path) -> bool {
        self.entries.contains_key(&source_key(path))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Identity of a source: its canonical path when it resolves, else the path as given.
fn source_key(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
