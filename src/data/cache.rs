//! Load Cache Module
//! Memoizes merged tables by input identity so reloads skip unchanged files.

use crate::data::loader::{DataLoader, LoaderError};
use crate::data::records::MergedTable;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;
use tracing::debug;

/// Identity of one input file: where it is and when it last changed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FileStamp {
    path: PathBuf,
    modified: Option<SystemTime>,
}

impl FileStamp {
    fn of(path: &Path) -> Self {
        let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let modified = std::fs::metadata(&path).and_then(|m| m.modified()).ok();
        Self { path, modified }
    }
}

type CacheKey = (FileStamp, FileStamp);

/// Cache of merged tables keyed by the (order, unit) file pair.
///
/// Entries are immutable `Arc`s; a changed file produces a new key and the
/// stale entry for the same paths is replaced, never mutated.
#[derive(Default)]
pub struct LoadCache {
    entries: Mutex<HashMap<CacheKey, Arc<MergedTable>>>,
}

impl LoadCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached table for these inputs, loading it on a miss.
    pub fn get_or_load(
        &self,
        order_path: &Path,
        unit_path: &Path,
    ) -> Result<Arc<MergedTable>, LoaderError> {
        let key = (FileStamp::of(order_path), FileStamp::of(unit_path));

        if let Some(hit) = self.lock().get(&key) {
            debug!(order = %order_path.display(), "Load cache hit");
            return Ok(Arc::clone(hit));
        }

        // Load outside the lock; a concurrent miss just loads twice
        let table = Arc::new(DataLoader::load(order_path, unit_path)?);

        let mut entries = self.lock();
        entries.retain(|(order, unit), _| order.path != key.0.path || unit.path != key.1.path);
        entries.insert(key, Arc::clone(&table));
        Ok(table)
    }

    /// Drop every cached table.
    #[allow(dead_code)]
    pub fn clear(&self) {
        self.lock().clear();
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<CacheKey, Arc<MergedTable>>> {
        // A poisoned map only ever held complete entries
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORDERS: &str = "PO,Vendor,PTJ,Total_Amount,PO_Date\nPO1,V,PL01,10,01.01.2024\n";
    const UNITS: &str = "PTJ NO,PTJ,BAHAGIAN/UNIT\nPL01,PL,Logistics\n";

    fn fixture() -> (tempfile::TempDir, PathBuf, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let order_path = dir.path().join("orders.csv");
        let unit_path = dir.path().join("units.csv");
        std::fs::write(&order_path, ORDERS).unwrap();
        std::fs::write(&unit_path, UNITS).unwrap();
        (dir, order_path, unit_path)
    }

    #[test]
    fn test_second_call_hits_cache() {
        let (_dir, order_path, unit_path) = fixture();
        let cache = LoadCache::new();

        let first = cache.get_or_load(&order_path, &unit_path).unwrap();
        let second = cache.get_or_load(&order_path, &unit_path).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cached_equals_uncached() {
        let (_dir, order_path, unit_path) = fixture();
        let cache = LoadCache::new();

        let cached = cache.get_or_load(&order_path, &unit_path).unwrap();
        let fresh = DataLoader::load(&order_path, &unit_path).unwrap();
        assert_eq!(*cached, fresh);
    }

    #[test]
    fn test_clear_forces_reload() {
        let (_dir, order_path, unit_path) = fixture();
        let cache = LoadCache::new();

        let first = cache.get_or_load(&order_path, &unit_path).unwrap();
        cache.clear();
        assert_eq!(cache.len(), 0);

        let second = cache.get_or_load(&order_path, &unit_path).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(*first, *second);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let (dir, order_path, _) = fixture();
        let cache = LoadCache::new();

        let missing = dir.path().join("missing.csv");
        assert!(cache.get_or_load(&order_path, &missing).is_err());
        assert_eq!(cache.len(), 0);
    }
}
