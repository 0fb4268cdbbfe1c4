//! Pools persisted as one file per pool
//!
//! # Staleness guard
//!
//! A `FileStore` remembers the modification time of its file as of the last
//! load or successful write. Before writing it compares that time with the
//! file on disk; if another session wrote in between, the write is refused
//! with `StaleWrite` instead of clobbering the newer data. There is no merge
//! and no retry: the caller re-opens the pool and applies its change again.
//!
//! Detection is only as precise as the filesystem's timestamp resolution.

use super::{Entries, ItemPool, Store};
use crate::codec::Codec;
use crate::error::{CacheError, CacheResult};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::SystemTime;
use tracing::{debug, warn};

/// Pool backed by a file on disk
pub type FilesystemItemPool = ItemPool<FileStore>;

/// Modification time of a file, `None` if it does not exist
pub fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|meta| meta.modified()).ok()
}

/// File-backed store with optimistic concurrency
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    last_update: Option<SystemTime>,
    codec: Rc<dyn Codec>,
}

impl FileStore {
    /// Create a store for `path`.
    ///
    /// `last_update` is the modification time observed when the file was
    /// read, or `None` if no file existed.
    pub fn new(path: PathBuf, last_update: Option<SystemTime>, codec: Rc<dyn Codec>) -> Self {
        Self {
            path,
            last_update,
            codec,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Modification time recorded at load or after the last write
    pub fn last_update(&self) -> Option<SystemTime> {
        self.last_update
    }

    /// Whether the file changed since this store last saw it
    pub fn is_stale(&self) -> bool {
        match (modified_time(&self.path), self.last_update) {
            (None, _) => false,
            // Someone created the file after we found none
            (Some(_), None) => true,
            (Some(on_disk), Some(seen)) => on_disk > seen,
        }
    }
}

impl Store for FileStore {
    fn persist(&mut self, entries: &Entries) -> CacheResult<()> {
        if self.is_stale() {
            warn!(path = %self.path.display(), "Refusing to overwrite newer pool file");
            return Err(CacheError::StaleWrite {
                path: self.path.clone(),
            });
        }

        let bytes = self.codec.encode(entries)?;
        fs::write(&self.path, bytes).map_err(|e| {
            CacheError::io(format!("writing pool file {}", self.path.display()), e)
        })?;

        self.last_update = modified_time(&self.path).or_else(|| Some(SystemTime::now()));
        debug!("Persisted {} entries to {}", entries.len(), self.path.display());
        Ok(())
    }

    /// An empty pool leaves no file behind, unless someone else wrote it
    fn release(&mut self, entries: &Entries) {
        if !entries.is_empty() || self.last_update.is_none() || self.is_stale() {
            return;
        }
        if !self.path.exists() {
            return;
        }

        match fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed empty pool file {}", self.path.display()),
            Err(e) => warn!(
                path = %self.path.display(),
                error = %e,
                "Failed to remove empty pool file"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::JsonCodec;
    use crate::item::CacheItem;
    use crate::pool::{seed_entries, CacheItemPool};
    use std::time::Duration;
    use tempfile::TempDir;

    fn codec() -> Rc<dyn Codec> {
        Rc::new(JsonCodec::new())
    }

    fn new_pool(path: &Path, entries: Entries) -> FilesystemItemPool {
        let store = FileStore::new(path.to_path_buf(), modified_time(path), codec());
        ItemPool::new(entries, 0, store)
    }

    #[test]
    fn persist_writes_and_records_mtime() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("pool");

        let mut pool = new_pool(&path, seed_entries([("a", 1)]));
        assert!(pool.commit());
        assert!(path.exists());
        assert_eq!(pool.store().last_update(), modified_time(&path));

        let decoded = JsonCodec::new().decode(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(decoded.len(), 1);
    }

    #[test]
    fn stale_file_is_not_overwritten() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("pool");
        fs::write(&path, "{}").unwrap();

        let mut pool = new_pool(&path, Entries::new());
        std::thread::sleep(Duration::from_millis(50));
        fs::write(&path, "{\"other\":{\"value\":1,\"expires\":null}}").unwrap();

        let mut item = CacheItem::new("mine");
        item.set(2);
        assert!(!pool.save(&item));
        assert!(fs::read_to_string(&path).unwrap().contains("other"));
    }

    #[test]
    fn file_created_by_someone_else_is_stale() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("pool");

        let mut pool = new_pool(&path, Entries::new());
        fs::write(&path, "{}").unwrap();
        assert!(pool.store().is_stale());
        assert!(!pool.clear());
    }

    #[test]
    fn write_failure_returns_false() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing-dir").join("pool");

        let mut pool = new_pool(&path, Entries::new());
        assert!(!pool.clear());
    }

    #[test]
    fn dropping_empty_pool_removes_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("pool");

        let mut pool = new_pool(&path, seed_entries([("a", 1)]));
        assert!(pool.commit());
        assert!(pool.clear());
        assert!(path.exists());

        drop(pool);
        assert!(!path.exists());
    }

    #[test]
    fn dropping_non_empty_pool_keeps_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("pool");

        let mut pool = new_pool(&path, seed_entries([("a", 1)]));
        assert!(pool.commit());
        drop(pool);
        assert!(path.exists());
    }

    #[test]
    fn dropping_empty_pool_keeps_newer_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("pool");
        fs::write(&path, "{}").unwrap();

        let pool = new_pool(&path, Entries::new());
        std::thread::sleep(Duration::from_millis(50));
        fs::write(&path, "{\"k\":{\"value\":1,\"expires\":null}}").unwrap();

        drop(pool);
        assert!(path.exists());
    }

    #[test]
    fn stale_commit_keeps_snapshot_and_staged_items() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("pool");

        let mut pool = new_pool(&path, seed_entries([("a", 1)]));
        assert!(pool.commit());
        let before = pool.entries().clone();

        std::thread::sleep(Duration::from_millis(50));
        let theirs = "{\"other\":{\"value\":1,\"expires\":null}}";
        fs::write(&path, theirs).unwrap();

        let mut item = pool.get_item("b").unwrap();
        item.set(2);
        assert!(pool.save_deferred(item));
        assert!(!pool.commit());

        assert_eq!(pool.entries(), &before);
        let staged: Vec<&str> = pool.deferred().map(|item| item.key()).collect();
        assert_eq!(staged, vec!["b"]);
        assert_eq!(fs::read_to_string(&path).unwrap(), theirs);
    }
}
