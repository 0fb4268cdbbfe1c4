//! Cache item pools
//!
//! A pool is a named collection of entries. `ItemPool` implements the whole
//! `CacheItemPool` contract once; durability is delegated to a `Store`:
//!
//! | Store | Pool alias | Persistence |
//! |-------|------------|-------------|
//! | `FileStore` | `FilesystemItemPool` | one file per pool, stale writes refused |
//! | `MemoryStore` | `DebugItemPool` | none, always succeeds |
//!
//! Expiration is checked lazily on every read. Expired entries found while
//! reading are dropped from memory; nothing sweeps in the background.

pub mod debug;
pub mod filesystem;

pub use debug::{DebugItemPool, MemoryStore};
pub use filesystem::{FileStore, FilesystemItemPool};

use crate::error::{CacheError, CacheResult};
use crate::item::{default_expiration, CacheEntry, CacheItem};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, warn};

/// Entries of one pool, keyed by cache key
pub type Entries = HashMap<String, CacheEntry>;

/// Pool handle shared between a manager and its callers
pub type SharedPool = Rc<RefCell<dyn CacheItemPool>>;

/// Reject keys that cannot identify an entry
pub fn validate_key(key: &str) -> CacheResult<&str> {
    if key.is_empty() {
        return Err(CacheError::invalid_key(key, "key must not be empty"));
    }
    if key.chars().any(char::is_control) {
        return Err(CacheError::invalid_key(
            key,
            "key must not contain control characters",
        ));
    }
    Ok(key)
}

/// Normalize creator output into entries that never expire
pub fn seed_entries<I, K, V>(pairs: I) -> Entries
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    pairs
        .into_iter()
        .map(|(key, value)| (key.into(), CacheEntry::permanent(value.into())))
        .collect()
}

/// Durable backing of a pool
pub trait Store: fmt::Debug {
    /// Write all entries. Errors are reported to the caller of the pool
    /// operation as `false`.
    fn persist(&mut self, entries: &Entries) -> CacheResult<()>;

    /// Called once when the pool owning this store is dropped
    fn release(&mut self, _entries: &Entries) {}
}

/// Operations every cache pool offers
pub trait CacheItemPool: fmt::Debug {
    /// Look up one item. Deferred items shadow stored entries.
    fn get_item(&mut self, key: &str) -> CacheResult<CacheItem>;

    /// Whether an unexpired entry exists. Drops the entry if it expired.
    fn has_item(&mut self, key: &str) -> CacheResult<bool>;

    /// Remove every entry and persist
    fn clear(&mut self) -> bool;

    /// Remove one entry and persist. Absent keys succeed without writing.
    fn delete_item(&mut self, key: &str) -> CacheResult<bool>;

    /// Remove several entries with a single persist
    fn delete_items(&mut self, keys: &[&str]) -> CacheResult<bool>;

    /// Merge the item into the entries and persist.
    ///
    /// A failed persist leaves the merged item in memory; only `commit`
    /// rolls back.
    fn save(&mut self, item: &CacheItem) -> bool;

    /// Stage the item for the next `commit`
    fn save_deferred(&mut self, item: CacheItem) -> bool;

    /// Merge all staged items and persist, restoring the previous entries
    /// if the persist fails
    fn commit(&mut self) -> bool;

    /// Expiration given to items without an explicit one
    fn default_expiration(&self) -> Option<DateTime<Utc>>;

    /// Drop every expired entry from memory, returning how many went away
    fn purge_expired(&mut self) -> usize;

    /// Keys of all unexpired entries, sorted
    fn keys(&self) -> Vec<String>;

    /// Number of unexpired entries
    fn len(&self) -> usize {
        self.keys().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Lazy multi-get over a pool, see [`CacheItemPoolExt::get_items`]
pub struct Items<'a, P: ?Sized, K> {
    pool: &'a mut P,
    keys: &'a [K],
    pos: usize,
}

impl<P: ?Sized, K> Items<'_, P, K> {
    /// Start over; lookups run again and see any changes made since
    pub fn restart(&mut self) {
        self.pos = 0;
    }
}

impl<P, K> Iterator for Items<'_, P, K>
where
    P: CacheItemPool + ?Sized,
    K: AsRef<str>,
{
    type Item = CacheResult<(String, CacheItem)>;

    fn next(&mut self) -> Option<Self::Item> {
        let keys = self.keys;
        let key = keys.get(self.pos)?.as_ref();
        self.pos += 1;
        Some(
            self.pool
                .get_item(key)
                .map(|item| (key.to_string(), item)),
        )
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.keys.len() - self.pos;
        (left, Some(left))
    }
}

impl<P: ?Sized, K> fmt::Debug for Items<'_, P, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Items")
            .field("len", &self.keys.len())
            .field("pos", &self.pos)
            .finish()
    }
}

/// Helpers available on every pool, including `dyn CacheItemPool`
pub trait CacheItemPoolExt: CacheItemPool {
    /// One `get_item` per key, in order, evaluated as the iterator advances
    fn get_items<'a, K: AsRef<str>>(&'a mut self, keys: &'a [K]) -> Items<'a, Self, K> {
        Items {
            pool: self,
            keys,
            pos: 0,
        }
    }
}

impl<P: CacheItemPool + ?Sized> CacheItemPoolExt for P {}

/// Pool implementation shared by all backends
#[derive(Debug)]
pub struct ItemPool<S: Store> {
    entries: Entries,
    deferred: HashMap<String, CacheItem>,
    default_ttl: i64,
    store: S,
}

impl<S: Store> ItemPool<S> {
    /// Create a pool from already loaded entries
    pub fn new(entries: Entries, default_ttl: i64, store: S) -> Self {
        Self {
            entries,
            deferred: HashMap::new(),
            default_ttl,
            store,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Raw entries, including expired ones not yet dropped
    pub fn entries(&self) -> &Entries {
        &self.entries
    }

    /// Items staged for the next commit
    pub fn deferred(&self) -> impl Iterator<Item = &CacheItem> {
        self.deferred.values()
    }

    /// Live entries. Expiration is checked as each element is consumed.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CacheEntry)> {
        self.entries
            .iter()
            .filter(|(_, entry)| !entry.is_expired())
            .map(|(key, entry)| (key.as_str(), entry))
    }

    fn persist(&mut self) -> bool {
        match self.store.persist(&self.entries) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Failed to persist cache pool");
                false
            }
        }
    }

    /// Look up a stored entry, dropping it if it expired
    fn live_entry(&mut self, key: &str) -> Option<&CacheEntry> {
        if self.entries.get(key).is_some_and(CacheEntry::is_expired) {
            debug!("Dropping expired cache entry {}", key);
            self.entries.remove(key);
            return None;
        }
        self.entries.get(key)
    }
}

impl<S: Store> CacheItemPool for ItemPool<S> {
    fn get_item(&mut self, key: &str) -> CacheResult<CacheItem> {
        let key = validate_key(key)?;
        let ttl = self.default_ttl;

        if let Some(staged) = self.deferred.get(key) {
            if !staged.is_expired() {
                return Ok(CacheItem::found(key.to_string(), &staged.to_entry(ttl), ttl));
            }
        }

        Ok(match self.live_entry(key) {
            Some(entry) => CacheItem::found(key.to_string(), entry, ttl),
            None => CacheItem::missed(key.to_string(), ttl),
        })
    }

    fn has_item(&mut self, key: &str) -> CacheResult<bool> {
        let key = validate_key(key)?;
        Ok(self.live_entry(key).is_some())
    }

    fn clear(&mut self) -> bool {
        self.entries.clear();
        self.persist()
    }

    fn delete_item(&mut self, key: &str) -> CacheResult<bool> {
        let key = validate_key(key)?;
        if self.entries.remove(key).is_none() {
            return Ok(true);
        }
        Ok(self.persist())
    }

    fn delete_items(&mut self, keys: &[&str]) -> CacheResult<bool> {
        for key in keys {
            validate_key(key)?;
        }
        for key in keys {
            self.entries.remove(*key);
        }
        Ok(self.persist())
    }

    fn save(&mut self, item: &CacheItem) -> bool {
        if validate_key(item.key()).is_err() {
            return false;
        }
        let entry = item.to_entry(self.default_ttl);
        self.entries.insert(item.key().to_string(), entry);
        self.persist()
    }

    fn save_deferred(&mut self, mut item: CacheItem) -> bool {
        if validate_key(item.key()).is_err() {
            return false;
        }
        item.bind(self.default_ttl);
        self.deferred.insert(item.key().to_string(), item);
        true
    }

    fn commit(&mut self) -> bool {
        let snapshot = self.entries.clone();
        for (key, item) in &self.deferred {
            self.entries.insert(key.clone(), item.to_entry(self.default_ttl));
        }

        if !self.persist() {
            self.entries = snapshot;
            return false;
        }

        debug!("Committed {} deferred cache items", self.deferred.len());
        self.deferred.clear();
        true
    }

    fn default_expiration(&self) -> Option<DateTime<Utc>> {
        default_expiration(self.default_ttl)
    }

    fn purge_expired(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired());
        before - self.entries.len()
    }

    fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.iter().map(|(key, _)| key.to_string()).collect();
        keys.sort();
        keys
    }
}

impl<S: Store> Drop for ItemPool<S> {
    fn drop(&mut self) {
        self.store.release(&self.entries);
    }
}
