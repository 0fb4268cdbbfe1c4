//! Cache managers
//!
//! A manager opens named pools and keeps them for its own lifetime: asking
//! twice for the same name returns the same `SharedPool`. There is no global
//! registry; construct one manager per session (or per test).

pub mod debug;
pub mod filesystem;

pub use debug::DebugCacheManager;
pub use filesystem::FilesystemCacheManager;

use crate::config::{Backend, Configuration};
use crate::error::{CacheError, CacheResult};
use crate::pool::{seed_entries, Entries, SharedPool};
use serde_json::Value;
use std::fmt;

/// Produces the initial entries of a pool that has no usable backing data
pub type Creator<'a> = Box<dyn FnOnce() -> Entries + 'a>;

/// Reject pool names that could escape the storage directory
pub fn validate_pool_name(name: &str) -> CacheResult<&str> {
    if name.is_empty() || name.contains("..") || name.contains('/') || name.contains('\\') {
        return Err(CacheError::bad_file_name(name));
    }
    Ok(name)
}

/// Opens and tracks the pools of one session
pub trait CacheManager: fmt::Debug {
    /// Configuration this manager was built from
    fn configuration(&self) -> &Configuration;

    /// Open `name`, or return it unchanged if this manager opened it before.
    ///
    /// `creator` seeds the pool when there is no backing data yet, or when
    /// the existing data cannot be read.
    fn get_item_pool(
        &mut self,
        name: &str,
        creator: Option<Creator<'_>>,
    ) -> CacheResult<SharedPool>;

    /// Whether `name` is open in this session
    fn is_opened(&self, name: &str) -> bool;

    /// Names of all pools open in this session, sorted
    fn pool_names(&self) -> Vec<String>;
}

/// Convenience wrappers for `CacheManager::get_item_pool`
pub trait CacheManagerExt: CacheManager {
    /// Open a pool without a creator
    fn pool(&mut self, name: &str) -> CacheResult<SharedPool> {
        self.get_item_pool(name, None)
    }

    /// Open a pool, seeding it from `creator` on first creation. Every
    /// produced entry starts out without expiration.
    fn pool_with<F, I, K, V>(&mut self, name: &str, creator: F) -> CacheResult<SharedPool>
    where
        F: FnOnce() -> I,
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.get_item_pool(name, Some(Box::new(move || seed_entries(creator()))))
    }
}

impl<M: CacheManager + ?Sized> CacheManagerExt for M {}

/// Build the manager selected by the configuration
pub fn create_manager(config: Configuration) -> CacheResult<Box<dyn CacheManager>> {
    match config.implementation() {
        Backend::Filesystem => Ok(Box::new(FilesystemCacheManager::new(config))),
        Backend::Debug => Ok(Box::new(DebugCacheManager::new(config))),
    }
}

/// Build a manager from a symbolic backend identifier
pub fn create_manager_for(
    id: &str,
    mut config: Configuration,
) -> CacheResult<Box<dyn CacheManager>> {
    config.set_implementation(id)?;
    create_manager(config)
}
