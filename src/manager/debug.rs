//! Manager for in-memory pools

use super::{validate_pool_name, CacheManager, Creator};
use crate::config::Configuration;
use crate::error::CacheResult;
use crate::pool::{DebugItemPool, MemoryStore, SharedPool};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::debug;

/// Hands out pools that never touch the disk
#[derive(Debug)]
pub struct DebugCacheManager {
    configuration: Configuration,
    pools: HashMap<String, SharedPool>,
}

impl DebugCacheManager {
    pub fn new(configuration: Configuration) -> Self {
        Self {
            configuration,
            pools: HashMap::new(),
        }
    }
}

impl CacheManager for DebugCacheManager {
    fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    fn get_item_pool(
        &mut self,
        name: &str,
        creator: Option<Creator<'_>>,
    ) -> CacheResult<SharedPool> {
        if let Some(pool) = self.pools.get(name) {
            return Ok(Rc::clone(pool));
        }
        validate_pool_name(name)?;

        let entries = creator.map(|create| create()).unwrap_or_default();
        debug!("Opened in-memory pool {} with {} entries", name, entries.len());

        let pool: SharedPool = Rc::new(RefCell::new(DebugItemPool::new(
            entries,
            self.configuration.default_expiration(),
            MemoryStore,
        )));
        self.pools.insert(name.to_string(), Rc::clone(&pool));
        Ok(pool)
    }

    fn is_opened(&self, name: &str) -> bool {
        self.pools.contains_key(name)
    }

    fn pool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.pools.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CacheError;
    use crate::manager::CacheManagerExt;
    use crate::pool::CacheItemPool;

    fn manager() -> DebugCacheManager {
        DebugCacheManager::new(Configuration::new())
    }

    #[test]
    fn opening_twice_returns_same_pool() {
        let mut manager = manager();
        assert!(!manager.is_opened("test"));

        let pool1 = manager.pool("test").unwrap();
        let pool2 = manager.pool("test").unwrap();
        assert!(Rc::ptr_eq(&pool1, &pool2));
        assert!(manager.is_opened("test"));
    }

    #[test]
    fn creator_seeds_pool() {
        let mut manager = manager();
        let pool = manager.pool_with("test", || [("foo", "bar")]).unwrap();
        assert!(pool.borrow_mut().has_item("foo").unwrap());
    }

    #[test]
    fn creator_ignored_for_open_pool() {
        let mut manager = manager();
        manager.pool("test").unwrap();
        let pool = manager.pool_with("test", || [("foo", "bar")]).unwrap();
        assert!(!pool.borrow_mut().has_item("foo").unwrap());
    }

    #[test]
    fn bad_file_name() {
        let err = manager().pool("../invalidName").unwrap_err();
        assert!(matches!(err, CacheError::BadFileName { .. }));
    }

    #[test]
    fn pools_use_configured_default_expiration() {
        let mut config = Configuration::new();
        config.set_default_expiration(30);
        let mut manager = DebugCacheManager::new(config);

        let pool = manager.pool("ttl").unwrap();
        let item = pool.borrow_mut().get_item("missing").unwrap();
        assert!(item.expiration().is_some());
    }
}
