//! In-memory pools without persistence

use super::{Entries, ItemPool, Store};
use crate::error::CacheResult;

/// Pool that only lives in memory
pub type DebugItemPool = ItemPool<MemoryStore>;

/// Store that accepts every write and performs no I/O
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryStore;

impl Store for MemoryStore {
    fn persist(&mut self, _entries: &Entries) -> CacheResult<()> {
        Ok(())
    }
}
