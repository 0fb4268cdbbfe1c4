//! memocache - pluggable key-value caching
//!
//! Values live in named pools handed out by a cache manager. The
//! filesystem backend keeps one JSON file per pool and refuses to
//! overwrite a file another session changed underneath it; the debug
//! backend keeps everything in memory.
//!
//! ```no_run
//! use memocache::{create_manager, CacheManagerExt, Configuration};
//!
//! # fn main() -> memocache::CacheResult<()> {
//! let mut manager = create_manager(Configuration::new())?;
//! let pool = manager.pool("sessions")?;
//! let mut pool = pool.borrow_mut();
//!
//! let mut item = pool.get_item("alice")?;
//! if !item.is_hit() {
//!     item.set("logged in").expires_after_secs(3600);
//!     pool.save(&item);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod item;
pub mod manager;
pub mod pool;

pub use codec::{Codec, JsonCodec};
pub use config::{Backend, Configuration};
pub use error::{CacheError, CacheResult, ErrorCode};
pub use item::{CacheEntry, CacheItem};
pub use manager::{
    create_manager, create_manager_for, CacheManager, CacheManagerExt, DebugCacheManager,
    FilesystemCacheManager,
};
pub use pool::{
    CacheItemPool, CacheItemPoolExt, DebugItemPool, Entries, FilesystemItemPool, ItemPool,
    SharedPool, Store,
};
