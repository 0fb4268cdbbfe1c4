//! Manager for pools stored as files
//!
//! Each pool lives in `{directory}/{name}`. Opening a pool:
//!
//! 1. returns the already open pool of that name, if any
//! 2. rejects names containing `..` or `/` before touching the disk
//! 3. creates the storage directory if needed
//! 4. loads the existing file, or falls back to the creator
//! 5. seeds a brand-new pool from the creator and writes it right away

use super::{validate_pool_name, CacheManager, Creator};
use crate::codec::{Codec, JsonCodec};
use crate::config::Configuration;
use crate::error::{CacheError, CacheResult};
use crate::pool::filesystem::modified_time;
use crate::pool::{CacheItemPool, Entries, FileStore, FilesystemItemPool, SharedPool};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, info, warn};

/// Opens pools persisted in one directory
#[derive(Debug)]
pub struct FilesystemCacheManager {
    configuration: Configuration,
    directory: PathBuf,
    codec: Rc<dyn Codec>,
    pools: HashMap<String, SharedPool>,
}

impl FilesystemCacheManager {
    /// Create a manager using the JSON codec
    pub fn new(configuration: Configuration) -> Self {
        Self::with_codec(configuration, JsonCodec::new())
    }

    /// Create a manager writing pool files with a custom codec
    pub fn with_codec(configuration: Configuration, codec: impl Codec + 'static) -> Self {
        let directory = configuration.directory_or_default();
        Self {
            configuration,
            directory,
            codec: Rc::new(codec),
            pools: HashMap::new(),
        }
    }

    /// Directory holding the pool files
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Path of the file backing `name`
    pub fn pool_path(&self, name: &str) -> CacheResult<PathBuf> {
        Ok(self.directory.join(validate_pool_name(name)?))
    }

    /// Names of all pool files in the directory, sorted
    pub fn stored_pools(&self) -> CacheResult<Vec<String>> {
        if !self.directory.exists() {
            return Ok(vec![]);
        }

        let entries = fs::read_dir(&self.directory).map_err(|e| {
            CacheError::io(format!("reading directory {}", self.directory.display()), e)
        })?;

        let mut names = vec![];
        for entry in entries {
            let entry = entry.map_err(|e| CacheError::io("reading directory entry", e))?;
            if !entry.path().is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if validate_pool_name(name).is_ok() {
                    names.push(name.to_string());
                }
            }
        }

        names.sort();
        Ok(names)
    }

    /// Decode a stored pool without opening it. The file is left untouched
    /// and the pool is not registered with this manager.
    pub fn peek_pool(&self, name: &str) -> CacheResult<Entries> {
        let path = self.pool_path(name)?;
        self.read_entries(&path)
    }

    fn ensure_directory(&self) -> CacheResult<()> {
        fs::create_dir_all(&self.directory).map_err(|e| {
            CacheError::io(
                format!("creating cache directory {}", self.directory.display()),
                e,
            )
        })
    }

    fn read_entries(&self, path: &Path) -> CacheResult<Entries> {
        let bytes = fs::read(path).map_err(|e| CacheError::FileUnreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        self.codec
            .decode(&bytes)
            .map_err(|e| CacheError::FileUnreadable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }

    fn load_pool(
        &self,
        path: PathBuf,
        creator: Option<Creator<'_>>,
    ) -> CacheResult<FilesystemItemPool> {
        let ttl = self.configuration.default_expiration();
        let last_update = modified_time(&path);

        let entries = match self.read_entries(&path) {
            Ok(entries) => entries,
            Err(e) => match creator {
                Some(create) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "Cannot read cache file, using creator data"
                    );
                    create()
                }
                None => return Err(e),
            },
        };

        debug!("Loaded {} entries from {}", entries.len(), path.display());
        let store = FileStore::new(path, last_update, Rc::clone(&self.codec));
        Ok(FilesystemItemPool::new(entries, ttl, store))
    }

    fn create_pool(&self, path: PathBuf, creator: Option<Creator<'_>>) -> FilesystemItemPool {
        let ttl = self.configuration.default_expiration();
        let entries = creator.map(|create| create()).unwrap_or_default();
        let seeded = !entries.is_empty();

        let store = FileStore::new(path, None, Rc::clone(&self.codec));
        let mut pool = FilesystemItemPool::new(entries, ttl, store);

        if seeded {
            if pool.commit() {
                info!("Created pool file {}", pool.store().path().display());
            } else {
                warn!(
                    path = %pool.store().path().display(),
                    "Failed to write seeded pool"
                );
            }
        }
        pool
    }
}

impl CacheManager for FilesystemCacheManager {
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

        let path = self.pool_path(name)?;
        self.ensure_directory()?;

        let pool = if path.exists() {
            self.load_pool(path, creator)?
        } else {
            self.create_pool(path, creator)
        };

        let pool: SharedPool = Rc::new(RefCell::new(pool));
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
