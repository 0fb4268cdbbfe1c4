//! Configuration schema for memocache
//!
//! Configuration is stored at `~/.config/memocache/config.toml`

use crate::error::{CacheError, CacheResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Available cache backends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Backend {
    /// One serialized file per pool inside the configured directory
    #[default]
    Filesystem,
    /// In-memory pools without any I/O, for tests and dry runs
    Debug,
}

impl Backend {
    /// Symbolic identifier of this backend
    pub fn id(&self) -> &'static str {
        match self {
            Self::Filesystem => "filesystem",
            Self::Debug => "debug",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for Backend {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "filesystem" | "fs" => Ok(Self::Filesystem),
            "debug" | "memory" => Ok(Self::Debug),
            _ => Err(CacheError::InvalidImplementation { id: s.to_string() }),
        }
    }
}

impl TryFrom<String> for Backend {
    type Error = CacheError;

    fn try_from(id: String) -> Result<Self, Self::Error> {
        id.parse()
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Backend used for managers built from this configuration
    implementation: Backend,

    /// Directory holding the pool files (filesystem backend only)
    directory: Option<PathBuf>,

    /// Default lifetime of new entries in seconds, 0 = never expires
    default_expiration: i64,
}

impl Configuration {
    /// Create a configuration with defaults (filesystem, default dir, no expiry)
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the backend by its symbolic identifier
    pub fn set_implementation(&mut self, id: &str) -> CacheResult<&mut Self> {
        self.implementation = id.parse()?;
        Ok(self)
    }

    /// Select the backend directly
    pub fn set_backend(&mut self, backend: Backend) -> &mut Self {
        self.implementation = backend;
        self
    }

    pub fn implementation(&self) -> Backend {
        self.implementation
    }

    /// Set the storage directory. Existence is checked lazily by the
    /// filesystem backend on first pool access.
    pub fn set_directory(&mut self, dir: impl Into<PathBuf>) -> &mut Self {
        self.directory = Some(dir.into());
        self
    }

    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }

    /// Storage directory, falling back to the user cache directory
    pub fn directory_or_default(&self) -> PathBuf {
        self.directory.clone().unwrap_or_else(Self::default_directory)
    }

    /// Default storage directory (`~/.cache/memocache` on Linux)
    pub fn default_directory() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("memocache")
    }

    /// Set the default expiration in seconds.
    ///
    /// Negative values are stored as given; entries created with them are
    /// already expired.
    pub fn set_default_expiration(&mut self, seconds: i64) -> &mut Self {
        self.default_expiration = seconds;
        self
    }

    pub fn default_expiration(&self) -> i64 {
        self.default_expiration
    }
}
