//! Error types for memocache
//!
//! All fallible operations return `CacheResult<T>`. Write failures inside a
//! pool (stale file, disk errors) never surface here: pool operations report
//! them as a `false` return so callers can decide to retry or abandon.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for memocache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// Machine-readable error code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidImplementation,
    BadFileName,
    FileUnreadable,
    InvalidKey,
    Io,
    StaleWrite,
    Persist,
    Codec,
    Config,
}

impl ErrorCode {
    /// Numeric code of the error
    ///
    /// Key errors live in their own namespace, so `InvalidKey` shares its
    /// number with `BadFileName`.
    pub fn as_u8(self) -> u8 {
        match self {
            Self::InvalidImplementation => 1,
            Self::BadFileName | Self::InvalidKey => 2,
            Self::FileUnreadable => 3,
            Self::Io => 10,
            Self::StaleWrite => 11,
            Self::Persist => 12,
            Self::Codec => 13,
            Self::Config => 20,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InvalidImplementation => "invalid_implementation",
            Self::BadFileName => "bad_file_name",
            Self::FileUnreadable => "file_unreadable",
            Self::InvalidKey => "invalid_key",
            Self::Io => "io",
            Self::StaleWrite => "stale_write",
            Self::Persist => "persist",
            Self::Codec => "codec",
            Self::Config => "config",
        };
        write!(f, "{}", name)
    }
}

/// All errors that can occur in memocache
#[derive(Error, Debug)]
pub enum CacheError {
    // Validation errors
    #[error("Invalid cache implementation: {id}")]
    InvalidImplementation { id: String },

    #[error("Bad pool name: {name}")]
    BadFileName { name: String },

    #[error("Invalid cache item key {key:?}: {reason}")]
    InvalidKey { key: String, reason: &'static str },

    // Backing store errors
    #[error("Cannot read pool file {path}: {reason}")]
    FileUnreadable { path: PathBuf, reason: String },

    #[error("Pool file {path} was modified by another session")]
    StaleWrite { path: PathBuf },

    #[error("Failed to persist pool {pool}")]
    PersistFailed { pool: String },

    #[error("Codec error: {0}")]
    Codec(String),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl CacheError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a bad file name error
    pub fn bad_file_name(name: impl Into<String>) -> Self {
        Self::BadFileName { name: name.into() }
    }

    /// Create an invalid key error
    pub fn invalid_key(key: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidKey {
            key: key.into(),
            reason,
        }
    }

    /// Get the machine-readable code of this error
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidImplementation { .. } => ErrorCode::InvalidImplementation,
            Self::BadFileName { .. } => ErrorCode::BadFileName,
            Self::InvalidKey { .. } => ErrorCode::InvalidKey,
            Self::FileUnreadable { .. } => ErrorCode::FileUnreadable,
            Self::StaleWrite { .. } => ErrorCode::StaleWrite,
            Self::PersistFailed { .. } => ErrorCode::Persist,
            Self::Codec(_) | Self::Json(_) => ErrorCode::Codec,
            Self::ConfigInvalid { .. } | Self::TomlParse(_) | Self::TomlSerialize(_) => {
                ErrorCode::Config
            }
            Self::Io { .. } => ErrorCode::Io,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::InvalidImplementation { .. } => Some("Supported backends: filesystem, debug"),
            Self::BadFileName { .. } => Some("Pool names must not contain '/' or '..'"),
            Self::StaleWrite { .. } | Self::PersistFailed { .. } => {
                Some("The pool file may have changed meanwhile; run the command again")
            }
            Self::ConfigInvalid { .. } => Some("Fix the file shown above or remove it to use defaults"),
            _ => None,
        }
    }
}
