//! CLI command implementations

pub mod clear;
pub mod config;
pub mod entries;
pub mod list;
pub mod show;

pub use clear::{clear, purge};
pub use config::execute as config;
pub use entries::{delete, get, set};
pub use list::execute as list;
pub use show::execute as show;

use crate::error::{CacheError, CacheResult};

/// Turn a pool write result into an error the CLI can report
pub(crate) fn ensure_persisted(persisted: bool, pool: &str) -> CacheResult<()> {
    if persisted {
        Ok(())
    } else {
        Err(CacheError::PersistFailed {
            pool: pool.to_string(),
        })
    }
}

/// Compact one-line rendering of a value for tables
pub(crate) fn preview(value: &serde_json::Value, width: usize) -> String {
    let text = value.to_string();
    if text.chars().count() <= width {
        return text;
    }
    let cut: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", cut)
}
