//! Serialization of pool entries
//!
//! The filesystem backend delegates the byte format to a `Codec`. The
//! default is JSON: `{ "<key>": { "value": <json>, "expires": <rfc3339>|null } }`.

use crate::error::{CacheError, CacheResult};
use crate::pool::Entries;
use std::fmt;

/// Turns a pool's entries into bytes and back
pub trait Codec: fmt::Debug {
    /// Encode all entries of a pool
    fn encode(&self, entries: &Entries) -> CacheResult<Vec<u8>>;

    /// Decode entries previously produced by `encode`
    fn decode(&self, bytes: &[u8]) -> CacheResult<Entries>;
}

/// JSON codec backed by serde_json
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec {
    pretty: bool,
}

impl JsonCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indented output, handy when pool files are inspected by hand
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl Codec for JsonCodec {
    fn encode(&self, entries: &Entries) -> CacheResult<Vec<u8>> {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(entries)?
        } else {
            serde_json::to_vec(entries)?
        };
        Ok(bytes)
    }

    fn decode(&self, bytes: &[u8]) -> CacheResult<Entries> {
        // An empty file is an empty pool, not a corrupt one
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Entries::new());
        }
        serde_json::from_slice(bytes).map_err(|e| CacheError::Codec(e.to_string()))
    }
}
