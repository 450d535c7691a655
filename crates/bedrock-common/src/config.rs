use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::types::Result;

/// Raw deflate, the compressor id current worlds are written with.
pub const RAW_ZLIB_COMPRESSOR: u8 = 4;

/// Options applied when a world's store is opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Bytes buffered in the memtable before it is flushed.
    pub write_buffer_size: usize,
    /// Bytes of decompressed table blocks kept in the store's LRU cache.
    pub block_cache_capacity: usize,
    pub create_if_missing: bool,
    pub paranoid_checks: bool,
    /// Compressor id used for blocks the store writes.
    pub compressor: u8,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            write_buffer_size: 4 * 1024 * 1024,
            block_cache_capacity: 40 * 1024 * 1024,
            create_if_missing: false,
            paranoid_checks: false,
            compressor: RAW_ZLIB_COMPRESSOR,
        }
    }
}

impl WorldConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
