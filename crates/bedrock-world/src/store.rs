use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::Path;
use std::rc::Rc;

use bedrock_common::error::hex_key;
use bedrock_common::{BedrockError, Result, WorldConfig};
use flate2::read::{DeflateDecoder, ZlibDecoder};
use flate2::write::{DeflateEncoder, ZlibEncoder};
use flate2::Compression;
use rusty_leveldb::compressor::{Compressor, CompressorId};
use rusty_leveldb::{CompressorList, Options, DB};

/// Read access to the key-value database a world is stored in.
pub trait KeyValueStore {
    /// `Ok(None)` when the key is absent.
    fn get(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Hint to drop any internal read caches.
    fn release_memory(&mut self) {}

    fn close(self) -> Result<()>
    where
        Self: Sized;
}

/// Block compression with a zlib header (id 2), used by older worlds.
pub struct ZlibCompressor(Compression);

impl CompressorId for ZlibCompressor {
    const ID: u8 = 2;
}

impl Compressor for ZlibCompressor {
    fn encode(&self, block: Vec<u8>) -> rusty_leveldb::Result<Vec<u8>> {
        let mut encoder = ZlibEncoder::new(Vec::new(), self.0);
        encoder.write_all(&block)?;
        Ok(encoder.finish()?)
    }

    fn decode(&self, block: Vec<u8>) -> rusty_leveldb::Result<Vec<u8>> {
        let mut decoded = Vec::new();
        ZlibDecoder::new(block.as_slice()).read_to_end(&mut decoded)?;
        Ok(decoded)
    }
}

/// Headerless deflate (id 4), what current worlds are written with.
pub struct RawZlibCompressor(Compression);

impl CompressorId for RawZlibCompressor {
    const ID: u8 = 4;
}

impl Compressor for RawZlibCompressor {
    fn encode(&self, block: Vec<u8>) -> rusty_leveldb::Result<Vec<u8>> {
        let mut encoder = DeflateEncoder::new(Vec::new(), self.0);
        encoder.write_all(&block)?;
        Ok(encoder.finish()?)
    }

    fn decode(&self, block: Vec<u8>) -> rusty_leveldb::Result<Vec<u8>> {
        let mut decoded = Vec::new();
        DeflateDecoder::new(block.as_slice()).read_to_end(&mut decoded)?;
        Ok(decoded)
    }
}

/// Compressors a Bedrock world may contain, on top of the defaults (id 0, no
/// compression).
pub fn bedrock_compressors() -> CompressorList {
    let mut list = CompressorList::new();
    list.set(ZlibCompressor(Compression::default()));
    list.set(RawZlibCompressor(Compression::default()));
    list
}

/// Installs the Bedrock compressors into already prepared options, such as
/// those from `rusty_leveldb::in_memory`.
pub fn install_compressors(options: &mut Options) {
    options.compressor_list = Rc::new(bedrock_compressors());
}

/// Store options for a world on disk: LevelDB defaults with `config` on top.
pub fn world_options(config: &WorldConfig) -> Options {
    let mut options = Options::default();
    options.create_if_missing = config.create_if_missing;
    options.paranoid_checks = config.paranoid_checks;
    options.write_buffer_size = config.write_buffer_size;
    options.block_cache_capacity_bytes = config.block_cache_capacity;
    options.compressor = config.compressor;
    install_compressors(&mut options);
    options
}

/// A world's LevelDB database.
pub struct LevelDbStore {
    db: DB,
}

impl LevelDbStore {
    pub fn open(path: impl AsRef<Path>, config: &WorldConfig) -> Result<Self> {
        let path = path.as_ref();
        let db = DB::open(path, world_options(config)).map_err(|e| BedrockError::StoreOpenFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(Self { db })
    }

    /// Wraps an already opened database, e.g. one from `rusty_leveldb::in_memory`.
    pub fn from_db(db: DB) -> Self {
        Self { db }
    }
}

impl KeyValueStore for LevelDbStore {
    fn get(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        // `DB::get` folds read errors into `None`; reading at a snapshot
        // keeps them apart from missing keys.
        let snapshot = self.db.get_snapshot();
        self.db
            .get_at(&snapshot, key)
            .map(|value| value.map(|v| v.to_vec()))
            .map_err(|e| read_failed(key, e))
    }

    fn close(mut self) -> Result<()> {
        self.db
            .close()
            .map_err(|e| read_failed(&[], format!("close failed: {}", e)))
    }
}

/// Store backed by a `HashMap`.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<Vec<u8>, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: Vec<u8>, value: Vec<u8>) -> Option<Vec<u8>> {
        self.entries.insert(key, value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.get(key).cloned())
    }

    fn close(self) -> Result<()> {
        Ok(())
    }
}

/// Error for a failed read of `key`.
pub fn read_failed(key: &[u8], reason: impl ToString) -> BedrockError {
    BedrockError::StoreReadFailed {
        key: hex_key(key),
        reason: reason.to_string(),
    }
}
