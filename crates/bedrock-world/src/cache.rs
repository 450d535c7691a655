use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::Path;

use bedrock_common::{BedrockError, BlockPosition, Result, SubchunkPosition, WorldConfig};
use bedrock_nbt::Tag;
use log::{debug, trace};

use crate::key::subchunk_key;
use crate::store::{KeyValueStore, LevelDbStore};
use crate::subchunk::{decode_subchunk, Subchunk};

/// A world opened from its LevelDB directory.
pub type World = ChunkCache<LevelDbStore>;

/// Decoded subchunks of one world, loaded from `S` on first access and kept
/// until evicted or cleared.
pub struct ChunkCache<S> {
    store: S,
    subchunks: HashMap<SubchunkPosition, Subchunk>,
}

impl<S: KeyValueStore> ChunkCache<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            subchunks: HashMap::new(),
        }
    }

    /// Returns the cached subchunk, reading and decoding it on a miss. A
    /// failed load caches nothing.
    pub fn get_or_load_subchunk(&mut self, position: SubchunkPosition) -> Result<&Subchunk> {
        match self.subchunks.entry(position) {
            Entry::Occupied(entry) => {
                trace!("Subchunk cache hit at {}", position);
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => {
                debug!("Subchunk cache miss at {}", position);
                let subchunk = load_subchunk(&mut self.store, position)?;
                Ok(entry.insert(subchunk))
            }
        }
    }

    /// Palette entry of the block at a world position, from the first storage
    /// record of its subchunk.
    pub fn get_block(&mut self, position: BlockPosition) -> Result<&Tag> {
        let subchunk_position = position.subchunk()?;
        let (x, y, z) = position.local();
        self.get_or_load_subchunk(subchunk_position)?
            .block_at(x, y, z)
    }

    pub fn get(&self, position: &SubchunkPosition) -> Option<&Subchunk> {
        self.subchunks.get(position)
    }

    pub fn contains(&self, position: &SubchunkPosition) -> bool {
        self.subchunks.contains_key(position)
    }

    pub fn len(&self) -> usize {
        self.subchunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subchunks.is_empty()
    }

    pub fn evict(&mut self, position: &SubchunkPosition) -> Option<Subchunk> {
        self.subchunks.remove(position)
    }

    /// Drops every cached subchunk and asks the store to release its own caches.
    pub fn clear(&mut self) {
        debug!("Clearing {} cached subchunks", self.subchunks.len());
        self.subchunks.clear();
        self.store.release_memory();
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn close(mut self) -> Result<()> {
        self.clear();
        self.store.close()
    }
}

impl World {
    pub fn open(path: impl AsRef<Path>, config: &WorldConfig) -> Result<Self> {
        let path = path.as_ref();
        debug!("Opening world at {}", path.display());
        Ok(Self::new(LevelDbStore::open(path, config)?))
    }
}

/// Reads and decodes the subchunk at `position`.
pub(crate) fn load_subchunk<S: KeyValueStore>(
    store: &mut S,
    position: SubchunkPosition,
) -> Result<Subchunk> {
    let key = subchunk_key(&position);
    let bytes = store
        .get(&key)?
        .ok_or(BedrockError::EntryNotFound { position })?;

    debug!("Decoding {} bytes of subchunk {}", bytes.len(), position);
    decode_subchunk(bytes, position).map_err(|source| BedrockError::DeserializationFailed {
        position,
        source: Box::new(source),
    })
}
