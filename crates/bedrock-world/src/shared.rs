use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use bedrock_common::{BlockPosition, Result, SubchunkPosition};
use bedrock_nbt::Tag;
use log::{debug, trace};
use once_cell::sync::OnceCell;

use crate::cache::load_subchunk;
use crate::store::KeyValueStore;
use crate::subchunk::Subchunk;

type Slot = Arc<OnceCell<Arc<Subchunk>>>;

/// Subchunk cache that can be shared between threads.
///
/// Lookups of cached subchunks only take a read lock. Concurrent misses on the
/// same position wait on one slot, so each position is read from the store and
/// decoded at most once. A failed load drops its slot, so absent positions
/// take no space and the next caller retries them.
///
/// The store sits behind a mutex and must be `Send`. A `LevelDbStore` is not;
/// use [`crate::ChunkCache`] for those.
pub struct SharedChunkCache<S> {
    store: Mutex<S>,
    slots: RwLock<HashMap<SubchunkPosition, Slot>>,
}

impl<S: KeyValueStore + Send> SharedChunkCache<S> {
    pub fn new(store: S) -> Self {
        Self {
            store: Mutex::new(store),
            slots: RwLock::new(HashMap::new()),
        }
    }

    pub fn get_or_load_subchunk(&self, position: SubchunkPosition) -> Result<Arc<Subchunk>> {
        let slot = self.slot(position);

        if let Some(subchunk) = slot.get() {
            trace!("Subchunk cache hit at {}", position);
            return Ok(Arc::clone(subchunk));
        }

        let loaded = slot.get_or_try_init(|| {
            debug!("Subchunk cache miss at {}", position);
            let mut store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
            load_subchunk(&mut *store, position).map(Arc::new)
        });
        match loaded {
            Ok(subchunk) => Ok(Arc::clone(subchunk)),
            Err(e) => {
                self.discard_empty_slot(position, &slot);
                Err(e)
            }
        }
    }

    /// Palette entry of the block at a world position, cloned out of the cache.
    pub fn get_block(&self, position: BlockPosition) -> Result<Tag> {
        let subchunk_position = position.subchunk()?;
        let (x, y, z) = position.local();
        let subchunk = self.get_or_load_subchunk(subchunk_position)?;
        subchunk.block_at(x, y, z).cloned()
    }

    /// Subchunks currently loaded; slots still loading or left empty by a
    /// failed load are not counted.
    pub fn len(&self) -> usize {
        self.read_slots()
            .values()
            .filter(|slot| slot.get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every slot. Subchunks already handed out stay alive through
    /// their `Arc`s.
    pub fn clear(&self) {
        self.slots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.store
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .release_memory();
    }

    pub fn close(self) -> Result<()> {
        self.store
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .close()
    }

    fn read_slots(&self) -> std::sync::RwLockReadGuard<'_, HashMap<SubchunkPosition, Slot>> {
        self.slots.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Removes the slot a failed load left behind, unless another caller has
    /// replaced or filled it since.
    fn discard_empty_slot(&self, position: SubchunkPosition, slot: &Slot) {
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        let stale = slots
            .get(&position)
            .is_some_and(|current| Arc::ptr_eq(current, slot) && current.get().is_none());
        if stale {
            slots.remove(&position);
        }
    }

    fn slot(&self, position: SubchunkPosition) -> Slot {
        if let Some(slot) = self.read_slots().get(&position) {
            return Arc::clone(slot);
        }
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(position).or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::subchunk_key;
    use crate::store::MemoryStore;
    use crate::subchunk::{BLOCKS_PER_SUBCHUNK, LEGACY_VERSION};
    use assert_matches::assert_matches;
    use bedrock_common::{BedrockError, ByteCursor, Dimension};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    /// Memory store that counts reads.
    struct CountingStore {
        inner: MemoryStore,
        reads: Arc<AtomicUsize>,
    }

    impl KeyValueStore for CountingStore {
        fn get(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.get(key)
        }

        fn close(self) -> Result<()> {
            self.inner.close()
        }
    }

    fn uniform_subchunk(id: i32) -> Vec<u8> {
        let mut cursor = ByteCursor::new();
        cursor.write_u8(LEGACY_VERSION);
        cursor.write_u8(1 << 1);
        for _ in 0..BLOCKS_PER_SUBCHUNK / 32 {
            cursor.write_u32(0);
        }
        cursor.write_u32(1);
        Tag::compound([("id", Tag::Int(id))])
            .write(&mut cursor, "")
            .unwrap();
        cursor.into_inner()
    }

    fn counting_cache(
        entries: &[(SubchunkPosition, Vec<u8>)],
    ) -> (SharedChunkCache<CountingStore>, Arc<AtomicUsize>) {
        let mut inner = MemoryStore::new();
        for (position, bytes) in entries {
            inner.insert(subchunk_key(position), bytes.clone());
        }
        let reads = Arc::new(AtomicUsize::new(0));
        let store = CountingStore {
            inner,
            reads: Arc::clone(&reads),
        };
        (SharedChunkCache::new(store), reads)
    }

    #[test]
    fn test_concurrent_misses_read_once() {
        let position = SubchunkPosition::new(4, 0, -4, Dimension::Overworld);
        let (cache, reads) = counting_cache(&[(position, uniform_subchunk(5))]);

        thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    let block = cache
                        .get_block(BlockPosition::new(64, 3, -60, Dimension::Overworld))
                        .unwrap();
                    assert_eq!(block.get("id"), Some(&Tag::Int(5)));
                });
            }
        });

        assert_eq!(reads.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_hits_share_subchunk() {
        let position = SubchunkPosition::new(0, 0, 0, Dimension::Overworld);
        let (cache, reads) = counting_cache(&[(position, uniform_subchunk(1))]);

        let first = cache.get_or_load_subchunk(position).unwrap();
        let second = cache.get_or_load_subchunk(position).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(reads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_load_is_retried() {
        let position = SubchunkPosition::new(0, 1, 0, Dimension::Nether);
        let (cache, reads) = counting_cache(&[]);

        assert_matches!(
            cache.get_or_load_subchunk(position),
            Err(BedrockError::EntryNotFound { .. })
        );
        assert!(cache.is_empty());
        assert_matches!(
            cache.get_or_load_subchunk(position),
            Err(BedrockError::EntryNotFound { .. })
        );
        assert_eq!(reads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_failed_loads_leave_no_slots() {
        let present = SubchunkPosition::new(0, 0, 0, Dimension::Overworld);
        let (cache, _) = counting_cache(&[(present, uniform_subchunk(1))]);

        for x in 1..=32 {
            let absent = SubchunkPosition::new(x, 0, 0, Dimension::Overworld);
            assert!(cache.get_or_load_subchunk(absent).is_err());
        }
        assert!(cache.read_slots().is_empty());

        cache.get_or_load_subchunk(present).unwrap();
        assert_eq!(cache.read_slots().len(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clear_keeps_handed_out_subchunks() {
        let position = SubchunkPosition::new(0, 0, 0, Dimension::Overworld);
        let (cache, reads) = counting_cache(&[(position, uniform_subchunk(1))]);

        let subchunk = cache.get_or_load_subchunk(position).unwrap();
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(subchunk.position(), position);

        cache.get_or_load_subchunk(position).unwrap();
        assert_eq!(reads.load(Ordering::SeqCst), 2);
        assert!(cache.close().is_ok());
    }
}
