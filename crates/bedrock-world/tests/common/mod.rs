#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bedrock_common::{ByteCursor, Result, SubchunkPosition};
use bedrock_nbt::Tag;
use bedrock_world::{subchunk_key, KeyValueStore, MemoryStore};

pub const BLOCKS: usize = 4096;

/// Builds the bytes of a subchunk record.
pub struct SubchunkBuilder {
    version: u8,
    layers: Vec<(u8, Vec<u16>, Vec<Tag>)>,
}

impl SubchunkBuilder {
    pub fn legacy() -> Self {
        Self {
            version: 1,
            layers: Vec::new(),
        }
    }

    pub fn multi_layer() -> Self {
        Self {
            version: 8,
            layers: Vec::new(),
        }
    }

    pub fn layer(mut self, bits_per_block: u8, blocks: Vec<u16>, palette: Vec<Tag>) -> Self {
        self.layers.push((bits_per_block, blocks, palette));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut cursor = ByteCursor::new();
        cursor.write_u8(self.version);
        if self.version == 8 {
            cursor.write_u8(self.layers.len() as u8);
        }

        for (bits_per_block, blocks, palette) in &self.layers {
            cursor.write_u8(bits_per_block << 1);
            let per_word = 32 / *bits_per_block as usize;
            for chunk in blocks.chunks(per_word) {
                let mut word = 0u32;
                for (i, &index) in chunk.iter().enumerate() {
                    word |= (index as u32) << (i * *bits_per_block as usize);
                }
                cursor.write_u32(word);
            }
            cursor.write_u32(palette.len() as u32);
            for entry in palette {
                entry.write(&mut cursor, "").unwrap();
            }
        }

        cursor.into_inner()
    }
}

pub fn block_state(name: &str) -> Tag {
    Tag::compound([
        ("name", Tag::String(name.to_string())),
        ("states", Tag::compound(Vec::<(String, Tag)>::new())),
        ("version", Tag::Int(17959425)),
    ])
}

pub fn id_entry(id: i32) -> Tag {
    Tag::compound([("id", Tag::Int(id))])
}

/// Memory store that counts reads.
pub struct CountingStore {
    pub inner: MemoryStore,
    pub reads: Arc<AtomicUsize>,
    pub released: Arc<AtomicUsize>,
}

impl CountingStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            reads: Arc::new(AtomicUsize::new(0)),
            released: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_subchunk(mut self, position: SubchunkPosition, bytes: Vec<u8>) -> Self {
        self.inner.insert(subchunk_key(&position), bytes);
        self
    }

    pub fn reads(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.reads)
    }
}

impl KeyValueStore for CountingStore {
    fn get(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key)
    }

    fn release_memory(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }

    fn close(self) -> Result<()> {
        self.inner.close()
    }
}
