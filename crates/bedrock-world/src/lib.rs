//! Reading block states out of Bedrock Edition worlds: store keys, subchunk
//! decoding and the caches that sit in front of the world database.

pub mod cache;
pub mod key;
pub mod shared;
pub mod store;
pub mod subchunk;

pub use cache::{ChunkCache, World};
pub use key::{build_key, chunk_key, parse_subchunk_key, subchunk_key, RecordType};
pub use shared::SharedChunkCache;
pub use store::{KeyValueStore, LevelDbStore, MemoryStore};
pub use subchunk::{decode_subchunk, unpack_word, BlockStorageRecord, Subchunk};
