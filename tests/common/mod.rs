use std::path::Path;

use bedrock::{SubchunkPosition, Tag, WorldConfig};
use bedrock_common::ByteCursor;
use bedrock_world::store::world_options;
use bedrock_world::subchunk_key;
use rusty_leveldb::DB;

pub fn block_state(name: &str) -> Tag {
    Tag::compound([
        ("name", Tag::String(name.to_string())),
        ("version", Tag::Int(17959425)),
    ])
}

/// Version 8 subchunk with one 4 bit layer. `block` picks the palette index
/// for each local (x, y, z).
pub fn subchunk_bytes(palette: &[Tag], block: impl Fn(usize, usize, usize) -> u16) -> Vec<u8> {
    let mut indices = vec![0u16; 4096];
    for x in 0..16 {
        for z in 0..16 {
            for y in 0..16 {
                indices[256 * x + 16 * z + y] = block(x, y, z);
            }
        }
    }

    let mut cursor = ByteCursor::new();
    cursor.write_u8(8);
    cursor.write_u8(1);
    cursor.write_u8(4 << 1);
    for chunk in indices.chunks(8) {
        let word = chunk
            .iter()
            .enumerate()
            .fold(0u32, |word, (i, &index)| word | (index as u32) << (4 * i));
        cursor.write_u32(word);
    }
    cursor.write_u32(palette.len() as u32);
    for entry in palette {
        entry.write(&mut cursor, "").unwrap();
    }
    cursor.into_inner()
}

/// Writes subchunks into a new world database at `path`.
pub fn create_world(path: &Path, subchunks: &[(SubchunkPosition, Vec<u8>)]) {
    let config = WorldConfig {
        create_if_missing: true,
        ..WorldConfig::default()
    };
    let mut db = DB::open(path, world_options(&config)).unwrap();
    for (position, bytes) in subchunks {
        db.put(&subchunk_key(position), bytes).unwrap();
    }
    db.flush().unwrap();
    db.close().unwrap();
}
