use std::fmt;

use bedrock_common::{BedrockError, ByteCursor, Result, SubchunkPosition};
use bedrock_nbt::Tag;

/// Blocks in one subchunk (16 * 16 * 16).
pub const BLOCKS_PER_SUBCHUNK: usize = 4096;

/// Single storage record, no count byte.
pub const LEGACY_VERSION: u8 = 1;
/// Explicit storage record count after the version byte.
pub const MULTI_LAYER_VERSION: u8 = 8;

const MAX_BITS_PER_BLOCK: u8 = 16;

/// Bytes in front of every palette compound: TAG_Compound and an empty name.
const PALETTE_ENTRY_PREFIX: [u8; 3] = [0x0A, 0x00, 0x00];

/// One bit-packed layer of block indices and the palette they index into.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStorageRecord {
    version: u8,
    palette: Vec<Tag>,
    blocks: Vec<u16>,
}

impl BlockStorageRecord {
    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn bits_per_block(&self) -> u8 {
        self.version >> 1
    }

    pub fn blocks_per_word(&self) -> usize {
        32 / self.bits_per_block() as usize
    }

    /// Palette entries, each a `Tag::Compound`.
    pub fn palette(&self) -> &[Tag] {
        &self.palette
    }

    /// Palette index of every block, in `16*16*x + 16*z + y` order.
    pub fn blocks(&self) -> &[u16] {
        &self.blocks
    }

    pub fn block_at(&self, x: usize, y: usize, z: usize) -> Result<&Tag> {
        if x >= 16 || y >= 16 || z >= 16 {
            return Err(BedrockError::invalid_data(format!(
                "Local block ({}, {}, {}) is outside the subchunk",
                x, y, z
            )));
        }
        let index = self.blocks[16 * 16 * x + 16 * z + y] as usize;
        // Indices were bounds-checked during decode.
        Ok(&self.palette[index])
    }

    fn read(cursor: &mut ByteCursor) -> Result<Self> {
        let version = cursor.read_u8()?;
        let bits_per_block = version >> 1;
        if bits_per_block == 0 || bits_per_block > MAX_BITS_PER_BLOCK {
            return Err(BedrockError::invalid_data(format!(
                "Storage record version {} gives {} bits per block",
                version, bits_per_block
            )));
        }

        let blocks_per_word = 32 / bits_per_block as usize;
        let word_count = BLOCKS_PER_SUBCHUNK.div_ceil(blocks_per_word);

        let mut blocks = Vec::new();
        blocks.try_reserve_exact(BLOCKS_PER_SUBCHUNK)?;
        for _ in 0..word_count {
            let word = cursor.read_u32()?;
            unpack_word(word, bits_per_block, &mut blocks, BLOCKS_PER_SUBCHUNK);
        }

        let palette_size = cursor.read_u32()?;
        let palette_size = u16::try_from(palette_size).map_err(|_| {
            BedrockError::invalid_data(format!(
                "Palette of {} entries cannot be indexed by 16-bit block indices",
                palette_size
            ))
        })?;

        let mut palette = Vec::new();
        palette.try_reserve_exact(palette_size as usize)?;
        for _ in 0..palette_size {
            let prefix = cursor.read_bytes(PALETTE_ENTRY_PREFIX.len())?;
            if prefix != PALETTE_ENTRY_PREFIX {
                return Err(BedrockError::invalid_data(format!(
                    "Palette entry starts with {:02x?}, expected an unnamed compound",
                    prefix
                )));
            }
            palette.push(Tag::read_compound(cursor)?);
        }

        if let Some(position) = blocks
            .iter()
            .position(|&index| index as usize >= palette.len())
        {
            return Err(BedrockError::invalid_data(format!(
                "Block {} has palette index {} but the palette holds {} entries",
                position,
                blocks[position],
                palette.len()
            )));
        }

        Ok(Self {
            version,
            palette,
            blocks,
        })
    }
}

/// Splits one packed word into block indices, lowest bits first, stopping once
/// `out` holds `limit` indices.
pub fn unpack_word(mut word: u32, bits_per_block: u8, out: &mut Vec<u16>, limit: usize) {
    let mask = !(u32::MAX << bits_per_block);
    let blocks_per_word = 32 / bits_per_block as usize;

    for _ in 0..blocks_per_word {
        if out.len() >= limit {
            break;
        }
        out.push((word & mask) as u16);
        word >>= bits_per_block;
    }
}

/// A decoded subchunk. Owns its storage records and all palette tags.
#[derive(Debug, Clone, PartialEq)]
pub struct Subchunk {
    version: u8,
    storage_records: Vec<BlockStorageRecord>,
    position: SubchunkPosition,
}

impl Subchunk {
    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn position(&self) -> SubchunkPosition {
        self.position
    }

    pub fn storage_records(&self) -> &[BlockStorageRecord] {
        &self.storage_records
    }

    /// Block state in the first storage record; later records hold
    /// secondary layers such as waterlogging.
    pub fn block_at(&self, x: usize, y: usize, z: usize) -> Result<&Tag> {
        self.block_at_layer(0, x, y, z)
    }

    pub fn block_at_layer(&self, layer: usize, x: usize, y: usize, z: usize) -> Result<&Tag> {
        let record = self.storage_records.get(layer).ok_or_else(|| {
            BedrockError::invalid_data(format!(
                "Subchunk {} has no storage record {}",
                self.position, layer
            ))
        })?;
        record.block_at(x, y, z)
    }
}

impl fmt::Display for Subchunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Subchunk {} version: {}", self.position, self.version)?;
        for (layer, record) in self.storage_records.iter().enumerate() {
            writeln!(
                f,
                "Layer {}: {} bits per block, palette block count: {}",
                layer,
                record.bits_per_block(),
                record.palette.len()
            )?;
            for entry in &record.palette {
                write!(f, "{}", entry)?;
            }
        }
        Ok(())
    }
}

/// Decodes the value of a subchunk record. Any failure discards everything
/// decoded so far.
pub fn decode_subchunk(bytes: Vec<u8>, position: SubchunkPosition) -> Result<Subchunk> {
    let mut cursor = ByteCursor::from_bytes(bytes);

    let version = cursor.read_u8()?;
    let storage_count = match version {
        LEGACY_VERSION => 1,
        MULTI_LAYER_VERSION => cursor.read_u8()?,
        _ => {
            return Err(BedrockError::invalid_data(format!(
                "Subchunk version {} (should be either {} or {})",
                version, LEGACY_VERSION, MULTI_LAYER_VERSION
            )))
        }
    };
    if storage_count == 0 {
        return Err(BedrockError::invalid_data("Subchunk has no storage records"));
    }

    let mut storage_records = Vec::with_capacity(storage_count as usize);
    for _ in 0..storage_count {
        storage_records.push(BlockStorageRecord::read(&mut cursor)?);
    }

    Ok(Subchunk {
        version,
        storage_records,
        position,
    })
}
