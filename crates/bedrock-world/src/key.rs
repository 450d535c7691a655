use bedrock_common::{ByteCursor, Dimension, SubchunkPosition};

/// Record tags that follow the chunk coordinates in a store key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    Data3D,
    Version,
    Data2D,
    Data2DLegacy,
    SubchunkPrefix,
    LegacyTerrain,
    BlockEntity,
    Entity,
    PendingTicks,
    BlockExtraData,
    BiomeState,
    FinalizedState,
}

impl RecordType {
    pub fn tag(self) -> u8 {
        match self {
            RecordType::Data3D => 0x2B,
            RecordType::Version => 0x2C,
            RecordType::Data2D => 0x2D,
            RecordType::Data2DLegacy => 0x2E,
            RecordType::SubchunkPrefix => 0x2F,
            RecordType::LegacyTerrain => 0x30,
            RecordType::BlockEntity => 0x31,
            RecordType::Entity => 0x32,
            RecordType::PendingTicks => 0x33,
            RecordType::BlockExtraData => 0x34,
            RecordType::BiomeState => 0x35,
            RecordType::FinalizedState => 0x36,
        }
    }
}

/// Key of a per-chunk record: `x, z, [dimension], tag`. The dimension is left
/// out for the Overworld, as in worlds saved before other dimensions existed.
pub fn chunk_key(x: i32, z: i32, dimension: Dimension, record: RecordType) -> Vec<u8> {
    let capacity = if dimension == Dimension::Overworld { 9 } else { 13 };
    let mut cursor = ByteCursor::with_capacity(capacity + 1);

    cursor.write_i32(x);
    cursor.write_i32(z);
    if dimension != Dimension::Overworld {
        cursor.write_i32(dimension.id());
    }
    cursor.write_u8(record.tag());

    cursor.into_inner()
}

/// Key of one subchunk record: the chunk key for [`RecordType::SubchunkPrefix`]
/// followed by the subchunk's y index.
pub fn build_key(x: i32, z: i32, y: i8, dimension: Dimension) -> Vec<u8> {
    let mut key = chunk_key(x, z, dimension, RecordType::SubchunkPrefix);
    key.push(y as u8);
    key
}

pub fn subchunk_key(position: &SubchunkPosition) -> Vec<u8> {
    build_key(position.x, position.z, position.y, position.dimension)
}

/// Inverse of [`subchunk_key`]. Returns `None` for keys of any other record.
pub fn parse_subchunk_key(key: &[u8]) -> Option<SubchunkPosition> {
    let mut cursor = ByteCursor::from_bytes(key.to_vec());
    let x = cursor.read_i32().ok()?;
    let z = cursor.read_i32().ok()?;

    let dimension = match key.len() {
        10 => Dimension::Overworld,
        14 => Dimension::from_id(cursor.read_i32().ok()?)?,
        _ => return None,
    };

    if cursor.read_u8().ok()? != RecordType::SubchunkPrefix.tag() {
        return None;
    }
    let y = cursor.read_i8().ok()?;

    Some(SubchunkPosition::new(x, y, z, dimension))
}
