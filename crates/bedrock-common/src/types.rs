use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BedrockError;

pub type Result<T> = std::result::Result<T, crate::error::BedrockError>;

/// Edge length of a subchunk in blocks, on every axis.
pub const SUBCHUNK_SIZE: i32 = 16;

#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Dimension {
    #[default]
    Overworld,
    Nether,
    End,
}

impl Dimension {
    /// Numeric id used in store keys.
    pub fn id(self) -> i32 {
        match self {
            Dimension::Overworld => 0,
            Dimension::Nether => 1,
            Dimension::End => 2,
        }
    }

    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            0 => Some(Dimension::Overworld),
            1 => Some(Dimension::Nether),
            2 => Some(Dimension::End),
            _ => None,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Overworld => write!(f, "Overworld"),
            Dimension::Nether => write!(f, "Nether"),
            Dimension::End => write!(f, "End"),
        }
    }
}

impl FromStr for Dimension {
    type Err = BedrockError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "overworld" | "0" => Ok(Dimension::Overworld),
            "nether" | "1" => Ok(Dimension::Nether),
            "end" | "2" => Ok(Dimension::End),
            _ => Err(BedrockError::invalid_data(format!("Unknown dimension: {}", s))),
        }
    }
}

/// Address of one 16x16x16 subchunk. Field order gives the derived ordering:
/// lexicographic over (x, z, y, dimension).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubchunkPosition {
    pub x: i32,
    pub z: i32,
    pub y: i8,
    pub dimension: Dimension,
}

impl SubchunkPosition {
    pub fn new(x: i32, y: i8, z: i32, dimension: Dimension) -> Self {
        Self { x, z, y, dimension }
    }
}

impl fmt::Display for SubchunkPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}) in {}", self.x, self.y, self.z, self.dimension)
    }
}

/// Absolute block coordinates in a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPosition {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub dimension: Dimension,
}

impl BlockPosition {
    pub fn new(x: i32, y: i32, z: i32, dimension: Dimension) -> Self {
        Self { x, y, z, dimension }
    }

    /// Subchunk containing this block, by floor division on every axis.
    pub fn subchunk(&self) -> Result<SubchunkPosition> {
        let y = i8::try_from(self.y.div_euclid(SUBCHUNK_SIZE)).map_err(|_| {
            BedrockError::invalid_data(format!("Block y {} is outside the subchunk range", self.y))
        })?;

        Ok(SubchunkPosition::new(
            self.x.div_euclid(SUBCHUNK_SIZE),
            y,
            self.z.div_euclid(SUBCHUNK_SIZE),
            self.dimension,
        ))
    }

    /// Coordinates inside the containing subchunk, each in `0..16`.
    pub fn local(&self) -> (usize, usize, usize) {
        (
            self.x.rem_euclid(SUBCHUNK_SIZE) as usize,
            self.y.rem_euclid(SUBCHUNK_SIZE) as usize,
            self.z.rem_euclid(SUBCHUNK_SIZE) as usize,
        )
    }
}

impl fmt::Display for BlockPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}) in {}", self.x, self.y, self.z, self.dimension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::collections::{BTreeSet, HashSet};

    #[test]
    fn test_dimension_ids() {
        assert_eq!(Dimension::Overworld.id(), 0);
        assert_eq!(Dimension::Nether.id(), 1);
        assert_eq!(Dimension::End.id(), 2);
        assert_eq!(Dimension::from_id(1), Some(Dimension::Nether));
        assert_eq!(Dimension::from_id(7), None);
        assert_eq!(Dimension::default(), Dimension::Overworld);
    }

    #[test]
    fn test_dimension_from_str() {
        assert_eq!("Nether".parse::<Dimension>().unwrap(), Dimension::Nether);
        assert_eq!("end".parse::<Dimension>().unwrap(), Dimension::End);
        assert_eq!("0".parse::<Dimension>().unwrap(), Dimension::Overworld);
        assert_matches!("aether".parse::<Dimension>(), Err(BedrockError::InvalidData(_)));
    }

    #[test]
    fn test_position_equality_covers_all_fields() {
        let a = SubchunkPosition::new(1, 2, 3, Dimension::Overworld);
        assert_eq!(a, SubchunkPosition::new(1, 2, 3, Dimension::Overworld));
        assert_ne!(a, SubchunkPosition::new(1, 2, 3, Dimension::Nether));
        assert_ne!(a, SubchunkPosition::new(1, 3, 3, Dimension::Overworld));

        let set: HashSet<_> = [a, a, SubchunkPosition::new(3, 2, 1, Dimension::Overworld)]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_position_ordering_is_total() {
        let positions = [
            SubchunkPosition::new(0, 0, 1, Dimension::Overworld),
            SubchunkPosition::new(0, 0, 0, Dimension::Nether),
            SubchunkPosition::new(0, 0, 0, Dimension::Overworld),
            SubchunkPosition::new(-1, 5, 0, Dimension::Overworld),
        ];
        let ordered: BTreeSet<_> = positions.iter().copied().collect();
        assert_eq!(ordered.len(), positions.len());

        let first = *ordered.iter().next().unwrap();
        assert_eq!(first, SubchunkPosition::new(-1, 5, 0, Dimension::Overworld));
        assert!(
            SubchunkPosition::new(0, 0, 0, Dimension::Overworld)
                < SubchunkPosition::new(0, 0, 0, Dimension::Nether)
        );
    }

    #[test]
    fn test_block_to_subchunk_floors_negative_coordinates() {
        let block = BlockPosition::new(-1, 17, -16, Dimension::End);
        assert_eq!(
            block.subchunk().unwrap(),
            SubchunkPosition::new(-1, 1, -1, Dimension::End)
        );
        assert_eq!(block.local(), (15, 1, 0));

        let origin = BlockPosition::new(0, 0, 0, Dimension::Overworld);
        assert_eq!(
            origin.subchunk().unwrap(),
            SubchunkPosition::new(0, 0, 0, Dimension::Overworld)
        );
        assert_eq!(origin.local(), (0, 0, 0));
    }

    #[test]
    fn test_block_y_out_of_subchunk_range() {
        let block = BlockPosition::new(0, 16 * 200, 0, Dimension::Overworld);
        assert_matches!(block.subchunk(), Err(BedrockError::InvalidData(_)));
    }
}
