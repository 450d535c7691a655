use std::collections::TryReserveError;
use std::path::PathBuf;

use crate::types::SubchunkPosition;

#[derive(Debug, thiserror::Error)]
pub enum BedrockError {
    #[error("Allocation failed: {0}")]
    AllocationFailed(#[from] TryReserveError),

    #[error("Failed to open store at {}: {reason}", path.display())]
    StoreOpenFailed { path: PathBuf, reason: String },

    #[error("Failed to read store entry {key}: {reason}")]
    StoreReadFailed { key: String, reason: String },

    /// The store holds no record for this subchunk. Callers may treat this as
    /// "not generated yet" rather than as a broken store.
    #[error("No subchunk stored at {position}")]
    EntryNotFound { position: SubchunkPosition },

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Unsupported tag type: {0}")]
    UnsupportedTagType(u8),

    #[error("Failed to deserialize subchunk {position}: {source}")]
    DeserializationFailed {
        position: SubchunkPosition,
        #[source]
        source: Box<BedrockError>,
    },

    #[error("Read of {requested} bytes at offset {position} overruns buffer of {len} bytes")]
    OutOfBounds {
        position: usize,
        requested: usize,
        len: usize,
    },

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BedrockError {
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        BedrockError::InvalidData(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, BedrockError::EntryNotFound { .. })
    }
}

/// Formats a store key as lowercase hex, for error messages.
pub fn hex_key(key: &[u8]) -> String {
    key.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Dimension;
    use std::error::Error;

    #[test]
    fn test_hex_key() {
        assert_eq!(hex_key(&[0x00, 0x2f, 0xff]), "002fff");
        assert_eq!(hex_key(&[]), "");
    }

    #[test]
    fn test_not_found_is_distinguished() {
        let position = SubchunkPosition::new(1, 2, 3, Dimension::Overworld);
        assert!(BedrockError::EntryNotFound { position }.is_not_found());
        assert!(!BedrockError::StoreReadFailed {
            key: "00".to_owned(),
            reason: "corrupt".to_owned(),
        }
        .is_not_found());
    }

    #[test]
    fn test_deserialization_failed_keeps_source() {
        let position = SubchunkPosition::new(0, 0, 0, Dimension::Nether);
        let err = BedrockError::DeserializationFailed {
            position,
            source: Box::new(BedrockError::UnsupportedTagType(42)),
        };
        let message = err.to_string();
        assert!(message.contains("Nether"));
        assert!(message.contains("42"));
        assert!(err.source().is_some());
    }
}
