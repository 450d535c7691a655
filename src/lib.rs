pub mod cli;

// Re-export commonly used items
pub use bedrock_common::{BedrockError, BlockPosition, Dimension, Result, SubchunkPosition, WorldConfig};
pub use bedrock_logger::{log, LogSeverity};
pub use bedrock_nbt::Tag;
pub use bedrock_world::{ChunkCache, SharedChunkCache, World};
