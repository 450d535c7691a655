pub mod config;
pub mod cursor;
pub mod error;
pub mod types;

pub use config::WorldConfig;
pub use cursor::ByteCursor;
pub use error::BedrockError;
pub use types::{BlockPosition, Dimension, Result, SubchunkPosition};
