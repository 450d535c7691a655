//! Command-line arguments of the `bedrock` binary.

use std::path::PathBuf;

use bedrock_common::{BlockPosition, Dimension, Result, WorldConfig};
use bedrock_nbt::Tag;
use bedrock_world::World;
use clap::Parser;
use log::debug;

/// Prints the block state stored at one position of a Bedrock world.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "bedrock", about = "Bedrock world block reader", allow_negative_numbers = true)]
pub struct Args {
    /// World database directory (the `db` folder of a save).
    pub world: PathBuf,

    pub x: i32,
    pub y: i32,
    pub z: i32,

    /// overworld, nether or end.
    pub dimension: Option<Dimension>,

    /// JSON file with store options.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Args {
    pub fn position(&self) -> BlockPosition {
        BlockPosition::new(
            self.x,
            self.y,
            self.z,
            self.dimension.unwrap_or_default(),
        )
    }

    pub fn world_config(&self) -> Result<WorldConfig> {
        match &self.config {
            Some(path) => WorldConfig::load(path),
            None => Ok(WorldConfig::default()),
        }
    }
}

/// Opens the world, looks up one block and closes the world again.
pub fn run(args: &Args) -> Result<Tag> {
    let config = args.world_config()?;
    debug!("World config: {:?}", config);

    let mut world = World::open(&args.world, &config)?;
    let block = world.get_block(args.position()).cloned();
    world.close()?;
    block
}
