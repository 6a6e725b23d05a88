//! Hex terrain generation library
//!
//! Re-exports modules for use by binaries and tools.

pub mod ascii;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod export;
pub mod heightmap;
pub mod hex;
pub mod hexmap;
pub mod noise_bundle;
pub mod numeric;
pub mod palette;
pub mod seeds;
pub mod terrain;
pub mod world;

pub use config::{GenerationConfig, TerrainBands};
pub use error::{ConfigError, HexworldError};
pub use hex::HexCoord;
pub use terrain::TerrainType;
pub use world::{generate_terrain, HexWorld, Tile};
