//! Tile map, object lifecycle and collision queries for the Tessera tile engine.
//!
//! A [`TileMap`] is a dense 3D grid of tiles. Objects inserted into it are
//! registered with the tile containing their anchor (for drawing) and with
//! every tile their bounding cuboid overlaps (for collision). Segment
//! queries walk the grid and test candidate objects against their voxel
//! shapes.

pub mod batch;
pub mod collision;
pub mod config;
mod draw;
pub mod line;
pub mod map;
pub mod object;
pub mod tile;

pub use batch::{CollisionBatch, ResolvedBatch};
pub use collision::{Collision, CollisionQuery};
pub use config::{LayerConfig, TileMapConfig};
pub use line::{StepMode, TileWalk};
pub use map::TileMap;
pub use object::{tile_span, ObjectId, TileObject};
pub use tile::Tile;
