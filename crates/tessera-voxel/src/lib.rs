//! Voxel occupancy volumes for the Tessera tile engine.
//!
//! A [`VoxelSlice`] is one Z layer of occupancy bits; a [`VoxelMap`] stacks
//! shared slices into the collision shape of one object type. Both are built
//! by an asset loader and are read-only once handed to the world.

pub mod error;
pub mod map;
pub mod slice;

pub use error::{Result, VoxelError};
pub use map::VoxelMap;
pub use slice::VoxelSlice;
