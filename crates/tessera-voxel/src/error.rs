//! Errors raised while assembling voxel data.

use glam::{UVec2, UVec3};
use thiserror::Error;

/// Voxel construction error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VoxelError {
    /// Slice layer index beyond the map's depth
    #[error("layer {z} out of range for map of size {size}")]
    LayerOutOfRange { z: u32, size: UVec3 },

    /// Slice dimensions differ from the map's footprint
    #[error("slice of size {slice} does not fit map of size {map}")]
    SliceSizeMismatch { slice: UVec2, map: UVec3 },

    /// Raw bit data does not match the declared dimensions
    #[error("expected {expected} voxels, got {actual}")]
    DataLength { expected: usize, actual: usize },
}

/// Result type alias using [`VoxelError`].
pub type Result<T> = std::result::Result<T, VoxelError>;
