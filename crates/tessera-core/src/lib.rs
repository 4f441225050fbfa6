//! Core types and math for the Tessera tile engine.
//!
//! This crate provides the foundational types shared by every other crate:
//! - Integer tile coordinates
//! - Axis-aligned boxes and segment clipping
//! - Entity kinds and kind sets
//! - Common error types

pub mod coords;
pub mod error;
pub mod math;
pub mod types;

pub use coords::TilePos;
pub use error::{Error, Result};
pub use math::Aabb;
pub use types::{EntityKind, KindSet, RenderHandle};

/// Engine-wide constants
pub mod constants {
    use glam::Vec3;

    /// Per-axis weights of the isometric depth key.
    ///
    /// Objects further along +x, +y and +z are drawn later.
    pub const DEPTH_SCALE: Vec3 = Vec3::new(1.0, 1.0, 1.0);
    /// Depth bias added to overlay kinds.
    ///
    /// Must exceed the largest key difference inside one tile (the sum of
    /// `DEPTH_SCALE`), so overlays always sort above co-located ground objects.
    pub const OVERLAY_DEPTH_BIAS: f32 = 8.0;
    /// Collision sampling resolution of a city map tile.
    pub const CITY_VOXELS_PER_TILE: [u32; 3] = [32, 32, 16];
    /// Collision sampling resolution of a battle map tile.
    pub const BATTLE_VOXELS_PER_TILE: [u32; 3] = [24, 24, 20];
}
