//! Test fixtures for the Tessera tile engine.
//!
//! Builds voxel shapes, preset maps and deterministic object layouts shared
//! by the scenario tests and the benchmark app.

use std::sync::Arc;

use glam::{UVec2, UVec3, Vec3};
use tessera_core::constants::CITY_VOXELS_PER_TILE;
use tessera_core::EntityKind;
use tessera_voxel::{VoxelError, VoxelMap, VoxelSlice};
use tessera_world::{ObjectId, TileMap, TileMapConfig, TileObject};
use thiserror::Error;

#[cfg(test)]
mod scenarios;

#[derive(Error, Debug)]
pub enum TestError {
    #[error("Voxel error: {0}")]
    Voxel(#[from] VoxelError),
    #[error("World error: {0}")]
    World(#[from] tessera_core::Error),
}

pub type Result<T> = std::result::Result<T, TestError>;

/// Route `tracing` output through the test harness.
///
/// Safe to call from every test; only the first call installs a subscriber.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Voxel size of one city tile.
pub fn city_shape_size() -> UVec3 {
    UVec3::from_array(CITY_VOXELS_PER_TILE)
}

/// A shape with every voxel set. All layers share one slice.
pub fn solid_map(size: UVec3) -> Arc<VoxelMap> {
    let layer = Arc::new(VoxelSlice::filled(UVec2::new(size.x, size.y)));
    Arc::new(VoxelMap::from_slices(
        size,
        std::iter::repeat(layer).take(size.z as usize),
    ))
}

/// Which half of a shape along X is solid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Half {
    Low,
    High,
}

/// A shape solid in one X half, full height.
pub fn half_map(size: UVec3, half: Half) -> Result<Arc<VoxelMap>> {
    let split = size.x / 2;
    let bits: Vec<bool> = (0..size.y)
        .flat_map(|_| {
            (0..size.x).map(move |x| match half {
                Half::Low => x < split,
                Half::High => x >= split,
            })
        })
        .collect();
    let layer = Arc::new(VoxelSlice::from_bits(UVec2::new(size.x, size.y), &bits)?);

    let mut map = VoxelMap::new(size);
    for z in 0..size.z {
        map.try_set_slice(z, Arc::clone(&layer))?;
    }
    Ok(Arc::new(map))
}

/// Empty 100x100x10 city map.
pub fn city_map() -> Result<TileMap> {
    Ok(TileMap::new(TileMapConfig::city(UVec3::new(100, 100, 10)))?)
}

/// Deterministic xorshift generator for reproducible layouts.
#[derive(Clone, Debug)]
pub struct Scatter {
    state: u64,
}

impl Scatter {
    pub fn new(seed: u64) -> Self {
        Self {
            state: seed.max(1),
        }
    }

    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        (x >> 32) as u32
    }

    /// Uniform in `[0, 1)`.
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }

    /// Uniform point inside a box of the given size.
    pub fn point_in(&mut self, size: Vec3) -> Vec3 {
        Vec3::new(self.next_f32(), self.next_f32(), self.next_f32()) * size
    }

    /// Pick an index below `len`. `len` must be non-zero.
    pub fn index(&mut self, len: usize) -> usize {
        self.next_u32() as usize % len
    }
}

/// Scatter solid scenery blocks over the lowest `levels` of a map.
pub fn scatter_scenery(map: &mut TileMap, count: usize, levels: u32, seed: u64) -> Vec<ObjectId> {
    let size = map.size();
    let area = Vec3::new(size.x as f32, size.y as f32, levels.min(size.z) as f32);
    let shape = solid_map(city_shape_size());
    let mut scatter = Scatter::new(seed);

    let ids: Vec<_> = (0..count)
        .map(|_| {
            let extent = Vec3::new(0.4, 0.4, 0.6) + scatter.point_in(Vec3::splat(0.6));
            let object = TileObject::new(EntityKind::Scenery, scatter.point_in(area), extent)
                .with_voxel_map(Arc::clone(&shape));
            map.insert(object)
        })
        .collect();
    tracing::debug!("Scattered {} scenery objects", ids.len());
    ids
}
