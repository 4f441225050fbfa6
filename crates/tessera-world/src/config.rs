//! Tile map configuration.

use glam::{UVec3, Vec3};
use serde::{Deserialize, Serialize};
use tessera_core::constants::{BATTLE_VOXELS_PER_TILE, CITY_VOXELS_PER_TILE};
use tessera_core::{EntityKind, Error, Result};

/// One draw pass and the object kinds drawn in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    /// Human readable layer name (for debug overlays).
    pub name: String,
    /// Kinds whose owned objects appear in this layer's draw lists.
    pub kinds: Vec<EntityKind>,
}

impl LayerConfig {
    /// Create a layer drawing the given kinds.
    pub fn new(name: impl Into<String>, kinds: impl Into<Vec<EntityKind>>) -> Self {
        Self {
            name: name.into(),
            kinds: kinds.into(),
        }
    }
}

/// Construction parameters of a [`TileMap`](crate::TileMap).
///
/// Fixed for the lifetime of the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileMapConfig {
    /// Number of tiles along each axis.
    pub size: UVec3,
    /// World units per tile. Only used by callers converting to and from
    /// screen or world space; the map itself works in tile units.
    pub tile_size: Vec3,
    /// Minimum collision sampling resolution per tile.
    pub voxels_per_tile: UVec3,
    /// Draw passes, back to front.
    pub layers: Vec<LayerConfig>,
}

impl Default for TileMapConfig {
    fn default() -> Self {
        Self::city(UVec3::new(100, 100, 10))
    }
}

impl TileMapConfig {
    /// Overworld city layout: ground, shadows, then everything that moves.
    pub fn city(size: UVec3) -> Self {
        Self {
            size,
            tile_size: Vec3::new(64.0, 32.0, 16.0),
            voxels_per_tile: UVec3::from_array(CITY_VOXELS_PER_TILE),
            layers: vec![
                LayerConfig::new("ground", [EntityKind::Scenery]),
                LayerConfig::new("shadows", [EntityKind::Shadow]),
                LayerConfig::new(
                    "objects",
                    [
                        EntityKind::Vehicle,
                        EntityKind::Projectile,
                        EntityKind::Effect,
                    ],
                ),
            ],
        }
    }

    /// Tactical battle layout: terrain with its shadows, then actors.
    pub fn battle(size: UVec3) -> Self {
        Self {
            size,
            tile_size: Vec3::new(48.0, 24.0, 40.0),
            voxels_per_tile: UVec3::from_array(BATTLE_VOXELS_PER_TILE),
            layers: vec![
                LayerConfig::new("terrain", [EntityKind::Scenery, EntityKind::Shadow]),
                LayerConfig::new(
                    "actors",
                    [
                        EntityKind::Vehicle,
                        EntityKind::Projectile,
                        EntityKind::Effect,
                    ],
                ),
            ],
        }
    }

    /// Check the configuration and build the kind-to-layer table.
    ///
    /// Kinds not listed in any layer are never drawn.
    pub fn layer_table(&self) -> Result<[Option<usize>; EntityKind::COUNT]> {
        if self.size.cmpeq(UVec3::ZERO).any() {
            return Err(Error::InvalidConfig(format!(
                "map size {} has an empty axis",
                self.size
            )));
        }
        if self.voxels_per_tile.cmpeq(UVec3::ZERO).any() {
            return Err(Error::InvalidConfig(format!(
                "voxels per tile {} has an empty axis",
                self.voxels_per_tile
            )));
        }

        if !self.tile_size.cmpgt(Vec3::ZERO).all() {
            return Err(Error::InvalidConfig(format!(
                "tile size {} must be positive",
                self.tile_size
            )));
        }

        let mut table = [None; EntityKind::COUNT];
        for (layer, config) in self.layers.iter().enumerate() {
            for &kind in &config.kinds {
                if let Some(previous) = table[kind.index()].replace(layer) {
                    return Err(Error::InvalidConfig(format!(
                        "{kind:?} is assigned to layers {previous} and {layer}"
                    )));
                }
            }
        }
        Ok(table)
    }

    /// Convert a position in tile units to world units.
    #[inline]
    pub fn to_world(&self, pos: Vec3) -> Vec3 {
        pos * self.tile_size
    }

    /// Convert a position in world units to tile units.
    #[inline]
    pub fn from_world(&self, pos: Vec3) -> Vec3 {
        pos / self.tile_size
    }
}
