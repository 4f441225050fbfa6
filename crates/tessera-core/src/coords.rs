//! Tile coordinates.
//!
//! Continuous positions are plain `glam::Vec3` values in tile units; a
//! position `p` lies in the tile `floor(p)`. Z is the vertical axis.

use std::fmt;

use bytemuck::{Pod, Zeroable};
use glam::{IVec3, UVec3, Vec3};
use serde::{Deserialize, Serialize};

use crate::math::Aabb;

/// Integer coordinate of a single tile.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Pod,
    Zeroable,
    Serialize,
    Deserialize,
)]
#[repr(C)]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl TilePos {
    /// Create a new tile position
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The tile containing a continuous position.
    #[inline]
    pub fn containing(pos: Vec3) -> Self {
        Self::new(
            pos.x.floor() as i32,
            pos.y.floor() as i32,
            pos.z.floor() as i32,
        )
    }

    /// The tile containing a position, or `None` if any component is NaN or
    /// infinite.
    ///
    /// Finite positions beyond the `i32` range saturate.
    #[inline]
    pub fn try_containing(pos: Vec3) -> Option<Self> {
        pos.is_finite().then(|| Self::containing(pos))
    }

    /// Whether this tile lies inside a map of the given size.
    #[inline]
    pub fn in_bounds(self, size: UVec3) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.z >= 0
            && (self.x as u32) < size.x
            && (self.y as u32) < size.y
            && (self.z as u32) < size.z
    }

    /// Linear index into dense storage of the given size.
    ///
    /// Returns `None` if out of bounds. X varies fastest, then Y, then Z.
    #[inline]
    pub fn to_index(self, size: UVec3) -> Option<usize> {
        if !self.in_bounds(size) {
            return None;
        }
        let (sx, sy) = (size.x as usize, size.y as usize);
        Some(self.x as usize + self.y as usize * sx + self.z as usize * sx * sy)
    }

    /// Inverse of [`TilePos::to_index`].
    #[inline]
    pub fn from_index(index: usize, size: UVec3) -> Self {
        let (sx, sy) = (size.x as usize, size.y as usize);
        Self::new(
            (index % sx) as i32,
            ((index / sx) % sy) as i32,
            (index / (sx * sy)) as i32,
        )
    }

    /// Minimum corner of the tile in continuous space
    #[inline]
    pub fn corner(self) -> Vec3 {
        Vec3::new(self.x as f32, self.y as f32, self.z as f32)
    }

    /// The unit cube occupied by this tile.
    #[inline]
    pub fn aabb(self) -> Aabb {
        Aabb::unit_cube(self.corner())
    }

    /// Convert to glam IVec3
    #[inline]
    pub const fn to_ivec3(self) -> IVec3 {
        IVec3::new(self.x, self.y, self.z)
    }
}

impl From<IVec3> for TilePos {
    fn from(v: IVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<TilePos> for IVec3 {
    fn from(p: TilePos) -> Self {
        p.to_ivec3()
    }
}

impl fmt::Display for TilePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_roundtrip() {
        let size = UVec3::new(7, 5, 3);
        for index in 0..(7 * 5 * 3) {
            let pos = TilePos::from_index(index, size);
            assert_eq!(pos.to_index(size), Some(index));
        }
    }

    #[test]
    fn out_of_bounds_has_no_index() {
        let size = UVec3::new(4, 4, 4);
        assert_eq!(TilePos::new(-1, 0, 0).to_index(size), None);
        assert_eq!(TilePos::new(0, 4, 0).to_index(size), None);
        assert_eq!(TilePos::new(0, 0, 100).to_index(size), None);
    }

    #[test]
    fn containing_floors_negative_positions() {
        assert_eq!(
            TilePos::containing(Vec3::new(-0.5, 2.99, 3.0)),
            TilePos::new(-1, 2, 3)
        );
    }

    #[test]
    fn non_finite_position_has_no_tile() {
        assert_eq!(TilePos::try_containing(Vec3::new(f32::NAN, 1.0, 1.0)), None);
        assert_eq!(TilePos::try_containing(Vec3::new(1.0, f32::INFINITY, 1.0)), None);
        assert_eq!(
            TilePos::try_containing(Vec3::new(3.0e9, -3.0e9, 0.5)),
            Some(TilePos::new(i32::MAX, i32::MIN, 0))
        );
    }

    #[test]
    fn tile_aabb_is_unit_cube() {
        let aabb = TilePos::new(2, 3, 4).aabb();
        assert_eq!(aabb.min, Vec3::new(2.0, 3.0, 4.0));
        assert_eq!(aabb.max, Vec3::new(3.0, 4.0, 5.0));
    }
}
