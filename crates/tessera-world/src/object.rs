//! Objects placed on a tile map.

use std::fmt;
use std::sync::Arc;

use glam::{IVec3, UVec3, Vec3};
use tessera_core::constants::DEPTH_SCALE;
use tessera_core::{Aabb, EntityKind, RenderHandle, TilePos};
use tessera_voxel::VoxelMap;

/// Handle to an object stored in a [`TileMap`](crate::TileMap).
///
/// Ids are generational: once the object is removed its id goes stale and
/// every map operation treats it as unknown, even after the slot is reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// A vehicle, piece of scenery, projectile, effect or shadow.
///
/// `position` is the centre of the object's bounding cuboid, whose size in
/// tile units is `extent`. The cached tile links are maintained by the map
/// and are empty while the object is detached.
#[derive(Clone, Debug)]
pub struct TileObject {
    kind: EntityKind,
    position: Vec3,
    extent: Vec3,
    voxel_map: Option<Arc<VoxelMap>>,
    render_handle: Option<RenderHandle>,
    pub(crate) owning_tile: Option<TilePos>,
    pub(crate) intersecting_tiles: Vec<TilePos>,
}

impl TileObject {
    /// Create a detached object. Negative extents are clamped to zero and
    /// non-finite ones replaced by zero.
    pub fn new(kind: EntityKind, position: Vec3, extent: Vec3) -> Self {
        Self {
            kind,
            position,
            extent: if extent.is_finite() {
                extent.max(Vec3::ZERO)
            } else {
                Vec3::ZERO
            },
            voxel_map: None,
            render_handle: None,
            owning_tile: None,
            intersecting_tiles: Vec::new(),
        }
    }

    /// Attach the collision shape shared by all objects of this type.
    #[must_use]
    pub fn with_voxel_map(mut self, voxel_map: Arc<VoxelMap>) -> Self {
        self.voxel_map = Some(voxel_map);
        self
    }

    /// Attach the renderer's handle for this object.
    #[must_use]
    pub fn with_render_handle(mut self, handle: RenderHandle) -> Self {
        self.render_handle = Some(handle);
        self
    }

    #[inline]
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub(crate) fn set_position_unchecked(&mut self, position: Vec3) {
        self.position = position;
    }

    #[inline]
    pub fn extent(&self) -> Vec3 {
        self.extent
    }

    /// Bounding cuboid in tile units.
    #[inline]
    pub fn bounds(&self) -> Aabb {
        Aabb::from_centre_extent(self.position, self.extent)
    }

    #[inline]
    pub fn render_handle(&self) -> Option<RenderHandle> {
        self.render_handle
    }

    /// The tile containing the anchor, or `None` while detached or off-map.
    ///
    /// Objects without an owning tile are neither drawn nor hit.
    #[inline]
    pub fn owning_tile(&self) -> Option<TilePos> {
        self.owning_tile
    }

    /// In-bounds tiles overlapped by the bounding cuboid.
    #[inline]
    pub fn intersecting_tiles(&self) -> &[TilePos] {
        &self.intersecting_tiles
    }

    /// Voxel volume used for precise collision.
    ///
    /// Always `None` for purely visual kinds, even if a map was attached.
    #[inline]
    pub fn voxel_map(&self) -> Option<&Arc<VoxelMap>> {
        if self.kind.is_collidable() {
            self.voxel_map.as_ref()
        } else {
            None
        }
    }

    /// Voxels per tile unit along each axis, if the object has a shape.
    pub fn voxel_density(&self) -> Option<Vec3> {
        let map = self.voxel_map()?;
        if self.extent.cmple(Vec3::ZERO).any() {
            return None;
        }
        Some(map.size().as_vec3() / self.extent)
    }

    /// Voxel containing a point, in this object's local voxel space.
    ///
    /// The anchor maps to the centre of the voxel map. `None` if either the
    /// point or the anchor is not finite.
    pub fn voxel_coord(&self, point: Vec3) -> Option<IVec3> {
        let density = self.voxel_density()?;
        let size = self.voxel_map()?.size().as_vec3();
        let local = (point - self.position) * density + size * 0.5;
        local.is_finite().then(|| local.floor().as_ivec3())
    }

    /// Whether the object's shape is solid at a point.
    ///
    /// Objects without a populated voxel map are never solid.
    pub fn is_solid_at(&self, point: Vec3) -> bool {
        match (self.voxel_coord(point), self.voxel_map()) {
            (Some(coord), Some(map)) => map.get_bit(coord),
            _ => false,
        }
    }

    /// Centre of the solid voxels in tile space, or the anchor if there are
    /// none.
    pub fn centre(&self) -> Vec3 {
        let (Some(map), Some(density)) = (self.voxel_map(), self.voxel_density()) else {
            return self.position;
        };
        match map.centroid() {
            Some(centroid) => {
                self.position + (centroid - map.size().as_vec3() * 0.5) / density
            }
            None => self.position,
        }
    }

    /// Sort key for back-to-front drawing within one tile and layer.
    #[inline]
    pub fn depth_key(&self) -> f32 {
        self.position.dot(DEPTH_SCALE) + self.kind.depth_bias()
    }
}

/// Tiles overlapped by a cuboid centred on `anchor`, clipped to a map.
///
/// Covers every tile from `floor(anchor - extent/2)` up to, but excluding,
/// `ceil(anchor + extent/2)`, and always the tile containing the anchor, so
/// zero-sized objects still occupy one tile. Ordered with X fastest.
///
/// Far-away anchors saturate instead of overflowing, and a non-finite anchor
/// covers nothing.
pub fn tile_span(anchor: Vec3, extent: Vec3, map_size: UVec3) -> impl Iterator<Item = TilePos> {
    let (lo, hi) = match TilePos::try_containing(anchor) {
        Some(anchor_tile) => {
            let bounds = Aabb::from_centre_extent(anchor, extent);
            let anchor_tile = anchor_tile.to_ivec3();
            let anchor_end = IVec3::new(
                anchor_tile.x.saturating_add(1),
                anchor_tile.y.saturating_add(1),
                anchor_tile.z.saturating_add(1),
            );
            let lo = bounds.min.floor().as_ivec3().max(IVec3::ZERO);
            let hi = bounds
                .max
                .ceil()
                .as_ivec3()
                .max(anchor_end)
                .min(map_size.as_ivec3());
            (lo, hi)
        }
        None => (IVec3::ZERO, IVec3::ZERO),
    };

    (lo.z..hi.z).flat_map(move |z| {
        (lo.y..hi.y).flat_map(move |y| (lo.x..hi.x).map(move |x| TilePos::new(x, y, z)))
    })
}
