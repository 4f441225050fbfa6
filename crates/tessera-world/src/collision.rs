//! Segment collision against object voxel shapes.
//!
//! A query walks the tiles along the segment and, for each tile the segment
//! actually passes through, samples the clipped piece of the segment against
//! the voxel maps of every candidate overlapping that tile. The first tile in
//! walk order with a solid sample ends the search.

use glam::Vec3;
use rayon::prelude::*;
use tessera_core::math::Segment;
use tessera_core::{Aabb, EntityKind, KindSet, TilePos};

use crate::line::{StepMode, TileWalk};
use crate::map::TileMap;
use crate::object::{ObjectId, TileObject};

/// A segment query with its options.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollisionQuery {
    pub segment: Segment,
    pub mode: StepMode,
    /// Kinds that can be hit.
    pub targets: KindSet,
    /// Object that can never be hit, usually the shooter.
    pub ignore: Option<ObjectId>,
}

impl CollisionQuery {
    /// Conservative query against every collidable kind.
    pub fn new(start: Vec3, end: Vec3) -> Self {
        Self {
            segment: Segment::new(start, end),
            mode: StepMode::Conservative,
            targets: KindSet::COLLIDABLE,
            ignore: None,
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: StepMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_targets(mut self, targets: KindSet) -> Self {
        self.targets = targets;
        self
    }

    #[must_use]
    pub fn ignoring(mut self, id: ObjectId) -> Self {
        self.ignore = Some(id);
        self
    }
}

/// The first solid point found along a segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Collision {
    pub object: ObjectId,
    pub kind: EntityKind,
    /// Sample point on the segment, in tile units.
    pub position: Vec3,
    /// Tile the hit was found in.
    pub tile: TilePos,
}

impl TileMap {
    /// First object whose voxels the segment from `start` to `end` touches.
    pub fn find_collision(&self, start: Vec3, end: Vec3) -> Option<Collision> {
        self.query_collision(&CollisionQuery::new(start, end))
    }

    /// Run a collision query with explicit options.
    #[cfg_attr(
        feature = "profiling",
        tracing::instrument(level = "trace", skip_all)
    )]
    pub fn query_collision(&self, query: &CollisionQuery) -> Option<Collision> {
        let segment = query.segment;
        if !segment.is_finite() {
            return None;
        }
        let grid = Aabb::new(Vec3::ZERO, self.size().as_vec3());
        let (t0, t1) = grid.clip_segment(&segment)?;
        let inside = Segment::new(segment.at(t0), segment.at(t1));

        let mut candidates: Vec<(ObjectId, &TileObject)> = Vec::new();
        for pos in TileWalk::new(inside, query.mode) {
            let Some(tile) = self.get_tile(pos) else {
                continue;
            };
            if tile.is_empty() {
                continue;
            }
            let Some((c0, c1)) = pos.aabb().clip_segment(&segment) else {
                continue;
            };

            candidates.clear();
            candidates.extend(tile.intersecting().iter().filter_map(|&id| {
                let object = self.object(id)?;
                let wanted = query.ignore != Some(id)
                    && query.targets.has(object.kind())
                    && object.owning_tile().is_some()
                    && object.voxel_map().is_some();
                wanted.then_some((id, object))
            }));
            if candidates.is_empty() {
                continue;
            }

            if let Some(hit) = self.sample_tile(&segment, c0, c1, pos, &candidates) {
                tracing::trace!("Segment hit {} at {}", hit.object, hit.position);
                return Some(hit);
            }
        }
        None
    }

    /// Tiles a query would visit, in order, clipped to the map.
    pub fn tiles_on_segment(&self, start: Vec3, end: Vec3, mode: StepMode) -> Vec<TilePos> {
        let segment = Segment::new(start, end);
        if !segment.is_finite() {
            return Vec::new();
        }
        let size = self.size();
        let grid = Aabb::new(Vec3::ZERO, size.as_vec3());
        let Some((t0, t1)) = grid.clip_segment(&segment) else {
            return Vec::new();
        };
        TileWalk::new(Segment::new(segment.at(t0), segment.at(t1)), mode)
            .filter(|pos| pos.in_bounds(size))
            .collect()
    }

    /// Resolve independent queries on the rayon pool.
    ///
    /// Results are in query order.
    pub fn find_collisions_parallel(&self, queries: &[CollisionQuery]) -> Vec<Option<Collision>> {
        queries
            .par_iter()
            .map(|query| self.query_collision(query))
            .collect()
    }

    /// Sample `segment` between `t0` and `t1` against `candidates`.
    fn sample_tile(
        &self,
        segment: &Segment,
        t0: f32,
        t1: f32,
        tile: TilePos,
        candidates: &[(ObjectId, &TileObject)],
    ) -> Option<Collision> {
        let density = candidates
            .iter()
            .filter_map(|(_, object)| object.voxel_density())
            .fold(self.config().voxels_per_tile.as_vec3(), Vec3::max);
        let travel = segment.delta().abs() * (t1 - t0) * density;
        let samples = (travel.max_element().ceil() as u32).max(1);

        for i in 0..=samples {
            let t = t0 + (t1 - t0) * (i as f32 / samples as f32);
            let point = segment.at(t);
            for &(id, object) in candidates {
                if object.is_solid_at(point) {
                    return Some(Collision {
                        object: id,
                        kind: object.kind(),
                        position: point,
                        tile,
                    });
                }
            }
        }
        None
    }
}
