//! Two-phase collision batches.
//!
//! Queries are resolved in parallel against a shared `&TileMap`, and the
//! results are applied one at a time with `&mut TileMap` once every query has
//! finished. The borrow checker keeps the phases from overlapping.

use rayon::prelude::*;

use crate::collision::{Collision, CollisionQuery};
use crate::map::TileMap;

/// Queries waiting to be resolved, each tagged with caller data.
#[derive(Debug, Clone)]
pub struct CollisionBatch<T> {
    entries: Vec<(T, CollisionQuery)>,
}

impl<T> Default for CollisionBatch<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> CollisionBatch<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, tag: T, query: CollisionQuery) {
        self.entries.push((tag, query));
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Send> CollisionBatch<T> {
    /// Resolve every query on the rayon pool.
    ///
    /// Results keep push order.
    #[cfg_attr(
        feature = "profiling",
        tracing::instrument(level = "trace", skip_all)
    )]
    pub fn resolve(self, map: &TileMap) -> ResolvedBatch<T> {
        let results: Vec<(T, Option<Collision>)> = self
            .entries
            .into_par_iter()
            .map(|(tag, query)| {
                let hit = map.query_collision(&query);
                (tag, hit)
            })
            .collect();
        tracing::debug!(
            "Resolved {} queries, {} hits",
            results.len(),
            results.iter().filter(|(_, hit)| hit.is_some()).count()
        );
        ResolvedBatch { results }
    }
}

/// Results of a batch, ready to be applied.
#[derive(Debug, Clone)]
pub struct ResolvedBatch<T> {
    results: Vec<(T, Option<Collision>)>,
}

impl<T> ResolvedBatch<T> {
    pub fn results(&self) -> &[(T, Option<Collision>)] {
        &self.results
    }

    /// Tagged hits, skipping misses.
    pub fn hits(&self) -> impl Iterator<Item = (&T, &Collision)> {
        self.results
            .iter()
            .filter_map(|(tag, hit)| hit.as_ref().map(|hit| (tag, hit)))
    }

    /// Apply results in push order.
    ///
    /// Earlier applications may remove objects later hits refer to, so
    /// `apply` should check ids with [`TileMap::contains`].
    pub fn apply<F>(self, map: &mut TileMap, mut apply: F)
    where
        F: FnMut(&mut TileMap, T, Option<Collision>),
    {
        for (tag, hit) in self.results {
            apply(map, tag, hit);
        }
    }

    pub fn into_results(self) -> Vec<(T, Option<Collision>)> {
        self.results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TileMapConfig;
    use crate::object::TileObject;
    use glam::{UVec2, UVec3, Vec3};
    use std::sync::Arc;
    use tessera_core::EntityKind;
    use tessera_voxel::{VoxelMap, VoxelSlice};

    fn target(pos: Vec3) -> TileObject {
        let size = UVec3::new(8, 8, 8);
        let layer = Arc::new(VoxelSlice::filled(UVec2::new(8, 8)));
        let map = VoxelMap::from_slices(size, std::iter::repeat(layer).take(8));
        TileObject::new(EntityKind::Vehicle, pos, Vec3::ONE).with_voxel_map(Arc::new(map))
    }

    #[test]
    fn resolve_then_apply() {
        let mut map = TileMap::new(TileMapConfig::battle(UVec3::new(8, 8, 2))).unwrap();
        let a = map.insert(target(Vec3::new(3.5, 1.5, 0.5)));
        let b = map.insert(target(Vec3::new(3.5, 5.5, 0.5)));

        let across = |y: f32, from: f32, to: f32| {
            CollisionQuery::new(Vec3::new(from, y, 0.5), Vec3::new(to, y, 0.5))
        };
        let mut batch = CollisionBatch::new();
        batch.push("a", across(1.5, 0.5, 7.5));
        batch.push("b", across(5.5, 0.5, 7.5));
        batch.push("miss", across(3.5, 0.5, 7.5));
        // Same target as "a"; by the time it's applied "a" is gone.
        batch.push("a again", across(1.5, 7.5, 0.5));
        assert_eq!(batch.len(), 4);

        let resolved = batch.resolve(&map);
        let tags: Vec<_> = resolved.hits().map(|(tag, _)| *tag).collect();
        assert_eq!(tags, vec!["a", "b", "a again"]);

        let mut removed = Vec::new();
        let mut stale = 0;
        resolved.apply(&mut map, |map, _tag, hit| {
            let Some(hit) = hit else { return };
            if map.contains(hit.object) {
                map.remove(hit.object);
                removed.push(hit.object);
            } else {
                stale += 1;
            }
        });
        assert_eq!(removed, vec![a, b]);
        assert_eq!(stale, 1);
        assert!(map.is_empty());
        map.validate().unwrap();
    }

    #[test]
    fn empty_batch() {
        let map = TileMap::new(TileMapConfig::default()).unwrap();
        let batch: CollisionBatch<u32> = CollisionBatch::default();
        assert!(batch.is_empty());
        assert!(batch.resolve(&map).into_results().is_empty());
    }
}
