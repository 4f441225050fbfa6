use std::sync::Arc;

use glam::{IVec3, UVec2, UVec3, Vec3};
use tessera_core::{EntityKind, RenderHandle, TilePos};
use tessera_voxel::{VoxelError, VoxelMap, VoxelSlice};
use tessera_world::{
    tile_span, CollisionBatch, CollisionQuery, ObjectId, TileMap, TileMapConfig, TileObject,
};

use crate::{
    city_map, city_shape_size, half_map, init_logging, scatter_scenery, solid_map, Half, Scatter,
};

fn unit_block(pos: Vec3) -> TileObject {
    TileObject::new(EntityKind::Scenery, pos, Vec3::ONE)
        .with_voxel_map(solid_map(city_shape_size()))
}

#[test]
fn segment_hits_solid_block() {
    init_logging();
    let mut map = city_map().unwrap();
    let e = map.insert(unit_block(Vec3::splat(2.5)));

    assert!(map.find_collision(Vec3::ZERO, Vec3::ONE).is_none());

    let hit = map
        .find_collision(Vec3::new(2.1, 2.1, 0.0), Vec3::new(2.1, 2.1, 4.0))
        .unwrap();
    assert_eq!(hit.object, e);
    assert_eq!(hit.tile, TilePos::new(2, 2, 2));
    assert!((2.0..=3.0).contains(&hit.position.z), "{}", hit.position);
    assert!(hit.position.z < 2.1);
}

#[test]
fn moved_block_leaves_old_tile() {
    let mut map = city_map().unwrap();
    let e = map.insert(unit_block(Vec3::splat(2.5)));
    assert!(map.set_position(e, Vec3::splat(5.0)));

    let old = map.get_tile(TilePos::new(2, 2, 2)).unwrap();
    assert!(!old.owned().contains(&e));
    assert!(!old.intersecting().contains(&e));
    assert!(old.draw_list(0).is_empty());

    let new = map.get_tile(TilePos::new(5, 5, 5)).unwrap();
    assert_eq!(new.owned(), &[e]);
    assert_eq!(map.object(e).unwrap().intersecting_tiles().len(), 8);

    // The old segment now misses.
    assert!(map
        .find_collision(Vec3::new(2.1, 2.1, 0.0), Vec3::new(2.1, 2.1, 4.0))
        .is_none());
    map.validate().unwrap();
}

#[test]
fn unpopulated_map_is_empty_everywhere() {
    let map = VoxelMap::new(UVec3::new(32, 32, 16));
    for z in -1..17 {
        for y in (-1..33).step_by(3) {
            for x in (-1..33).step_by(3) {
                assert!(!map.get_bit(IVec3::new(x, y, z)));
            }
        }
    }
    assert!(map.is_empty());
    assert_eq!(map.centroid(), None);
}

#[test]
fn mismatched_slice_is_rejected() {
    init_logging();
    let mut map = VoxelMap::new(UVec3::new(32, 32, 16));
    let small = Arc::new(VoxelSlice::filled(UVec2::new(16, 16)));

    let err = map.try_set_slice(0, Arc::clone(&small)).unwrap_err();
    assert!(matches!(err, VoxelError::SliceSizeMismatch { .. }));
    map.set_slice(0, small);

    assert!(map.slice(0).is_none());
    assert!(!map.get_bit(IVec3::ZERO));
    assert!(map.is_empty());
}

#[test]
fn solid_object_wins_regardless_of_insertion_order() {
    let size = city_shape_size();
    let low = half_map(size, Half::Low).unwrap();
    let high = half_map(size, Half::High).unwrap();
    let pos = Vec3::new(3.5, 3.5, 1.5);
    let make = |shape: &Arc<VoxelMap>, handle| {
        TileObject::new(EntityKind::Vehicle, pos, Vec3::ONE)
            .with_voxel_map(Arc::clone(shape))
            .with_render_handle(RenderHandle(handle))
    };
    // Runs through the high half only.
    let start = Vec3::new(3.8, 0.5, 1.5);
    let end = Vec3::new(3.8, 9.5, 1.5);

    for high_first in [false, true] {
        let mut map = city_map().unwrap();
        if high_first {
            map.insert(make(&high, 2));
            map.insert(make(&low, 1));
        } else {
            map.insert(make(&low, 1));
            map.insert(make(&high, 2));
        }
        let hit = map.find_collision(start, end).unwrap();
        let object = map.object(hit.object).unwrap();
        assert_eq!(object.render_handle(), Some(RenderHandle(2)));
        assert!((3.0..=3.1).contains(&hit.position.y));
    }
}

#[test]
fn same_voxel_tie_goes_to_first_inserted() {
    let mut map = city_map().unwrap();
    let first = map.insert(unit_block(Vec3::new(6.5, 1.5, 1.5)));
    let _second = map.insert(unit_block(Vec3::new(6.5, 1.5, 1.5)));
    let hit = map
        .find_collision(Vec3::new(1.5, 1.5, 1.5), Vec3::new(9.5, 1.5, 1.5))
        .unwrap();
    assert_eq!(hit.object, first);
}

#[test]
fn insert_then_lookup_owns() {
    let mut map = city_map().unwrap();
    let mut scatter = Scatter::new(7);
    for _ in 0..200 {
        let pos = scatter.point_in(map.size().as_vec3());
        let id = map.insert(TileObject::new(EntityKind::Vehicle, pos, Vec3::splat(0.5)));
        let tile = map.get_tile_at(pos).unwrap();
        assert!(tile.owned().contains(&id));
        assert_eq!(tile.pos(), TilePos::containing(pos));
    }
    map.validate().unwrap();
}

#[test]
fn remove_is_idempotent() {
    let mut map = city_map().unwrap();
    let ids = scatter_scenery(&mut map, 50, 3, 11);
    let gone = ids[10];
    let snapshot: Vec<Vec<ObjectId>> = map.tiles().map(|t| t.intersecting().to_vec()).collect();

    assert!(map.remove(gone).is_some());
    let once: Vec<Vec<ObjectId>> = map.tiles().map(|t| t.intersecting().to_vec()).collect();
    assert!(map.remove(gone).is_none());
    let twice: Vec<Vec<ObjectId>> = map.tiles().map(|t| t.intersecting().to_vec()).collect();

    assert_ne!(snapshot, once);
    assert_eq!(once, twice);
    assert_eq!(map.len(), 49);
    map.validate().unwrap();
}

#[test]
fn random_lifecycle_keeps_links_consistent() {
    init_logging();
    let config = TileMapConfig::battle(UVec3::new(12, 12, 4));
    let mut map = TileMap::new(config).unwrap();
    let mut scatter = Scatter::new(0x5eed);
    let mut live: Vec<ObjectId> = Vec::new();
    let mut dead: Vec<ObjectId> = Vec::new();
    // Overshoots the map so some objects end up partly or fully off it.
    let reach = map.size().as_vec3() + Vec3::splat(2.0);
    let offset = Vec3::splat(-1.0);

    for step in 0..600 {
        match scatter.index(4) {
            0 | 1 if live.len() < 80 => {
                let kind = EntityKind::ALL[scatter.index(EntityKind::COUNT)];
                let extent = scatter.point_in(Vec3::splat(2.0));
                let pos = offset + scatter.point_in(reach);
                live.push(map.insert(TileObject::new(kind, pos, extent)));
            }
            2 if !live.is_empty() => {
                let id = live[scatter.index(live.len())];
                let pos = offset + scatter.point_in(reach);
                assert!(map.set_position(id, pos));
            }
            _ if !live.is_empty() => {
                let id = live.swap_remove(scatter.index(live.len()));
                assert!(map.remove(id).is_some());
                dead.push(id);
            }
            _ => {}
        }

        if step % 25 == 0 {
            map.validate().unwrap();
        }
    }
    map.validate().unwrap();
    assert_eq!(map.len(), live.len());

    let size = map.size();
    for &id in &live {
        let object = map.object(id).unwrap();
        let owner = TilePos::containing(object.position());
        let expected_owner = owner.in_bounds(size).then_some(owner);
        assert_eq!(object.owning_tile(), expected_owner);
        let span: Vec<_> = tile_span(object.position(), object.extent(), size).collect();
        assert_eq!(object.intersecting_tiles(), span.as_slice());
    }
    for &id in &dead {
        assert!(!map.contains(id));
        assert!(map.remove(id).is_none());
    }

    for tile in map.tiles() {
        for layer in 0..tile.layer_count() {
            let list = tile.draw_list(layer);
            for pair in list.windows(2) {
                let a = map.object(pair[0]).unwrap().depth_key();
                let b = map.object(pair[1]).unwrap().depth_key();
                assert!(a <= b);
            }
            let expected = tile
                .owned()
                .iter()
                .filter(|&&id| map.layer_of(map.object(id).unwrap().kind()) == Some(layer))
                .count();
            assert_eq!(list.len(), expected);
        }
    }
}

#[test]
fn volley_resolves_then_applies() {
    init_logging();
    let mut map = city_map().unwrap();
    scatter_scenery(&mut map, 400, 2, 3);
    let before = map.len();

    let mut scatter = Scatter::new(99);
    let mut batch = CollisionBatch::with_capacity(64);
    for shot in 0..64u32 {
        let start = scatter.point_in(Vec3::new(100.0, 100.0, 2.0));
        let end = scatter.point_in(Vec3::new(100.0, 100.0, 2.0));
        batch.push(shot, CollisionQuery::new(start, end));
    }

    assert_eq!(batch.len(), 64);

    let resolved = batch.resolve(&map);
    let hits: Vec<ObjectId> = resolved.hits().map(|(_, hit)| hit.object).collect();
    for &id in &hits {
        assert_eq!(map.object(id).unwrap().kind(), EntityKind::Scenery);
    }

    let mut destroyed = 0;
    resolved.apply(&mut map, |map, _shot, hit| {
        if let Some(hit) = hit {
            if map.remove(hit.object).is_some() {
                destroyed += 1;
            }
        }
    });

    let mut unique = hits.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(destroyed, unique.len());
    assert_eq!(map.len(), before - destroyed);
    map.validate().unwrap();
}
