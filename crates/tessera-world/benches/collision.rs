use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::{UVec2, UVec3, Vec3};
use tessera_core::EntityKind;
use tessera_voxel::{VoxelMap, VoxelSlice};
use tessera_world::{CollisionQuery, StepMode, TileMap, TileMapConfig, TileObject};

fn scattered_map() -> TileMap {
    let size = UVec3::new(64, 64, 8);
    let mut map = TileMap::new(TileMapConfig::city(size)).unwrap();
    let shape_size = UVec3::new(32, 32, 16);
    let layer = Arc::new(VoxelSlice::filled(UVec2::new(32, 32)));
    let shape = Arc::new(VoxelMap::from_slices(
        shape_size,
        std::iter::repeat(layer).take(16),
    ));
    for i in 0..2048u32 {
        let x = (i * 37 % 64) as f32 + 0.5;
        let y = (i * 101 % 64) as f32 + 0.5;
        let z = (i % 3) as f32 + 0.5;
        map.insert(
            TileObject::new(EntityKind::Scenery, Vec3::new(x, y, z), Vec3::splat(0.6))
                .with_voxel_map(Arc::clone(&shape)),
        );
    }
    map
}

fn volley(count: usize) -> Vec<CollisionQuery> {
    (0..count)
        .map(|i| {
            let a = i as f32 * 0.37;
            let start = Vec3::new(32.0 + a.cos() * 30.0, 32.0 + a.sin() * 30.0, 1.5);
            CollisionQuery::new(start, Vec3::new(32.0, 32.0, 0.5))
        })
        .collect()
}

fn bench_collision(c: &mut Criterion) {
    let map = scattered_map();
    let queries = volley(256);

    c.bench_function("find_collision", |b| {
        b.iter(|| {
            for q in &queries {
                black_box(map.query_collision(black_box(q)));
            }
        })
    });

    c.bench_function("find_collision_fast_walk", |b| {
        let fast: Vec<_> = queries.iter().map(|q| q.with_mode(StepMode::Fast)).collect();
        b.iter(|| {
            for q in &fast {
                black_box(map.query_collision(black_box(q)));
            }
        })
    });

    c.bench_function("find_collisions_parallel", |b| {
        b.iter(|| black_box(map.find_collisions_parallel(black_box(&queries))))
    });
}

fn bench_lifecycle(c: &mut Criterion) {
    let mut map = scattered_map();
    let ids: Vec<_> = map.objects().map(|(id, _)| id).take(256).collect();
    let mut step = 0u32;

    c.bench_function("set_position", |b| {
        b.iter(|| {
            step = step.wrapping_add(1);
            let offset = (step % 16) as f32 * 0.25;
            for &id in &ids {
                map.set_position(id, Vec3::new(10.0 + offset, 10.0, 1.5));
            }
        })
    });
}

criterion_group!(benches, bench_collision, bench_lifecycle);
criterion_main!(benches);
