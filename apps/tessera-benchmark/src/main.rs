//! Tessera collision benchmark.
//!
//! Builds a city-sized map, scatters scenery, then fires projectile volleys
//! through a collision batch and applies the hits. Set `RUST_LOG=debug` for
//! per-batch detail.

use std::time::Instant;

use glam::Vec3;
use tessera_core::EntityKind;
use tessera_test::{city_map, scatter_scenery, Scatter};
use tessera_world::{CollisionBatch, CollisionQuery, TileObject};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const SCENERY: usize = 20_000;
const VOLLEYS: usize = 20;
const SHOTS_PER_VOLLEY: usize = 2_000;

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    info!("Tessera collision benchmark");

    let mut map = match city_map() {
        Ok(map) => map,
        Err(err) => {
            error!("Failed to create map: {err}");
            return;
        }
    };

    let started = Instant::now();
    scatter_scenery(&mut map, SCENERY, 3, 42);
    info!("Inserted {} objects in {:?}", map.len(), started.elapsed());

    let mut scatter = Scatter::new(1337);
    let area = map.size().as_vec3() * Vec3::new(1.0, 1.0, 0.0) + Vec3::Z * 3.0;
    let mut shooters = Vec::with_capacity(SHOTS_PER_VOLLEY);
    for _ in 0..SHOTS_PER_VOLLEY {
        let pos = scatter.point_in(area);
        shooters.push(map.insert(TileObject::new(EntityKind::Vehicle, pos, Vec3::splat(0.5))));
    }

    let mut total_hits = 0;
    let mut destroyed = 0;
    let mut resolve_time = std::time::Duration::ZERO;
    for volley in 0..VOLLEYS {
        let mut batch = CollisionBatch::with_capacity(SHOTS_PER_VOLLEY);
        for &shooter in &shooters {
            let Some(object) = map.object(shooter) else {
                continue;
            };
            let start = object.position();
            let target = scatter.point_in(area);
            batch.push(shooter, CollisionQuery::new(start, target).ignoring(shooter));
        }

        let started = Instant::now();
        let resolved = batch.resolve(&map);
        let elapsed = started.elapsed();
        resolve_time += elapsed;

        let hits = resolved.hits().count();
        total_hits += hits;
        resolved.apply(&mut map, |map, _shooter, hit| {
            let Some(hit) = hit else { return };
            if hit.kind == EntityKind::Scenery && map.remove(hit.object).is_some() {
                destroyed += 1;
            }
        });
        info!("Volley {volley}: {hits} hits, resolved in {elapsed:?}");
    }

    let shots = VOLLEYS * SHOTS_PER_VOLLEY;
    info!(
        "{shots} shots, {total_hits} hits, {destroyed} scenery destroyed, {:.2} us/shot",
        resolve_time.as_secs_f64() * 1e6 / shots as f64
    );
    if let Err(err) = map.validate() {
        error!("Map inconsistent after run: {err}");
    }
}
