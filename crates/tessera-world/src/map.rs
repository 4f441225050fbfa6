//! The tile map: dense tile storage plus object lifecycle.
//!
//! Objects live in a slot arena inside the map and are addressed by
//! generational [`ObjectId`]s. Tiles refer to objects by id and objects refer
//! to tiles by [`TilePos`], so neither side owns the other.
//!
//! Every move fully unregisters the object and registers it again; there is
//! no incremental update path.

use glam::{UVec3, Vec3};
use hashbrown::HashSet;
use tessera_core::{EntityKind, Error, Result, TilePos};

use crate::config::TileMapConfig;
use crate::draw;
use crate::object::{tile_span, ObjectId, TileObject};
use crate::tile::{remove_ordered, Tile};

#[derive(Debug, Clone, Default)]
struct Slot {
    generation: u32,
    object: Option<TileObject>,
}

/// Fixed-size 3D grid of tiles and the objects placed on it.
#[derive(Debug, Clone)]
pub struct TileMap {
    config: TileMapConfig,
    layer_of: [Option<usize>; EntityKind::COUNT],
    tiles: Vec<Tile>,
    slots: Vec<Slot>,
    free_slots: Vec<u32>,
    len: usize,
}

impl TileMap {
    /// Create an empty map. Fails if the configuration is invalid.
    pub fn new(config: TileMapConfig) -> Result<Self> {
        let layer_of = config.layer_table()?;
        let size = config.size;
        let count = size.x as usize * size.y as usize * size.z as usize;
        let layers = config.layers.len();
        let tiles = (0..count)
            .map(|i| Tile::new(TilePos::from_index(i, size), layers))
            .collect();

        tracing::debug!("Created {} tile map with {} layers", size, layers);

        Ok(Self {
            config,
            layer_of,
            tiles,
            slots: Vec::new(),
            free_slots: Vec::new(),
            len: 0,
        })
    }

    #[inline]
    pub fn config(&self) -> &TileMapConfig {
        &self.config
    }

    /// Number of tiles along each axis.
    #[inline]
    pub fn size(&self) -> UVec3 {
        self.config.size
    }

    /// Draw layer of a kind, if it is drawn at all.
    #[inline]
    pub fn layer_of(&self, kind: EntityKind) -> Option<usize> {
        self.layer_of[kind.index()]
    }

    /// The tile at an integer coordinate, or `None` out of bounds.
    #[inline]
    pub fn get_tile(&self, pos: TilePos) -> Option<&Tile> {
        pos.to_index(self.size()).map(|i| &self.tiles[i])
    }

    /// Like [`TileMap::get_tile`], but reports an out-of-bounds coordinate.
    pub fn try_get_tile(&self, pos: TilePos) -> Result<&Tile> {
        self.get_tile(pos).ok_or(Error::OutOfBounds(pos))
    }

    /// The tile containing a continuous position, or `None` out of bounds.
    #[inline]
    pub fn get_tile_at(&self, pos: Vec3) -> Option<&Tile> {
        TilePos::try_containing(pos).and_then(|tile| self.get_tile(tile))
    }

    /// All tiles, X fastest.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    /// Objects overlapping a tile, in insertion order. Empty out of bounds.
    pub fn objects_at(&self, pos: TilePos) -> &[ObjectId] {
        self.get_tile(pos).map_or(&[][..], Tile::intersecting)
    }

    /// Number of objects on the map.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if no objects are on the map.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Look up a live object.
    #[inline]
    pub fn object(&self, id: ObjectId) -> Option<&TileObject> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.object.as_ref())
    }

    /// Returns true if `id` refers to an object on the map.
    #[inline]
    pub fn contains(&self, id: ObjectId) -> bool {
        self.object(id).is_some()
    }

    /// All live objects, in slot order.
    pub fn objects(&self) -> impl Iterator<Item = (ObjectId, &TileObject)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.object.as_ref().map(|object| {
                (
                    ObjectId {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    object,
                )
            })
        })
    }

    /// World-space centre of an object's solid voxels.
    pub fn object_centre(&self, id: ObjectId) -> Option<Vec3> {
        self.object(id).map(TileObject::centre)
    }

    /// Place a detached object on the map at its current position.
    ///
    /// Any tile links the object carries are discarded and recomputed.
    pub fn insert(&mut self, mut object: TileObject) -> ObjectId {
        object.owning_tile = None;
        object.intersecting_tiles.clear();

        let id = if let Some(index) = self.free_slots.pop() {
            let slot = &mut self.slots[index as usize];
            slot.object = Some(object);
            ObjectId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                object: Some(object),
            });
            ObjectId {
                index,
                generation: 0,
            }
        };
        self.len += 1;
        self.register(id);
        id
    }

    /// Move an object, re-registering it with every affected tile.
    ///
    /// Off-map targets are allowed; the object then has no owning tile.
    /// Returns false if `id` is stale.
    #[cfg_attr(
        feature = "profiling",
        tracing::instrument(level = "trace", skip_all)
    )]
    pub fn set_position(&mut self, id: ObjectId, position: Vec3) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.unregister(id);
        if let Some(object) = self.object_mut(id) {
            object.set_position_unchecked(position);
        }
        self.register(id);
        true
    }

    /// Take an object off the map, returning it detached.
    ///
    /// Removing a stale id is a no-op that returns `None`.
    pub fn remove(&mut self, id: ObjectId) -> Option<TileObject> {
        if !self.contains(id) {
            return None;
        }
        self.unregister(id);

        let slot = &mut self.slots[id.index as usize];
        let object = slot.object.take();
        slot.generation = slot.generation.wrapping_add(1);
        self.free_slots.push(id.index);
        self.len -= 1;
        object
    }

    fn object_mut(&mut self, id: ObjectId) -> Option<&mut TileObject> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.object.as_mut())
    }

    fn tile_mut(&mut self, pos: TilePos) -> Option<&mut Tile> {
        pos.to_index(self.config.size).map(|i| &mut self.tiles[i])
    }

    /// Compute an object's tiles from its position and add it to them.
    fn register(&mut self, id: ObjectId) {
        let size = self.size();
        let Some(object) = self.object(id) else {
            return;
        };
        let kind = object.kind();
        let position = object.position();
        let span: Vec<TilePos> = tile_span(position, object.extent(), size).collect();
        let owner = TilePos::try_containing(position).filter(|pos| pos.in_bounds(size));

        for &pos in &span {
            if let Some(tile) = self.tile_mut(pos) {
                tile.intersecting_mut().push(id);
            }
        }

        if let Some(owner_pos) = owner {
            let layer = self.layer_of(kind);
            if let Some(index) = owner_pos.to_index(size) {
                let slots = &self.slots;
                let tile = &mut self.tiles[index];
                tile.owned_mut().push(id);
                if let Some(layer) = layer {
                    let list = tile.draw_list_mut(layer);
                    list.push(id);
                    draw::sort_draw_list(list, |other| lookup(slots, other));
                }
            }
        }

        if let Some(object) = self.object_mut(id) {
            object.owning_tile = owner;
            object.intersecting_tiles = span;
        }
    }

    /// Remove an object from every tile its cached links name.
    fn unregister(&mut self, id: ObjectId) {
        let Some(object) = self.object_mut(id) else {
            return;
        };
        let kind = object.kind();
        let owner = object.owning_tile.take();
        let span = std::mem::take(&mut object.intersecting_tiles);
        let layer = self.layer_of(kind);

        for pos in span {
            let found = self
                .tile_mut(pos)
                .is_some_and(|tile| remove_ordered(tile.intersecting_mut(), id));
            if !found {
                report_inconsistency(id, pos, "intersecting");
            }
        }

        if let Some(pos) = owner {
            let Some(tile) = self.tile_mut(pos) else {
                report_inconsistency(id, pos, "owning");
                return;
            };
            let mut found = remove_ordered(tile.owned_mut(), id);
            // Removing an entry keeps a sorted list sorted.
            if let Some(layer) = layer {
                found &= remove_ordered(tile.draw_list_mut(layer), id);
            }
            if !found {
                report_inconsistency(id, pos, "owning");
            }
        }
    }

    /// Check every tile/object link.
    ///
    /// The public operations keep the map consistent, so an error here is a
    /// bug in the map itself.
    pub fn validate(&self) -> Result<()> {
        let size = self.size();
        let fail = |msg: String| Err(Error::Inconsistent(msg));

        let mut live = 0;
        for (id, object) in self.objects() {
            live += 1;
            let position = object.position();
            let expected_owner =
                TilePos::try_containing(position).filter(|pos| pos.in_bounds(size));
            if object.owning_tile() != expected_owner {
                return fail(format!(
                    "object {id} at {position} owned by {:?}, expected {expected_owner:?}",
                    object.owning_tile()
                ));
            }
            let expected_span: Vec<TilePos> =
                tile_span(position, object.extent(), size).collect();
            if object.intersecting_tiles() != expected_span.as_slice() {
                return fail(format!("object {id} caches the wrong intersecting tiles"));
            }
            for &pos in object.intersecting_tiles() {
                if !self.objects_at(pos).contains(&id) {
                    return fail(format!("tile {pos} is missing intersecting object {id}"));
                }
            }
            if let Some(pos) = object.owning_tile() {
                let owned = self.get_tile(pos).map_or(&[][..], Tile::owned);
                if !owned.contains(&id) {
                    return fail(format!("tile {pos} is missing owned object {id}"));
                }
            }
        }
        if live != self.len {
            return fail(format!("{live} live objects but len is {}", self.len));
        }

        for tile in &self.tiles {
            let pos = tile.pos();
            check_unique(tile.owned(), pos, "owned")?;
            check_unique(tile.intersecting(), pos, "intersecting")?;

            for &id in tile.intersecting() {
                let Some(object) = self.object(id) else {
                    return fail(format!("tile {pos} lists dead object {id}"));
                };
                if !object.intersecting_tiles().contains(&pos) {
                    return fail(format!("tile {pos} lists {id} which doesn't overlap it"));
                }
            }
            for &id in tile.owned() {
                if self.object(id).and_then(TileObject::owning_tile) != Some(pos) {
                    return fail(format!("tile {pos} owns {id} which isn't anchored there"));
                }
            }

            for layer in 0..tile.layer_count() {
                let list = tile.draw_list(layer);
                check_unique(list, pos, "draw")?;
                let expected = tile
                    .owned()
                    .iter()
                    .filter(|&&id| {
                        self.object(id)
                            .is_some_and(|object| self.layer_of(object.kind()) == Some(layer))
                    })
                    .count();
                let all_owned = list.iter().all(|id| tile.owned().contains(id));
                if list.len() != expected || !all_owned {
                    return fail(format!("tile {pos} layer {layer} draw list mismatch"));
                }
                if !draw::is_sorted(list, |id| self.object(id)) {
                    return fail(format!("tile {pos} layer {layer} draw list is unsorted"));
                }
            }
        }
        Ok(())
    }
}

fn lookup(slots: &[Slot], id: ObjectId) -> Option<&TileObject> {
    slots
        .get(id.index as usize)
        .filter(|slot| slot.generation == id.generation)
        .and_then(|slot| slot.object.as_ref())
}

fn check_unique(list: &[ObjectId], pos: TilePos, what: &str) -> Result<()> {
    let mut seen = HashSet::with_capacity(list.len());
    match list.iter().find(|&&id| !seen.insert(id)) {
        Some(id) => Err(Error::Inconsistent(format!(
            "tile {pos} lists {id} twice in its {what} list"
        ))),
        None => Ok(()),
    }
}

fn report_inconsistency(id: ObjectId, pos: TilePos, what: &str) {
    tracing::error!("Object {id} missing from {what} tile {pos}");
    debug_assert!(false, "object {id} missing from {what} tile {pos}");
}
