//! A single tile and its membership lists.

use tessera_core::TilePos;

use crate::object::ObjectId;

/// One cube of the map.
///
/// All lists are kept in insertion order except draw lists, which are kept
/// sorted by depth key (ties in insertion order).
#[derive(Debug, Clone)]
pub struct Tile {
    pos: TilePos,
    owned: Vec<ObjectId>,
    intersecting: Vec<ObjectId>,
    draw_lists: Vec<Vec<ObjectId>>,
}

impl Tile {
    pub(crate) fn new(pos: TilePos, layer_count: usize) -> Self {
        Self {
            pos,
            owned: Vec::new(),
            intersecting: Vec::new(),
            draw_lists: vec![Vec::new(); layer_count],
        }
    }

    #[inline]
    pub fn pos(&self) -> TilePos {
        self.pos
    }

    /// Objects whose anchor lies in this tile.
    #[inline]
    pub fn owned(&self) -> &[ObjectId] {
        &self.owned
    }

    /// Objects whose bounding cuboid overlaps this tile.
    #[inline]
    pub fn intersecting(&self) -> &[ObjectId] {
        &self.intersecting
    }

    /// Owned objects of one layer, back to front. Empty for unknown layers.
    #[inline]
    pub fn draw_list(&self, layer: usize) -> &[ObjectId] {
        self.draw_lists.get(layer).map_or(&[][..], Vec::as_slice)
    }

    /// Number of draw layers.
    #[inline]
    pub fn layer_count(&self) -> usize {
        self.draw_lists.len()
    }

    /// Returns true if nothing overlaps this tile.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.intersecting.is_empty()
    }

    pub(crate) fn owned_mut(&mut self) -> &mut Vec<ObjectId> {
        &mut self.owned
    }

    pub(crate) fn intersecting_mut(&mut self) -> &mut Vec<ObjectId> {
        &mut self.intersecting
    }

    pub(crate) fn draw_list_mut(&mut self, layer: usize) -> &mut Vec<ObjectId> {
        &mut self.draw_lists[layer]
    }
}

/// Remove `id` from an ordered list, keeping the order of the rest.
///
/// Returns false if it wasn't there.
pub(crate) fn remove_ordered(list: &mut Vec<ObjectId>, id: ObjectId) -> bool {
    match list.iter().position(|&other| other == id) {
        Some(i) => {
            list.remove(i);
            true
        }
        None => false,
    }
}
