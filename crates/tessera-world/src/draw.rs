//! Per-tile draw ordering.
//!
//! Each tile keeps one list per draw layer holding the objects it owns in
//! that layer, sorted back to front by [`TileObject::depth_key`]. Lists are
//! re-sorted whenever an object joins them. Tiles rarely hold more than a
//! handful of objects, so a full stable sort per move is cheap.

use std::cmp::Ordering;

use crate::object::{ObjectId, TileObject};

/// Stable sort of a draw list by depth key.
///
/// `lookup` resolves ids to objects; ids it can't resolve sort first.
pub(crate) fn sort_draw_list<'a, F>(list: &mut [ObjectId], lookup: F)
where
    F: Fn(ObjectId) -> Option<&'a TileObject>,
{
    let key = |id: ObjectId| lookup(id).map_or(f32::NEG_INFINITY, TileObject::depth_key);
    list.sort_by(|&a, &b| key(a).total_cmp(&key(b)));
}

/// Whether a draw list is in back-to-front order.
pub(crate) fn is_sorted<'a, F>(list: &[ObjectId], lookup: F) -> bool
where
    F: Fn(ObjectId) -> Option<&'a TileObject>,
{
    let key = |id: ObjectId| lookup(id).map_or(f32::NEG_INFINITY, TileObject::depth_key);
    list.windows(2)
        .all(|pair| key(pair[0]).total_cmp(&key(pair[1])) != Ordering::Greater)
}
