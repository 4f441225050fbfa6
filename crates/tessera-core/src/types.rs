//! Entity kinds and small shared value types.

use bitflags::bitflags;
use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::constants::OVERLAY_DEPTH_BIAS;

/// What a placed object is.
///
/// The kind only selects a draw layer and filters collision targets; all
/// other behaviour lives in the simulation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    Vehicle,
    Scenery,
    Projectile,
    /// Short-lived decorative doodad (explosions, smoke).
    Effect,
    Shadow,
}

impl EntityKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Vehicle,
        Self::Scenery,
        Self::Projectile,
        Self::Effect,
        Self::Shadow,
    ];

    /// Number of kinds.
    pub const COUNT: usize = Self::ALL.len();

    /// Dense index of this kind, matching [`EntityKind::ALL`].
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Overlays are drawn above ground objects sharing their tile.
    #[inline]
    pub const fn is_overlay(self) -> bool {
        matches!(self, Self::Projectile | Self::Effect)
    }

    /// Additive bias applied to the depth key of this kind.
    #[inline]
    pub const fn depth_bias(self) -> f32 {
        if self.is_overlay() {
            OVERLAY_DEPTH_BIAS
        } else {
            0.0
        }
    }

    /// Whether objects of this kind may expose a voxel volume at all.
    ///
    /// Effects and shadows are purely visual.
    #[inline]
    pub const fn is_collidable(self) -> bool {
        !matches!(self, Self::Effect | Self::Shadow)
    }
}

bitflags! {
    /// A set of entity kinds, used to filter collision targets.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct KindSet: u8 {
        const VEHICLE = 1 << 0;
        const SCENERY = 1 << 1;
        const PROJECTILE = 1 << 2;
        const EFFECT = 1 << 3;
        const SHADOW = 1 << 4;
    }
}

impl KindSet {
    /// Kinds that can be hit by a collision query.
    pub const COLLIDABLE: Self = Self::VEHICLE
        .union(Self::SCENERY)
        .union(Self::PROJECTILE);

    /// Whether the set contains the given kind
    #[inline]
    pub fn has(self, kind: EntityKind) -> bool {
        self.contains(Self::from(kind))
    }
}

impl From<EntityKind> for KindSet {
    fn from(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Vehicle => Self::VEHICLE,
            EntityKind::Scenery => Self::SCENERY,
            EntityKind::Projectile => Self::PROJECTILE,
            EntityKind::Effect => Self::EFFECT,
            EntityKind::Shadow => Self::SHADOW,
        }
    }
}

impl FromIterator<EntityKind> for KindSet {
    fn from_iter<I: IntoIterator<Item = EntityKind>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::empty(), |set, kind| set | Self::from(kind))
    }
}

/// Opaque handle the renderer uses to find an object's sprite or model.
///
/// The engine stores and returns it but never interprets it.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize,
)]
#[repr(transparent)]
pub struct RenderHandle(pub u32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_indices_match_all() {
        for (i, kind) in EntityKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn overlays_have_bias() {
        assert!(EntityKind::Projectile.depth_bias() > 0.0);
        assert!(EntityKind::Effect.depth_bias() > 0.0);
        assert_eq!(EntityKind::Scenery.depth_bias(), 0.0);
        assert_eq!(EntityKind::Shadow.depth_bias(), 0.0);
    }

    #[test]
    fn collidable_set_excludes_visuals() {
        assert!(KindSet::COLLIDABLE.has(EntityKind::Vehicle));
        assert!(KindSet::COLLIDABLE.has(EntityKind::Scenery));
        assert!(!KindSet::COLLIDABLE.has(EntityKind::Effect));
        assert!(!KindSet::COLLIDABLE.has(EntityKind::Shadow));
    }

    #[test]
    fn kind_set_from_iter() {
        let set: KindSet = [EntityKind::Vehicle, EntityKind::Shadow].into_iter().collect();
        assert_eq!(set, KindSet::VEHICLE | KindSet::SHADOW);
    }
}
