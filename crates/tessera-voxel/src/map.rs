//! Layered 3D occupancy volume.

use std::sync::{Arc, OnceLock};

use glam::{IVec2, IVec3, UVec2, UVec3, Vec3};

use crate::error::{Result, VoxelError};
use crate::slice::VoxelSlice;

/// Stack of shared [`VoxelSlice`]s forming one object type's collision shape.
///
/// Each Z layer is either a slice whose footprint equals the map's `(x, y)`
/// size, or empty. Slices are reference counted so identical layers (and
/// whole maps) can be shared between many objects.
#[derive(Clone, Debug)]
pub struct VoxelMap {
    size: UVec3,
    slices: Vec<Option<Arc<VoxelSlice>>>,
    centroid: OnceLock<Option<Vec3>>,
}

impl VoxelMap {
    /// Create a map of the given size with every layer empty.
    pub fn new(size: UVec3) -> Self {
        Self {
            size,
            slices: vec![None; size.z as usize],
            centroid: OnceLock::new(),
        }
    }

    /// Create a map and assign `slices` to layers `0..`.
    ///
    /// Slices that don't fit are skipped with a warning, like
    /// [`VoxelMap::set_slice`].
    pub fn from_slices<I>(size: UVec3, slices: I) -> Self
    where
        I: IntoIterator<Item = Arc<VoxelSlice>>,
    {
        let mut map = Self::new(size);
        for (z, slice) in slices.into_iter().enumerate() {
            map.set_slice(z as u32, slice);
        }
        map
    }

    /// Map dimensions in voxels.
    #[inline]
    pub fn size(&self) -> UVec3 {
        self.size
    }

    /// Footprint a slice must have to be assigned to this map.
    #[inline]
    pub fn slice_size(&self) -> UVec2 {
        self.size.truncate()
    }

    /// Assign a slice to layer `z`, reporting why it was rejected.
    ///
    /// On error the map is left unchanged.
    pub fn try_set_slice(&mut self, z: u32, slice: Arc<VoxelSlice>) -> Result<()> {
        if z >= self.size.z {
            return Err(VoxelError::LayerOutOfRange { z, size: self.size });
        }
        if slice.size() != self.slice_size() {
            return Err(VoxelError::SliceSizeMismatch {
                slice: slice.size(),
                map: self.size,
            });
        }
        self.slices[z as usize] = Some(slice);
        self.centroid = OnceLock::new();
        Ok(())
    }

    /// Assign a slice to layer `z`.
    ///
    /// Asset files are sometimes malformed, so a rejected slice is logged and
    /// ignored; that layer simply behaves as empty.
    pub fn set_slice(&mut self, z: u32, slice: Arc<VoxelSlice>) {
        if let Err(err) = self.try_set_slice(z, slice) {
            tracing::warn!("Ignoring voxel slice: {err}");
        }
    }

    /// The slice at layer `z`, if one is set.
    #[inline]
    pub fn slice(&self, z: u32) -> Option<&Arc<VoxelSlice>> {
        self.slices.get(z as usize).and_then(Option::as_ref)
    }

    /// Read a voxel. Returns `false` out of range or on an unset layer.
    #[inline]
    pub fn get_bit(&self, pos: IVec3) -> bool {
        if pos.z < 0 || pos.z as u32 >= self.size.z {
            return false;
        }
        // The slice checks x/y against its own size, which equals ours.
        self.slices[pos.z as usize]
            .as_ref()
            .is_some_and(|slice| slice.get_bit(IVec2::new(pos.x, pos.y)))
    }

    /// Returns true if no voxel is set.
    pub fn is_empty(&self) -> bool {
        self.slices
            .iter()
            .flatten()
            .all(|slice| slice.solid_count() == 0)
    }

    /// Number of set voxels.
    pub fn solid_count(&self) -> usize {
        self.slices.iter().flatten().map(|s| s.solid_count()).sum()
    }

    /// Mean position of the set voxels' centres, in voxel space.
    ///
    /// `None` when the map is empty. Computed once and cached.
    pub fn centroid(&self) -> Option<Vec3> {
        *self.centroid.get_or_init(|| {
            let mut sum = Vec3::ZERO;
            let mut count = 0_u64;
            for (z, slice) in self.slices.iter().enumerate() {
                let Some(slice) = slice else {
                    continue;
                };
                for p in slice.solid_positions() {
                    sum += Vec3::new(p.x as f32, p.y as f32, z as f32) + Vec3::splat(0.5);
                    count += 1;
                }
            }
            (count > 0).then(|| sum / count as f32)
        })
    }
}
