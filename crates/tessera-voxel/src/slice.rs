//! Single-layer occupancy bitmap.

use glam::{IVec2, UVec2};

use crate::error::{Result, VoxelError};

const WORD_BITS: usize = 64;

/// One Z layer of occupancy bits, stored row-major and bit-packed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoxelSlice {
    size: UVec2,
    words: Vec<u64>,
}

impl VoxelSlice {
    /// Create an empty slice of the given size.
    pub fn new(size: UVec2) -> Self {
        let bits = size.x as usize * size.y as usize;
        Self {
            size,
            words: vec![0; bits.div_ceil(WORD_BITS)],
        }
    }

    /// Create a slice with every bit set.
    pub fn filled(size: UVec2) -> Self {
        let mut slice = Self::new(size);
        for y in 0..size.y as i32 {
            for x in 0..size.x as i32 {
                slice.set_bit(IVec2::new(x, y), true);
            }
        }
        slice
    }

    /// Create a slice from row-major occupancy flags.
    ///
    /// `bits[x + y * width]` is the voxel at `(x, y)`.
    pub fn from_bits(size: UVec2, bits: &[bool]) -> Result<Self> {
        let expected = size.x as usize * size.y as usize;
        if bits.len() != expected {
            return Err(VoxelError::DataLength {
                expected,
                actual: bits.len(),
            });
        }
        let mut slice = Self::new(size);
        for (i, &bit) in bits.iter().enumerate() {
            if bit {
                slice.words[i / WORD_BITS] |= 1u64 << (i % WORD_BITS);
            }
        }
        Ok(slice)
    }

    /// Slice dimensions (width, height).
    #[inline]
    pub fn size(&self) -> UVec2 {
        self.size
    }

    #[inline]
    fn bit_index(&self, pos: IVec2) -> Option<usize> {
        if pos.x < 0 || pos.y < 0 || pos.x as u32 >= self.size.x || pos.y as u32 >= self.size.y {
            return None;
        }
        Some(pos.x as usize + pos.y as usize * self.size.x as usize)
    }

    /// Read a bit. Returns `false` outside the slice.
    #[inline]
    pub fn get_bit(&self, pos: IVec2) -> bool {
        self.bit_index(pos)
            .is_some_and(|i| self.words[i / WORD_BITS] & (1u64 << (i % WORD_BITS)) != 0)
    }

    /// Write a bit. No-op outside the slice.
    pub fn set_bit(&mut self, pos: IVec2, value: bool) {
        let Some(i) = self.bit_index(pos) else {
            return;
        };
        let mask = 1u64 << (i % WORD_BITS);
        if value {
            self.words[i / WORD_BITS] |= mask;
        } else {
            self.words[i / WORD_BITS] &= !mask;
        }
    }

    /// Number of set bits.
    pub fn solid_count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Iterate over the coordinates of every set bit, row by row.
    pub fn solid_positions(&self) -> impl Iterator<Item = IVec2> + '_ {
        let width = self.size.x as usize;
        let total = width * self.size.y as usize;
        (0..total)
            .filter(move |&i| self.words[i / WORD_BITS] & (1u64 << (i % WORD_BITS)) != 0)
            .map(move |i| IVec2::new((i % width) as i32, (i / width) as i32))
    }
}
