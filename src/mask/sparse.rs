//! Sparse selection mask: the compacted list of selected positions
//!
//! Positions are stored as `u32` in a buffer sized for the worst case (every
//! position selected). Only the first `count` slots are meaningful; the
//! remainder is never exposed.

use super::dense::DenseMask;
use super::SelectedPositions;
use crate::error::{MaskError, Result};

/// Ascending list of selected positions plus their count
#[derive(Debug, Clone)]
pub struct SparseMask {
    slots: Box<[u32]>,
    count: usize,
}

impl SparseMask {
    /// Compact `dense` by scanning it left to right
    pub fn from_dense(dense: &DenseMask) -> Result<Self> {
        let len = dense.len();
        if len > u32::MAX as usize {
            return Err(MaskError::invalid_data(format!(
                "Sparse masks address at most {} positions, got {}",
                u32::MAX,
                len
            )));
        }

        let mut slots = vec![0u32; len].into_boxed_slice();
        let mut count = 0;
        for (position, &flag) in dense.as_slice().iter().enumerate() {
            if flag {
                slots[count] = position as u32;
                count += 1;
            }
        }

        Ok(Self { slots, count })
    }

    /// Number of positions of the originating mask
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if the originating mask covers no positions
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of selected positions
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Allocated slots, equal to `len()`
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// The selected positions, strictly ascending
    #[inline]
    pub fn positions(&self) -> &[u32] {
        &self.slots[..self.count]
    }

    /// The `index`-th selected position, `None` past `count()`
    #[inline]
    pub fn position(&self, index: usize) -> Option<usize> {
        self.positions().get(index).map(|&p| p as usize)
    }

    /// Visit every selected position in ascending order
    #[inline]
    pub fn for_each<F: FnMut(usize)>(&self, mut visitor: F) {
        for &position in self.positions() {
            visitor(position as usize);
        }
    }

    /// Expand back into a dense mask of `len()` positions
    pub fn to_dense(&self) -> DenseMask {
        let mut flags = vec![false; self.len()];
        for &position in self.positions() {
            flags[position as usize] = true;
        }
        DenseMask::new(flags)
    }
}

impl SelectedPositions for SparseMask {
    #[inline]
    fn len(&self) -> usize {
        SparseMask::len(self)
    }

    #[inline]
    fn for_each_selected<F: FnMut(usize)>(&self, visitor: F) {
        self.for_each(visitor)
    }

    #[inline]
    fn count_selected(&self) -> usize {
        self.count
    }
}
