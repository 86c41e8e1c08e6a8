//! Dense selection mask: one boolean flag per position
//!
//! The dense mask is the ground truth every other representation is derived
//! from, and its `for_each` defines the reference visiting order.

use super::sparse::SparseMask;
use super::vectorized::DenseVectorized;
use super::SelectedPositions;
use crate::error::{check_bounds, MaskError, Result};
use crate::memory::DEFAULT_ALIGNMENT;
use rand::Rng;

/// A flat boolean sequence with one entry per position
///
/// # Examples
///
/// ```rust
/// use selmask::DenseMask;
///
/// let mask = DenseMask::new(vec![true, false, false, true]);
/// let mut visited = Vec::new();
/// mask.for_each(|p| visited.push(p));
/// assert_eq!(visited, vec![0, 3]);
///
/// let sparse = mask.to_sparse()?;
/// assert_eq!(sparse.positions(), &[0, 3]);
/// # Ok::<(), selmask::MaskError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenseMask {
    flags: Box<[bool]>,
}

impl DenseMask {
    /// Wrap a boolean sequence; its length is the mask length
    pub fn new(flags: Vec<bool>) -> Self {
        Self {
            flags: flags.into_boxed_slice(),
        }
    }

    /// Build a mask of `len` positions selecting exactly `positions`
    pub fn from_positions(len: usize, positions: &[usize]) -> Result<Self> {
        let mut flags = vec![false; len];
        for &position in positions {
            check_bounds(position, len)?;
            flags[position] = true;
        }
        Ok(Self::new(flags))
    }

    /// Random mask using the thread-local generator
    ///
    /// Each position is selected independently with probability `selectivity`.
    pub fn random(len: usize, selectivity: f64) -> Result<Self> {
        Self::random_with_rng(len, selectivity, &mut rand::thread_rng())
    }

    /// Random mask drawn from `rng`
    ///
    /// One uniform draw in `[0, 1)` per position; the position is selected
    /// when the draw is below `selectivity`, so 0 selects nothing and 1
    /// selects everything.
    pub fn random_with_rng<R: Rng + ?Sized>(len: usize, selectivity: f64, rng: &mut R) -> Result<Self> {
        validate_selectivity(selectivity)?;
        let flags = (0..len).map(|_| rng.gen::<f64>() < selectivity).collect();
        Ok(Self::new(flags))
    }

    /// Number of positions
    #[inline]
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Check if the mask covers no positions
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Flag at `position`, `None` outside `[0, len)`
    #[inline]
    pub fn get(&self, position: usize) -> Option<bool> {
        self.flags.get(position).copied()
    }

    /// The underlying flags
    #[inline]
    pub fn as_slice(&self) -> &[bool] {
        &self.flags
    }

    /// Number of selected positions
    pub fn count_selected(&self) -> usize {
        self.flags.iter().filter(|&&flag| flag).count()
    }

    /// Visit every selected position in ascending order
    #[inline]
    pub fn for_each<F: FnMut(usize)>(&self, mut visitor: F) {
        for (position, &flag) in self.flags.iter().enumerate() {
            if flag {
                visitor(position);
            }
        }
    }

    /// Repack into a byte buffer with the default alignment
    pub fn to_vectorized(&self) -> Result<DenseVectorized> {
        DenseVectorized::from_dense(self, DEFAULT_ALIGNMENT)
    }

    /// Repack into a byte buffer aligned to `align`
    pub fn to_vectorized_aligned(&self, align: usize) -> Result<DenseVectorized> {
        DenseVectorized::from_dense(self, align)
    }

    /// Compact into the list of selected positions
    pub fn to_sparse(&self) -> Result<SparseMask> {
        SparseMask::from_dense(self)
    }
}

impl From<Vec<bool>> for DenseMask {
    fn from(flags: Vec<bool>) -> Self {
        Self::new(flags)
    }
}

impl SelectedPositions for DenseMask {
    #[inline]
    fn len(&self) -> usize {
        DenseMask::len(self)
    }

    #[inline]
    fn for_each_selected<F: FnMut(usize)>(&self, visitor: F) {
        self.for_each(visitor)
    }

    fn count_selected(&self) -> usize {
        DenseMask::count_selected(self)
    }
}

/// Reject selectivities that are not probabilities
pub fn validate_selectivity(selectivity: f64) -> Result<()> {
    if selectivity.is_finite() && (0.0..=1.0).contains(&selectivity) {
        Ok(())
    } else {
        Err(MaskError::invalid_selectivity(selectivity))
    }
}
