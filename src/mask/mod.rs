//! Selection mask representations
//!
//! Three interchangeable encodings of the same selected-position set over
//! `N` positions:
//!
//! - [`DenseMask`]: one `bool` per position, the reference representation
//! - [`DenseVectorized`]: one byte (0 or 1) per position, iterated in batches
//!   with a lane predicate
//! - [`SparseMask`]: the ascending list of selected positions and its count
//!
//! All three visit selected positions in strictly ascending order through
//! [`SelectedPositions`]. [`MaskRef`] is the closed set of borrowed
//! representations accepted by the masked apply loops.

pub mod dense;
pub mod sparse;
pub mod vectorized;

pub use dense::{validate_selectivity, DenseMask};
pub use sparse::SparseMask;
pub use vectorized::DenseVectorized;

use std::fmt;

/// Capability shared by every representation: produce the ascending
/// sequence of selected positions
pub trait SelectedPositions {
    /// Number of positions `N` the mask covers
    fn len(&self) -> usize;

    /// Check if the mask covers no positions
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Invoke `visitor` once per selected position, ascending
    fn for_each_selected<F: FnMut(usize)>(&self, visitor: F);

    /// Number of selected positions
    fn count_selected(&self) -> usize {
        let mut count = 0;
        self.for_each_selected(|_| count += 1);
        count
    }

    /// Selected positions collected into a vector
    fn collect_positions(&self) -> Vec<usize> {
        let mut positions = Vec::new();
        self.for_each_selected(|p| positions.push(p));
        positions
    }
}

/// Names of the three representations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Representation {
    /// [`DenseMask`]
    Dense,
    /// [`DenseVectorized`]
    DenseVectorized,
    /// [`SparseMask`]
    Sparse,
}

impl Representation {
    /// All representations
    pub const ALL: [Representation; 3] = [
        Representation::Dense,
        Representation::DenseVectorized,
        Representation::Sparse,
    ];

    /// Short name used in logs and benchmark ids
    pub const fn name(self) -> &'static str {
        match self {
            Representation::Dense => "dense",
            Representation::DenseVectorized => "dense_vectorized",
            Representation::Sparse => "sparse",
        }
    }
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Borrowed mask in any of the three representations
#[derive(Debug, Clone, Copy)]
pub enum MaskRef<'a> {
    /// Per-position booleans
    Dense(&'a DenseMask),
    /// Byte-packed, batch evaluated
    Vectorized(&'a DenseVectorized),
    /// Compacted positions
    Sparse(&'a SparseMask),
}

impl MaskRef<'_> {
    /// Which representation this is
    pub fn representation(&self) -> Representation {
        match self {
            MaskRef::Dense(_) => Representation::Dense,
            MaskRef::Vectorized(_) => Representation::DenseVectorized,
            MaskRef::Sparse(_) => Representation::Sparse,
        }
    }
}

impl SelectedPositions for MaskRef<'_> {
    fn len(&self) -> usize {
        match self {
            MaskRef::Dense(mask) => mask.len(),
            MaskRef::Vectorized(mask) => mask.len(),
            MaskRef::Sparse(mask) => mask.len(),
        }
    }

    fn for_each_selected<F: FnMut(usize)>(&self, visitor: F) {
        match self {
            MaskRef::Dense(mask) => mask.for_each(visitor),
            MaskRef::Vectorized(mask) => mask.for_each(visitor),
            MaskRef::Sparse(mask) => mask.for_each(visitor),
        }
    }

    fn count_selected(&self) -> usize {
        match self {
            MaskRef::Dense(mask) => mask.count_selected(),
            MaskRef::Vectorized(mask) => mask.count_selected(),
            MaskRef::Sparse(mask) => mask.count(),
        }
    }
}

impl<'a> From<&'a DenseMask> for MaskRef<'a> {
    fn from(mask: &'a DenseMask) -> Self {
        MaskRef::Dense(mask)
    }
}

impl<'a> From<&'a DenseVectorized> for MaskRef<'a> {
    fn from(mask: &'a DenseVectorized) -> Self {
        MaskRef::Vectorized(mask)
    }
}

impl<'a> From<&'a SparseMask> for MaskRef<'a> {
    fn from(mask: &'a SparseMask) -> Self {
        MaskRef::Sparse(mask)
    }
}
