//! # Selmask: selection masks and masked element-wise loops
//!
//! A selection mask marks which of `N` positions participate in an
//! operation. This crate provides three interchangeable representations of
//! the same mask and the masked addition loops that consume them, so their
//! cost can be compared across selectivities and element widths.
//!
//! ## Key Features
//!
//! - **Dense masks**: one boolean per position, the reference representation
//! - **Vectorized masks**: byte-packed flags evaluated a batch at a time with
//!   SSE2/AVX2/AVX-512/NEON lane predicates and a SWAR fallback
//! - **Sparse masks**: the compacted list of selected positions
//! - **Masked apply**: `result[p] = left[p] + right[p]` over 8, 32 and 64-bit
//!   elements in aligned native buffers
//! - **Workloads**: seeded fixtures driven by a validated [`WorkloadConfig`]
//!
//! ## Quick Start
//!
//! ```rust
//! use selmask::{apply, DenseMask, NativeBuffer};
//!
//! let mask = DenseMask::new(vec![true, false, false, true, false, false, false, true]);
//! let sparse = mask.to_sparse()?;
//! assert_eq!(sparse.positions(), &[0, 3, 7]);
//!
//! let left = NativeBuffer::from_elements(&[1u32, 2, 3, 4, 5, 6, 7, 8], 8)?;
//! let right = NativeBuffer::from_elements(&[10u32, 20, 30, 40, 50, 60, 70, 80], 8)?;
//! let mut result = NativeBuffer::from_elements(&[0u32; 8], 8)?;
//!
//! apply::ints::sparse(&left, &right, &mut result, &sparse)?;
//! assert_eq!(result.as_slice::<u32>()?, &[11, 0, 0, 44, 0, 0, 0, 88]);
//! # Ok::<(), selmask::MaskError>(())
//! ```

#![warn(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod apply;
pub mod config;
pub mod error;
pub mod mask;
pub mod memory;
pub mod simd;
pub mod system;
pub mod workload;

// Re-export core types
pub use apply::{ElementWidth, WrappingAdd};
pub use config::{Config, WorkloadConfig};
pub use error::{MaskError, Result};
pub use mask::{DenseMask, DenseVectorized, MaskRef, Representation, SelectedPositions, SparseMask};
pub use memory::{NativeBuffer, NativeElement};
pub use simd::{BatchWidth, LaneKernel, SimdTier};
pub use system::CpuFeatures;
pub use workload::{MaskWorkload, OperandSet};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library, logging the version and detected SIMD tier
pub fn init() {
    log::debug!("Initializing selmask v{} (simd tier: {})", VERSION, SimdTier::native());
}
