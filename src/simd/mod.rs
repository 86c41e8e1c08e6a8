//! # Batch Lane Predicates
//!
//! Runtime-selected kernels that test a batch of mask bytes at once:
//!
//! - [`SimdTier`]: the instruction tier (AVX-512BW, AVX2, SSE2, NEON or a
//!   64-bit word fallback) and its lane count
//! - [`BatchWidth`]: native width or an explicit lane count
//! - [`LaneKernel`]: "byte equals 1" as a lane bitmask for one batch
//!
//! ## Example
//!
//! ```
//! use selmask::simd::{BatchWidth, LaneKernel};
//!
//! let kernel = LaneKernel::for_batch_width(BatchWidth::Lanes(4))?;
//! assert_eq!(kernel.eq_one_mask(&[1, 0, 0, 1]), 0b1001);
//! # Ok::<(), selmask::MaskError>(())
//! ```

pub mod lanes;
pub mod tier;

pub use lanes::{LaneKernel, SELECTED};
pub use tier::{BatchWidth, SimdTier, MAX_MASKED_LANES};
