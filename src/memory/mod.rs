//! Native memory for masks and operands
//!
//! Vectorized masks and operand arrays live outside the Rust heap-managed
//! collections in explicitly aligned allocations, read and written through
//! typed views.

pub mod native;

pub use native::{NativeBuffer, NativeElement, DEFAULT_ALIGNMENT, MAX_ALIGNMENT};
