//! Byte-packed selection mask evaluated one batch at a time
//!
//! Each position occupies one byte holding 0 or 1. Iteration loads a batch,
//! computes the "byte equals 1" lane predicate and only walks the lanes of
//! batches with at least one candidate; the tail shorter than a batch is
//! scanned byte by byte.

use super::dense::DenseMask;
use super::SelectedPositions;
use crate::error::Result;
use crate::memory::NativeBuffer;
use crate::simd::{BatchWidth, LaneKernel, SELECTED};

/// Dense mask repacked into a contiguous byte buffer
#[derive(Debug)]
pub struct DenseVectorized {
    bytes: NativeBuffer,
    kernel: LaneKernel,
}

impl DenseVectorized {
    /// Repack `dense` into a fresh buffer aligned to `align`
    pub fn from_dense(dense: &DenseMask, align: usize) -> Result<Self> {
        let mut bytes = NativeBuffer::allocate(dense.len(), align)?;
        for (byte, &flag) in bytes.as_bytes_mut().iter_mut().zip(dense.as_slice()) {
            *byte = flag as u8;
        }
        Ok(Self {
            bytes,
            kernel: LaneKernel::native(),
        })
    }

    /// Use `width` lanes per batch for iteration and batch apply loops
    pub fn with_batch_width(mut self, width: BatchWidth) -> Result<Self> {
        self.kernel = LaneKernel::for_batch_width(width)?;
        Ok(self)
    }

    /// Number of positions
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.byte_len()
    }

    /// Check if the mask covers no positions
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Whether `position` is selected, `None` outside `[0, len)`
    #[inline]
    pub fn get(&self, position: usize) -> Option<bool> {
        self.bytes.as_bytes().get(position).map(|&byte| byte == SELECTED)
    }

    /// One byte per position, each 0 or 1
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.bytes.as_bytes()
    }

    /// The backing buffer
    #[inline]
    pub fn buffer(&self) -> &NativeBuffer {
        &self.bytes
    }

    /// Kernel used for batch evaluation
    #[inline]
    pub fn kernel(&self) -> &LaneKernel {
        &self.kernel
    }

    /// Lanes per batch
    #[inline]
    pub fn batch_width(&self) -> usize {
        self.kernel.width()
    }

    /// Number of selected positions
    pub fn count_selected(&self) -> usize {
        self.as_bytes().iter().filter(|&&byte| byte == SELECTED).count()
    }

    /// Visit every selected position in ascending order
    #[inline]
    pub fn for_each<F: FnMut(usize)>(&self, visitor: F) {
        self.for_each_with_kernel(&self.kernel, visitor)
    }

    /// Visit selected positions using `width` lanes per batch
    pub fn for_each_with_width<F: FnMut(usize)>(&self, width: BatchWidth, visitor: F) -> Result<()> {
        let kernel = LaneKernel::for_batch_width(width)?;
        self.for_each_with_kernel(&kernel, visitor);
        Ok(())
    }

    fn for_each_with_kernel<F: FnMut(usize)>(&self, kernel: &LaneKernel, mut visitor: F) {
        let bytes = self.as_bytes();
        let width = kernel.width();

        let mut batches = bytes.chunks_exact(width);
        for (index, batch) in (&mut batches).enumerate() {
            kernel.visit_batch(batch, index * width, &mut visitor);
        }

        let tail = batches.remainder();
        let tail_start = bytes.len() - tail.len();
        for (offset, &byte) in tail.iter().enumerate() {
            if byte == SELECTED {
                visitor(tail_start + offset);
            }
        }
    }

    /// Expand back into a dense mask
    pub fn to_dense(&self) -> DenseMask {
        DenseMask::new(self.as_bytes().iter().map(|&byte| byte == SELECTED).collect())
    }
}

impl SelectedPositions for DenseVectorized {
    #[inline]
    fn len(&self) -> usize {
        DenseVectorized::len(self)
    }

    #[inline]
    fn for_each_selected<F: FnMut(usize)>(&self, visitor: F) {
        self.for_each(visitor)
    }

    fn count_selected(&self) -> usize {
        DenseVectorized::count_selected(self)
    }
}
