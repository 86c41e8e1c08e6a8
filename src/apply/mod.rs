//! Masked element-wise addition over native buffers
//!
//! Every loop computes `result[p] = left[p] + right[p]` (wrapping at the
//! element width) for selected positions `p`. How positions are found
//! depends on the mask representation:
//!
//! - [`sum_sparse`]: walks the stored positions, `count` reads and writes
//! - [`sum_dense`]: scans all `N` flags and tests each one
//! - [`sum_vectorized`]: sums and writes a whole batch when any lane of the
//!   batch is selected, skips all-zero batches, masks the tail per position
//! - [`sum_all`]: unmasked baseline that writes every position
//!
//! Sparse and dense loops never touch unselected outputs. The batch loop may
//! also overwrite unselected outputs inside a selected batch. Operand lengths
//! are checked once at entry; on mismatch nothing is written.
//!
//! Per-width entry points live in [`bytes`], [`ints`] and [`longs`].

use crate::error::{check_same_len, Result};
use crate::mask::{DenseMask, DenseVectorized, MaskRef, SparseMask};
use crate::memory::{NativeBuffer, NativeElement};

/// Byte width of a numeric element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementWidth {
    /// 8-bit elements
    Byte = 1,
    /// 32-bit elements
    Int = 4,
    /// 64-bit elements
    Long = 8,
}

impl ElementWidth {
    /// Width in bytes
    #[inline]
    pub const fn bytes(self) -> usize {
        self as usize
    }

    /// Short name used in logs and benchmark ids
    pub const fn name(self) -> &'static str {
        match self {
            ElementWidth::Byte => "bytes",
            ElementWidth::Int => "ints",
            ElementWidth::Long => "longs",
        }
    }
}

/// Numeric elements the apply loops can add
pub trait WrappingAdd: NativeElement {
    /// Width tag of this element type
    const WIDTH: ElementWidth;

    /// Sum modulo 2^(8 * WIDTH)
    fn wrapping_sum(self, other: Self) -> Self;

    /// Low `WIDTH` bytes of a 64-bit value
    fn truncate(value: u64) -> Self;
}

macro_rules! impl_wrapping_add {
    ($($t:ty => $width:expr),* $(,)?) => {
        $(
            impl WrappingAdd for $t {
                const WIDTH: ElementWidth = $width;

                #[inline(always)]
                fn wrapping_sum(self, other: Self) -> Self {
                    self.wrapping_add(other)
                }

                #[inline(always)]
                fn truncate(value: u64) -> Self {
                    value as $t
                }
            }
        )*
    };
}

impl_wrapping_add!(u8 => ElementWidth::Byte, u32 => ElementWidth::Int, u64 => ElementWidth::Long);

/// Typed views of the three operands, all checked to hold `len` elements
fn operands<'a, T: WrappingAdd>(
    left: &'a NativeBuffer,
    right: &'a NativeBuffer,
    result: &'a mut NativeBuffer,
    len: usize,
) -> Result<(&'a [T], &'a [T], &'a mut [T])> {
    let left = left.as_slice::<T>()?;
    let right = right.as_slice::<T>()?;
    let result = result.as_mut_slice::<T>()?;
    check_same_len(len, left.len())?;
    check_same_len(len, right.len())?;
    check_same_len(len, result.len())?;
    Ok((left, right, result))
}

/// Add at the positions stored in a sparse mask
pub fn sum_sparse<T: WrappingAdd>(
    left: &NativeBuffer,
    right: &NativeBuffer,
    result: &mut NativeBuffer,
    mask: &SparseMask,
) -> Result<()> {
    let (left, right, result) = operands::<T>(left, right, result, mask.len())?;

    for &position in mask.positions() {
        let p = position as usize;
        debug_assert!(p < result.len());
        // Stored positions are < mask.len(), and every operand holds mask.len() elements
        unsafe {
            *result.get_unchecked_mut(p) = left.get_unchecked(p).wrapping_sum(*right.get_unchecked(p));
        }
    }
    Ok(())
}

/// Add where the dense flag is set, testing every position
pub fn sum_dense<T: WrappingAdd>(
    left: &NativeBuffer,
    right: &NativeBuffer,
    result: &mut NativeBuffer,
    mask: &DenseMask,
) -> Result<()> {
    let (left, right, result) = operands::<T>(left, right, result, mask.len())?;

    for (((out, &a), &b), &selected) in result.iter_mut().zip(left).zip(right).zip(mask.as_slice()) {
        if selected {
            *out = a.wrapping_sum(b);
        }
    }
    Ok(())
}

/// Add whole batches that contain a selected position
///
/// Uses the mask's own batch width.
pub fn sum_vectorized<T: WrappingAdd>(
    left: &NativeBuffer,
    right: &NativeBuffer,
    result: &mut NativeBuffer,
    mask: &DenseVectorized,
) -> Result<()> {
    let (left, right, result) = operands::<T>(left, right, result, mask.len())?;
    let kernel = mask.kernel();
    let width = kernel.width();
    let bytes = mask.as_bytes();

    let mut batches = bytes.chunks_exact(width);
    for (index, batch) in (&mut batches).enumerate() {
        if kernel.any_selected(batch) {
            let start = index * width;
            let end = start + width;
            for ((out, &a), &b) in result[start..end]
                .iter_mut()
                .zip(&left[start..end])
                .zip(&right[start..end])
            {
                *out = a.wrapping_sum(b);
            }
        }
    }

    let tail_start = bytes.len() - batches.remainder().len();
    for (offset, &byte) in batches.remainder().iter().enumerate() {
        if byte == crate::simd::SELECTED {
            let p = tail_start + offset;
            result[p] = left[p].wrapping_sum(right[p]);
        }
    }
    Ok(())
}

/// Add at every position, no mask
pub fn sum_all<T: WrappingAdd>(
    left: &NativeBuffer,
    right: &NativeBuffer,
    result: &mut NativeBuffer,
) -> Result<()> {
    let len = left.element_count::<T>();
    let (left, right, result) = operands::<T>(left, right, result, len)?;

    for ((out, &a), &b) in result.iter_mut().zip(left).zip(right) {
        *out = a.wrapping_sum(b);
    }
    Ok(())
}

/// Add at the positions selected by any representation
pub fn sum_masked<T: WrappingAdd>(
    left: &NativeBuffer,
    right: &NativeBuffer,
    result: &mut NativeBuffer,
    mask: MaskRef<'_>,
) -> Result<()> {
    match mask {
        MaskRef::Dense(mask) => sum_dense::<T>(left, right, result, mask),
        MaskRef::Vectorized(mask) => sum_vectorized::<T>(left, right, result, mask),
        MaskRef::Sparse(mask) => sum_sparse::<T>(left, right, result, mask),
    }
}

macro_rules! width_family {
    ($module:ident, $t:ty, $doc:literal) => {
        #[doc = $doc]
        pub mod $module {
            use super::*;

            /// Sparse mask loop
            #[inline]
            pub fn sparse(
                left: &NativeBuffer,
                right: &NativeBuffer,
                result: &mut NativeBuffer,
                mask: &SparseMask,
            ) -> Result<()> {
                sum_sparse::<$t>(left, right, result, mask)
            }

            /// Dense flag-per-position loop
            #[inline]
            pub fn dense(
                left: &NativeBuffer,
                right: &NativeBuffer,
                result: &mut NativeBuffer,
                mask: &DenseMask,
            ) -> Result<()> {
                sum_dense::<$t>(left, right, result, mask)
            }

            /// Batch loop over a vectorized mask
            #[inline]
            pub fn vectorized(
                left: &NativeBuffer,
                right: &NativeBuffer,
                result: &mut NativeBuffer,
                mask: &DenseVectorized,
            ) -> Result<()> {
                sum_vectorized::<$t>(left, right, result, mask)
            }

            /// Unmasked baseline
            #[inline]
            pub fn all(left: &NativeBuffer, right: &NativeBuffer, result: &mut NativeBuffer) -> Result<()> {
                sum_all::<$t>(left, right, result)
            }
        }
    };
}

width_family!(bytes, u8, "Masked addition of 8-bit elements");
width_family!(ints, u32, "Masked addition of 32-bit elements");
width_family!(longs, u64, "Masked addition of 64-bit elements");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MaskError;
    use crate::simd::BatchWidth;

    fn buffer<T: NativeElement>(values: &[T]) -> NativeBuffer {
        NativeBuffer::from_elements(values, 8).unwrap()
    }

    fn sentinel_result<T: NativeElement>(len: usize, value: T) -> NativeBuffer {
        buffer(&vec![value; len])
    }

    fn scenario_mask() -> DenseMask {
        DenseMask::new(vec![true, false, false, true, false, false, false, true])
    }

    #[test]
    fn test_element_widths() {
        assert_eq!(<u8 as WrappingAdd>::WIDTH.bytes(), 1);
        assert_eq!(<u32 as WrappingAdd>::WIDTH.bytes(), 4);
        assert_eq!(<u64 as WrappingAdd>::WIDTH.bytes(), 8);
        assert_eq!(ElementWidth::Long.name(), "longs");
    }

    #[test]
    fn test_sparse_ints_scenario() {
        let dense = scenario_mask();
        let sparse = dense.to_sparse().unwrap();
        let left = buffer::<u32>(&[1, 2, 3, 4, 5, 6, 7, 8]);
        let right = buffer::<u32>(&[10; 8]);
        let mut result = sentinel_result::<u32>(8, 999);

        ints::sparse(&left, &right, &mut result, &sparse).unwrap();
        assert_eq!(
            result.as_slice::<u32>().unwrap(),
            &[11, 999, 999, 14, 999, 999, 999, 18]
        );
    }

    #[test]
    fn test_dense_leaves_unselected_untouched() {
        let dense = scenario_mask();
        let left = buffer::<u64>(&[1, 2, 3, 4, 5, 6, 7, 8]);
        let right = buffer::<u64>(&[10; 8]);
        let mut result = sentinel_result::<u64>(8, 7);

        longs::dense(&left, &right, &mut result, &dense).unwrap();
        assert_eq!(result.as_slice::<u64>().unwrap(), &[11, 7, 7, 14, 7, 7, 7, 18]);
    }

    #[test]
    fn test_byte_wraparound() {
        let dense = DenseMask::new(vec![true, false]);
        let sparse = dense.to_sparse().unwrap();
        let left = buffer::<u8>(&[200, 200]);
        let right = buffer::<u8>(&[100, 100]);
        let mut result = sentinel_result::<u8>(2, 5);

        bytes::sparse(&left, &right, &mut result, &sparse).unwrap();
        assert_eq!(result.as_slice::<u8>().unwrap(), &[44, 5]);
    }

    #[test]
    fn test_long_wraparound() {
        let dense = DenseMask::new(vec![true]);
        let left = buffer::<u64>(&[u64::MAX]);
        let right = buffer::<u64>(&[2]);
        let mut result = sentinel_result::<u64>(1, 0);
        longs::dense(&left, &right, &mut result, &dense).unwrap();
        assert_eq!(result.get_at_index::<u64>(0).unwrap(), 1);
    }

    #[test]
    fn test_vectorized_matches_on_selected_positions() {
        let flags: Vec<bool> = (0..37).map(|i| i % 5 == 2).collect();
        let dense = DenseMask::new(flags.clone());
        let left_values: Vec<u32> = (0..37).map(|i| i * 3).collect();
        let right_values: Vec<u32> = (0..37).map(|i| u32::MAX - i).collect();
        let left = buffer(&left_values);
        let right = buffer(&right_values);

        for width in [1usize, 3, 8, 16, 64] {
            let vectorized = dense
                .to_vectorized()
                .unwrap()
                .with_batch_width(BatchWidth::Lanes(width))
                .unwrap();
            let mut result = sentinel_result::<u32>(37, 0);
            ints::vectorized(&left, &right, &mut result, &vectorized).unwrap();
            let out = result.as_slice::<u32>().unwrap();
            for (p, &selected) in flags.iter().enumerate() {
                if selected {
                    assert_eq!(out[p], left_values[p].wrapping_add(right_values[p]), "width {}", width);
                }
            }
        }
    }

    #[test]
    fn test_vectorized_skips_unselected_batches() {
        // Selected only in the second batch of 8
        let dense = DenseMask::from_positions(24, &[9]).unwrap();
        let vectorized = dense
            .to_vectorized()
            .unwrap()
            .with_batch_width(BatchWidth::Lanes(8))
            .unwrap();
        let left = buffer::<u8>(&[1; 24]);
        let right = buffer::<u8>(&[1; 24]);
        let mut result = sentinel_result::<u8>(24, 0);

        bytes::vectorized(&left, &right, &mut result, &vectorized).unwrap();
        let out = result.as_slice::<u8>().unwrap();
        assert!(out[..8].iter().all(|&v| v == 0));
        assert!(out[8..16].iter().all(|&v| v == 2));
        assert!(out[16..].iter().all(|&v| v == 0));
    }

    #[test]
    fn test_sum_all() {
        let left = buffer::<u8>(&[1, 2, 255]);
        let right = buffer::<u8>(&[1, 1, 1]);
        let mut result = sentinel_result::<u8>(3, 9);
        bytes::all(&left, &right, &mut result).unwrap();
        assert_eq!(result.as_slice::<u8>().unwrap(), &[2, 3, 0]);
    }

    #[test]
    fn test_sum_masked_dispatch() {
        let dense = scenario_mask();
        let vectorized = dense.to_vectorized().unwrap();
        let sparse = dense.to_sparse().unwrap();
        let left = buffer::<u32>(&[1, 2, 3, 4, 5, 6, 7, 8]);
        let right = buffer::<u32>(&[10; 8]);

        for mask in [MaskRef::from(&dense), MaskRef::from(&vectorized), MaskRef::from(&sparse)] {
            let mut result = sentinel_result::<u32>(8, 0);
            sum_masked::<u32>(&left, &right, &mut result, mask).unwrap();
            let out = result.as_slice::<u32>().unwrap();
            assert_eq!((out[0], out[3], out[7]), (11, 14, 18));
        }
    }

    #[test]
    fn test_length_mismatch_writes_nothing() {
        let sparse = scenario_mask().to_sparse().unwrap();
        let left = buffer::<u32>(&[1; 8]);
        let short = buffer::<u32>(&[1; 7]);
        let mut result = sentinel_result::<u32>(8, 3);

        let err = ints::sparse(&left, &short, &mut result, &sparse).unwrap_err();
        assert!(matches!(err, MaskError::LengthMismatch { expected: 8, actual: 7 }));
        assert!(result.as_slice::<u32>().unwrap().iter().all(|&v| v == 3));

        let mut short_result = sentinel_result::<u32>(7, 3);
        assert!(ints::sparse(&left, &left, &mut short_result, &sparse).is_err());
    }

    #[test]
    fn test_nothing_selected_writes_nothing() {
        let dense = DenseMask::new(vec![false; 40]);
        let vectorized = dense.to_vectorized().unwrap();
        let sparse = dense.to_sparse().unwrap();
        let left = buffer::<u64>(&[5; 40]);
        let right = buffer::<u64>(&[6; 40]);
        let mut result = sentinel_result::<u64>(40, 42);

        longs::sparse(&left, &right, &mut result, &sparse).unwrap();
        longs::dense(&left, &right, &mut result, &dense).unwrap();
        longs::vectorized(&left, &right, &mut result, &vectorized).unwrap();
        assert!(result.as_slice::<u64>().unwrap().iter().all(|&v| v == 42));
    }
}
