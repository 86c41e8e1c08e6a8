//! Byte-lane predicate kernels
//!
//! A [`LaneKernel`] evaluates "byte equals 1" across one batch of mask bytes
//! and reports the result as a lane bitmask (bit `j` set iff lane `j` holds 1).
//! Batches whose width matches a supported [`SimdTier`] use that tier's
//! instructions; every other width uses a portable lane loop, so results are
//! identical for any width.

use super::tier::{BatchWidth, SimdTier, MAX_MASKED_LANES};
use crate::error::{MaskError, Result};

#[cfg(all(target_arch = "x86_64", feature = "simd"))]
use std::arch::x86_64::*;

#[cfg(all(target_arch = "aarch64", feature = "simd"))]
use std::arch::aarch64::*;

/// Value a mask byte holds for a selected position
pub const SELECTED: u8 = 1;

const LOW_BITS: u64 = 0x7F7F_7F7F_7F7F_7F7F;
const BROADCAST_SELECTED: u64 = 0x0101_0101_0101_0101;

/// Batch predicate evaluator bound to one batch width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneKernel {
    width: usize,
    tier: Option<SimdTier>,
}

impl LaneKernel {
    /// Kernel for the native tier
    pub fn native() -> Self {
        let tier = SimdTier::native();
        Self {
            width: tier.lanes(),
            tier: Some(tier),
        }
    }

    /// Kernel for an explicit batch width
    pub fn for_width(width: usize) -> Result<Self> {
        if width == 0 {
            return Err(MaskError::configuration("Batch width must be at least 1"));
        }
        let tier = SimdTier::for_width(width);
        if tier.is_none() {
            log::debug!("No native kernel for {} lanes, using portable lane loop", width);
        }
        Ok(Self { width, tier })
    }

    /// Kernel for a configured batch width
    pub fn for_batch_width(width: BatchWidth) -> Result<Self> {
        match width {
            BatchWidth::Native => Ok(Self::native()),
            BatchWidth::Lanes(lanes) => Self::for_width(lanes),
        }
    }

    /// Lanes per batch
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Tier backing this kernel, `None` for the portable loop
    #[inline]
    pub fn tier(&self) -> Option<SimdTier> {
        self.tier
    }

    /// Lane bitmask of `batch[j] == 1`
    ///
    /// `batch` must hold exactly `width()` bytes and `width()` must not
    /// exceed 64.
    #[inline]
    pub fn eq_one_mask(&self, batch: &[u8]) -> u64 {
        debug_assert_eq!(batch.len(), self.width);
        debug_assert!(self.width <= MAX_MASKED_LANES);

        match self.tier {
            #[cfg(all(target_arch = "x86_64", feature = "avx512"))]
            Some(SimdTier::Avx512) => unsafe { eq_one_mask_avx512(batch) },
            #[cfg(all(target_arch = "x86_64", feature = "simd"))]
            Some(SimdTier::Avx2) => unsafe { eq_one_mask_avx2(batch) },
            #[cfg(all(target_arch = "x86_64", feature = "simd"))]
            Some(SimdTier::Sse2) => unsafe { eq_one_mask_sse2(batch) },
            #[cfg(all(target_arch = "aarch64", feature = "simd"))]
            Some(SimdTier::Neon) => unsafe { eq_one_mask_neon(batch) },
            Some(SimdTier::Scalar) => eq_one_mask_word(batch),
            _ => eq_one_mask_portable(batch),
        }
    }

    /// Whether any lane of `batch` holds 1
    #[inline]
    pub fn any_selected(&self, batch: &[u8]) -> bool {
        if self.width <= MAX_MASKED_LANES {
            self.eq_one_mask(batch) != 0
        } else {
            batch.iter().any(|&b| b == SELECTED)
        }
    }

    /// Visit `base + j` for every lane `j` of `batch` holding 1, ascending
    ///
    /// Lanes are only scanned when the batch has at least one candidate.
    #[inline]
    pub fn visit_batch<F>(&self, batch: &[u8], base: usize, visitor: &mut F)
    where
        F: FnMut(usize),
    {
        if self.width <= MAX_MASKED_LANES {
            let mut lanes = self.eq_one_mask(batch);
            while lanes != 0 {
                visitor(base + lanes.trailing_zeros() as usize);
                lanes &= lanes - 1;
            }
        } else if batch.iter().any(|&b| b == SELECTED) {
            for (lane, &byte) in batch.iter().enumerate() {
                if byte == SELECTED {
                    visitor(base + lane);
                }
            }
        }
    }
}

impl Default for LaneKernel {
    fn default() -> Self {
        Self::native()
    }
}

/// Portable lane loop, any width up to 64
#[inline]
fn eq_one_mask_portable(batch: &[u8]) -> u64 {
    batch
        .iter()
        .take(MAX_MASKED_LANES)
        .enumerate()
        .fold(0u64, |mask, (lane, &byte)| mask | (((byte == SELECTED) as u64) << lane))
}

/// Eight lanes in one 64-bit word
#[inline]
fn eq_one_mask_word(batch: &[u8]) -> u64 {
    debug_assert_eq!(batch.len(), 8);
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&batch[..8]);
    // Little-endian keeps lane 0 in the low byte on every target
    let word = u64::from_le_bytes(raw) ^ BROADCAST_SELECTED;

    // High bit of each byte set iff that byte of `word` is zero, no cross-byte carries
    let mut zero_bytes = !(((word & LOW_BITS) + LOW_BITS) | word | LOW_BITS);

    let mut mask = 0u64;
    while zero_bytes != 0 {
        mask |= 1u64 << (zero_bytes.trailing_zeros() / 8);
        zero_bytes &= zero_bytes - 1;
    }
    mask
}

#[cfg(all(target_arch = "x86_64", feature = "simd"))]
#[target_feature(enable = "sse2")]
unsafe fn eq_one_mask_sse2(batch: &[u8]) -> u64 {
    debug_assert_eq!(batch.len(), 16);
    unsafe {
        let ones = _mm_set1_epi8(SELECTED as i8);
        let bytes = _mm_loadu_si128(batch.as_ptr() as *const __m128i);
        _mm_movemask_epi8(_mm_cmpeq_epi8(bytes, ones)) as u32 as u64
    }
}

#[cfg(all(target_arch = "x86_64", feature = "simd"))]
#[target_feature(enable = "avx2")]
unsafe fn eq_one_mask_avx2(batch: &[u8]) -> u64 {
    debug_assert_eq!(batch.len(), 32);
    unsafe {
        let ones = _mm256_set1_epi8(SELECTED as i8);
        let bytes = _mm256_loadu_si256(batch.as_ptr() as *const __m256i);
        _mm256_movemask_epi8(_mm256_cmpeq_epi8(bytes, ones)) as u32 as u64
    }
}

#[cfg(all(target_arch = "x86_64", feature = "avx512"))]
#[target_feature(enable = "avx512bw")]
unsafe fn eq_one_mask_avx512(batch: &[u8]) -> u64 {
    debug_assert_eq!(batch.len(), 64);
    unsafe {
        let ones = _mm512_set1_epi8(SELECTED as i8);
        let bytes = _mm512_loadu_si512(batch.as_ptr() as *const _);
        _mm512_cmpeq_epi8_mask(bytes, ones)
    }
}

#[cfg(all(target_arch = "aarch64", feature = "simd"))]
#[target_feature(enable = "neon")]
unsafe fn eq_one_mask_neon(batch: &[u8]) -> u64 {
    debug_assert_eq!(batch.len(), 16);
    let mut nibbles = unsafe {
        let bytes = vld1q_u8(batch.as_ptr());
        let eq = vceqq_u8(bytes, vdupq_n_u8(SELECTED));
        // Narrow each 0x00/0xFF lane to a 4-bit nibble
        let narrowed = vshrn_n_u16::<4>(vreinterpretq_u16_u8(eq));
        vget_lane_u64::<0>(vreinterpret_u64_u8(narrowed))
    };

    let mut mask = 0u64;
    while nibbles != 0 {
        let lane = nibbles.trailing_zeros() / 4;
        mask |= 1u64 << lane;
        nibbles &= !(0xFu64 << (lane * 4));
    }
    mask
}
