//! Measurement fixture: one mask in every representation plus operands
//!
//! [`MaskWorkload::generate`] draws a dense mask with the configured
//! selectivity, derives the vectorized and sparse forms from it and fills
//! byte, int and long operand sets. Each position gets one random 64-bit
//! value per operand, truncated to the element width, so the three widths
//! see the same draws.

use crate::apply::{self, WrappingAdd};
use crate::config::{Config, WorkloadConfig};
use crate::error::Result;
use crate::mask::{DenseMask, DenseVectorized, MaskRef, SparseMask};
use crate::memory::NativeBuffer;
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::marker::PhantomData;

/// Left, right and result buffers of `T` elements
///
/// The result buffer starts out random as well, so a loop that skips a
/// position leaves visible garbage behind rather than a convenient zero.
#[derive(Debug)]
pub struct OperandSet<T: WrappingAdd> {
    left: NativeBuffer,
    right: NativeBuffer,
    result: NativeBuffer,
    _element: PhantomData<T>,
}

impl<T: WrappingAdd> OperandSet<T> {
    /// Operands from per-position 64-bit draws, truncated to `T`
    pub fn from_draws(left: &[u64], right: &[u64], result: &[u64], align: usize) -> Result<Self> {
        Ok(Self {
            left: Self::fill(left, align)?,
            right: Self::fill(right, align)?,
            result: Self::fill(result, align)?,
            _element: PhantomData,
        })
    }

    /// `len` random elements per buffer
    pub fn random_with_rng<R: Rng + ?Sized>(len: usize, align: usize, rng: &mut R) -> Result<Self> {
        let mut draw = || (0..len).map(|_| rng.gen::<u64>()).collect::<Vec<_>>();
        let (left, right, result) = (draw(), draw(), draw());
        Self::from_draws(&left, &right, &result, align)
    }

    fn fill(draws: &[u64], align: usize) -> Result<NativeBuffer> {
        let mut buffer = NativeBuffer::allocate_elements::<T>(draws.len(), align)?;
        for (slot, &draw) in buffer.as_mut_slice::<T>()?.iter_mut().zip(draws) {
            *slot = T::truncate(draw);
        }
        Ok(buffer)
    }

    /// Number of elements per buffer
    #[inline]
    pub fn len(&self) -> usize {
        self.left.element_count::<T>()
    }

    /// Check if the buffers hold no elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First operand
    #[inline]
    pub fn left(&self) -> &NativeBuffer {
        &self.left
    }

    /// Second operand
    #[inline]
    pub fn right(&self) -> &NativeBuffer {
        &self.right
    }

    /// Output buffer
    #[inline]
    pub fn result(&self) -> &NativeBuffer {
        &self.result
    }

    /// Add at the positions `mask` selects and return the result buffer
    pub fn apply(&mut self, mask: MaskRef<'_>) -> Result<&NativeBuffer> {
        apply::sum_masked::<T>(&self.left, &self.right, &mut self.result, mask)?;
        Ok(&self.result)
    }

    /// Add at every position and return the result buffer
    pub fn apply_all(&mut self) -> Result<&NativeBuffer> {
        apply::sum_all::<T>(&self.left, &self.right, &mut self.result)?;
        Ok(&self.result)
    }
}

/// One configuration's worth of masks and operands
#[derive(Debug)]
pub struct MaskWorkload {
    config: WorkloadConfig,
    dense: DenseMask,
    vectorized: DenseVectorized,
    sparse: SparseMask,
    bytes: OperandSet<u8>,
    ints: OperandSet<u32>,
    longs: OperandSet<u64>,
}

macro_rules! width_invocations {
    ($field:ident, $sparse:ident, $dense:ident, $vectorized:ident, $all:ident) => {
        #[doc = concat!("Sparse loop over the ", stringify!($field), " operands")]
        pub fn $sparse(&mut self) -> Result<&NativeBuffer> {
            self.$field.apply(MaskRef::Sparse(&self.sparse))
        }

        #[doc = concat!("Dense loop over the ", stringify!($field), " operands")]
        pub fn $dense(&mut self) -> Result<&NativeBuffer> {
            self.$field.apply(MaskRef::Dense(&self.dense))
        }

        #[doc = concat!("Batch loop over the ", stringify!($field), " operands")]
        pub fn $vectorized(&mut self) -> Result<&NativeBuffer> {
            self.$field.apply(MaskRef::Vectorized(&self.vectorized))
        }

        #[doc = concat!("Unmasked baseline over the ", stringify!($field), " operands")]
        pub fn $all(&mut self) -> Result<&NativeBuffer> {
            self.$field.apply_all()
        }
    };
}

impl MaskWorkload {
    /// Build the fixture for `config`
    ///
    /// With a seed the whole fixture is reproducible; without one the
    /// generator is seeded from OS entropy.
    pub fn generate(config: &WorkloadConfig) -> Result<Self> {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::generate_with_rng(config, &mut rng)
    }

    /// Build the fixture drawing from `rng`
    pub fn generate_with_rng<R: Rng + ?Sized>(config: &WorkloadConfig, rng: &mut R) -> Result<Self> {
        config.validate()?;
        let n = config.positions;

        let dense = DenseMask::random_with_rng(n, config.selectivity, rng)?;
        let vectorized = dense
            .to_vectorized_aligned(config.alignment)?
            .with_batch_width(config.batch_width)?;
        let sparse = dense.to_sparse()?;

        let mut draw = || (0..n).map(|_| rng.gen::<u64>()).collect::<Vec<_>>();
        let (left, right, result) = (draw(), draw(), draw());
        let bytes = OperandSet::from_draws(&left, &right, &result, config.alignment)?;
        let ints = OperandSet::from_draws(&left, &right, &result, config.alignment)?;
        let longs = OperandSet::from_draws(&left, &right, &result, config.alignment)?;

        debug!(
            "Generated workload: positions={}, selectivity={}, selected={}, batch_width={}, kernel={:?}",
            n,
            config.selectivity,
            sparse.count(),
            vectorized.batch_width(),
            vectorized.kernel().tier()
        );

        Ok(Self {
            config: config.clone(),
            dense,
            vectorized,
            sparse,
            bytes,
            ints,
            longs,
        })
    }

    /// Configuration the fixture was generated from
    pub fn config(&self) -> &WorkloadConfig {
        &self.config
    }

    /// Number of positions
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    /// Check if the fixture covers no positions
    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    /// Dense mask the other representations derive from
    pub fn dense(&self) -> &DenseMask {
        &self.dense
    }

    /// Byte-packed mask
    pub fn vectorized(&self) -> &DenseVectorized {
        &self.vectorized
    }

    /// Compacted mask
    pub fn sparse(&self) -> &SparseMask {
        &self.sparse
    }

    /// 8-bit operands
    pub fn bytes(&self) -> &OperandSet<u8> {
        &self.bytes
    }

    /// 32-bit operands
    pub fn ints(&self) -> &OperandSet<u32> {
        &self.ints
    }

    /// 64-bit operands
    pub fn longs(&self) -> &OperandSet<u64> {
        &self.longs
    }

    width_invocations!(bytes, sum_bytes_sparse, sum_bytes_dense, sum_bytes_vectorized, sum_bytes_all);
    width_invocations!(ints, sum_ints_sparse, sum_ints_dense, sum_ints_vectorized, sum_ints_all);
    width_invocations!(longs, sum_longs_sparse, sum_longs_dense, sum_longs_vectorized, sum_longs_all);
}
