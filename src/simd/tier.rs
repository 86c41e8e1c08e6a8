//! SIMD tiers and batch widths
//!
//! A tier names one lane-predicate kernel and its lane count. The native
//! tier is the widest one the running CPU supports; the batch width used by
//! the vectorized mask can follow it or be pinned to any positive lane count.

use crate::error::{MaskError, Result};
use crate::system::cpu_features::CpuFeatures;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Largest batch a lane bitmask (`u64`) can describe
pub const MAX_MASKED_LANES: usize = 64;

/// SIMD implementation tiers based on available CPU features
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SimdTier {
    /// AVX-512BW implementation (64 byte lanes)
    Avx512,
    /// AVX2 implementation (32 byte lanes)
    Avx2,
    /// SSE2 implementation (16 byte lanes)
    Sse2,
    /// ARM NEON implementation (16 byte lanes)
    Neon,
    /// Word-at-a-time fallback on a 64-bit register (8 byte lanes)
    Scalar,
}

static NATIVE_TIER: OnceLock<SimdTier> = OnceLock::new();

impl SimdTier {
    /// Every tier, widest first
    pub const ALL: [SimdTier; 5] = [
        SimdTier::Avx512,
        SimdTier::Avx2,
        SimdTier::Sse2,
        SimdTier::Neon,
        SimdTier::Scalar,
    ];

    /// Number of byte lanes processed per batch
    #[inline]
    pub const fn lanes(self) -> usize {
        match self {
            SimdTier::Avx512 => 64,
            SimdTier::Avx2 => 32,
            SimdTier::Sse2 | SimdTier::Neon => 16,
            SimdTier::Scalar => 8,
        }
    }

    /// Short lowercase name used in logs and benchmark ids
    pub const fn name(self) -> &'static str {
        match self {
            SimdTier::Avx512 => "avx512",
            SimdTier::Avx2 => "avx2",
            SimdTier::Sse2 => "sse2",
            SimdTier::Neon => "neon",
            SimdTier::Scalar => "scalar",
        }
    }

    /// The widest tier supported by this CPU and build (cached)
    pub fn native() -> SimdTier {
        *NATIVE_TIER.get_or_init(|| {
            let tier = Self::select_optimal_tier(CpuFeatures::get());
            log::debug!("Native lane tier: {} ({} lanes)", tier.name(), tier.lanes());
            tier
        })
    }

    /// Select the optimal tier for a feature set
    pub fn select_optimal_tier(features: &CpuFeatures) -> SimdTier {
        Self::ALL
            .into_iter()
            .find(|tier| tier.is_supported_by(features))
            .unwrap_or(SimdTier::Scalar)
    }

    /// Whether this tier can run on the current CPU with the current build
    #[inline]
    pub fn is_supported(self) -> bool {
        self.is_supported_by(CpuFeatures::get())
    }

    fn is_supported_by(self, features: &CpuFeatures) -> bool {
        match self {
            SimdTier::Avx512 => {
                cfg!(all(target_arch = "x86_64", feature = "avx512")) && features.has_avx512bw
            }
            SimdTier::Avx2 => {
                cfg!(all(target_arch = "x86_64", feature = "simd")) && features.has_avx2
            }
            SimdTier::Sse2 => {
                cfg!(all(target_arch = "x86_64", feature = "simd")) && features.has_sse2
            }
            SimdTier::Neon => {
                cfg!(all(target_arch = "aarch64", feature = "simd")) && features.has_neon
            }
            SimdTier::Scalar => true,
        }
    }

    /// Find a supported tier whose lane count is exactly `width`
    pub fn for_width(width: usize) -> Option<SimdTier> {
        Self::ALL
            .into_iter()
            .find(|tier| tier.lanes() == width && tier.is_supported())
    }
}

impl fmt::Display for SimdTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Number of positions evaluated together by the vectorized mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BatchWidth {
    /// The lane count of [`SimdTier::native`]
    #[default]
    Native,
    /// An explicit lane count, at least 1
    Lanes(usize),
}

impl BatchWidth {
    /// Resolve to a concrete lane count
    #[inline]
    pub fn resolve(self) -> usize {
        match self {
            BatchWidth::Native => SimdTier::native().lanes(),
            BatchWidth::Lanes(lanes) => lanes,
        }
    }

    /// Reject a zero lane count
    pub fn validate(self) -> Result<()> {
        match self {
            BatchWidth::Lanes(0) => Err(MaskError::configuration("Batch width must be at least 1")),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for BatchWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchWidth::Native => f.write_str("native"),
            BatchWidth::Lanes(lanes) => write!(f, "{}", lanes),
        }
    }
}

impl FromStr for BatchWidth {
    type Err = MaskError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("native") {
            return Ok(BatchWidth::Native);
        }
        let lanes: usize = trimmed
            .parse()
            .map_err(|_| MaskError::configuration(format!("Invalid batch width: {:?}", s)))?;
        let width = BatchWidth::Lanes(lanes);
        width.validate()?;
        Ok(width)
    }
}
