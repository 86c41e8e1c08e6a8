//! # CPU Feature Detection
//!
//! Runtime detection of the vector extensions the lane predicate kernels can
//! use. Detection runs once and is cached for the life of the process.

use std::sync::OnceLock;

/// Runtime CPU feature flags relevant to byte-lane predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CpuFeatures {
    /// SSE2 (16 byte lanes), baseline on x86_64
    pub has_sse2: bool,
    /// AVX2 (32 byte lanes)
    pub has_avx2: bool,
    /// AVX-512BW (64 byte lanes with mask registers)
    pub has_avx512bw: bool,
    /// ARM NEON (16 byte lanes)
    pub has_neon: bool,
}

static CPU_FEATURES: OnceLock<CpuFeatures> = OnceLock::new();

impl CpuFeatures {
    /// Detect available CPU features at runtime
    #[cfg(target_arch = "x86_64")]
    pub fn detect() -> Self {
        Self {
            has_sse2: is_x86_feature_detected!("sse2"),
            has_avx2: is_x86_feature_detected!("avx2"),
            has_avx512bw: is_x86_feature_detected!("avx512bw"),
            has_neon: false,
        }
    }

    /// Detect available CPU features at runtime
    #[cfg(target_arch = "aarch64")]
    pub fn detect() -> Self {
        Self {
            has_sse2: false,
            has_avx2: false,
            has_avx512bw: false,
            has_neon: std::arch::is_aarch64_feature_detected!("neon"),
        }
    }

    /// Detect available CPU features at runtime
    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    pub fn detect() -> Self {
        Self::scalar_only()
    }

    /// Feature set with every extension disabled
    pub const fn scalar_only() -> Self {
        Self {
            has_sse2: false,
            has_avx2: false,
            has_avx512bw: false,
            has_neon: false,
        }
    }

    /// Get the global CPU features instance (cached)
    pub fn get() -> &'static CpuFeatures {
        CPU_FEATURES.get_or_init(|| {
            let features = Self::detect();
            log::debug!("Detected CPU features: {:?}", features);
            features
        })
    }

    /// Whether any vector extension usable for byte lanes is present
    pub fn has_vector_lanes(&self) -> bool {
        self.has_sse2 || self.has_avx2 || self.has_avx512bw || self.has_neon
    }
}

/// Get the global CPU feature set (detected once on first call)
pub fn get_cpu_features() -> &'static CpuFeatures {
    CpuFeatures::get()
}
