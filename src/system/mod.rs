//! # System Integration Utilities
//!
//! Runtime CPU feature detection used to pick the native batch width.

pub mod cpu_features;

pub use cpu_features::{get_cpu_features, CpuFeatures};
