//! Workload configuration: mask shape and operand layout

use super::{into_result, parse_env_opt, parse_env_var, Config, ValidationError};
use crate::error::{MaskError, Result};
use crate::memory::{DEFAULT_ALIGNMENT, MAX_ALIGNMENT};
use crate::simd::BatchWidth;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Shape of one masked-apply measurement
///
/// `positions` is the mask length `N` (also the operand length) and
/// `selectivity` the probability that any single position is selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadConfig {
    /// Number of positions `N`
    pub positions: usize,

    /// Probability that a position is selected, in `[0, 1]`
    pub selectivity: f64,

    /// Seed for mask and operand generation; `None` seeds from OS entropy
    pub seed: Option<u64>,

    /// Alignment in bytes of the vectorized mask and operand buffers
    pub alignment: usize,

    /// Lanes per batch for the vectorized representation
    pub batch_width: BatchWidth,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            positions: 1024,
            selectivity: 0.5,
            seed: None,
            alignment: DEFAULT_ALIGNMENT,
            batch_width: BatchWidth::Native,
        }
    }
}

impl Config for WorkloadConfig {
    fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if self.positions > u32::MAX as usize {
            errors.push(
                ValidationError::new("positions", self.positions, "exceeds the sparse position range")
                    .with_suggestion("0..=4294967295"),
            );
        }

        if !self.selectivity.is_finite() || !(0.0..=1.0).contains(&self.selectivity) {
            errors.push(
                ValidationError::new("selectivity", self.selectivity, "must be a probability")
                    .with_suggestion("0.0..=1.0"),
            );
        }

        if !self.alignment.is_power_of_two() || self.alignment > MAX_ALIGNMENT {
            errors.push(
                ValidationError::new("alignment", self.alignment, "must be a power of two")
                    .with_suggestion("1, 2, 4, ..., 4096"),
            );
        }

        if let BatchWidth::Lanes(0) = self.batch_width {
            errors.push(
                ValidationError::new("batch_width", self.batch_width, "a batch needs at least one lane")
                    .with_suggestion("native or an integer >= 1"),
            );
        }

        into_result(errors)
    }

    fn from_env_with_prefix(prefix: &str) -> Result<Self> {
        let mut config = Self::default();

        config.positions = parse_env_var(&format!("{}POSITIONS", prefix), config.positions);
        config.selectivity = parse_env_var(&format!("{}SELECTIVITY", prefix), config.selectivity);
        config.seed = parse_env_opt(&format!("{}SEED", prefix), config.seed);
        config.alignment = parse_env_var(&format!("{}ALIGNMENT", prefix), config.alignment);
        config.batch_width = parse_env_var(&format!("{}BATCH_WIDTH", prefix), config.batch_width);

        config.validate()?;
        Ok(config)
    }

    fn performance_preset() -> Self {
        Self {
            positions: 1 << 16,
            alignment: 64,
            ..Self::default()
        }
    }

    fn memory_preset() -> Self {
        Self {
            positions: 256,
            ..Self::default()
        }
    }

    fn realtime_preset() -> Self {
        Self {
            positions: 1024,
            seed: Some(0),
            batch_width: BatchWidth::Lanes(8),
            ..Self::default()
        }
    }

    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let serialized = serde_json::to_string_pretty(self)
            .map_err(|e| MaskError::configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, serialized)
            .map_err(|e| MaskError::configuration(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| MaskError::configuration(format!("Failed to read config file: {}", e)))?;

        let config: Self = serde_json::from_str(&content)
            .map_err(|e| MaskError::configuration(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;
        Ok(config)
    }
}

impl WorkloadConfig {
    /// Create a new configuration builder
    pub fn builder() -> WorkloadConfigBuilder {
        WorkloadConfigBuilder::new()
    }

    /// Same shape with a different selectivity, used by sweeps
    pub fn with_selectivity(&self, selectivity: f64) -> Result<Self> {
        let config = Self {
            selectivity,
            ..self.clone()
        };
        config.validate()?;
        Ok(config)
    }
}

/// Builder for [`WorkloadConfig`]
#[derive(Debug, Clone, Default)]
pub struct WorkloadConfigBuilder {
    config: WorkloadConfig,
}

impl WorkloadConfigBuilder {
    /// Start from the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of positions
    pub fn positions(mut self, positions: usize) -> Self {
        self.config.positions = positions;
        self
    }

    /// Set the selection probability
    pub fn selectivity(mut self, selectivity: f64) -> Self {
        self.config.selectivity = selectivity;
        self
    }

    /// Fix the generation seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Set the buffer alignment in bytes
    pub fn alignment(mut self, alignment: usize) -> Self {
        self.config.alignment = alignment;
        self
    }

    /// Set the vectorized batch width
    pub fn batch_width(mut self, batch_width: BatchWidth) -> Self {
        self.config.batch_width = batch_width;
        self
    }

    /// Build the configuration, or fail if validation fails
    pub fn build(self) -> Result<WorkloadConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
