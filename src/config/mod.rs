//! Configuration APIs for selmask
//!
//! A measurement configuration is two knobs (position count and
//! selectivity) plus a few reproducibility and layout settings. Every
//! configuration type implements [`Config`]: validation, presets, loading
//! from environment variables and JSON files.
//!
//! ```rust
//! use selmask::config::{Config, WorkloadConfig};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = WorkloadConfig::builder()
//!     .positions(4096)
//!     .selectivity(0.1)
//!     .seed(7)
//!     .build()?;
//! assert!(config.validate().is_ok());
//!
//! // SELMASK_POSITIONS, SELMASK_SELECTIVITY, ...
//! let from_env = WorkloadConfig::from_env()?;
//! # let _ = from_env;
//! # Ok(())
//! # }
//! ```

use crate::error::Result;
use std::env;
use std::fmt;
use std::path::Path;

pub mod workload;

#[cfg(test)]
mod tests;

pub use workload::{WorkloadConfig, WorkloadConfigBuilder};

/// Default environment variable prefix
pub const ENV_PREFIX: &str = "SELMASK_";

/// Common configuration trait providing validation, environment initialization,
/// and preset management functionality.
pub trait Config: Clone + fmt::Debug {
    /// Validate the configuration for correctness and consistency.
    fn validate(&self) -> Result<()>;

    /// Initialize configuration from environment variables with the
    /// `SELMASK_` prefix.
    fn from_env() -> Result<Self>
    where
        Self: Default,
    {
        Self::from_env_with_prefix(ENV_PREFIX)
    }

    /// Initialize configuration from environment variables with a custom prefix.
    ///
    /// Unset or unparsable variables keep their default value.
    fn from_env_with_prefix(prefix: &str) -> Result<Self>
    where
        Self: Default;

    /// Preset favouring raw throughput.
    fn performance_preset() -> Self;

    /// Preset favouring a small memory footprint.
    fn memory_preset() -> Self;

    /// Preset favouring short, predictable runs.
    fn realtime_preset() -> Self;

    /// Balanced preset, the default configuration.
    fn balanced_preset() -> Self
    where
        Self: Default,
    {
        Self::default()
    }

    /// Save configuration to a JSON file.
    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()>;

    /// Load and validate configuration from a JSON file.
    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self>;
}

/// Parse an environment variable, falling back to `default` when it is
/// unset or does not parse.
pub fn parse_env_var<T>(var_name: &str, default: T) -> T
where
    T: std::str::FromStr + Clone,
{
    env::var(var_name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

/// Parse an environment variable into an optional setting, keeping
/// `default` when it is unset or does not parse.
pub fn parse_env_opt<T>(var_name: &str, default: Option<T>) -> Option<T>
where
    T: std::str::FromStr,
{
    match env::var(var_name) {
        Ok(s) => s.trim().parse().ok().or(default),
        Err(_) => default,
    }
}

/// A single rejected configuration field
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Field name
    pub field: &'static str,
    /// Rejected value, rendered
    pub value: String,
    /// What is wrong with it
    pub reason: &'static str,
    /// Accepted values or range
    pub suggestion: Option<&'static str>,
}

impl ValidationError {
    /// Reject `value` for `field`
    pub fn new(field: &'static str, value: impl fmt::Display, reason: &'static str) -> Self {
        Self {
            field,
            value: value.to_string(),
            reason,
            suggestion: None,
        }
    }

    /// Attach the accepted values or range
    pub fn with_suggestion(mut self, suggestion: &'static str) -> Self {
        self.suggestion = Some(suggestion);
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "field '{}': value '{}' is invalid ({})",
            self.field, self.value, self.reason
        )?;
        if let Some(suggestion) = self.suggestion {
            write!(f, ", expected {}", suggestion)?;
        }
        Ok(())
    }
}

/// Fold collected field errors into one configuration error
pub(crate) fn into_result(errors: Vec<ValidationError>) -> Result<()> {
    if errors.is_empty() {
        return Ok(());
    }
    Err(crate::error::MaskError::configuration(format!(
        "Configuration validation failed: {}",
        errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    )))
}
