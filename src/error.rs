//! Error handling for the selmask library
//!
//! Every check in this crate guards a caller contract (positions inside the
//! mask, equal-length operand buffers, a selectivity that is a probability).
//! Checks run once at operation entry so a violation is reported before any
//! buffer is written.

use thiserror::Error;

/// Main error type for the selmask library
#[derive(Error, Debug)]
pub enum MaskError {
    /// I/O related errors (configuration files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Position or byte offset outside the addressed range
    #[error("Out of bounds: index {index}, size {size}")]
    OutOfBounds {
        /// The invalid index
        index: usize,
        /// The valid size/length
        size: usize,
    },

    /// Operand buffers or masks disagree on their logical length
    #[error("Length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Length implied by the mask or first operand
        expected: usize,
        /// Length that was actually supplied
        actual: usize,
    },

    /// Selectivity that is not a probability
    #[error("Invalid selectivity: {value} is not in [0, 1]")]
    InvalidSelectivity {
        /// The rejected selectivity
        value: f64,
    },

    /// Memory allocation failures
    #[error("Memory allocation failed: requested {size} bytes")]
    OutOfMemory {
        /// Number of bytes requested
        size: usize,
    },

    /// Invalid data layout or representation limits
    #[error("Invalid data: {message}")]
    InvalidData {
        /// Error message describing the issue
        message: String,
    },

    /// Configuration or parameter errors
    #[error("Invalid configuration: {message}")]
    Configuration {
        /// Configuration error message
        message: String,
    },
}

impl MaskError {
    /// Create an out of bounds error
    pub fn out_of_bounds(index: usize, size: usize) -> Self {
        Self::OutOfBounds { index, size }
    }

    /// Create a length mismatch error
    pub fn length_mismatch(expected: usize, actual: usize) -> Self {
        Self::LengthMismatch { expected, actual }
    }

    /// Create an invalid selectivity error
    pub fn invalid_selectivity(value: f64) -> Self {
        Self::InvalidSelectivity { value }
    }

    /// Create an out of memory error
    pub fn out_of_memory(size: usize) -> Self {
        Self::OutOfMemory { size }
    }

    /// Create an invalid data error
    pub fn invalid_data<S: Into<String>>(message: S) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Check if this is a recoverable error
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Io(_) => true,
            Self::OutOfMemory { .. } => true,
            Self::OutOfBounds { .. } => false,
            Self::LengthMismatch { .. } => false,
            Self::InvalidSelectivity { .. } => false,
            Self::InvalidData { .. } => false,
            Self::Configuration { .. } => false,
        }
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::OutOfBounds { .. } => "bounds",
            Self::LengthMismatch { .. } => "length",
            Self::InvalidSelectivity { .. } => "selectivity",
            Self::OutOfMemory { .. } => "memory",
            Self::InvalidData { .. } => "data",
            Self::Configuration { .. } => "config",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, MaskError>;

/// Assert that an index is within bounds
#[inline]
pub fn check_bounds(index: usize, size: usize) -> Result<()> {
    if index >= size {
        Err(MaskError::out_of_bounds(index, size))
    } else {
        Ok(())
    }
}

/// Assert that a range is within bounds
#[inline]
pub fn check_range(start: usize, end: usize, size: usize) -> Result<()> {
    if start > end {
        return Err(MaskError::invalid_data(format!(
            "Invalid range: start {} > end {}",
            start, end
        )));
    }
    if end > size {
        return Err(MaskError::out_of_bounds(end, size));
    }
    Ok(())
}

/// Assert that two logical lengths agree
#[inline]
pub fn check_same_len(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        Err(MaskError::length_mismatch(expected, actual))
    } else {
        Ok(())
    }
}
