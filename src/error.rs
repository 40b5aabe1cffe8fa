//! Error types for the diode network simulator.
//!
//! This module provides a unified error type [`SimError`] for the conditions
//! that halt a run. Recoverable outcomes (Newton non-convergence, a rejected
//! step) are not errors; they are reported through
//! [`NewtonOutcome`](crate::solver::NewtonOutcome) and
//! [`StepEvent`](crate::solver::StepEvent) instead.

use thiserror::Error;

/// Result type alias using [`SimError`].
pub type Result<T> = std::result::Result<T, SimError>;

/// Unified error type for all fatal simulator conditions.
#[derive(Error, Debug)]
pub enum SimError {
    // ============ Defects ============
    /// Linear system matrix and right-hand side disagree in size
    #[error("Invalid size of matrix: {rows}x{rows} system with right-hand side of length {len}")]
    DimensionMismatch { rows: usize, len: usize },

    /// Flat array cannot be turned into a state vector
    #[error("Solution has {actual} entries, state vector requires {expected}")]
    Conversion { expected: usize, actual: usize },

    // ============ Simulation Errors ============
    /// Step size controller ran out of room below the minimum step
    #[error("Step {step:.3e} at t = {time:.6e} is below the minimum step {min_step:.1e}")]
    StepSizeExhausted { time: f64, step: f64, min_step: f64 },

    /// Invalid simulation or circuit parameter
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    // ============ I/O Errors ============
    /// Error writing a result series file
    #[error("Failed to write result file '{path}': {source}")]
    OutputWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl SimError {
    /// Create a conversion error for an array of the wrong length
    pub fn conversion(actual: usize) -> Self {
        Self::Conversion {
            expected: crate::circuit::STATE_DIM,
            actual,
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Whether the error signals a programming defect rather than a numerical failure.
    pub fn is_defect(&self) -> bool {
        matches!(
            self,
            Self::DimensionMismatch { .. } | Self::Conversion { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defect_classification() {
        assert!(SimError::conversion(17).is_defect());
        assert!(SimError::DimensionMismatch { rows: 3, len: 2 }.is_defect());
        assert!(!SimError::StepSizeExhausted {
            time: 1e-4,
            step: 5e-19,
            min_step: 1e-18,
        }
        .is_defect());
    }

    #[test]
    fn test_conversion_message() {
        let msg = SimError::conversion(5).to_string();
        assert!(msg.contains('5'));
        assert!(msg.contains("18"));
    }
}
