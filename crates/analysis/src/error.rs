//! Error types for the dsge-analysis crate.

use dsge_kalman::FilterError;
use dsge_linalg::LinalgError;

/// Error type for analysis routines.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    /// Returned when an input has the wrong shape for the model.
    #[error("{what}: expected {expected}, got {got}")]
    DimensionMismatch {
        /// What was being checked.
        what: &'static str,
        /// Expected size.
        expected: usize,
        /// Actual size.
        got: usize,
    },

    /// Returned when a shock index is out of range.
    #[error("shock index {index} out of range (model has {shocks} shocks)")]
    UnknownShock {
        /// Requested index.
        index: usize,
        /// Number of shocks.
        shocks: usize,
    },

    /// Returned when a horizon of zero is requested where at least one
    /// period is needed.
    #[error("horizon must be at least 1")]
    EmptyHorizon,

    /// Returned when the measurement-error covariance cannot be factorised
    /// for sampling.
    #[error("measurement-error covariance is not positive semi-definite")]
    InvalidMeasurementCovariance,

    /// Filtering or smoothing failed (conditional forecasts).
    #[error(transparent)]
    Filter(#[from] FilterError),

    /// Linear algebra failure (unconditional moments).
    #[error(transparent)]
    Linalg(#[from] LinalgError),
}
