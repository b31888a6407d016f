//! Error types for the dsge-kalman crate.

use dsge_linalg::LinalgError;

/// Error type for filtering and smoothing.
///
/// [`FilterError::FilterDegenerate`], [`FilterError::BudgetExhausted`] and
/// [`FilterError::NotStationary`] depend on the parameter draw and are
/// recoverable; the remaining variants indicate caller bugs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FilterError {
    /// Returned when the observation matrix has no rows.
    #[error("observation matrix is empty")]
    EmptyData,

    /// Returned when data or initial state dimensions disagree with the model.
    #[error("{what}: expected {expected}, got {got}")]
    DimensionMismatch {
        /// What was being checked.
        what: &'static str,
        /// Expected size.
        expected: usize,
        /// Actual size.
        got: usize,
    },

    /// Returned when the innovation covariance is not positive definite or
    /// the update produces non-finite values.
    #[error("innovation covariance is not positive definite at step {t}")]
    FilterDegenerate {
        /// Zero-based time index of the failing step.
        t: usize,
    },

    /// Returned when the evaluation deadline passes mid-run.
    #[error("filter budget exhausted at step {t}")]
    BudgetExhausted {
        /// Step at which the run stopped.
        t: usize,
    },

    /// Returned when a stationary initial state is requested for a
    /// transition matrix without a stationary distribution.
    #[error("no stationary initial distribution (spectral radius {radius})")]
    NotStationary {
        /// Spectral radius of the transition matrix.
        radius: f64,
    },

    /// Returned when a user-supplied initial state is unusable.
    #[error("invalid initial state: {reason}")]
    InvalidInitialState {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when the smoother is asked to run on a model with `D ≠ 0`.
    #[error("smoother requires a state-space model without direct shock loading (D = 0)")]
    SmootherRequiresZeroD,

    /// Returned when the filter configuration is invalid.
    #[error("invalid filter configuration: {reason}")]
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },

    /// Linear algebra failure outside the per-step update.
    #[error(transparent)]
    Linalg(#[from] LinalgError),
}

impl FilterError {
    /// Returns `true` if the error depends on the parameter draw rather
    /// than on how the filter was called.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            FilterError::FilterDegenerate { .. }
                | FilterError::BudgetExhausted { .. }
                | FilterError::NotStationary { .. }
                | FilterError::Linalg(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_display() {
        let err = FilterError::FilterDegenerate { t: 7 };
        assert_eq!(err.to_string(), "innovation covariance is not positive definite at step 7");
        assert!(err.is_recoverable());
    }

    #[test]
    fn dimension_display() {
        let err = FilterError::DimensionMismatch {
            what: "observation columns",
            expected: 3,
            got: 2,
        };
        assert_eq!(err.to_string(), "observation columns: expected 3, got 2");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn empty_display() {
        assert_eq!(FilterError::EmptyData.to_string(), "observation matrix is empty");
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FilterError>();
    }
}
