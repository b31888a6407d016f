//! Error types for the dsge-linalg crate.

/// Error type for dense linear-algebra failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LinalgError {
    /// Returned when a square matrix is required.
    #[error("matrix is not square: {rows}x{cols}")]
    NotSquare {
        /// Number of rows.
        rows: usize,
        /// Number of columns.
        cols: usize,
    },

    /// Returned when operand shapes do not conform.
    #[error("dimension mismatch: expected {expected} rows, got {got}")]
    DimensionMismatch {
        /// Expected row count.
        expected: usize,
        /// Actual row count.
        got: usize,
    },

    /// Returned when an LU factorization hits a zero pivot or the solution
    /// is not finite.
    #[error("matrix is singular")]
    Singular,

    /// Returned when a Cholesky factorization fails.
    #[error("matrix is not positive definite")]
    NotPositiveDefinite,

    /// Returned when a stationary solution is requested for a transition
    /// matrix with spectral radius at or above one.
    #[error("transition matrix is not stable (spectral radius {radius})")]
    NotStable {
        /// Largest eigenvalue modulus.
        radius: f64,
    },

    /// Returned when an iterative routine hits its iteration cap.
    #[error("{routine} did not converge after {iterations} iterations")]
    NoConvergence {
        /// Name of the routine.
        routine: &'static str,
        /// Iterations performed.
        iterations: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_not_square() {
        let err = LinalgError::NotSquare { rows: 2, cols: 3 };
        assert_eq!(err.to_string(), "matrix is not square: 2x3");
    }

    #[test]
    fn error_not_stable() {
        let err = LinalgError::NotStable { radius: 1.5 };
        assert_eq!(
            err.to_string(),
            "transition matrix is not stable (spectral radius 1.5)"
        );
    }

    #[test]
    fn error_no_convergence() {
        let err = LinalgError::NoConvergence {
            routine: "lyapunov doubling",
            iterations: 60,
        };
        assert_eq!(
            err.to_string(),
            "lyapunov doubling did not converge after 60 iterations"
        );
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<LinalgError>();
    }
}
