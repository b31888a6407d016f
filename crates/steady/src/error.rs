//! Error types for the dsge-steady crate.

use dsge_model::ModelError;

/// Error type for steady-state computation.
///
/// Every variant except [`SteadyStateError::InvalidConfig`] and
/// [`SteadyStateError::Model`] means "this parameter draw has no usable
/// steady state" and is recoverable by the caller.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SteadyStateError {
    /// Returned when the iteration cap is hit or the line search stalls.
    #[error(
        "steady state did not converge after {iterations} iterations \
         (max residual {max_residual:e} in equations {equations:?})"
    )]
    NotConverged {
        /// Best maximum absolute residual reached.
        max_residual: f64,
        /// Indices of equations whose residual is still above tolerance.
        equations: Vec<usize>,
        /// Newton iterations performed.
        iterations: usize,
    },

    /// Returned when the static Jacobian cannot be inverted.
    #[error("singular steady-state jacobian at iteration {iteration}")]
    SingularJacobian {
        /// Iteration at which the solve failed.
        iteration: usize,
    },

    /// Returned when residuals at the starting point are not finite.
    #[error("non-finite residuals at the initial guess (equations {equations:?})")]
    NonFinite {
        /// Equations with non-finite residuals.
        equations: Vec<usize>,
    },

    /// Returned when the evaluation deadline passes.
    #[error("steady-state budget exhausted after {iterations} iterations (max residual {max_residual:e})")]
    BudgetExhausted {
        /// Iterations performed.
        iterations: usize,
        /// Maximum absolute residual at that point.
        max_residual: f64,
    },

    /// Returned when the initial guess has the wrong length.
    #[error("initial guess has {got} entries, model has {expected} variables")]
    InvalidGuess {
        /// Number of variables.
        expected: usize,
        /// Length of the guess.
        got: usize,
    },

    /// Returned when the solver configuration is invalid.
    #[error("invalid steady-state configuration: {reason}")]
    InvalidConfig {
        /// What is wrong.
        reason: String,
    },

    /// Returned when parameters cannot be bound to the model.
    #[error(transparent)]
    Model(#[from] ModelError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_not_converged() {
        let err = SteadyStateError::NotConverged {
            max_residual: 0.5,
            equations: vec![0, 2],
            iterations: 200,
        };
        assert_eq!(
            err.to_string(),
            "steady state did not converge after 200 iterations \
             (max residual 5e-1 in equations [0, 2])"
        );
    }

    #[test]
    fn error_singular() {
        let err = SteadyStateError::SingularJacobian { iteration: 3 };
        assert_eq!(err.to_string(), "singular steady-state jacobian at iteration 3");
    }

    #[test]
    fn error_invalid_guess() {
        let err = SteadyStateError::InvalidGuess { expected: 4, got: 2 };
        assert_eq!(
            err.to_string(),
            "initial guess has 2 entries, model has 4 variables"
        );
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SteadyStateError>();
    }
}
