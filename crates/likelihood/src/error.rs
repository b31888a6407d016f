//! Error types for the dsge-likelihood crate.

use dsge_kalman::FilterError;
use dsge_model::ModelError;
use dsge_params::ParamsError;
use dsge_perturbation::SolutionError;
use dsge_steady::SteadyStateError;

/// Why a parameter draw has no likelihood.
///
/// Every variant is an ordinary outcome for an estimation loop: the draw
/// lies in a region with zero posterior mass and should be rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FailureReason {
    /// No steady state was found.
    #[error("steady state: {0}")]
    SteadyState(SteadyStateError),

    /// Perturbation failed (Blanchard–Kahn violation, unit root, singular pencil, ...).
    #[error("solution: {0}")]
    Solution(SolutionError),

    /// The filter broke down.
    #[error("filter: {0}")]
    Filter(#[from] FilterError),

    /// The parameter values are outside their bounds or the prior is not
    /// evaluable.
    #[error("parameters: {0}")]
    Parameters(#[from] ParamsError),
}

impl From<SolutionError> for FailureReason {
    fn from(err: SolutionError) -> Self {
        match err {
            SolutionError::SteadyState(inner) => FailureReason::SteadyState(inner),
            other => FailureReason::Solution(other),
        }
    }
}

impl From<SteadyStateError> for FailureReason {
    fn from(err: SteadyStateError) -> Self {
        FailureReason::SteadyState(err)
    }
}

impl FailureReason {
    /// Short stable label, e.g. for counting rejections.
    pub fn kind(&self) -> &'static str {
        match self {
            FailureReason::SteadyState(_) => "steady_state",
            FailureReason::Solution(_) => "solution",
            FailureReason::Filter(_) => "filter",
            FailureReason::Parameters(_) => "parameters",
        }
    }
}

/// Error type for engine construction and mode search.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EstimateError {
    /// Returned when the data does not match the observation mapping.
    #[error("{what}: expected {expected}, got {got}")]
    DimensionMismatch {
        /// What was being checked.
        what: &'static str,
        /// Expected size.
        expected: usize,
        /// Actual size.
        got: usize,
    },

    /// Returned when the data has no rows.
    #[error("observation matrix is empty")]
    EmptyData,

    /// Returned when the observation mapping does not fit the model.
    #[error("observation mapping: {0}")]
    Mapping(SolutionError),

    /// Model binding failed.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Returned when the starting point of a mode search has no posterior.
    #[error("starting point rejected: {0}")]
    InfeasibleStart(FailureReason),

    /// Returned when the starting point has zero prior density.
    #[error("starting point has zero prior density")]
    ZeroPriorDensity,

    /// Returned when a free parameter starts exactly on a finite bound,
    /// which has no unconstrained image.
    #[error("parameter `{0}` starts on its bound")]
    StartOnBound(String),

    /// Returned when a parameter named for the search is not declared.
    #[error("unknown parameter `{0}`")]
    UnknownParameter(String),

    /// Returned when the mode-search settings are invalid.
    #[error("invalid mode-search configuration: {reason}")]
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when the optimiser fails to run.
    #[error("optimisation failed: {reason}")]
    Optimization {
        /// Message from the optimiser.
        reason: String,
    },

    /// Parameter handling failed outside a likelihood evaluation.
    #[error(transparent)]
    Params(#[from] ParamsError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steady_state_is_unwrapped_from_solution_errors() {
        let inner = SteadyStateError::SingularJacobian { iteration: 3 };
        let reason = FailureReason::from(SolutionError::SteadyState(inner.clone()));
        assert_eq!(reason, FailureReason::SteadyState(inner));
        assert_eq!(reason.kind(), "steady_state");
    }

    #[test]
    fn blanchard_kahn_display() {
        let reason = FailureReason::from(SolutionError::NoStableSolution { explosive: 2, jumps: 3 });
        assert_eq!(reason.kind(), "solution");
        assert!(reason.to_string().starts_with("solution: "));
    }

    #[test]
    fn estimate_display() {
        let err = EstimateError::DimensionMismatch {
            what: "data columns",
            expected: 3,
            got: 2,
        };
        assert_eq!(err.to_string(), "data columns: expected 3, got 2");
        assert_eq!(EstimateError::UnknownParameter("zeta".into()).to_string(), "unknown parameter `zeta`");
    }

    #[test]
    fn errors_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FailureReason>();
        assert_send_sync::<EstimateError>();
    }
}
