//! Error types for the dsge-perturbation crate.

use dsge_linalg::LinalgError;
use dsge_model::ModelError;
use dsge_steady::SteadyStateError;

/// Error type for the perturbation solver.
///
/// Blanchard–Kahn violations, singular pencils and rank failures describe
/// an invalid region of parameter space and are recoverable per draw.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SolutionError {
    /// Returned when fewer explosive roots than jump variables are found
    /// (indeterminacy: a continuum of stable solutions).
    #[error(
        "no unique stable solution: {explosive} explosive roots for {jumps} jump variables (indeterminacy)"
    )]
    NoStableSolution {
        /// Explosive generalized eigenvalues found.
        explosive: usize,
        /// Jump variables declared.
        jumps: usize,
    },

    /// Returned when more explosive roots than jump variables are found.
    #[error("unstable: {explosive} explosive roots for {jumps} jump variables")]
    Unstable {
        /// Explosive generalized eigenvalues found.
        explosive: usize,
        /// Jump variables declared.
        jumps: usize,
    },

    /// Returned when a stable root lies on the unit circle and unit roots
    /// are not allowed.
    #[error("unit root with modulus {modulus} (set allow_unit_roots to accept)")]
    UnitRoot {
        /// Modulus of the offending root.
        modulus: f64,
    },

    /// Returned when a generalized eigenvalue is `0/0`.
    #[error("singular pencil: generalized eigenvalue {index} is 0/0")]
    SingularPencil {
        /// Position on the Schur diagonal.
        index: usize,
    },

    /// Returned when the QZ iteration hits its cap.
    #[error("QZ iteration did not converge after {iterations} sweeps")]
    QzNotConverged {
        /// Sweeps performed.
        iterations: usize,
    },

    /// Returned when eigenvalue reordering leaves a stable root behind an
    /// explosive one.
    #[error("generalized Schur reordering failed")]
    ReorderFailed,

    /// Returned when the stable block of the Schur vectors is not invertible.
    #[error("rank condition fails: reciprocal condition {rcond:e} of the stable block")]
    RankCondition {
        /// Reciprocal condition number of `Z₁₁`.
        rcond: f64,
    },

    /// Returned when the contemporaneous impact matrix cannot be inverted.
    #[error("singular impact matrix when solving for the shock response")]
    SingularImpact,

    /// Returned when the solved transition matrix has spectral radius above
    /// the allowed limit.
    #[error("transition matrix has spectral radius {radius}")]
    NonStationaryTransition {
        /// Spectral radius of `A`.
        radius: f64,
    },

    /// Returned when derivatives at the steady state are not finite.
    #[error("non-finite jacobians at the steady state")]
    NonFinite,

    /// Returned when an observable names a variable the model lacks.
    #[error("observable {observable:?} refers to unknown variable {variable:?}")]
    UnknownVariable {
        /// Observable name.
        observable: String,
        /// Variable name.
        variable: String,
    },

    /// Returned when an observable's transform is unusable at this steady state.
    #[error("invalid observable {observable:?}: {reason}")]
    InvalidObservation {
        /// Observable name.
        observable: String,
        /// What is wrong.
        reason: String,
    },

    /// Returned when the solver configuration is invalid.
    #[error("invalid perturbation configuration: {reason}")]
    InvalidConfig {
        /// What is wrong.
        reason: String,
    },

    /// Returned when the steady state cannot be computed.
    #[error(transparent)]
    SteadyState(#[from] SteadyStateError),

    /// Returned on model binding or state-space shape errors.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Returned when a dense factorization fails.
    #[error(transparent)]
    Linalg(#[from] LinalgError),
}

impl SolutionError {
    /// Returns `true` for Blanchard–Kahn violations.
    pub fn is_blanchard_kahn(&self) -> bool {
        matches!(
            self,
            SolutionError::NoStableSolution { .. } | SolutionError::Unstable { .. }
        )
    }
}
