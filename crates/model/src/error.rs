//! Error types for the dsge-model crate.

use dsge_params::ParamsError;

/// Error type for model definition and state-space construction.
///
/// All variants describe a malformed model and are raised when the model
/// is bound, not during evaluation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    /// Returned when counts of equations, variables, shocks or matrix
    /// dimensions do not agree.
    #[error("dimension mismatch in {what}: expected {expected}, got {got}")]
    DimensionMismatch {
        /// What was being checked.
        what: &'static str,
        /// Expected size.
        expected: usize,
        /// Actual size.
        got: usize,
    },

    /// Returned when a model declares no variables.
    #[error("model declares no variables")]
    Empty,

    /// Returned when a variable, shock or parameter name is declared twice.
    #[error("duplicate {kind} name {name:?}")]
    DuplicateName {
        /// `"variable"`, `"shock"` or `"parameter"`.
        kind: &'static str,
        /// The repeated name.
        name: String,
    },

    /// Returned when the equation system needs a parameter the set lacks.
    #[error("parameter {name:?} required by the model is not declared")]
    UnknownParameter {
        /// Missing parameter.
        name: String,
    },

    /// Returned when a name lookup fails.
    #[error("unknown {kind} {name:?}")]
    UnknownName {
        /// `"variable"`, `"shock"` or `"observable"`.
        kind: &'static str,
        /// The name that was looked up.
        name: String,
    },

    /// Returned when a jump variable appears lagged or a predetermined
    /// variable appears led.
    #[error("variable {variable:?} ({kind}) must not appear at {timing}")]
    TimingViolation {
        /// Offending variable.
        variable: String,
        /// `"jump"` or `"predetermined"`.
        kind: &'static str,
        /// `"t-1"` or `"t+1"`.
        timing: &'static str,
    },

    /// Returned when residuals or derivatives at the probe point are not finite.
    #[error("model {model:?} produced non-finite {what} at its initial point")]
    NonFinite {
        /// Model name.
        model: String,
        /// `"residuals"` or `"jacobians"`.
        what: &'static str,
    },

    /// Returned when parameter values cannot be read.
    #[error(transparent)]
    Params(#[from] ParamsError),
}
