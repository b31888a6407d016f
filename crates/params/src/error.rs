//! Error types for the dsge-params crate.

/// Error type for all fallible operations in the dsge-params crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamsError {
    /// Returned when a parameter name is declared twice.
    #[error("parameter {name:?} is already declared")]
    DuplicateName {
        /// The repeated name.
        name: String,
    },

    /// Returned when a name is not part of the set.
    #[error("unknown parameter {name:?}")]
    UnknownName {
        /// The name that was looked up.
        name: String,
    },

    /// Returned when a value lies outside its declared bounds.
    #[error("parameter {name:?} = {value} outside bounds [{lower}, {upper}]")]
    OutOfBounds {
        /// Parameter name.
        name: String,
        /// Offending value.
        value: f64,
        /// Lower bound.
        lower: f64,
        /// Upper bound.
        upper: f64,
    },

    /// Returned when a value is NaN or infinite.
    #[error("parameter {name:?} has non-finite value {value}")]
    NonFinite {
        /// Parameter name.
        name: String,
        /// Offending value.
        value: f64,
    },

    /// Returned when bounds are empty or NaN.
    #[error("invalid bounds for {name:?}: [{lower}, {upper}]")]
    InvalidBounds {
        /// Parameter name.
        name: String,
        /// Lower bound.
        lower: f64,
        /// Upper bound.
        upper: f64,
    },

    /// Returned when a prior's hyperparameters do not define a distribution.
    #[error("invalid {family} prior for {name:?}: {reason}")]
    InvalidPrior {
        /// Parameter name.
        name: String,
        /// Prior family.
        family: &'static str,
        /// Description of the problem.
        reason: String,
    },

    /// Returned when a value vector does not match the number of parameters.
    #[error("expected {expected} values, got {got}")]
    LengthMismatch {
        /// Number of declared parameters.
        expected: usize,
        /// Number of supplied values.
        got: usize,
    },
}
