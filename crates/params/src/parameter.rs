//! A single named structural parameter.

use crate::error::ParamsError;
use crate::prior::Prior;

/// Closed interval `[lower, upper]`; either end may be infinite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    lower: f64,
    upper: f64,
}

impl Bounds {
    /// Creates bounds `[lower, upper]`. Validity is checked by
    /// [`Parameter::validate`].
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// The whole real line.
    pub fn unbounded() -> Self {
        Self::new(f64::NEG_INFINITY, f64::INFINITY)
    }

    /// Lower bound.
    pub fn lower(&self) -> f64 {
        self.lower
    }

    /// Upper bound.
    pub fn upper(&self) -> f64 {
        self.upper
    }

    /// Returns `true` if `value` lies inside the closed interval.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }

    fn is_valid(&self) -> bool {
        !self.lower.is_nan() && !self.upper.is_nan() && self.lower < self.upper
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// A named parameter with a value, bounds and an optional prior.
///
/// # Example
///
/// ```
/// use dsge_params::{Parameter, Prior};
///
/// let beta = Parameter::new("beta", 0.99)
///     .with_bounds(0.9, 0.9999)
///     .with_prior(Prior::Beta { mean: 0.99, sd: 0.002 });
/// assert!(beta.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: String,
    value: f64,
    bounds: Bounds,
    prior: Option<Prior>,
}

impl Parameter {
    /// Creates an unbounded parameter without a prior.
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            bounds: Bounds::unbounded(),
            prior: None,
        }
    }

    /// Sets the admissible interval.
    pub fn with_bounds(mut self, lower: f64, upper: f64) -> Self {
        self.bounds = Bounds::new(lower, upper);
        self
    }

    /// Attaches a prior distribution.
    pub fn with_prior(mut self, prior: Prior) -> Self {
        self.prior = Some(prior);
        self
    }

    /// Parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current value.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Admissible interval.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Prior, if declared.
    pub fn prior(&self) -> Option<&Prior> {
        self.prior.as_ref()
    }

    /// Checks the value against the bounds and the prior's hyperparameters.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if !self.bounds.is_valid() {
            return Err(ParamsError::InvalidBounds {
                name: self.name.clone(),
                lower: self.bounds.lower,
                upper: self.bounds.upper,
            });
        }
        self.check_value(self.value)?;
        if let Some(prior) = &self.prior {
            prior.validate(&self.name)?;
        }
        Ok(())
    }

    pub(crate) fn check_value(&self, value: f64) -> Result<(), ParamsError> {
        if !value.is_finite() {
            return Err(ParamsError::NonFinite {
                name: self.name.clone(),
                value,
            });
        }
        if !self.bounds.contains(value) {
            return Err(ParamsError::OutOfBounds {
                name: self.name.clone(),
                value,
                lower: self.bounds.lower,
                upper: self.bounds.upper,
            });
        }
        Ok(())
    }

    pub(crate) fn set_value_unchecked(&mut self, value: f64) {
        self.value = value;
    }
}
