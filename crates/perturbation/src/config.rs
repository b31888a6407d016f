//! Configuration for the perturbation solver.

use crate::error::SolutionError;

/// Order of the Taylor approximation.
///
/// Only first order is implemented; the enum leaves room for higher
/// orders without breaking callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum Order {
    /// Linear approximation.
    #[default]
    First,
}

/// Numerical settings for the QZ step and the Blanchard–Kahn check.
///
/// # Example
///
/// ```
/// use dsge_perturbation::PerturbationConfig;
///
/// let config = PerturbationConfig::new()
///     .with_qz_criterium(1.0 + 1e-8)
///     .with_allow_unit_roots(true);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct PerturbationConfig {
    order: Order,
    qz_criterium: f64,
    qz_zero_threshold: f64,
    qz_max_iterations: usize,
    allow_unit_roots: bool,
    imaginary_tolerance: f64,
}

impl PerturbationConfig {
    /// Defaults: first order, `qz_criterium = 1 + 1e-6`, zero threshold
    /// `1e-6`, 30 sweeps per eigenvalue, unit roots rejected, imaginary
    /// tolerance `1e-8`.
    pub fn new() -> Self {
        Self {
            order: Order::First,
            qz_criterium: 1.0 + 1e-6,
            qz_zero_threshold: 1e-6,
            qz_max_iterations: 30,
            allow_unit_roots: false,
            imaginary_tolerance: 1e-8,
        }
    }

    /// Sets the approximation order.
    pub fn with_order(mut self, order: Order) -> Self {
        self.order = order;
        self
    }

    /// Sets the modulus above which a root counts as explosive.
    pub fn with_qz_criterium(mut self, qz_criterium: f64) -> Self {
        self.qz_criterium = qz_criterium;
        self
    }

    /// Sets the threshold below which both `|s_ii|` and `|t_ii|` make a
    /// root `0/0`.
    ///
    /// Relative to the pencil: the cut-off applied is
    /// `threshold · (‖A₀‖_F + ‖A₁‖_F)`.
    pub fn with_qz_zero_threshold(mut self, threshold: f64) -> Self {
        self.qz_zero_threshold = threshold;
        self
    }

    /// Sets the QZ sweep budget per eigenvalue.
    pub fn with_qz_max_iterations(mut self, iterations: usize) -> Self {
        self.qz_max_iterations = iterations;
        self
    }

    /// Accepts stable roots within the tolerance band of the unit circle.
    pub fn with_allow_unit_roots(mut self, allow: bool) -> Self {
        self.allow_unit_roots = allow;
        self
    }

    /// Sets the largest imaginary part tolerated silently in the policy.
    pub fn with_imaginary_tolerance(mut self, tolerance: f64) -> Self {
        self.imaginary_tolerance = tolerance;
        self
    }

    /// Approximation order.
    pub fn order(&self) -> Order {
        self.order
    }

    /// Explosive-root threshold.
    pub fn qz_criterium(&self) -> f64 {
        self.qz_criterium
    }

    /// `0/0` threshold.
    pub fn qz_zero_threshold(&self) -> f64 {
        self.qz_zero_threshold
    }

    /// Sweep budget per eigenvalue.
    pub fn qz_max_iterations(&self) -> usize {
        self.qz_max_iterations
    }

    /// Whether unit roots are accepted.
    pub fn allow_unit_roots(&self) -> bool {
        self.allow_unit_roots
    }

    /// Imaginary-part tolerance.
    pub fn imaginary_tolerance(&self) -> f64 {
        self.imaginary_tolerance
    }

    /// Validates this configuration.
    pub fn validate(&self) -> Result<(), SolutionError> {
        if !(self.qz_criterium.is_finite() && self.qz_criterium >= 1.0) {
            return Err(SolutionError::InvalidConfig {
                reason: format!("qz_criterium must be >= 1, got {}", self.qz_criterium),
            });
        }
        if !(self.qz_zero_threshold.is_finite() && self.qz_zero_threshold > 0.0) {
            return Err(SolutionError::InvalidConfig {
                reason: format!(
                    "qz_zero_threshold must be positive, got {}",
                    self.qz_zero_threshold
                ),
            });
        }
        if self.qz_max_iterations == 0 {
            return Err(SolutionError::InvalidConfig {
                reason: "qz_max_iterations must be at least 1".into(),
            });
        }
        if !(self.imaginary_tolerance >= 0.0) {
            return Err(SolutionError::InvalidConfig {
                reason: format!(
                    "imaginary_tolerance must be non-negative, got {}",
                    self.imaginary_tolerance
                ),
            });
        }
        Ok(())
    }

    pub(crate) fn unit_band(&self) -> f64 {
        self.qz_criterium - 1.0
    }
}

impl Default for PerturbationConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = PerturbationConfig::default();
        assert_eq!(cfg.order(), Order::First);
        assert_eq!(cfg.qz_criterium(), 1.0 + 1e-6);
        assert!(!cfg.allow_unit_roots());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn criterium_below_one_rejected() {
        let cfg = PerturbationConfig::new().with_qz_criterium(0.99);
        assert!(matches!(cfg.validate(), Err(SolutionError::InvalidConfig { .. })));
    }

    #[test]
    fn zero_sweeps_rejected() {
        let cfg = PerturbationConfig::new().with_qz_max_iterations(0);
        assert!(cfg.validate().is_err());
    }
}
