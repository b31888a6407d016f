//! Configuration for the steady-state solver.

use std::time::Duration;

use crate::error::SteadyStateError;

/// Tolerances and limits for the damped Newton iteration.
///
/// # Example
///
/// ```
/// use dsge_steady::SteadyStateConfig;
///
/// let config = SteadyStateConfig::new()
///     .with_tolerance(1e-12)
///     .with_max_iterations(50);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct SteadyStateConfig {
    tolerance: f64,
    max_iterations: usize,
    min_step: f64,
    timeout: Option<Duration>,
}

impl SteadyStateConfig {
    /// Defaults: tolerance `1e-10`, 200 iterations, minimum step `1e-10`,
    /// no timeout.
    pub fn new() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: 200,
            min_step: 1e-10,
            timeout: None,
        }
    }

    /// Sets the maximum absolute residual accepted as converged.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the Newton iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the smallest step fraction the line search may try.
    pub fn with_min_step(mut self, min_step: f64) -> Self {
        self.min_step = min_step;
        self
    }

    /// Sets a wall-clock limit per solve.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Convergence tolerance.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Iteration cap.
    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Minimum line-search step.
    pub fn min_step(&self) -> f64 {
        self.min_step
    }

    /// Wall-clock limit.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Validates this configuration.
    pub fn validate(&self) -> Result<(), SteadyStateError> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(SteadyStateError::InvalidConfig {
                reason: format!("tolerance must be positive, got {}", self.tolerance),
            });
        }
        if self.max_iterations == 0 {
            return Err(SteadyStateError::InvalidConfig {
                reason: "max_iterations must be at least 1".into(),
            });
        }
        if !(self.min_step > 0.0 && self.min_step <= 1.0) {
            return Err(SteadyStateError::InvalidConfig {
                reason: format!("min_step must be in (0, 1], got {}", self.min_step),
            });
        }
        Ok(())
    }
}

impl Default for SteadyStateConfig {
    fn default() -> Self {
        Self::new()
    }
}
