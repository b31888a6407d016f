//! Filter configuration.

use std::time::Duration;

use ndarray::{Array1, Array2};

use crate::error::FilterError;

/// Distribution of the state before the first observation.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InitialState {
    /// Zero mean and the unconditional covariance solving
    /// `Σ = A Σ Aᵀ + B Bᵀ`.
    #[default]
    Stationary,
    /// Zero mean and `variance · I`; an approximate diffuse prior for
    /// models with unit roots.
    Diffuse {
        /// Diagonal variance.
        variance: f64,
    },
    /// An explicit mean and covariance.
    Given {
        /// State mean.
        mean: Array1<f64>,
        /// State covariance (symmetric positive semi-definite).
        covariance: Array2<f64>,
    },
}

/// Configuration for [`KalmanFilter`](crate::KalmanFilter).
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use dsge_kalman::{FilterConfig, InitialState};
///
/// let config = FilterConfig::new()
///     .with_initial_state(InitialState::Diffuse { variance: 1e6 })
///     .with_timeout(Duration::from_secs(1));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default)]
pub struct FilterConfig {
    initial_state: InitialState,
    timeout: Option<Duration>,
}

impl FilterConfig {
    /// Stationary initialisation, no timeout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the initial state distribution.
    pub fn with_initial_state(mut self, initial_state: InitialState) -> Self {
        self.initial_state = initial_state;
        self
    }

    /// Sets a wall-clock limit per run.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Initial state distribution.
    pub fn initial_state(&self) -> &InitialState {
        &self.initial_state
    }

    /// Wall-clock limit per run.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Validates the configuration.
    ///
    /// Dimensions of a [`InitialState::Given`] are checked against the
    /// model when the filter runs.
    pub fn validate(&self) -> Result<(), FilterError> {
        match &self.initial_state {
            InitialState::Stationary => Ok(()),
            InitialState::Diffuse { variance } => {
                if !(variance.is_finite() && *variance > 0.0) {
                    return Err(FilterError::InvalidConfig {
                        reason: format!("diffuse variance must be positive and finite, got {variance}"),
                    });
                }
                Ok(())
            }
            InitialState::Given { mean, covariance } => {
                if covariance.nrows() != covariance.ncols() || covariance.nrows() != mean.len() {
                    return Err(FilterError::InvalidInitialState {
                        reason: format!(
                            "mean has {} entries but covariance is {}x{}",
                            mean.len(),
                            covariance.nrows(),
                            covariance.ncols()
                        ),
                    });
                }
                if !mean.iter().chain(covariance.iter()).all(|v| v.is_finite()) {
                    return Err(FilterError::InvalidInitialState {
                        reason: "non-finite values".to_string(),
                    });
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn default_is_stationary() {
        let config = FilterConfig::default();
        assert_eq!(config.initial_state(), &InitialState::Stationary);
        assert!(config.timeout().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_bad_diffuse_variance() {
        for variance in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let config = FilterConfig::new().with_initial_state(InitialState::Diffuse { variance });
            assert!(matches!(config.validate(), Err(FilterError::InvalidConfig { .. })));
        }
    }

    #[test]
    fn rejects_inconsistent_given_state() {
        let config = FilterConfig::new().with_initial_state(InitialState::Given {
            mean: array![0.0, 0.0],
            covariance: array![[1.0]],
        });
        assert!(matches!(config.validate(), Err(FilterError::InvalidInitialState { .. })));
    }
}
