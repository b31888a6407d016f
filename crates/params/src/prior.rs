//! Prior distributions declared per parameter.
//!
//! Families are parameterised the way estimation files usually state them:
//! by mean and standard deviation (or by support for the uniform). The
//! shape/scale conversion happens when the density is evaluated.

use statrs::distribution::{Beta, Continuous, Gamma, InverseGamma, Normal, Uniform};

use crate::error::ParamsError;

/// Prior family with its hyperparameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Prior {
    /// Gaussian with the given mean and standard deviation.
    Normal {
        /// Mean.
        mean: f64,
        /// Standard deviation.
        sd: f64,
    },
    /// Beta on `(0, 1)`; requires `sd² < mean (1 - mean)`.
    Beta {
        /// Mean.
        mean: f64,
        /// Standard deviation.
        sd: f64,
    },
    /// Gamma on `(0, ∞)`.
    Gamma {
        /// Mean.
        mean: f64,
        /// Standard deviation.
        sd: f64,
    },
    /// Inverse gamma on `(0, ∞)`, the usual prior for shock standard deviations.
    InverseGamma {
        /// Mean.
        mean: f64,
        /// Standard deviation.
        sd: f64,
    },
    /// Uniform on `[lower, upper]`.
    Uniform {
        /// Lower end of the support.
        lower: f64,
        /// Upper end of the support.
        upper: f64,
    },
}

impl Prior {
    /// Short family name used in messages.
    pub fn family(&self) -> &'static str {
        match self {
            Prior::Normal { .. } => "normal",
            Prior::Beta { .. } => "beta",
            Prior::Gamma { .. } => "gamma",
            Prior::InverseGamma { .. } => "inverse_gamma",
            Prior::Uniform { .. } => "uniform",
        }
    }

    /// Checks that the hyperparameters define a proper distribution.
    pub fn validate(&self, name: &str) -> Result<(), ParamsError> {
        self.log_density_inner(self.probe_point())
            .map(|_| ())
            .map_err(|reason| ParamsError::InvalidPrior {
                name: name.to_string(),
                family: self.family(),
                reason,
            })
    }

    /// Log density at `x`; `-inf` outside the support.
    ///
    /// # Errors
    ///
    /// Returns [`ParamsError::InvalidPrior`] if the hyperparameters are invalid.
    pub fn log_density(&self, name: &str, x: f64) -> Result<f64, ParamsError> {
        self.log_density_inner(x)
            .map_err(|reason| ParamsError::InvalidPrior {
                name: name.to_string(),
                family: self.family(),
                reason,
            })
    }

    fn probe_point(&self) -> f64 {
        match *self {
            Prior::Normal { mean, .. }
            | Prior::Beta { mean, .. }
            | Prior::Gamma { mean, .. }
            | Prior::InverseGamma { mean, .. } => mean,
            Prior::Uniform { lower, upper } => 0.5 * (lower + upper),
        }
    }

    fn log_density_inner(&self, x: f64) -> Result<f64, String> {
        match *self {
            Prior::Normal { mean, sd } => {
                let dist = Normal::new(mean, sd).map_err(|e| e.to_string())?;
                Ok(dist.ln_pdf(x))
            }
            Prior::Beta { mean, sd } => {
                check_mean_sd(mean, sd)?;
                if mean <= 0.0 || mean >= 1.0 {
                    return Err(format!("mean {mean} outside (0, 1)"));
                }
                let var = sd * sd;
                let common = mean * (1.0 - mean) / var - 1.0;
                if common <= 0.0 {
                    return Err(format!("sd {sd} too large for mean {mean}"));
                }
                let dist = Beta::new(mean * common, (1.0 - mean) * common)
                    .map_err(|e| e.to_string())?;
                if x <= 0.0 || x >= 1.0 {
                    return Ok(f64::NEG_INFINITY);
                }
                Ok(dist.ln_pdf(x))
            }
            Prior::Gamma { mean, sd } => {
                check_mean_sd(mean, sd)?;
                if mean <= 0.0 {
                    return Err(format!("mean {mean} must be positive"));
                }
                let dist = Gamma::new(mean * mean / (sd * sd), mean / (sd * sd))
                    .map_err(|e| e.to_string())?;
                if x <= 0.0 {
                    return Ok(f64::NEG_INFINITY);
                }
                Ok(dist.ln_pdf(x))
            }
            Prior::InverseGamma { mean, sd } => {
                check_mean_sd(mean, sd)?;
                if mean <= 0.0 {
                    return Err(format!("mean {mean} must be positive"));
                }
                let shape = 2.0 + mean * mean / (sd * sd);
                let scale = mean * (shape - 1.0);
                let dist = InverseGamma::new(shape, scale).map_err(|e| e.to_string())?;
                if x <= 0.0 {
                    return Ok(f64::NEG_INFINITY);
                }
                Ok(dist.ln_pdf(x))
            }
            Prior::Uniform { lower, upper } => {
                let dist = Uniform::new(lower, upper).map_err(|e| e.to_string())?;
                if x < lower || x > upper {
                    return Ok(f64::NEG_INFINITY);
                }
                Ok(dist.ln_pdf(x))
            }
        }
    }
}

fn check_mean_sd(mean: f64, sd: f64) -> Result<(), String> {
    if !mean.is_finite() {
        return Err(format!("non-finite mean {mean}"));
    }
    if !sd.is_finite() || sd <= 0.0 {
        return Err(format!("sd {sd} must be positive and finite"));
    }
    Ok(())
}
