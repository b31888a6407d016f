//! # dsge-kalman
//!
//! Likelihood evaluation and state estimation for a solved
//! [`StateSpaceModel`](dsge_model::StateSpaceModel).
//!
//! | Entry point | Returns |
//! |-------------|---------|
//! | [`KalmanFilter::log_likelihood`] | scalar log-likelihood, no paths stored |
//! | [`KalmanFilter::filter`] | [`FilterOutput`]: predicted/filtered moments, innovations, per-step contributions |
//! | [`KalmanFilter::smooth`] | [`SmootherOutput`]: smoothed states, covariances, shocks and initial state |
//!
//! Observations are a `T × k` matrix in the model's observable order; `NaN`
//! marks a missing value. A step with no observed series contributes zero
//! to the likelihood and leaves the predicted moments unchanged.
//!
//! Each step contributes
//!
//! ```text
//! -½ (k_t ln 2π + ln det F_t + v_tᵀ F_t⁻¹ v_t)
//! ```
//!
//! where `k_t` is the number of series observed at `t`.

mod config;
mod error;
mod filter;
mod smoother;

pub use config::{FilterConfig, InitialState};
pub use error::FilterError;
pub use filter::{FilterOutput, KalmanFilter};
pub use smoother::SmootherOutput;
