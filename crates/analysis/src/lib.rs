//! # dsge-analysis
//!
//! Pure functions of a solved [`StateSpaceModel`](dsge_model::StateSpaceModel)
//! and, where noted, of filter or smoother output.
//!
//! | Function | Inputs | Output |
//! |----------|--------|--------|
//! | [`impulse_response`], [`impulse_responses`] | model, shock, horizon | `A^h B e` and `C A^h B e` |
//! | [`simulate`] | model, initial state, shock path | states and observables |
//! | [`simulate_stochastic`] | model, periods, seeded RNG | simulated data |
//! | [`forecast`], [`forecast_from_filter`] | model, origin mean (and covariance) | means and covariances |
//! | [`conditional_forecast`] | model, origin, future conditions | paths meeting the conditions |
//! | [`variance_decomposition`] | model, horizon or unconditional | shock shares per observable |
//! | [`historical_decomposition`] | model, smoother output, data | additive shock contributions |
//!
//! Shocks are in standard-deviation units throughout (`ε_t ~ N(0, I)`).

mod decomposition;
mod error;
mod forecast;
mod irf;
mod simulate;

pub use decomposition::{
    HistoricalDecomposition, VarianceDecomposition, historical_decomposition, variance_decomposition,
};
pub use error::AnalysisError;
pub use forecast::{ConditionalForecast, Forecast, conditional_forecast, forecast, forecast_from_filter};
pub use irf::{ImpulseResponse, impulse_response, impulse_responses};
pub use simulate::{Simulation, simulate, simulate_stochastic};
