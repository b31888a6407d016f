//! Unconditional and conditional forecasts.

use dsge_kalman::{FilterConfig, FilterOutput, InitialState, KalmanFilter};
use dsge_model::StateSpaceModel;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use tracing::debug;

use crate::error::AnalysisError;

/// Forecast paths for `h = 1..=horizon`.
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    state_means: Array2<f64>,
    observable_means: Array2<f64>,
    state_covariances: Option<Vec<Array2<f64>>>,
    observable_covariances: Option<Vec<Array2<f64>>>,
}

impl Forecast {
    /// Expected state deviations (`horizon × n`).
    pub fn state_means(&self) -> &Array2<f64> {
        &self.state_means
    }

    /// Expected observables in data units (`horizon × k`).
    pub fn observable_means(&self) -> &Array2<f64> {
        &self.observable_means
    }

    /// State forecast-error covariances, if an initial covariance was given.
    pub fn state_covariances(&self) -> Option<&[Array2<f64>]> {
        self.state_covariances.as_deref()
    }

    /// Observable forecast-error covariances (including measurement
    /// error), if an initial covariance was given.
    pub fn observable_covariances(&self) -> Option<&[Array2<f64>]> {
        self.observable_covariances.as_deref()
    }
}

/// Iterates the transition from a state estimate `mean` (with optional
/// covariance) at the forecast origin.
pub fn forecast(
    ss: &StateSpaceModel,
    mean: ArrayView1<'_, f64>,
    covariance: Option<&Array2<f64>>,
    horizon: usize,
) -> Result<Forecast, AnalysisError> {
    let n = ss.n_states();
    if mean.len() != n {
        return Err(AnalysisError::DimensionMismatch {
            what: "forecast origin mean",
            expected: n,
            got: mean.len(),
        });
    }
    if let Some(p) = covariance {
        if p.nrows() != n || p.ncols() != n {
            return Err(AnalysisError::DimensionMismatch {
                what: "forecast origin covariance",
                expected: n,
                got: p.nrows(),
            });
        }
    }
    let (a, b, c, d) = (ss.a(), ss.b(), ss.c(), ss.d());
    let q = ss.state_noise_covariance();
    let shock_cross = c.dot(b).dot(&d.t());
    let obs_noise = d.dot(&d.t()) + &shock_cross + &shock_cross.t() + ss.measurement_covariance();

    let mut state_means = Array2::zeros((horizon, n));
    let mut observable_means = Array2::zeros((horizon, ss.n_observables()));
    let mut state_covs = covariance.map(|_| Vec::with_capacity(horizon));
    let mut obs_covs = covariance.map(|_| Vec::with_capacity(horizon));

    let mut s = mean.to_owned();
    let mut p = covariance.cloned();
    for h in 0..horizon {
        s = a.dot(&s);
        state_means.row_mut(h).assign(&s);
        observable_means
            .row_mut(h)
            .assign(&(ss.observation_constant() + &c.dot(&s)));
        if let Some(prev) = p.as_ref() {
            let next = a.dot(prev).dot(&a.t()) + &q;
            let obs = c.dot(&next).dot(&c.t()) + &obs_noise;
            if let (Some(sc), Some(oc)) = (state_covs.as_mut(), obs_covs.as_mut()) {
                sc.push(next.clone());
                oc.push(obs);
            }
            p = Some(next);
        }
    }
    Ok(Forecast {
        state_means,
        observable_means,
        state_covariances: state_covs,
        observable_covariances: obs_covs,
    })
}

/// Forecast from the last filtered state of a filter run.
pub fn forecast_from_filter(
    ss: &StateSpaceModel,
    filtered: &FilterOutput,
    horizon: usize,
) -> Result<Forecast, AnalysisError> {
    forecast(ss, filtered.final_mean(), Some(filtered.final_covariance()), horizon)
}

/// Forecast paths conditional on known future values of some observables.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalForecast {
    state_means: Array2<f64>,
    observable_means: Array2<f64>,
    shocks: Array2<f64>,
}

impl ConditionalForecast {
    /// Expected state deviations (`horizon × n`).
    pub fn state_means(&self) -> &Array2<f64> {
        &self.state_means
    }

    /// Expected observables in data units; conditioned entries reproduce
    /// the conditions.
    pub fn observable_means(&self) -> &Array2<f64> {
        &self.observable_means
    }

    /// Expected shocks needed to meet the conditions (`horizon × shocks`).
    pub fn shocks(&self) -> &Array2<f64> {
        &self.shocks
    }
}

/// Conditions the forecast on `conditions` (`horizon × k`, data units,
/// `NaN` = unconstrained) by running the filter and smoother over the
/// future with no measurement error, starting from the origin estimate.
///
/// # Errors
///
/// [`AnalysisError::EmptyHorizon`] for an empty condition matrix; filter
/// errors if the conditions are inconsistent (a singular innovation
/// covariance) or the model has `D ≠ 0`.
#[tracing::instrument(skip_all, fields(horizon = conditions.nrows()))]
pub fn conditional_forecast(
    ss: &StateSpaceModel,
    mean: ArrayView1<'_, f64>,
    covariance: &Array2<f64>,
    conditions: ArrayView2<'_, f64>,
) -> Result<ConditionalForecast, AnalysisError> {
    if conditions.nrows() == 0 {
        return Err(AnalysisError::EmptyHorizon);
    }
    if conditions.ncols() != ss.n_observables() {
        return Err(AnalysisError::DimensionMismatch {
            what: "condition columns",
            expected: ss.n_observables(),
            got: conditions.ncols(),
        });
    }
    let exact = ss.without_measurement_error();
    let filter = KalmanFilter::new(FilterConfig::new().with_initial_state(InitialState::Given {
        mean: mean.to_owned(),
        covariance: covariance.clone(),
    }));
    let smoothed = filter.smooth(&exact, conditions)?;
    let state_means = smoothed.smoothed_means().clone();

    let mut observable_means = Array2::zeros((conditions.nrows(), ss.n_observables()));
    for (t, s) in state_means.rows().into_iter().enumerate() {
        let x: Array1<f64> = ss.observation_constant() + &ss.c().dot(&s);
        observable_means.row_mut(t).assign(&x);
    }
    debug!(
        constrained = conditions.iter().filter(|v| !v.is_nan()).count(),
        "conditional forecast solved"
    );
    Ok(ConditionalForecast {
        state_means,
        observable_means,
        shocks: smoothed.smoothed_shocks().clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn ar1() -> StateSpaceModel {
        StateSpaceModel::new(array![[0.5]], array![[1.0]], array![[1.0]], array![[0.0]])
            .unwrap()
            .with_observation_constant(array![1.0])
            .unwrap()
    }

    #[test]
    fn mean_decays_and_variance_grows() {
        let fc = forecast(&ar1(), array![2.0].view(), Some(&array![[0.0]]), 3).unwrap();
        assert_eq!(fc.state_means().column(0).to_vec(), vec![1.0, 0.5, 0.25]);
        assert_eq!(fc.observable_means().column(0).to_vec(), vec![2.0, 1.5, 1.25]);
        let vars: Vec<f64> = fc.state_covariances().unwrap().iter().map(|p| p[[0, 0]]).collect();
        assert_abs_diff_eq!(vars[0], 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(vars[1], 1.25, epsilon = 1e-15);
        assert_abs_diff_eq!(vars[2], 1.3125, epsilon = 1e-15);
    }

    #[test]
    fn covariance_is_optional() {
        let fc = forecast(&ar1(), array![2.0].view(), None, 2).unwrap();
        assert!(fc.state_covariances().is_none());
        assert!(fc.observable_covariances().is_none());
    }

    #[test]
    fn conditions_are_met_exactly() {
        let conditions = array![[f64::NAN], [3.0], [f64::NAN]];
        let cf = conditional_forecast(&ar1(), array![0.0].view(), &array![[0.0]], conditions.view()).unwrap();
        assert_abs_diff_eq!(cf.observable_means()[[1, 0]], 3.0, epsilon = 1e-10);
        // minimum-norm shocks: (ε₁, ε₂) = 2 (0.5, 1) / 1.25
        let s = cf.state_means();
        assert_abs_diff_eq!(s[[2, 0]], 0.5 * s[[1, 0]], epsilon = 1e-12);
        assert_abs_diff_eq!(s[[0, 0]], 0.5 * 2.0 / 1.25, epsilon = 1e-10);
    }
}
