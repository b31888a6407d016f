//! Durbin–Koopman backward pass.
//!
//! ```text
//! r_{t-1} = Cᵀ F_t⁻¹ v_t + L_tᵀ r_t            r_T = 0
//! N_{t-1} = Cᵀ F_t⁻¹ C + L_tᵀ N_t L_t          N_T = 0
//! L_t     = A (I - K_t C)
//! ŝ_t     = s_{t|t-1} + P_{t|t-1} r_{t-1}
//! ε̂_t     = Bᵀ r_{t-1}
//! ```
//!
//! No predicted covariance is ever inverted, so singular `P_{t|t-1}`
//! (e.g. lag-copy states) is handled.

use dsge_linalg::symmetrize;
use dsge_model::StateSpaceModel;
use ndarray::{Array1, Array2, Axis};

use crate::error::FilterError;
use crate::filter::FilterOutput;

/// Smoothed states and shocks, together with the filter run they came from.
#[derive(Debug, Clone)]
pub struct SmootherOutput {
    filter: FilterOutput,
    smoothed_means: Array2<f64>,
    smoothed_covariances: Vec<Array2<f64>>,
    smoothed_shocks: Array2<f64>,
    initial_mean: Array1<f64>,
    initial_covariance: Array2<f64>,
}

impl SmootherOutput {
    /// The forward pass.
    pub fn filter(&self) -> &FilterOutput {
        &self.filter
    }

    /// Log-likelihood of the forward pass.
    pub fn log_likelihood(&self) -> f64 {
        self.filter.log_likelihood()
    }

    /// `E[s_t | x_1..x_T]` (`T × n`).
    pub fn smoothed_means(&self) -> &Array2<f64> {
        &self.smoothed_means
    }

    /// `Var[s_t | x_1..x_T]`.
    pub fn smoothed_covariances(&self) -> &[Array2<f64>] {
        &self.smoothed_covariances
    }

    /// `E[ε_t | x_1..x_T]` (`T × shocks`).
    pub fn smoothed_shocks(&self) -> &Array2<f64> {
        &self.smoothed_shocks
    }

    /// `E[s_0 | x_1..x_T]`: the state before the first observation.
    pub fn initial_mean(&self) -> &Array1<f64> {
        &self.initial_mean
    }

    /// `Var[s_0 | x_1..x_T]`.
    pub fn initial_covariance(&self) -> &Array2<f64> {
        &self.initial_covariance
    }
}

pub(crate) fn smooth(ss: &StateSpaceModel, filter: FilterOutput) -> Result<SmootherOutput, FilterError> {
    if !ss.has_zero_d() {
        return Err(FilterError::SmootherRequiresZeroD);
    }
    let (a, b, c) = (ss.a(), ss.b(), ss.c());
    let n = ss.n_states();
    let t_len = filter.len();
    let eye = Array2::<f64>::eye(n);

    let mut smoothed_means = Array2::zeros((t_len, n));
    let mut smoothed_covariances = vec![Array2::zeros((n, n)); t_len];
    let mut smoothed_shocks = Array2::zeros((t_len, ss.n_shocks()));
    let mut r = Array1::<f64>::zeros(n);
    let mut weight = Array2::<f64>::zeros((n, n));

    for t in (0..t_len).rev() {
        let step = &filter.steps[t];
        let (r_prev, weight_prev) = if step.observed.is_empty() {
            (a.t().dot(&r), a.t().dot(&weight).dot(a))
        } else {
            let z = c.select(Axis(0), &step.observed);
            let l = a.dot(&(&eye - &step.gain.dot(&z)));
            let zf = z.t().dot(&step.f_inv);
            (
                zf.dot(&step.innovation) + l.t().dot(&r),
                zf.dot(&z) + l.t().dot(&weight).dot(&l),
            )
        };

        let p = &filter.predicted_covariances()[t];
        let mean = &filter.predicted_means().row(t) + &p.dot(&r_prev);
        smoothed_means.row_mut(t).assign(&mean);
        let mut cov = p - &p.dot(&weight_prev).dot(p);
        symmetrize(&mut cov);
        smoothed_covariances[t] = cov;
        smoothed_shocks.row_mut(t).assign(&b.t().dot(&r_prev));

        r = r_prev;
        weight = weight_prev;
    }

    let p0 = filter.initial_covariance();
    let initial_mean = filter.initial_mean() + &p0.dot(&a.t().dot(&r));
    let pa = p0.dot(&a.t());
    let mut initial_covariance = p0 - &pa.dot(&weight).dot(&pa.t());
    symmetrize(&mut initial_covariance);

    Ok(SmootherOutput {
        filter,
        smoothed_means,
        smoothed_covariances,
        smoothed_shocks,
        initial_mean,
        initial_covariance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KalmanFilter;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn exact_observation_is_reproduced() {
        let ss = StateSpaceModel::new(array![[0.8]], array![[0.5]], array![[1.0]], array![[0.0]]).unwrap();
        let data = array![[0.3], [0.1], [-0.2], [0.25]];
        let out = KalmanFilter::default().smooth(&ss, data.view()).unwrap();
        for t in 0..4 {
            assert_abs_diff_eq!(out.smoothed_means()[[t, 0]], data[[t, 0]], epsilon = 1e-10);
            assert_abs_diff_eq!(out.smoothed_covariances()[t][[0, 0]], 0.0, epsilon = 1e-10);
        }
        // ε_t = (s_t - ρ s_{t-1}) / σ once the path is known exactly
        for t in 1..4 {
            let implied = (data[[t, 0]] - 0.8 * data[[t - 1, 0]]) / 0.5;
            assert_abs_diff_eq!(out.smoothed_shocks()[[t, 0]], implied, epsilon = 1e-9);
        }
    }

    #[test]
    fn rejects_direct_shock_loading() {
        let ss = StateSpaceModel::new(array![[0.8]], array![[0.5]], array![[1.0]], array![[0.1]]).unwrap();
        let err = KalmanFilter::default().smooth(&ss, array![[0.3]].view()).unwrap_err();
        assert_eq!(err, FilterError::SmootherRequiresZeroD);
    }

    #[test]
    fn last_smoothed_state_equals_filtered_state() {
        let ss = StateSpaceModel::new(
            array![[0.7, 0.1], [0.0, 0.5]],
            array![[1.0, 0.0], [0.3, 1.0]],
            array![[1.0, 1.0]],
            array![[0.0, 0.0]],
        )
        .unwrap()
        .with_measurement_covariance(array![[0.2]])
        .unwrap();
        let data = array![[0.5], [f64::NAN], [-0.3], [0.8]];
        let out = KalmanFilter::default().smooth(&ss, data.view()).unwrap();
        let last = out.filter().final_mean();
        for i in 0..2 {
            assert_abs_diff_eq!(out.smoothed_means()[[3, i]], last[i], epsilon = 1e-12);
        }
    }
}
