//! Variance and historical decompositions.

use dsge_kalman::SmootherOutput;
use dsge_linalg::{LyapunovOptions, lyapunov};
use dsge_model::StateSpaceModel;
use ndarray::{Array1, Array2, Array3, ArrayView2, Axis};

use crate::error::AnalysisError;

/// Share of each observable's variance due to each shock.
///
/// Measurement error is excluded: shares are relative to the variance
/// generated by the structural shocks.
#[derive(Debug, Clone, PartialEq)]
pub struct VarianceDecomposition {
    horizon: Option<usize>,
    contributions: Array2<f64>,
    shares: Array2<f64>,
}

impl VarianceDecomposition {
    /// Forecast horizon, or `None` for the unconditional decomposition.
    pub fn horizon(&self) -> Option<usize> {
        self.horizon
    }

    /// Variance contributed by each shock (`observables × shocks`).
    pub fn contributions(&self) -> &Array2<f64> {
        &self.contributions
    }

    /// Contributions normalised to sum to one per observable; rows with
    /// zero total variance are all zero.
    pub fn shares(&self) -> &Array2<f64> {
        &self.shares
    }

    /// Total structural variance per observable.
    pub fn totals(&self) -> Array1<f64> {
        self.contributions.sum_axis(Axis(1))
    }
}

/// Decomposes the `h`-step forecast-error variance (`Some(h)`, `h ≥ 1`) or
/// the unconditional variance (`None`) of every observable.
///
/// # Errors
///
/// [`AnalysisError::EmptyHorizon`] for `Some(0)`; a
/// [`LinalgError::NotStable`](dsge_linalg::LinalgError::NotStable) for the
/// unconditional variance of a model with unit roots.
pub fn variance_decomposition(
    ss: &StateSpaceModel,
    horizon: Option<usize>,
) -> Result<VarianceDecomposition, AnalysisError> {
    let (a, b, c, d) = (ss.a(), ss.b(), ss.c(), ss.d());
    let (m, k) = (ss.n_observables(), ss.n_shocks());
    let impact = c.dot(b) + d;
    let mut contributions = Array2::zeros((m, k));

    match horizon {
        Some(0) => return Err(AnalysisError::EmptyHorizon),
        Some(h) => {
            let mut response = b.to_owned();
            for j in 0..h {
                let psi = if j == 0 { impact.clone() } else { c.dot(&response) };
                contributions += &psi.mapv(|v| v * v);
                response = a.dot(&response);
            }
        }
        None => {
            for shock in 0..k {
                let column = b.column(shock).to_owned().insert_axis(Axis(1));
                let sigma = lyapunov(a.view(), column.dot(&column.t()).view(), LyapunovOptions::default())?;
                let ca = c.dot(a);
                let carried = ca.dot(&sigma).dot(&ca.t());
                for i in 0..m {
                    contributions[[i, shock]] = carried[[i, i]] + impact[[i, shock]].powi(2);
                }
            }
        }
    }

    let mut shares = Array2::zeros((m, k));
    for (i, row) in contributions.rows().into_iter().enumerate() {
        let total = row.sum();
        if total > 0.0 {
            shares.row_mut(i).assign(&row.mapv(|v| v / total));
        }
    }
    Ok(VarianceDecomposition {
        horizon,
        contributions,
        shares,
    })
}

/// Each observable's smoothed path split into additive parts.
///
/// For every period `t` and observable `i`:
///
/// ```text
/// x_{t,i} = constant_i + initial_{t,i} + Σ_j shock_{j,t,i} + residual_{t,i}
/// ```
///
/// where `residual` is the smoothed measurement error (`NaN` where the
/// observation is missing).
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalDecomposition {
    constant: Array1<f64>,
    initial: Array2<f64>,
    shocks: Array3<f64>,
    residual: Array2<f64>,
}

impl HistoricalDecomposition {
    /// Observation constant.
    pub fn constant(&self) -> &Array1<f64> {
        &self.constant
    }

    /// Contribution of the smoothed initial state (`T × k`).
    pub fn initial_conditions(&self) -> &Array2<f64> {
        &self.initial
    }

    /// Contribution of shock `j` (`T × k`).
    pub fn shock_contribution(&self, shock: usize) -> Result<ArrayView2<'_, f64>, AnalysisError> {
        if shock >= self.shocks.len_of(Axis(0)) {
            return Err(AnalysisError::UnknownShock {
                index: shock,
                shocks: self.shocks.len_of(Axis(0)),
            });
        }
        Ok(self.shocks.index_axis(Axis(0), shock))
    }

    /// All shock contributions (`shocks × T × k`).
    pub fn shock_contributions(&self) -> &Array3<f64> {
        &self.shocks
    }

    /// Smoothed measurement error.
    pub fn residual(&self) -> &Array2<f64> {
        &self.residual
    }

    /// `constant + initial + Σ shocks`: the smoothed observables.
    pub fn fitted(&self) -> Array2<f64> {
        let mut fitted = &self.initial + &self.constant;
        fitted += &self.shocks.sum_axis(Axis(0));
        fitted
    }
}

/// Attributes each observable's history to the smoothed initial state and
/// the smoothed shocks.
pub fn historical_decomposition(
    ss: &StateSpaceModel,
    smoothed: &SmootherOutput,
    data: ArrayView2<'_, f64>,
) -> Result<HistoricalDecomposition, AnalysisError> {
    let means = smoothed.smoothed_means();
    let eps = smoothed.smoothed_shocks();
    let (t_len, n) = means.dim();
    let (m, k) = (ss.n_observables(), ss.n_shocks());
    if n != ss.n_states() {
        return Err(AnalysisError::DimensionMismatch {
            what: "smoothed state columns",
            expected: ss.n_states(),
            got: n,
        });
    }
    if data.nrows() != t_len {
        return Err(AnalysisError::DimensionMismatch {
            what: "data rows",
            expected: t_len,
            got: data.nrows(),
        });
    }
    if data.ncols() != m {
        return Err(AnalysisError::DimensionMismatch {
            what: "data columns",
            expected: m,
            got: data.ncols(),
        });
    }
    let (a, b, c, d) = (ss.a(), ss.b(), ss.c(), ss.d());
    let constant = ss.observation_constant().clone();

    let mut initial = Array2::zeros((t_len, m));
    let mut shocks = Array3::zeros((k, t_len, m));
    let mut residual = Array2::from_elem((t_len, m), f64::NAN);

    let mut initial_state = smoothed.initial_mean().clone();
    let mut shock_states = vec![Array1::<f64>::zeros(n); k];
    for t in 0..t_len {
        initial_state = a.dot(&initial_state);
        initial.row_mut(t).assign(&c.dot(&initial_state));
        for (j, state) in shock_states.iter_mut().enumerate() {
            let e = eps[[t, j]];
            *state = a.dot(&*state) + &b.column(j).mapv(|v| v * e);
            let x = c.dot(&*state) + &d.column(j).mapv(|v| v * e);
            shocks.index_axis_mut(Axis(0), j).row_mut(t).assign(&x);
        }
        let fitted = &constant + &c.dot(&means.row(t)) + &d.dot(&eps.row(t));
        for i in 0..m {
            let observed = data[[t, i]];
            if !observed.is_nan() {
                residual[[t, i]] = observed - fitted[i];
            }
        }
    }

    Ok(HistoricalDecomposition {
        constant,
        initial,
        shocks,
        residual,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn two_shock() -> StateSpaceModel {
        StateSpaceModel::new(
            array![[0.8, 0.0], [0.0, 0.3]],
            array![[1.0, 0.0], [0.0, 2.0]],
            array![[1.0, 1.0]],
            array![[0.0, 0.0]],
        )
        .unwrap()
    }

    #[test]
    fn one_step_shares_follow_impact() {
        let vd = variance_decomposition(&two_shock(), Some(1)).unwrap();
        assert_abs_diff_eq!(vd.contributions()[[0, 0]], 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(vd.contributions()[[0, 1]], 4.0, epsilon = 1e-15);
        assert_abs_diff_eq!(vd.shares()[[0, 0]], 0.2, epsilon = 1e-15);
    }

    #[test]
    fn long_horizon_converges_to_unconditional() {
        let ss = two_shock();
        let long = variance_decomposition(&ss, Some(400)).unwrap();
        let uncond = variance_decomposition(&ss, None).unwrap();
        assert_abs_diff_eq!(uncond.contributions()[[0, 0]], 1.0 / (1.0 - 0.64), epsilon = 1e-10);
        assert_abs_diff_eq!(uncond.contributions()[[0, 1]], 4.0 / (1.0 - 0.09), epsilon = 1e-10);
        for (x, y) in long.shares().iter().zip(uncond.shares().iter()) {
            assert_abs_diff_eq!(x, y, epsilon = 1e-10);
        }
        assert_eq!(uncond.horizon(), None);
    }

    #[test]
    fn zero_horizon_rejected() {
        assert_eq!(
            variance_decomposition(&two_shock(), Some(0)),
            Err(AnalysisError::EmptyHorizon)
        );
    }

    #[test]
    fn historical_reports_the_mismatched_dimension() {
        let ss = two_shock();
        let data = array![[0.5], [-0.2], [1.1]];
        let smoothed = dsge_kalman::KalmanFilter::default().smooth(&ss, data.view()).unwrap();

        let short = data.slice(ndarray::s![..2, ..]);
        assert_eq!(
            historical_decomposition(&ss, &smoothed, short).unwrap_err(),
            AnalysisError::DimensionMismatch {
                what: "data rows",
                expected: 3,
                got: 2,
            }
        );

        let wide = Array2::<f64>::zeros((3, 2));
        assert_eq!(
            historical_decomposition(&ss, &smoothed, wide.view()).unwrap_err(),
            AnalysisError::DimensionMismatch {
                what: "data columns",
                expected: 1,
                got: 2,
            }
        );
    }

    #[test]
    fn shares_sum_to_one() {
        let vd = variance_decomposition(&two_shock(), Some(7)).unwrap();
        assert_abs_diff_eq!(vd.shares().row(0).sum(), 1.0, epsilon = 1e-14);
    }
}
