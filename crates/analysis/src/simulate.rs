//! Deterministic and stochastic simulation of the state-space model.

use dsge_linalg::SpdFactor;
use dsge_model::StateSpaceModel;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use rand::Rng;
use rand_distr::StandardNormal;

use crate::error::AnalysisError;

/// Simulated paths.
///
/// `observables` include the observation constant, so they are in the
/// units of the data.
#[derive(Debug, Clone, PartialEq)]
pub struct Simulation {
    states: Array2<f64>,
    observables: Array2<f64>,
    shocks: Array2<f64>,
}

impl Simulation {
    /// State deviations (`T × n`).
    pub fn states(&self) -> &Array2<f64> {
        &self.states
    }

    /// Observables (`T × k`).
    pub fn observables(&self) -> &Array2<f64> {
        &self.observables
    }

    /// Shock path used (`T × shocks`).
    pub fn shocks(&self) -> &Array2<f64> {
        &self.shocks
    }
}

/// Runs `s_t = A s_{t-1} + B ε_t`, `x_t = c + C s_t + D ε_t` from `initial`
/// (the state before the first shock) along a given shock path.
pub fn simulate(
    ss: &StateSpaceModel,
    initial: ArrayView1<'_, f64>,
    shocks: ArrayView2<'_, f64>,
) -> Result<Simulation, AnalysisError> {
    if initial.len() != ss.n_states() {
        return Err(AnalysisError::DimensionMismatch {
            what: "initial state",
            expected: ss.n_states(),
            got: initial.len(),
        });
    }
    if shocks.ncols() != ss.n_shocks() {
        return Err(AnalysisError::DimensionMismatch {
            what: "shock columns",
            expected: ss.n_shocks(),
            got: shocks.ncols(),
        });
    }
    let t_len = shocks.nrows();
    let mut states = Array2::zeros((t_len, ss.n_states()));
    let mut observables = Array2::zeros((t_len, ss.n_observables()));
    let mut s = initial.to_owned();
    for t in 0..t_len {
        let e = shocks.row(t);
        s = ss.a().dot(&s) + ss.b().dot(&e);
        let x = ss.observation_constant() + &ss.c().dot(&s) + &ss.d().dot(&e);
        states.row_mut(t).assign(&s);
        observables.row_mut(t).assign(&x);
    }
    Ok(Simulation {
        states,
        observables,
        shocks: shocks.to_owned(),
    })
}

/// Draws `ε_t ~ N(0, I)` and measurement error `η_t ~ N(0, R)`, starting
/// from the steady state and discarding the first `burn_in` periods.
///
/// Reproducible for a seeded `rng`.
///
/// # Errors
///
/// [`AnalysisError::InvalidMeasurementCovariance`] if `R` is neither
/// positive definite nor diagonal with non-negative entries.
pub fn simulate_stochastic<R: Rng>(
    ss: &StateSpaceModel,
    periods: usize,
    burn_in: usize,
    rng: &mut R,
) -> Result<Simulation, AnalysisError> {
    let total = periods + burn_in;
    let shocks = Array2::from_shape_simple_fn((total, ss.n_shocks()), || rng.sample::<f64, _>(StandardNormal));
    let full = simulate(ss, Array1::zeros(ss.n_states()).view(), shocks.view())?;

    let factor = measurement_factor(ss.measurement_covariance())?;
    let mut observables = full.observables.slice(ndarray::s![burn_in.., ..]).to_owned();
    if let Some(lower) = factor {
        for mut row in observables.rows_mut() {
            let z: Array1<f64> = (0..lower.ncols()).map(|_| rng.sample::<f64, _>(StandardNormal)).collect();
            row += &lower.dot(&z);
        }
    }
    Ok(Simulation {
        states: full.states.slice(ndarray::s![burn_in.., ..]).to_owned(),
        observables,
        shocks: full.shocks.slice(ndarray::s![burn_in.., ..]).to_owned(),
    })
}

/// A matrix `L` with `L Lᵀ = R`, or `None` when `R = 0`.
fn measurement_factor(r: &Array2<f64>) -> Result<Option<Array2<f64>>, AnalysisError> {
    if r.iter().all(|&v| v == 0.0) {
        return Ok(None);
    }
    if let Ok(factor) = SpdFactor::new(r.view()) {
        return Ok(Some(factor.lower()));
    }
    let n = r.nrows();
    let diagonal = (0..n).all(|i| (0..n).all(|j| i == j || r[[i, j]] == 0.0));
    if diagonal && r.diag().iter().all(|&v| v >= 0.0) {
        return Ok(Some(Array2::from_diag(&r.diag().mapv(f64::sqrt))));
    }
    Err(AnalysisError::InvalidMeasurementCovariance)
}
