//! Stochastic neoclassical growth model.
//!
//! ```text
//! 1/c_t           = β r_{t+1} / c_{t+1}
//! r_t             = α e^{z_t} k_{t-1}^{α-1} + 1 - δ
//! k_t + c_t       = e^{z_t} k_{t-1}^α + (1 - δ) k_{t-1}
//! z_t             = ρ z_{t-1} + σ_z ε_t
//! ```
//!
//! Variables are in levels, so perturbation works in level deviations.

use dsge_params::{Parameter, ParameterSet, ParamsError, Prior};
use ndarray::{Array1, ArrayView1, array};

use super::names;
use crate::system::{EquationSystem, Jacobians, Point};
use crate::variable::Variable;

const K: usize = 0;
const Z: usize = 1;
const C: usize = 2;
const R: usize = 3;

/// Real business cycle model with capital, technology, consumption and
/// the gross return on capital.
#[derive(Debug, Clone)]
pub struct Rbc {
    variables: Vec<Variable>,
    shocks: Vec<String>,
    parameters: Vec<String>,
}

impl Rbc {
    /// Creates the model.
    pub fn new() -> Self {
        Self {
            variables: vec![
                Variable::predetermined("k"),
                Variable::predetermined("z"),
                Variable::jump("c"),
                Variable::jump("r"),
            ],
            shocks: names(&["eps_z"]),
            parameters: names(&["alpha", "beta", "delta", "rho", "sigma_z"]),
        }
    }

    /// Quarterly calibration.
    pub fn default_parameters() -> Result<ParameterSet, ParamsError> {
        ParameterSet::from_parameters([
            Parameter::new("alpha", 0.33)
                .with_bounds(0.05, 0.95)
                .with_prior(Prior::Beta { mean: 0.33, sd: 0.05 }),
            Parameter::new("beta", 0.99).with_bounds(0.9, 0.9999),
            Parameter::new("delta", 0.025).with_bounds(0.0, 1.0),
            Parameter::new("rho", 0.95)
                .with_bounds(0.0, 0.9999)
                .with_prior(Prior::Beta { mean: 0.9, sd: 0.05 }),
            Parameter::new("sigma_z", 0.01)
                .with_bounds(1e-6, 1.0)
                .with_prior(Prior::InverseGamma { mean: 0.01, sd: 0.02 }),
        ])
    }
}

impl Default for Rbc {
    fn default() -> Self {
        Self::new()
    }
}

impl EquationSystem for Rbc {
    fn name(&self) -> &str {
        "rbc"
    }

    fn variables(&self) -> &[Variable] {
        &self.variables
    }

    fn shocks(&self) -> &[String] {
        &self.shocks
    }

    fn parameters(&self) -> &[String] {
        &self.parameters
    }

    fn evaluate(
        &self,
        lag: ArrayView1<'_, f64>,
        y: ArrayView1<'_, f64>,
        lead: ArrayView1<'_, f64>,
        e: ArrayView1<'_, f64>,
        theta: &[f64],
    ) -> Array1<f64> {
        let [alpha, beta, delta, rho, sigma_z] = [theta[0], theta[1], theta[2], theta[3], theta[4]];
        let tfp = y[Z].exp();
        array![
            1.0 / y[C] - beta * lead[R] / lead[C],
            y[R] - alpha * tfp * lag[K].powf(alpha - 1.0) - (1.0 - delta),
            y[K] + y[C] - tfp * lag[K].powf(alpha) - (1.0 - delta) * lag[K],
            y[Z] - rho * lag[Z] - sigma_z * e[0],
        ]
    }

    fn jacobians(&self, point: &Point, theta: &[f64]) -> Jacobians {
        let [alpha, beta, delta, rho, sigma_z] = [theta[0], theta[1], theta[2], theta[3], theta[4]];
        let (lag, y, lead) = (&point.lag, &point.current, &point.lead);
        let tfp = y[Z].exp();
        let k = lag[K];
        let mut j = Jacobians::zeros(4, 4, 1);

        j.current[[0, C]] = -1.0 / (y[C] * y[C]);
        j.lead[[0, R]] = -beta / lead[C];
        j.lead[[0, C]] = beta * lead[R] / (lead[C] * lead[C]);

        j.current[[1, R]] = 1.0;
        j.current[[1, Z]] = -alpha * tfp * k.powf(alpha - 1.0);
        j.lag[[1, K]] = -alpha * (alpha - 1.0) * tfp * k.powf(alpha - 2.0);

        j.current[[2, K]] = 1.0;
        j.current[[2, C]] = 1.0;
        j.current[[2, Z]] = -tfp * k.powf(alpha);
        j.lag[[2, K]] = -alpha * tfp * k.powf(alpha - 1.0) - (1.0 - delta);

        j.current[[3, Z]] = 1.0;
        j.lag[[3, Z]] = -rho;
        j.shocks[[3, 0]] = -sigma_z;
        j
    }

    fn steady_state(&self, theta: &[f64]) -> Option<Array1<f64>> {
        let [alpha, beta, delta] = [theta[0], theta[1], theta[2]];
        let r = 1.0 / beta;
        let k = (alpha / (r - 1.0 + delta)).powf(1.0 / (1.0 - alpha));
        let c = k.powf(alpha) - delta * k;
        if !(k.is_finite() && c.is_finite() && c > 0.0) {
            return None;
        }
        Some(array![k, 0.0, c, r])
    }

    fn initial_guess(&self, theta: &[f64]) -> Array1<f64> {
        self.steady_state(theta)
            .unwrap_or_else(|| array![10.0, 0.0, 1.0, 1.0])
    }
}
