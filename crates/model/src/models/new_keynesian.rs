//! Three-equation New Keynesian model in deviations from steady state.
//!
//! ```text
//! x_t  = x_{t+1} - (1/σ)(i_t - π_{t+1}) + g_t        IS curve
//! π_t  = β π_{t+1} + κ x_t + u_t                     Phillips curve
//! i_t  = φ_π π_t + φ_x x_t + σ_i ε^i_t               Taylor rule
//! g_t  = ρ_g g_{t-1} + σ_g ε^g_t
//! u_t  = ρ_u u_{t-1} + σ_u ε^u_t
//! ```
//!
//! Determinate iff the Taylor principle holds (roughly `φ_π > 1`).

use dsge_params::{Parameter, ParameterSet, ParamsError, Prior};
use ndarray::{Array1, ArrayView1, array};

use super::names;
use crate::system::{EquationSystem, Jacobians, Point};
use crate::variable::Variable;

const G: usize = 0;
const U: usize = 1;
const X: usize = 2;
const PI: usize = 3;
const I: usize = 4;

/// Three-equation New Keynesian model.
#[derive(Debug, Clone)]
pub struct NewKeynesian {
    variables: Vec<Variable>,
    shocks: Vec<String>,
    parameters: Vec<String>,
}

impl NewKeynesian {
    /// Creates the model.
    pub fn new() -> Self {
        Self {
            variables: vec![
                Variable::predetermined("g"),
                Variable::predetermined("u"),
                Variable::jump("x"),
                Variable::jump("pi"),
                Variable::jump("i"),
            ],
            shocks: names(&["eps_g", "eps_u", "eps_i"]),
            parameters: names(&[
                "sigma", "beta", "kappa", "phi_pi", "phi_x", "rho_g", "rho_u", "sigma_g",
                "sigma_u", "sigma_i",
            ]),
        }
    }

    /// A standard quarterly calibration with estimation priors.
    pub fn default_parameters() -> Result<ParameterSet, ParamsError> {
        let sd_prior = |mean: f64| Prior::InverseGamma { mean, sd: 2.0 * mean };
        ParameterSet::from_parameters([
            Parameter::new("sigma", 1.0)
                .with_bounds(0.1, 10.0)
                .with_prior(Prior::Gamma { mean: 1.0, sd: 0.3 }),
            Parameter::new("beta", 0.99).with_bounds(0.9, 0.9999),
            Parameter::new("kappa", 0.1)
                .with_bounds(1e-4, 2.0)
                .with_prior(Prior::Gamma { mean: 0.1, sd: 0.05 }),
            Parameter::new("phi_pi", 1.5)
                .with_bounds(0.0, 5.0)
                .with_prior(Prior::Gamma { mean: 1.5, sd: 0.25 }),
            Parameter::new("phi_x", 0.125)
                .with_bounds(0.0, 2.0)
                .with_prior(Prior::Gamma { mean: 0.125, sd: 0.05 }),
            Parameter::new("rho_g", 0.8)
                .with_bounds(0.0, 0.999)
                .with_prior(Prior::Beta { mean: 0.8, sd: 0.1 }),
            Parameter::new("rho_u", 0.5)
                .with_bounds(0.0, 0.999)
                .with_prior(Prior::Beta { mean: 0.5, sd: 0.2 }),
            Parameter::new("sigma_g", 0.01)
                .with_bounds(1e-6, 1.0)
                .with_prior(sd_prior(0.01)),
            Parameter::new("sigma_u", 0.005)
                .with_bounds(1e-6, 1.0)
                .with_prior(sd_prior(0.005)),
            Parameter::new("sigma_i", 0.0025)
                .with_bounds(1e-6, 1.0)
                .with_prior(sd_prior(0.0025)),
        ])
    }
}

impl Default for NewKeynesian {
    fn default() -> Self {
        Self::new()
    }
}

struct Theta {
    sigma: f64,
    beta: f64,
    kappa: f64,
    phi_pi: f64,
    phi_x: f64,
    rho_g: f64,
    rho_u: f64,
    sigma_g: f64,
    sigma_u: f64,
    sigma_i: f64,
}

impl Theta {
    fn from_slice(t: &[f64]) -> Self {
        Self {
            sigma: t[0],
            beta: t[1],
            kappa: t[2],
            phi_pi: t[3],
            phi_x: t[4],
            rho_g: t[5],
            rho_u: t[6],
            sigma_g: t[7],
            sigma_u: t[8],
            sigma_i: t[9],
        }
    }
}

impl EquationSystem for NewKeynesian {
    fn name(&self) -> &str {
        "new_keynesian"
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
        let p = Theta::from_slice(theta);
        array![
            y[X] - lead[X] + (y[I] - lead[PI]) / p.sigma - y[G],
            y[PI] - p.beta * lead[PI] - p.kappa * y[X] - y[U],
            y[I] - p.phi_pi * y[PI] - p.phi_x * y[X] - p.sigma_i * e[2],
            y[G] - p.rho_g * lag[G] - p.sigma_g * e[0],
            y[U] - p.rho_u * lag[U] - p.sigma_u * e[1],
        ]
    }

    fn jacobians(&self, _point: &Point, theta: &[f64]) -> Jacobians {
        let p = Theta::from_slice(theta);
        let mut j = Jacobians::zeros(5, 5, 3);

        j.current[[0, X]] = 1.0;
        j.current[[0, I]] = 1.0 / p.sigma;
        j.current[[0, G]] = -1.0;
        j.lead[[0, X]] = -1.0;
        j.lead[[0, PI]] = -1.0 / p.sigma;

        j.current[[1, PI]] = 1.0;
        j.current[[1, X]] = -p.kappa;
        j.current[[1, U]] = -1.0;
        j.lead[[1, PI]] = -p.beta;

        j.current[[2, I]] = 1.0;
        j.current[[2, PI]] = -p.phi_pi;
        j.current[[2, X]] = -p.phi_x;
        j.shocks[[2, 2]] = -p.sigma_i;

        j.current[[3, G]] = 1.0;
        j.lag[[3, G]] = -p.rho_g;
        j.shocks[[3, 0]] = -p.sigma_g;

        j.current[[4, U]] = 1.0;
        j.lag[[4, U]] = -p.rho_u;
        j.shocks[[4, 1]] = -p.sigma_u;
        j
    }

    fn steady_state(&self, _theta: &[f64]) -> Option<Array1<f64>> {
        Some(Array1::zeros(5))
    }
}
