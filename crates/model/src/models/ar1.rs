//! `y_t = ρ y_{t-1} + σ ε_t`.

use dsge_params::{Parameter, ParameterSet, ParamsError, Prior};
use ndarray::{Array1, ArrayView1, array};

use super::names;
use crate::system::{EquationSystem, Jacobians, Point};
use crate::variable::Variable;

/// Univariate autoregression; the smallest model with a closed-form
/// solution (`A = [ρ]`, `B = [σ]`).
#[derive(Debug, Clone)]
pub struct Ar1 {
    variables: Vec<Variable>,
    shocks: Vec<String>,
    parameters: Vec<String>,
}

impl Ar1 {
    /// Creates the model.
    pub fn new() -> Self {
        Self {
            variables: vec![Variable::predetermined("y")],
            shocks: names(&["e"]),
            parameters: names(&["rho", "sigma"]),
        }
    }

    /// `ρ = 0.9`, `σ = 1`; uniform prior on `ρ`, inverse gamma on `σ`.
    pub fn default_parameters() -> Result<ParameterSet, ParamsError> {
        ParameterSet::from_parameters([
            Parameter::new("rho", 0.9)
                .with_bounds(-0.9999, 0.9999)
                .with_prior(Prior::Uniform { lower: -0.9999, upper: 0.9999 }),
            Parameter::new("sigma", 1.0)
                .with_bounds(1e-6, f64::INFINITY)
                .with_prior(Prior::InverseGamma { mean: 1.0, sd: 2.0 }),
        ])
    }
}

impl Default for Ar1 {
    fn default() -> Self {
        Self::new()
    }
}

impl EquationSystem for Ar1 {
    fn name(&self) -> &str {
        "ar1"
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
        current: ArrayView1<'_, f64>,
        _lead: ArrayView1<'_, f64>,
        shocks: ArrayView1<'_, f64>,
        theta: &[f64],
    ) -> Array1<f64> {
        let (rho, sigma) = (theta[0], theta[1]);
        array![current[0] - rho * lag[0] - sigma * shocks[0]]
    }

    fn jacobians(&self, _point: &Point, theta: &[f64]) -> Jacobians {
        let mut jac = Jacobians::zeros(1, 1, 1);
        jac.lag[[0, 0]] = -theta[0];
        jac.current[[0, 0]] = 1.0;
        jac.shocks[[0, 0]] = -theta[1];
        jac
    }

    fn steady_state(&self, _theta: &[f64]) -> Option<Array1<f64>> {
        Some(array![0.0])
    }
}
