//! The perturbation solver and its output.

use dsge_linalg::spectral_radius;
use dsge_model::{Model, Point, StateSpaceModel};
use dsge_params::ParameterSet;
use dsge_steady::{SteadyState, SteadyStateSolver};
use ndarray::Array2;
use num_complex::Complex64;

use crate::config::{Order, PerturbationConfig};
use crate::error::SolutionError;
use crate::observation::{ObservationMapping, assemble};
use crate::policy::solve_policy;

/// First-order solution of a model at one parameter draw.
#[derive(Debug, Clone)]
pub struct FirstOrderSolution {
    steady_state: SteadyState,
    g_y: Array2<f64>,
    g_u: Array2<f64>,
    eigenvalues: Vec<Complex64>,
    state_space: StateSpaceModel,
}

impl FirstOrderSolution {
    /// Steady state the solution is expanded around.
    pub fn steady_state(&self) -> &SteadyState {
        &self.steady_state
    }

    /// `∂y_t/∂y_{t-1}` (`n × n`; columns of jump variables are zero).
    pub fn g_y(&self) -> &Array2<f64> {
        &self.g_y
    }

    /// `∂y_t/∂ε_t` (`n × k`).
    pub fn g_u(&self) -> &Array2<f64> {
        &self.g_u
    }

    /// Generalized eigenvalues, stable ones first; infinite roots are
    /// reported with an infinite real part.
    pub fn eigenvalues(&self) -> &[Complex64] {
        &self.eigenvalues
    }

    /// The assembled state-space model.
    pub fn state_space(&self) -> &StateSpaceModel {
        &self.state_space
    }

    /// Consumes the solution, keeping only the state-space model.
    pub fn into_state_space(self) -> StateSpaceModel {
        self.state_space
    }
}

/// Caller-owned perturbation solver holding only configuration.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use dsge_model::{Model, models::Ar1};
/// use dsge_perturbation::{ObservationMapping, PerturbationSolver};
///
/// let params = Ar1::default_parameters().unwrap();
/// let model = Model::new(Arc::new(Ar1::new()), &params).unwrap();
/// let solver = PerturbationSolver::default();
/// let solution = solver
///     .solve_model(&model, &params, &ObservationMapping::deviations(["y"]))
///     .unwrap();
/// assert!((solution.state_space().a()[[0, 0]] - 0.9).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PerturbationSolver {
    config: PerturbationConfig,
    steady: SteadyStateSolver,
}

impl PerturbationSolver {
    /// Creates a solver with a default steady-state solver.
    pub fn new(config: PerturbationConfig) -> Self {
        Self {
            config,
            steady: SteadyStateSolver::default(),
        }
    }

    /// Replaces the steady-state solver.
    pub fn with_steady_state_solver(mut self, steady: SteadyStateSolver) -> Self {
        self.steady = steady;
        self
    }

    /// Perturbation settings.
    pub fn config(&self) -> &PerturbationConfig {
        &self.config
    }

    /// Computes the steady state from the model's initial guess.
    pub fn steady_state(&self, model: &Model, params: &ParameterSet) -> Result<SteadyState, SolutionError> {
        Ok(self.steady.solve(model, params, None)?)
    }

    /// Steady state followed by [`PerturbationSolver::solve`].
    pub fn solve_model(
        &self,
        model: &Model,
        params: &ParameterSet,
        mapping: &ObservationMapping,
    ) -> Result<FirstOrderSolution, SolutionError> {
        let steady = self.steady_state(model, params)?;
        self.solve(model, params, &steady, mapping)
    }

    /// Linearizes around `steady` and solves for the stable policy.
    ///
    /// # Errors
    ///
    /// Blanchard–Kahn violations are reported as
    /// [`SolutionError::NoStableSolution`] (too few explosive roots) or
    /// [`SolutionError::Unstable`] (too many). See [`SolutionError`] for the rest.
    #[tracing::instrument(skip_all, fields(model = model.name()))]
    pub fn solve(
        &self,
        model: &Model,
        params: &ParameterSet,
        steady: &SteadyState,
        mapping: &ObservationMapping,
    ) -> Result<FirstOrderSolution, SolutionError> {
        self.config.validate()?;
        match self.config.order() {
            Order::First => {}
        }
        let theta = model.theta(params)?;
        let ybar = steady.values();
        if ybar.len() != model.n_variables() {
            return Err(SolutionError::Model(dsge_model::ModelError::DimensionMismatch {
                what: "steady state",
                expected: model.n_variables(),
                got: ybar.len(),
            }));
        }

        let jac = model.jacobians(&Point::steady(ybar, model.n_shocks()), &theta);
        if !jac.is_finite() {
            return Err(SolutionError::NonFinite);
        }

        let policy = solve_policy(model, &jac, &self.config)?;
        let state_space = assemble(model, &policy, ybar, mapping)?;

        let radius = spectral_radius(state_space.a().view())?;
        let limit = if self.config.allow_unit_roots() {
            self.config.qz_criterium()
        } else {
            1.0
        };
        if radius > limit || (!self.config.allow_unit_roots() && radius >= 1.0) {
            return Err(SolutionError::NonStationaryTransition { radius });
        }
        tracing::debug!(radius, states = state_space.n_states(), "solution assembled");

        Ok(FirstOrderSolution {
            steady_state: steady.clone(),
            g_y: policy.g_y,
            g_u: policy.g_u,
            eigenvalues: policy.eigenvalues,
            state_space,
        })
    }
}
