//! Damped Newton iteration on the static residual system.

use dsge_linalg::solve_vec;
use dsge_model::{Budget, Model, Point};
use dsge_params::ParameterSet;
use ndarray::{Array1, ArrayView1};
use tracing::{debug, warn};

use crate::config::SteadyStateConfig;
use crate::error::SteadyStateError;

/// Sufficient-decrease constant for the backtracking line search.
const ARMIJO: f64 = 1e-4;

/// A converged steady state.
#[derive(Debug, Clone, PartialEq)]
pub struct SteadyState {
    values: Array1<f64>,
    iterations: usize,
    max_residual: f64,
}

impl SteadyState {
    /// Wraps a vector already known to solve the model, e.g. a closed form.
    pub fn new(values: Array1<f64>, iterations: usize, max_residual: f64) -> Self {
        Self {
            values,
            iterations,
            max_residual,
        }
    }

    /// `ȳ`, ordered like the model's variables.
    pub fn values(&self) -> &Array1<f64> {
        &self.values
    }

    /// Newton iterations used (0 if the guess already solved the system).
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Maximum absolute residual at `ȳ`.
    pub fn max_residual(&self) -> f64 {
        self.max_residual
    }
}

/// Caller-owned steady-state solver. Holds only configuration.
#[derive(Debug, Clone, Default)]
pub struct SteadyStateSolver {
    config: SteadyStateConfig,
}

impl SteadyStateSolver {
    /// Creates a solver.
    pub fn new(config: SteadyStateConfig) -> Self {
        Self { config }
    }

    /// The solver's configuration.
    pub fn config(&self) -> &SteadyStateConfig {
        &self.config
    }

    /// Finds `ȳ` with `r(ȳ, ȳ, ȳ, 0; θ) ≈ 0`.
    ///
    /// Starts from `guess`, or from the model's initial guess when `None`
    /// (its closed-form steady state if it has one).
    ///
    /// # Errors
    ///
    /// See [`SteadyStateError`]. A poor approximation is never returned:
    /// failure reports the best residual reached and the equations that
    /// still violate the tolerance.
    #[tracing::instrument(skip_all, fields(model = model.name()))]
    pub fn solve(
        &self,
        model: &Model,
        params: &ParameterSet,
        guess: Option<&Array1<f64>>,
    ) -> Result<SteadyState, SteadyStateError> {
        self.config.validate()?;
        let theta = model.theta(params)?;
        let x0 = match guess {
            Some(g) => g.clone(),
            None => model.system().initial_guess(&theta),
        };
        self.solve_theta(model, &theta, x0)
    }

    fn solve_theta(
        &self,
        model: &Model,
        theta: &[f64],
        mut x: Array1<f64>,
    ) -> Result<SteadyState, SteadyStateError> {
        let n = model.n_variables();
        if x.len() != n {
            return Err(SteadyStateError::InvalidGuess {
                expected: n,
                got: x.len(),
            });
        }
        let tol = self.config.tolerance();
        let budget = Budget::start(self.config.timeout());

        let mut f = model.steady_residuals(x.view(), theta);
        let bad: Vec<usize> = (0..n).filter(|&i| !f[i].is_finite()).collect();
        if !bad.is_empty() {
            return Err(SteadyStateError::NonFinite { equations: bad });
        }

        let mut iterations = 0;
        loop {
            let max_residual = max_abs(f.view());
            if max_residual < tol {
                debug!(iterations, max_residual, "steady state converged");
                return Ok(SteadyState::new(x, iterations, max_residual));
            }
            if iterations >= self.config.max_iterations() {
                return Err(not_converged(f.view(), tol, iterations));
            }
            if budget.exhausted() {
                warn!(iterations, max_residual, "steady-state budget exhausted");
                return Err(SteadyStateError::BudgetExhausted {
                    iterations,
                    max_residual,
                });
            }

            let jac = model
                .jacobians(&Point::steady(&x, model.n_shocks()), theta)
                .static_jacobian();
            let neg_f = f.mapv(|v| -v);
            let dx = solve_vec(jac.view(), neg_f.view())
                .map_err(|_| SteadyStateError::SingularJacobian { iteration: iterations })?;

            let merit = 0.5 * f.dot(&f);
            let mut step = 1.0;
            let accepted = loop {
                let trial = &x + &(&dx * step);
                let f_trial = model.steady_residuals(trial.view(), theta);
                if f_trial.iter().all(|v| v.is_finite()) {
                    let trial_merit = 0.5 * f_trial.dot(&f_trial);
                    if trial_merit <= (1.0 - 2.0 * ARMIJO * step) * merit {
                        break Some((trial, f_trial));
                    }
                }
                step *= 0.5;
                if step < self.config.min_step() {
                    break None;
                }
            };
            iterations += 1;
            match accepted {
                Some((trial, f_trial)) => {
                    x = trial;
                    f = f_trial;
                    debug!(iteration = iterations, step, max_residual = max_abs(f.view()), "newton step");
                }
                None => {
                    debug!(iteration = iterations, "line search stalled");
                    return Err(not_converged(f.view(), tol, iterations));
                }
            }
        }
    }
}

fn max_abs(v: ArrayView1<'_, f64>) -> f64 {
    v.iter().fold(0.0_f64, |m, x| m.max(x.abs()))
}

fn not_converged(f: ArrayView1<'_, f64>, tol: f64, iterations: usize) -> SteadyStateError {
    SteadyStateError::NotConverged {
        max_residual: max_abs(f),
        equations: (0..f.len()).filter(|&i| f[i].abs() >= tol).collect(),
        iterations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use dsge_model::models::Rbc;
    use std::sync::Arc;

    fn rbc() -> (Model, ParameterSet) {
        let params = Rbc::default_parameters().unwrap();
        let model = Model::new(Arc::new(Rbc::new()), &params).unwrap();
        (model, params)
    }

    #[test]
    fn converges_from_perturbed_guess() {
        let (model, params) = rbc();
        let theta = model.theta(&params).unwrap();
        let exact = model.system().steady_state(&theta).unwrap();
        let guess = &exact * 1.2;
        let ss = SteadyStateSolver::default()
            .solve(&model, &params, Some(&guess))
            .unwrap();
        for (a, b) in ss.values().iter().zip(exact.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-8);
        }
        assert!(ss.iterations() > 0);
        assert!(ss.max_residual() < 1e-10);
    }

    #[test]
    fn wrong_guess_length() {
        let (model, params) = rbc();
        let guess = Array1::ones(2);
        assert_eq!(
            SteadyStateSolver::default().solve(&model, &params, Some(&guess)),
            Err(SteadyStateError::InvalidGuess { expected: 4, got: 2 })
        );
    }

    #[test]
    fn non_finite_start_reported() {
        let (model, params) = rbc();
        // zero consumption divides by zero in the Euler equation
        let guess = Array1::from(vec![30.0, 0.0, 0.0, 1.0]);
        let err = SteadyStateSolver::default()
            .solve(&model, &params, Some(&guess))
            .unwrap_err();
        assert_eq!(err, SteadyStateError::NonFinite { equations: vec![0] });
    }

    #[test]
    fn iteration_cap_reports_best_residual() {
        let (model, params) = rbc();
        let theta = model.theta(&params).unwrap();
        let guess = model.system().steady_state(&theta).unwrap() * 1.5;
        let solver = SteadyStateSolver::new(SteadyStateConfig::new().with_max_iterations(1));
        match solver.solve(&model, &params, Some(&guess)) {
            Err(SteadyStateError::NotConverged {
                max_residual,
                equations,
                iterations,
            }) => {
                assert_eq!(iterations, 1);
                assert!(max_residual > 1e-10);
                assert!(!equations.is_empty());
            }
            other => panic!("expected NotConverged, got {other:?}"),
        }
    }
}
