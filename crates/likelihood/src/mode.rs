//! Posterior mode search.

use argmin::core::{CostFunction, Executor, State};
use argmin::solver::neldermead::NelderMead;
use dsge_params::{Bounds, ParameterSet, from_unconstrained, to_unconstrained};
use tracing::debug;

use crate::engine::LikelihoodEngine;
use crate::error::EstimateError;

/// Settings for [`find_posterior_mode`].
///
/// # Example
///
/// ```
/// use dsge_likelihood::ModeConfig;
///
/// let config = ModeConfig::new()
///     .with_max_iterations(500)
///     .with_free_parameters(["rho", "sigma"]);
/// assert_eq!(config.max_iterations(), 500);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct ModeConfig {
    max_iterations: u64,
    sd_tolerance: f64,
    initial_step: f64,
    free_parameters: Option<Vec<String>>,
}

impl ModeConfig {
    /// 2000 iterations, simplex tolerance `1e-8`, initial step `0.5` in
    /// unconstrained units, every parameter free.
    pub fn new() -> Self {
        Self {
            max_iterations: 2000,
            sd_tolerance: 1e-8,
            initial_step: 0.5,
            free_parameters: None,
        }
    }

    /// Sets the iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the standard-deviation tolerance of the simplex cost values.
    pub fn with_sd_tolerance(mut self, tolerance: f64) -> Self {
        self.sd_tolerance = tolerance;
        self
    }

    /// Sets the initial simplex edge length.
    pub fn with_initial_step(mut self, step: f64) -> Self {
        self.initial_step = step;
        self
    }

    /// Restricts the search to the named parameters; the rest stay at
    /// their starting values.
    pub fn with_free_parameters<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.free_parameters = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Iteration cap.
    pub fn max_iterations(&self) -> u64 {
        self.max_iterations
    }

    /// Simplex tolerance.
    pub fn sd_tolerance(&self) -> f64 {
        self.sd_tolerance
    }

    /// Initial simplex edge length.
    pub fn initial_step(&self) -> f64 {
        self.initial_step
    }

    /// Parameters being optimised, or `None` for all.
    pub fn free_parameters(&self) -> Option<&[String]> {
        self.free_parameters.as_deref()
    }

    /// Validates the settings.
    pub fn validate(&self) -> Result<(), EstimateError> {
        if self.max_iterations == 0 {
            return Err(EstimateError::InvalidConfig {
                reason: "max_iterations must be at least 1".to_string(),
            });
        }
        if !(self.sd_tolerance.is_finite() && self.sd_tolerance > 0.0) {
            return Err(EstimateError::InvalidConfig {
                reason: format!("sd_tolerance must be positive, got {}", self.sd_tolerance),
            });
        }
        if !(self.initial_step.is_finite() && self.initial_step > 0.0) {
            return Err(EstimateError::InvalidConfig {
                reason: format!("initial_step must be positive, got {}", self.initial_step),
            });
        }
        Ok(())
    }
}

impl Default for ModeConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a mode search.
#[derive(Debug, Clone)]
pub struct PosteriorMode {
    parameters: ParameterSet,
    log_posterior: f64,
    log_likelihood: f64,
    iterations: u64,
}

impl PosteriorMode {
    /// Parameters at the mode.
    pub fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    /// Log posterior at the mode.
    pub fn log_posterior(&self) -> f64 {
        self.log_posterior
    }

    /// Log-likelihood at the mode.
    pub fn log_likelihood(&self) -> f64 {
        self.log_likelihood
    }

    /// Nelder–Mead iterations performed.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }
}

/// Maximises the log posterior with Nelder–Mead in unconstrained
/// coordinates, starting from `start`.
///
/// Rejected draws (no steady state, Blanchard–Kahn violations, filter
/// breakdown, zero prior density) cost `f64::MAX`, so the simplex simply
/// moves away from them.
#[tracing::instrument(skip_all, fields(model = engine.model().name()))]
pub fn find_posterior_mode(
    engine: &LikelihoodEngine,
    start: &ParameterSet,
    config: &ModeConfig,
) -> Result<PosteriorMode, EstimateError> {
    config.validate()?;
    let free: Vec<usize> = match config.free_parameters() {
        None => (0..start.len()).collect(),
        Some(names) => names
            .iter()
            .map(|name| start.index_of(name).ok_or_else(|| EstimateError::UnknownParameter(name.clone())))
            .collect::<Result<_, _>>()?,
    };

    let start_posterior = engine.log_posterior(start).map_err(EstimateError::InfeasibleStart)?;
    if start_posterior == f64::NEG_INFINITY {
        return Err(EstimateError::ZeroPriorDensity);
    }
    if free.is_empty() {
        return finish(engine, start.clone(), 0);
    }

    let declared: Vec<_> = start.iter().collect();
    let values = start.values();
    let bounds: Vec<Bounds> = free.iter().map(|&i| declared[i].bounds()).collect();
    let mut origin = Vec::with_capacity(free.len());
    for (&i, &b) in free.iter().zip(&bounds) {
        let y = to_unconstrained(b, values[i]);
        if !y.is_finite() {
            return Err(EstimateError::StartOnBound(declared[i].name().to_string()));
        }
        origin.push(y);
    }

    let mut simplex = Vec::with_capacity(free.len() + 1);
    simplex.push(origin.clone());
    for k in 0..free.len() {
        let mut vertex = origin.clone();
        vertex[k] += config.initial_step();
        simplex.push(vertex);
    }

    let cost = PosteriorCost {
        engine,
        start,
        free: &free,
        bounds: &bounds,
    };
    let solver = NelderMead::new(simplex)
        .with_sd_tolerance(config.sd_tolerance())
        .map_err(|e| EstimateError::Optimization { reason: e.to_string() })?;
    let result = Executor::new(cost, solver)
        .configure(|state| state.max_iters(config.max_iterations()))
        .run()
        .map_err(|e| EstimateError::Optimization { reason: e.to_string() })?;

    let state = result.state();
    let iterations = state.get_iter();
    let best = state.best_param.as_ref().ok_or_else(|| EstimateError::Optimization {
        reason: "optimiser returned no parameters".to_string(),
    })?;
    let parameters = constrained(start, &free, &bounds, best)?;
    debug!(iterations, best_cost = state.get_best_cost(), "nelder-mead finished");
    finish(engine, parameters, iterations)
}

fn finish(engine: &LikelihoodEngine, parameters: ParameterSet, iterations: u64) -> Result<PosteriorMode, EstimateError> {
    let log_prior = engine.log_prior(&parameters).map_err(EstimateError::InfeasibleStart)?;
    let log_likelihood = engine
        .log_likelihood(&parameters)
        .map_err(EstimateError::InfeasibleStart)?;
    Ok(PosteriorMode {
        parameters,
        log_posterior: log_prior + log_likelihood,
        log_likelihood,
        iterations,
    })
}

/// Replaces the free parameters of `start` by the images of `y`.
fn constrained(start: &ParameterSet, free: &[usize], bounds: &[Bounds], y: &[f64]) -> Result<ParameterSet, EstimateError> {
    let mut values = start.values();
    for ((&i, &b), &yk) in free.iter().zip(bounds).zip(y) {
        values[i] = from_unconstrained(b, yk);
    }
    Ok(start.with_values(&values)?)
}

/// Negative log posterior as a function of the unconstrained free parameters.
struct PosteriorCost<'a> {
    engine: &'a LikelihoodEngine,
    start: &'a ParameterSet,
    free: &'a [usize],
    bounds: &'a [Bounds],
}

impl CostFunction for PosteriorCost<'_> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, y: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
        let Ok(params) = constrained(self.start, self.free, self.bounds, y) else {
            return Ok(f64::MAX);
        };
        let lp = self.engine.log_posterior_or_reject(&params);
        Ok(if lp.is_finite() { -lp } else { f64::MAX })
    }
}
