//! Parameter draw → log-likelihood.

use dsge_kalman::KalmanFilter;
use dsge_model::Model;
use dsge_params::ParameterSet;
use dsge_perturbation::{FirstOrderSolution, ObservationMapping, PerturbationSolver};
use ndarray::Array2;
use rayon::prelude::*;
use tracing::debug;

use crate::error::{EstimateError, FailureReason};

/// The solve → filter pipeline for one model and one data set.
///
/// Every evaluation works on the [`ParameterSet`] snapshot it is given and
/// touches no shared mutable state, so one engine can be shared across
/// threads and evaluated concurrently. Identical inputs give bit-identical
/// outputs.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use dsge_likelihood::LikelihoodEngine;
/// use dsge_model::{Model, models::Ar1};
/// use dsge_perturbation::ObservationMapping;
/// use ndarray::array;
///
/// let params = Ar1::default_parameters().unwrap();
/// let model = Model::new(Arc::new(Ar1::new()), &params).unwrap();
/// let data = array![[0.1], [0.4], [-0.2]];
/// let engine = LikelihoodEngine::new(model, ObservationMapping::deviations(["y"]), data).unwrap();
/// assert!(engine.log_likelihood(&params).unwrap().is_finite());
///
/// let persistent = params.with_value("rho", 0.99).unwrap();
/// assert!(engine.log_posterior_or_reject(&persistent).is_finite());
/// ```
#[derive(Debug, Clone)]
pub struct LikelihoodEngine {
    model: Model,
    mapping: ObservationMapping,
    data: Array2<f64>,
    solver: PerturbationSolver,
    filter: KalmanFilter,
}

impl LikelihoodEngine {
    /// Binds a model, an observation mapping and a `T × k` data matrix
    /// (`NaN` = missing, columns in mapping order).
    ///
    /// # Errors
    ///
    /// Shape problems fail here rather than inside an estimation loop:
    /// [`EstimateError::Mapping`] for observables naming unknown variables,
    /// [`EstimateError::DimensionMismatch`] when the data has the wrong
    /// number of columns and [`EstimateError::EmptyData`] when it has no rows.
    pub fn new(model: Model, mapping: ObservationMapping, data: Array2<f64>) -> Result<Self, EstimateError> {
        mapping.validate(&model).map_err(EstimateError::Mapping)?;
        if data.ncols() != mapping.len() {
            return Err(EstimateError::DimensionMismatch {
                what: "data columns",
                expected: mapping.len(),
                got: data.ncols(),
            });
        }
        if data.nrows() == 0 {
            return Err(EstimateError::EmptyData);
        }
        Ok(Self {
            model,
            mapping,
            data,
            solver: PerturbationSolver::default(),
            filter: KalmanFilter::default(),
        })
    }

    /// Replaces the steady-state and perturbation settings.
    pub fn with_solver(mut self, solver: PerturbationSolver) -> Self {
        self.solver = solver;
        self
    }

    /// Replaces the filter settings.
    pub fn with_filter(mut self, filter: KalmanFilter) -> Self {
        self.filter = filter;
        self
    }

    /// The bound model.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// The observation mapping.
    pub fn mapping(&self) -> &ObservationMapping {
        &self.mapping
    }

    /// The observation matrix.
    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    /// The perturbation solver.
    pub fn solver(&self) -> &PerturbationSolver {
        &self.solver
    }

    /// The filter.
    pub fn filter(&self) -> &KalmanFilter {
        &self.filter
    }

    /// Steady state and first-order solution at `params`.
    pub fn solve(&self, params: &ParameterSet) -> Result<FirstOrderSolution, FailureReason> {
        Ok(self.solver.solve_model(&self.model, params, &self.mapping)?)
    }

    /// Log-likelihood of the data at `params`.
    #[tracing::instrument(level = "debug", skip_all, fields(model = self.model.name()))]
    pub fn log_likelihood(&self, params: &ParameterSet) -> Result<f64, FailureReason> {
        let result = self.solve(params).and_then(|solution| {
            self.filter
                .log_likelihood(solution.state_space(), self.data.view())
                .map_err(FailureReason::from)
        });
        if let Err(reason) = &result {
            debug!(kind = reason.kind(), %reason, "draw rejected");
        }
        result
    }

    /// [`LikelihoodEngine::log_likelihood`] with every failure mapped to `-∞`.
    pub fn log_likelihood_or_reject(&self, params: &ParameterSet) -> f64 {
        self.log_likelihood(params).unwrap_or(f64::NEG_INFINITY)
    }

    /// Sum of the declared priors' log densities.
    pub fn log_prior(&self, params: &ParameterSet) -> Result<f64, FailureReason> {
        Ok(params.log_prior()?)
    }

    /// Log prior plus log-likelihood. Draws with zero prior density are
    /// returned as `-∞` without solving the model.
    pub fn log_posterior(&self, params: &ParameterSet) -> Result<f64, FailureReason> {
        let prior = self.log_prior(params)?;
        if prior == f64::NEG_INFINITY {
            return Ok(prior);
        }
        Ok(prior + self.log_likelihood(params)?)
    }

    /// [`LikelihoodEngine::log_posterior`] with every failure mapped to `-∞`.
    pub fn log_posterior_or_reject(&self, params: &ParameterSet) -> f64 {
        self.log_posterior(params).unwrap_or(f64::NEG_INFINITY)
    }

    /// Evaluates many independent draws in parallel. Results are in input
    /// order and each failure stays local to its own draw.
    pub fn log_posterior_batch(&self, draws: &[ParameterSet]) -> Vec<Result<f64, FailureReason>> {
        draws.par_iter().map(|params| self.log_posterior(params)).collect()
    }
}
