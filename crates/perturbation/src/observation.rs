//! Mapping from model variables to observed series.
//!
//! | Transform | Observed value | Row of `C` | Constant |
//! |-----------|----------------|------------|----------|
//! | `Level` | `y_t` | `e_i` | `ȳ_i + offset` |
//! | `Deviation` | `y_t - ȳ_i` | `e_i` | `offset` |
//! | `LogDeviation` | `ln y_t - ln ȳ_i ≈ ŷ_t / ȳ_i` | `e_i / ȳ_i` | `offset` |
//! | `Difference` | `y_t - y_{t-1}` | `e_i - e_i(-1)` | `offset` |
//! | `GrowthRate` | `ln y_t - ln y_{t-1} ≈ (ŷ_t - ŷ_{t-1}) / ȳ_i` | `(e_i - e_i(-1)) / ȳ_i` | `offset` |
//!
//! `Difference` and `GrowthRate` need last period's value, so the state
//! vector is extended with a lagged copy of each such variable.

use dsge_model::{Model, StateSpaceModel};
use ndarray::{Array1, Array2};

use crate::error::SolutionError;
use crate::policy::Policy;

/// How a model variable is transformed into an observed series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// The variable's level.
    Level,
    /// Deviation from steady state.
    Deviation,
    /// Log deviation from steady state (requires `ȳ > 0`).
    LogDeviation,
    /// First difference.
    Difference,
    /// Log growth rate (requires `ȳ > 0`).
    GrowthRate,
}

impl Transform {
    fn needs_lag(self) -> bool {
        matches!(self, Transform::Difference | Transform::GrowthRate)
    }
}

/// One observed series.
#[derive(Debug, Clone, PartialEq)]
pub struct Observable {
    name: String,
    variable: String,
    transform: Transform,
    offset: f64,
    measurement_sd: f64,
}

impl Observable {
    /// Observes `variable` under `transform`, with no offset and no
    /// measurement error.
    pub fn new(name: impl Into<String>, variable: impl Into<String>, transform: Transform) -> Self {
        Self {
            name: name.into(),
            variable: variable.into(),
            transform,
            offset: 0.0,
            measurement_sd: 0.0,
        }
    }

    /// Adds a constant to the observed series (e.g. a trend growth rate).
    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    /// Sets the measurement-error standard deviation.
    pub fn with_measurement_error(mut self, sd: f64) -> Self {
        self.measurement_sd = sd;
        self
    }

    /// Series name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Model variable observed.
    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// Transform applied.
    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Constant added.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Measurement-error standard deviation.
    pub fn measurement_sd(&self) -> f64 {
        self.measurement_sd
    }
}

/// Ordered list of observed series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationMapping {
    observables: Vec<Observable>,
}

impl ObservationMapping {
    /// An empty mapping (no observables).
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an observable.
    pub fn with(mut self, observable: Observable) -> Self {
        self.observables.push(observable);
        self
    }

    /// Observes each named variable as a deviation from steady state,
    /// naming the series after the variable.
    pub fn deviations<'a>(variables: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            observables: variables
                .into_iter()
                .map(|v| Observable::new(v, v, Transform::Deviation))
                .collect(),
        }
    }

    /// The observables in order.
    pub fn observables(&self) -> &[Observable] {
        &self.observables
    }

    /// Number of observables.
    pub fn len(&self) -> usize {
        self.observables.len()
    }

    /// Returns `true` if nothing is observed.
    pub fn is_empty(&self) -> bool {
        self.observables.is_empty()
    }

    /// Checks names, variables and measurement errors against `model`.
    pub fn validate(&self, model: &Model) -> Result<(), SolutionError> {
        let mut seen = std::collections::HashSet::new();
        for obs in &self.observables {
            if !seen.insert(obs.name.as_str()) {
                return Err(invalid(obs, "duplicate observable name"));
            }
            if model.variable_index(&obs.variable).is_none() {
                return Err(SolutionError::UnknownVariable {
                    observable: obs.name.clone(),
                    variable: obs.variable.clone(),
                });
            }
            if !(obs.measurement_sd.is_finite() && obs.measurement_sd >= 0.0) {
                return Err(invalid(obs, "measurement error s.d. must be finite and >= 0"));
            }
            if !obs.offset.is_finite() {
                return Err(invalid(obs, "offset must be finite"));
            }
        }
        Ok(())
    }
}

fn invalid(obs: &Observable, reason: &str) -> SolutionError {
    SolutionError::InvalidObservation {
        observable: obs.name.clone(),
        reason: reason.to_string(),
    }
}

/// Builds `(A, B, C, D, R, c)` from the policy and the mapping.
pub(crate) fn assemble(
    model: &Model,
    policy: &Policy,
    steady: &Array1<f64>,
    mapping: &ObservationMapping,
) -> Result<StateSpaceModel, SolutionError> {
    mapping.validate(model)?;
    let n = model.n_variables();
    let k = model.n_shocks();

    let mut lagged: Vec<usize> = Vec::new();
    for obs in mapping.observables() {
        if obs.transform.needs_lag() {
            let v = variable_index(model, obs)?;
            if !lagged.contains(&v) {
                lagged.push(v);
            }
        }
    }
    let n_states = n + lagged.len();

    let mut a = Array2::<f64>::zeros((n_states, n_states));
    a.slice_mut(ndarray::s![..n, ..n]).assign(&policy.g_y);
    for (l, &v) in lagged.iter().enumerate() {
        a[[n + l, v]] = 1.0;
    }
    let mut b = Array2::<f64>::zeros((n_states, k));
    b.slice_mut(ndarray::s![..n, ..]).assign(&policy.g_u);

    let m = mapping.len();
    let mut c = Array2::<f64>::zeros((m, n_states));
    let mut constant = Array1::<f64>::zeros(m);
    let mut r = Array2::<f64>::zeros((m, m));
    for (row, obs) in mapping.observables().iter().enumerate() {
        let v = variable_index(model, obs)?;
        let ybar = steady[v];
        let lag_col = lagged.iter().position(|&x| x == v).map(|l| n + l);
        constant[row] = obs.offset;
        match obs.transform {
            Transform::Level => {
                c[[row, v]] = 1.0;
                constant[row] += ybar;
            }
            Transform::Deviation => c[[row, v]] = 1.0,
            Transform::LogDeviation => {
                let scale = positive_steady_state(obs, ybar)?;
                c[[row, v]] = 1.0 / scale;
            }
            Transform::Difference | Transform::GrowthRate => {
                let scale = if obs.transform == Transform::GrowthRate {
                    positive_steady_state(obs, ybar)?
                } else {
                    1.0
                };
                let lag_col = lag_col.ok_or_else(|| invalid(obs, "missing lag state"))?;
                c[[row, v]] = 1.0 / scale;
                c[[row, lag_col]] = -1.0 / scale;
            }
        }
        r[[row, row]] = obs.measurement_sd * obs.measurement_sd;
    }

    let var_names: Vec<String> = model.variables().iter().map(|v| v.name().to_string()).collect();
    let mut state_names = var_names.clone();
    state_names.extend(lagged.iter().map(|&v| format!("{}(-1)", var_names[v])));
    let observable_names = mapping.observables().iter().map(|o| o.name.clone()).collect();

    Ok(StateSpaceModel::new(a, b, c, Array2::zeros((m, k)))?
        .with_measurement_covariance(r)?
        .with_observation_constant(constant)?
        .with_names(state_names, model.shock_names().to_vec(), observable_names)?)
}

fn variable_index(model: &Model, obs: &Observable) -> Result<usize, SolutionError> {
    model
        .variable_index(&obs.variable)
        .ok_or_else(|| SolutionError::UnknownVariable {
            observable: obs.name.clone(),
            variable: obs.variable.clone(),
        })
}

fn positive_steady_state(obs: &Observable, ybar: f64) -> Result<f64, SolutionError> {
    if ybar > 0.0 && ybar.is_finite() {
        Ok(ybar)
    } else {
        Err(invalid(
            obs,
            &format!("log transform needs a positive steady state, got {ybar}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use dsge_model::models::Rbc;

    fn rbc_model() -> Model {
        Model::new(Arc::new(Rbc::new()), &Rbc::default_parameters().unwrap()).unwrap()
    }

    #[test]
    fn rejects_unknown_variable() {
        let mapping = ObservationMapping::new().with(Observable::new("gdp", "y", Transform::Level));
        assert!(matches!(
            mapping.validate(&rbc_model()),
            Err(SolutionError::UnknownVariable { .. })
        ));
    }

    #[test]
    fn rejects_duplicate_names_and_negative_sd() {
        let dup = ObservationMapping::new()
            .with(Observable::new("c", "c", Transform::Level))
            .with(Observable::new("c", "k", Transform::Level));
        assert!(dup.validate(&rbc_model()).is_err());
        let neg = ObservationMapping::new()
            .with(Observable::new("c", "c", Transform::Level).with_measurement_error(-1.0));
        assert!(neg.validate(&rbc_model()).is_err());
    }

    #[test]
    fn deviations_helper() {
        let mapping = ObservationMapping::deviations(["c", "k"]);
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.observables()[1].variable(), "k");
        assert_eq!(mapping.observables()[1].transform(), Transform::Deviation);
        assert!(mapping.validate(&rbc_model()).is_ok());
    }

    #[test]
    fn growth_needs_lag_state() {
        assert!(Transform::GrowthRate.needs_lag());
        assert!(Transform::Difference.needs_lag());
        assert!(!Transform::LogDeviation.needs_lag());
    }
}
