//! Binding of an [`EquationSystem`] to a parameter layout.

use std::collections::HashSet;
use std::sync::Arc;

use dsge_params::ParameterSet;
use ndarray::{Array1, ArrayView1};

use crate::error::ModelError;
use crate::system::{EquationSystem, Jacobians, Point};
use crate::variable::{Variable, VariableKind};

/// A validated equation system.
///
/// Construction checks everything that would otherwise surface as a
/// shape error deep inside an estimation loop: the system is square,
/// names are unique, every consumed parameter is declared, and the timing
/// partition is respected at the initial point. Cloning is cheap; the
/// system itself is shared immutably.
#[derive(Debug, Clone)]
pub struct Model {
    system: Arc<dyn EquationSystem>,
    predetermined: Vec<usize>,
    jumps: Vec<usize>,
}

impl Model {
    /// Validates `system` against the parameters it will be evaluated with.
    ///
    /// # Errors
    ///
    /// - [`ModelError::Empty`] if no variables are declared.
    /// - [`ModelError::DuplicateName`] for repeated variable, shock or parameter names.
    /// - [`ModelError::UnknownParameter`] if `params` lacks a consumed parameter.
    /// - [`ModelError::DimensionMismatch`] if the residual vector, initial
    ///   guess or Jacobian blocks have the wrong size.
    /// - [`ModelError::NonFinite`] if residuals or derivatives at the initial
    ///   point are not finite.
    /// - [`ModelError::TimingViolation`] if a jump variable is lagged or a
    ///   predetermined variable is led.
    #[tracing::instrument(skip_all, fields(model = system.name()))]
    pub fn new(system: Arc<dyn EquationSystem>, params: &ParameterSet) -> Result<Self, ModelError> {
        let vars = system.variables();
        if vars.is_empty() {
            return Err(ModelError::Empty);
        }
        check_unique("variable", vars.iter().map(Variable::name))?;
        check_unique("shock", system.shocks().iter().map(String::as_str))?;
        check_unique("parameter", system.parameters().iter().map(String::as_str))?;

        let (predetermined, jumps): (Vec<usize>, Vec<usize>) =
            (0..vars.len()).partition(|&i| vars[i].is_predetermined());

        let model = Self {
            system,
            predetermined,
            jumps,
        };
        let theta = model.theta(params)?;
        model.check_shapes_and_timing(&theta)?;

        tracing::debug!(
            variables = model.n_variables(),
            predetermined = model.predetermined.len(),
            jumps = model.jumps.len(),
            shocks = model.n_shocks(),
            "model bound"
        );
        Ok(model)
    }

    fn check_shapes_and_timing(&self, theta: &[f64]) -> Result<(), ModelError> {
        let n = self.n_variables();
        let k = self.n_shocks();
        let guess = self.system.initial_guess(theta);
        expect_len("initial guess", n, guess.len())?;

        let point = Point::steady(&guess, k);
        let residuals = self.residuals(&point, theta);
        expect_len("residual vector (equations vs variables)", n, residuals.len())?;
        if residuals.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::NonFinite {
                model: self.name().to_string(),
                what: "residuals",
            });
        }

        let jac = self.jacobians(&point, theta);
        for (what, m, cols) in [
            ("t-1 jacobian", &jac.lag, n),
            ("t jacobian", &jac.current, n),
            ("t+1 jacobian", &jac.lead, n),
            ("shock jacobian", &jac.shocks, k),
        ] {
            expect_len(what, n, m.nrows())?;
            expect_len(what, cols, m.ncols())?;
        }
        if !jac.is_finite() {
            return Err(ModelError::NonFinite {
                model: self.name().to_string(),
                what: "jacobians",
            });
        }

        self.check_timing(&jac)
    }

    /// Checks that `jac` never loads a jump variable at `t-1` or a
    /// predetermined variable at `t+1`.
    ///
    /// A coefficient can vanish at one parameter value and not another, so
    /// this runs again on every steady-state Jacobian, not only in [`Model::new`].
    pub fn check_timing(&self, jac: &Jacobians) -> Result<(), ModelError> {
        for &j in &self.jumps {
            if jac.lag.column(j).iter().any(|&v| v != 0.0) {
                return Err(self.timing_violation(j, "t-1"));
            }
        }
        for &p in &self.predetermined {
            if jac.lead.column(p).iter().any(|&v| v != 0.0) {
                return Err(self.timing_violation(p, "t+1"));
            }
        }
        Ok(())
    }

    fn timing_violation(&self, index: usize, timing: &'static str) -> ModelError {
        let var = &self.variables()[index];
        ModelError::TimingViolation {
            variable: var.name().to_string(),
            kind: var.kind().label(),
            timing,
        }
    }

    /// The underlying equation system.
    pub fn system(&self) -> &dyn EquationSystem {
        self.system.as_ref()
    }

    /// Model name.
    pub fn name(&self) -> &str {
        self.system.name()
    }

    /// Endogenous variables.
    pub fn variables(&self) -> &[Variable] {
        self.system.variables()
    }

    /// Shock names.
    pub fn shock_names(&self) -> &[String] {
        self.system.shocks()
    }

    /// Number of endogenous variables (and equations).
    pub fn n_variables(&self) -> usize {
        self.system.variables().len()
    }

    /// Number of shocks.
    pub fn n_shocks(&self) -> usize {
        self.system.shocks().len()
    }

    /// Indices of predetermined variables, ascending.
    pub fn predetermined(&self) -> &[usize] {
        &self.predetermined
    }

    /// Indices of jump variables, ascending.
    pub fn jumps(&self) -> &[usize] {
        &self.jumps
    }

    /// Index of the variable called `name`.
    pub fn variable_index(&self, name: &str) -> Option<usize> {
        self.variables().iter().position(|v| v.name() == name)
    }

    /// Index of the shock called `name`.
    pub fn shock_index(&self, name: &str) -> Option<usize> {
        self.shock_names().iter().position(|s| s == name)
    }

    /// Kind of variable `index`.
    pub fn kind(&self, index: usize) -> VariableKind {
        self.variables()[index].kind()
    }

    /// Extracts `θ` in the order the system consumes it.
    pub fn theta(&self, params: &ParameterSet) -> Result<Vec<f64>, ModelError> {
        self.system
            .parameters()
            .iter()
            .map(|name| {
                params.value(name).ok_or_else(|| ModelError::UnknownParameter {
                    name: name.clone(),
                })
            })
            .collect()
    }

    /// Residuals at an arbitrary point.
    pub fn residuals(&self, point: &Point, theta: &[f64]) -> Array1<f64> {
        self.system.evaluate(
            point.lag.view(),
            point.current.view(),
            point.lead.view(),
            point.shocks.view(),
            theta,
        )
    }

    /// Residuals at the constant path `y` with zero shocks.
    pub fn steady_residuals(&self, y: ArrayView1<'_, f64>, theta: &[f64]) -> Array1<f64> {
        let shocks = Array1::zeros(self.n_shocks());
        self.system.evaluate(y, y, y, shocks.view(), theta)
    }

    /// Jacobians at an arbitrary point.
    pub fn jacobians(&self, point: &Point, theta: &[f64]) -> Jacobians {
        self.system.jacobians(point, theta)
    }
}

fn check_unique<'a>(kind: &'static str, names: impl Iterator<Item = &'a str>) -> Result<(), ModelError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(ModelError::DuplicateName {
                kind,
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

fn expect_len(what: &'static str, expected: usize, got: usize) -> Result<(), ModelError> {
    if expected != got {
        return Err(ModelError::DimensionMismatch {
            what,
            expected,
            got,
        });
    }
    Ok(())
}
