use std::sync::Arc;

use approx::assert_abs_diff_eq;
use dsge_model::models::{Ar1, BUILTIN_MODELS, NewKeynesian, Rbc, builtin};
use dsge_model::{EquationSystem, Model, ModelError, Point, Variable, numeric_jacobians};
use dsge_params::{Parameter, ParameterSet};
use ndarray::{Array1, ArrayView1, array};

#[derive(Debug)]
struct Custom {
    vars: Vec<Variable>,
    shocks: Vec<String>,
    params: Vec<String>,
    equations: usize,
    lag_a_jump: bool,
}

impl Custom {
    fn new() -> Self {
        Self {
            vars: vec![Variable::predetermined("k"), Variable::jump("c")],
            shocks: vec!["e".into()],
            params: vec!["a".into()],
            equations: 2,
            lag_a_jump: false,
        }
    }
}

impl EquationSystem for Custom {
    fn name(&self) -> &str {
        "custom"
    }
    fn variables(&self) -> &[Variable] {
        &self.vars
    }
    fn shocks(&self) -> &[String] {
        &self.shocks
    }
    fn parameters(&self) -> &[String] {
        &self.params
    }
    fn evaluate(
        &self,
        lag: ArrayView1<'_, f64>,
        y: ArrayView1<'_, f64>,
        lead: ArrayView1<'_, f64>,
        e: ArrayView1<'_, f64>,
        theta: &[f64],
    ) -> Array1<f64> {
        let jump_lag = if self.lag_a_jump { lag[1] } else { 0.0 };
        let all = [
            y[0] - theta[0] * lag[0] - e[0],
            y[1] - 0.5 * lead[1] - y[0] + jump_lag,
        ];
        Array1::from_iter(all.into_iter().take(self.equations))
    }
}

fn params() -> ParameterSet {
    ParameterSet::from_parameters([Parameter::new("a", 0.5)]).unwrap()
}

#[test]
fn well_formed_model_binds() {
    let model = Model::new(Arc::new(Custom::new()), &params()).unwrap();
    assert_eq!(model.predetermined(), &[0]);
    assert_eq!(model.jumps(), &[1]);
    assert_eq!(model.variable_index("c"), Some(1));
    assert_eq!(model.shock_index("e"), Some(0));
    assert_eq!(model.theta(&params()).unwrap(), vec![0.5]);
}

#[test]
fn non_square_system_fails_at_construction() {
    let mut sys = Custom::new();
    sys.equations = 1;
    let err = Model::new(Arc::new(sys), &params()).unwrap_err();
    assert!(matches!(
        err,
        ModelError::DimensionMismatch { expected: 2, got: 1, .. }
    ));
}

#[test]
fn lagged_jump_variable_rejected() {
    let mut sys = Custom::new();
    sys.lag_a_jump = true;
    let err = Model::new(Arc::new(sys), &params()).unwrap_err();
    assert_eq!(
        err,
        ModelError::TimingViolation {
            variable: "c".into(),
            kind: "jump",
            timing: "t-1"
        }
    );
}

#[test]
fn missing_parameter_rejected() {
    let empty = ParameterSet::new();
    let err = Model::new(Arc::new(Custom::new()), &empty).unwrap_err();
    assert_eq!(err, ModelError::UnknownParameter { name: "a".into() });
}

#[test]
fn duplicate_variable_rejected() {
    let mut sys = Custom::new();
    sys.vars[1] = Variable::jump("k");
    assert!(matches!(
        Model::new(Arc::new(sys), &params()),
        Err(ModelError::DuplicateName { kind: "variable", .. })
    ));
}

#[test]
fn all_builtins_bind_with_default_parameters() {
    for name in BUILTIN_MODELS {
        let (system, params) = builtin(name).unwrap().unwrap();
        let model = Model::new(system, &params).unwrap();
        assert_eq!(model.name(), *name);
    }
    assert!(builtin("nope").is_none());
}

#[test]
fn new_keynesian_analytic_jacobians_match_numeric() {
    let params = NewKeynesian::default_parameters().unwrap();
    let model = Model::new(Arc::new(NewKeynesian::new()), &params).unwrap();
    let theta = model.theta(&params).unwrap();
    let point = Point {
        lag: array![0.1, -0.2, 0.3, 0.0, 0.5],
        current: array![0.2, 0.1, -0.1, 0.4, 0.0],
        lead: array![0.0, 0.3, 0.2, -0.3, 0.1],
        shocks: array![0.5, -0.5, 1.0],
    };
    let analytic = model.jacobians(&point, &theta);
    let numeric = numeric_jacobians(model.system(), &point, &theta);
    for (a, n) in analytic.current.iter().zip(numeric.current.iter()) {
        assert_abs_diff_eq!(*a, *n, epsilon = 1e-8);
    }
    for (a, n) in analytic.lead.iter().zip(numeric.lead.iter()) {
        assert_abs_diff_eq!(*a, *n, epsilon = 1e-8);
    }
    for (a, n) in analytic.shocks.iter().zip(numeric.shocks.iter()) {
        assert_abs_diff_eq!(*a, *n, epsilon = 1e-8);
    }
}

#[test]
fn steady_residuals_vanish_at_closed_form() {
    let params = Rbc::default_parameters().unwrap();
    let model = Model::new(Arc::new(Rbc::new()), &params).unwrap();
    let theta = model.theta(&params).unwrap();
    let ss = model.system().steady_state(&theta).unwrap();
    let r = model.steady_residuals(ss.view(), &theta);
    assert!(r.iter().all(|v| v.abs() < 1e-12));

    let ar = Model::new(Arc::new(Ar1::new()), &Ar1::default_parameters().unwrap()).unwrap();
    assert_eq!(ar.n_shocks(), 1);
}
