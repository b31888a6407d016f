use std::sync::Arc;
use std::time::Duration;

use dsge_model::models::{Ar1, NewKeynesian, Rbc};
use dsge_model::{EquationSystem, Model, Variable};
use dsge_params::{Parameter, ParameterSet};
use dsge_steady::{SteadyStateConfig, SteadyStateError, SteadyStateSolver};
use ndarray::{Array1, ArrayView1, array};

#[test]
fn true_steady_state_converges_within_two_iterations() {
    let params = Rbc::default_parameters().unwrap();
    let model = Model::new(Arc::new(Rbc::new()), &params).unwrap();
    let theta = model.theta(&params).unwrap();
    let exact = model.system().steady_state(&theta).unwrap();
    let ss = SteadyStateSolver::default()
        .solve(&model, &params, Some(&exact))
        .unwrap();
    assert!(ss.iterations() <= 2);
    assert_eq!(ss.values(), &exact);
}

#[test]
fn linear_models_solve_from_arbitrary_guess() {
    let params = NewKeynesian::default_parameters().unwrap();
    let model = Model::new(Arc::new(NewKeynesian::new()), &params).unwrap();
    let guess = array![0.3, -0.2, 1.0, 0.5, 2.0];
    let ss = SteadyStateSolver::default()
        .solve(&model, &params, Some(&guess))
        .unwrap();
    assert!(ss.values().iter().all(|v| v.abs() < 1e-10));
    assert!(ss.iterations() <= 2);

    let params = Ar1::default_parameters().unwrap();
    let model = Model::new(Arc::new(Ar1::new()), &params).unwrap();
    let ss = SteadyStateSolver::default()
        .solve(&model, &params, Some(&array![4.0]))
        .unwrap();
    assert!(ss.values()[0].abs() < 1e-10);
}

/// `y² + a = 0`, which has no real root for `a > 0`.
#[derive(Debug)]
struct NoRoot {
    vars: Vec<Variable>,
    shocks: Vec<String>,
    params: Vec<String>,
}

impl EquationSystem for NoRoot {
    fn name(&self) -> &str {
        "no_root"
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
        _lag: ArrayView1<'_, f64>,
        y: ArrayView1<'_, f64>,
        _lead: ArrayView1<'_, f64>,
        _e: ArrayView1<'_, f64>,
        theta: &[f64],
    ) -> Array1<f64> {
        array![y[0] * y[0] + theta[0]]
    }
    fn initial_guess(&self, _theta: &[f64]) -> Array1<f64> {
        array![1.0]
    }
}

fn no_root() -> (Model, ParameterSet) {
    let sys = NoRoot {
        vars: vec![Variable::jump("y")],
        shocks: vec![],
        params: vec!["a".into()],
    };
    let params = ParameterSet::from_parameters([Parameter::new("a", 1.0)]).unwrap();
    (Model::new(Arc::new(sys), &params).unwrap(), params)
}

#[test]
fn unsolvable_system_reports_failure_not_approximation() {
    let (model, params) = no_root();
    let err = SteadyStateSolver::default()
        .solve(&model, &params, None)
        .unwrap_err();
    match err {
        SteadyStateError::NotConverged {
            max_residual,
            equations,
            ..
        } => {
            assert!(max_residual >= 1.0 - 1e-12);
            assert_eq!(equations, vec![0]);
        }
        SteadyStateError::SingularJacobian { .. } => {}
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn zero_timeout_exhausts_budget() {
    let (model, params) = no_root();
    let solver = SteadyStateSolver::new(
        SteadyStateConfig::new().with_timeout(Some(Duration::ZERO)),
    );
    assert!(matches!(
        solver.solve(&model, &params, None),
        Err(SteadyStateError::BudgetExhausted { iterations: 0, .. })
    ));
}
