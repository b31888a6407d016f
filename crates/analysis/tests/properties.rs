use std::sync::Arc;

use approx::assert_abs_diff_eq;
use dsge_analysis::{
    historical_decomposition, impulse_response, simulate, simulate_stochastic, variance_decomposition,
};
use dsge_kalman::KalmanFilter;
use dsge_model::models::NewKeynesian;
use dsge_model::{Model, StateSpaceModel};
use dsge_perturbation::{Observable, ObservationMapping, PerturbationSolver, Transform};
use ndarray::{Array1, Array2};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn new_keynesian() -> StateSpaceModel {
    let params = NewKeynesian::default_parameters().unwrap();
    let model = Model::new(Arc::new(NewKeynesian::new()), &params).unwrap();
    let mapping = ObservationMapping::new()
        .with(Observable::new("output_gap", "x", Transform::Deviation).with_measurement_error(0.1))
        .with(Observable::new("inflation", "pi", Transform::Deviation).with_offset(0.5))
        .with(Observable::new("rate", "i", Transform::Deviation).with_offset(1.0));
    PerturbationSolver::default()
        .solve_model(&model, &params, &mapping)
        .unwrap()
        .into_state_space()
}

#[test]
fn impulse_response_matches_forward_simulation() {
    let ss = new_keynesian();
    let horizon = 40;
    for shock in 0..ss.n_shocks() {
        let irf = impulse_response(&ss, shock, 1.0, horizon).unwrap();
        let mut path = Array2::zeros((horizon + 1, ss.n_shocks()));
        path[[0, shock]] = 1.0;
        let sim = simulate(&ss, Array1::zeros(ss.n_states()).view(), path.view()).unwrap();
        for h in 0..=horizon {
            for i in 0..ss.n_states() {
                assert_abs_diff_eq!(irf.states()[[h, i]], sim.states()[[h, i]], epsilon = 1e-12);
            }
            for i in 0..ss.n_observables() {
                let deviation = sim.observables()[[h, i]] - ss.observation_constant()[i];
                assert_abs_diff_eq!(irf.observables()[[h, i]], deviation, epsilon = 1e-12);
            }
        }
    }
}

#[test]
fn historical_decomposition_adds_up() {
    let ss = new_keynesian();
    let mut rng = StdRng::seed_from_u64(42);
    let mut data = simulate_stochastic(&ss, 60, 20, &mut rng).unwrap().observables().clone();
    data[[10, 0]] = f64::NAN;
    data[[11, 2]] = f64::NAN;

    let smoothed = KalmanFilter::default().smooth(&ss, data.view()).unwrap();
    let hd = historical_decomposition(&ss, &smoothed, data.view()).unwrap();

    let fitted = hd.fitted();
    for t in 0..data.nrows() {
        for i in 0..ss.n_observables() {
            let x = data[[t, i]];
            if x.is_nan() {
                assert!(hd.residual()[[t, i]].is_nan());
            } else {
                assert_abs_diff_eq!(fitted[[t, i]] + hd.residual()[[t, i]], x, epsilon = 1e-9);
            }
        }
    }
    // only the output gap carries measurement error
    for t in 0..data.nrows() {
        if !data[[t, 1]].is_nan() {
            assert_abs_diff_eq!(hd.residual()[[t, 1]], 0.0, epsilon = 1e-8);
        }
    }
    assert!(hd.shock_contribution(ss.n_shocks()).is_err());
}

#[test]
fn variance_shares_are_a_partition() {
    let ss = new_keynesian();
    for horizon in [Some(1), Some(8), None] {
        let vd = variance_decomposition(&ss, horizon).unwrap();
        for row in vd.shares().rows() {
            assert_abs_diff_eq!(row.sum(), 1.0, epsilon = 1e-12);
            assert!(row.iter().all(|s| (0.0..=1.0).contains(s)));
        }
    }
}
