use approx::assert_abs_diff_eq;
use dsge_params::{Parameter, ParameterSet, Prior, from_unconstrained, to_unconstrained};

fn nk_parameters() -> ParameterSet {
    ParameterSet::from_parameters([
        Parameter::new("beta", 0.99)
            .with_bounds(0.9, 0.9999)
            .with_prior(Prior::Beta { mean: 0.99, sd: 0.002 }),
        Parameter::new("phi_pi", 1.5)
            .with_bounds(1.0, 5.0)
            .with_prior(Prior::Gamma { mean: 1.5, sd: 0.25 }),
        Parameter::new("sigma_i", 0.0025)
            .with_bounds(0.0, f64::INFINITY)
            .with_prior(Prior::InverseGamma { mean: 0.0025, sd: 0.01 }),
        Parameter::new("rho_g", 0.8).with_bounds(-0.999, 0.999),
    ])
    .unwrap()
}

#[test]
fn unconstrained_draws_always_produce_admissible_sets() {
    let set = nk_parameters();
    for &shift in &[-50.0, -3.0, 0.0, 3.0, 50.0] {
        let values: Vec<f64> = set
            .iter()
            .map(|p| from_unconstrained(p.bounds(), to_unconstrained(p.bounds(), p.value()) + shift))
            .collect();
        let draw = set.with_values(&values).unwrap();
        assert_eq!(draw.len(), set.len());
        assert!(!draw.log_prior().unwrap().is_nan());
    }
}

#[test]
fn draw_does_not_mutate_template() {
    let set = nk_parameters();
    let before = set.log_prior().unwrap();
    let draw = set.with_value("phi_pi", 2.0).unwrap();
    assert_abs_diff_eq!(set.log_prior().unwrap(), before, epsilon = 0.0);
    assert_eq!(draw.value("phi_pi"), Some(2.0));
    assert_eq!(set.value("phi_pi"), Some(1.5));
}

#[test]
fn prior_outside_support_is_negative_infinity() {
    let set = ParameterSet::from_parameters([Parameter::new("x", -1.0)
        .with_prior(Prior::Gamma { mean: 1.0, sd: 0.5 })])
    .unwrap();
    assert_eq!(set.log_prior().unwrap(), f64::NEG_INFINITY);
}
