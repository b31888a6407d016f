//! Solve command: steady state, first-order policy and state-space form.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde_json::json;
use tracing::{info, info_span, warn};

use dsge_analysis::variance_decomposition;

use crate::cli::SolveArgs;
use crate::convert;
use crate::output;

/// Run the solve pipeline and emit the solution as JSON.
pub fn run(args: SolveArgs) -> Result<()> {
    let _cmd = info_span!("solve").entered();
    let config = convert::load_config(&args.common.config)?;
    let (model, params) = convert::build_model(&config)?;
    let mapping = convert::build_mapping(&config, &model);
    let solver = convert::build_solver(&config)?;

    let solution = solver
        .solve_model(&model, &params, &mapping)
        .with_context(|| format!("failed to solve model {:?}", model.name()))?;
    let steady = solution.steady_state();
    info!(
        iterations = steady.iterations(),
        max_residual = steady.max_residual(),
        "model solved"
    );

    let steady_values: BTreeMap<&str, f64> = model
        .variables()
        .iter()
        .map(|v| v.name())
        .zip(steady.values().iter().copied())
        .collect();
    let eigenvalues: Vec<[f64; 2]> = solution.eigenvalues().iter().map(|z| [z.re, z.im]).collect();

    let ss = solution.state_space();
    let shares = match variance_decomposition(ss, None) {
        Ok(decomposition) => json!(output::matrix(decomposition.shares())),
        Err(e) => {
            warn!(error = %e, "unconditional variance decomposition unavailable");
            json!(null)
        }
    };

    let parameters: BTreeMap<&str, f64> = params.iter().map(|p| (p.name(), p.value())).collect();
    let value = json!({
        "model": model.name(),
        "parameters": parameters,
        "steady_state": steady_values,
        "eigenvalues": eigenvalues,
        "state_space": {
            "states": ss.state_names(),
            "shocks": ss.shock_names(),
            "observables": ss.observable_names(),
            "a": output::matrix(ss.a()),
            "b": output::matrix(ss.b()),
            "c": output::matrix(ss.c()),
            "d": output::matrix(ss.d()),
            "constant": ss.observation_constant().to_vec(),
            "measurement_covariance": output::matrix(ss.measurement_covariance()),
        },
        "variance_shares": shares,
    });
    output::emit(&value, args.common.output.as_deref())
}
