//! IRF command: one-standard-deviation impulse responses.

use anyhow::{Context, Result};
use serde_json::json;
use tracing::{info, info_span};

use dsge_analysis::{impulse_response, impulse_responses};

use crate::cli::IrfArgs;
use crate::convert;
use crate::output;

/// Solve the model and emit observable impulse responses as JSON.
pub fn run(args: IrfArgs) -> Result<()> {
    let _cmd = info_span!("irf").entered();
    let config = convert::load_config(&args.common.config)?;
    let (model, params) = convert::build_model(&config)?;
    let mapping = convert::build_mapping(&config, &model);
    let solver = convert::build_solver(&config)?;

    let solution = solver
        .solve_model(&model, &params, &mapping)
        .with_context(|| format!("failed to solve model {:?}", model.name()))?;
    let ss = solution.state_space();

    let responses = match args.shock {
        Some(ref name) => {
            let shock = ss.shock_index(name)?;
            vec![impulse_response(ss, shock, 1.0, args.horizon)?]
        }
        None => impulse_responses(ss, args.horizon)?,
    };
    info!(shocks = responses.len(), horizon = args.horizon, "impulse responses computed");

    let value = json!({
        "model": model.name(),
        "horizon": args.horizon,
        "observables": ss.observable_names(),
        "responses": responses
            .iter()
            .map(|irf| json!({
                "shock": ss.shock_names()[irf.shock()],
                "values": output::matrix(irf.observables()),
            }))
            .collect::<Vec<_>>(),
    });
    output::emit(&value, args.common.output.as_deref())
}
