//! Mode command: Nelder-Mead search for the posterior mode.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde_json::json;
use tracing::{info, info_span};

use dsge_likelihood::find_posterior_mode;

use crate::cli::ModeArgs;
use crate::convert;
use crate::loglik_cmd::build_engine;
use crate::output;

/// Search for the posterior mode starting from the configured parameters.
pub fn run(args: ModeArgs) -> Result<()> {
    let _cmd = info_span!("mode").entered();
    let mut config = convert::load_config(&args.common.config)?;
    if let Some(n) = args.max_iterations {
        config.mode.max_iterations = n;
    }
    let (engine, start) = build_engine(&config, args.data)?;
    let mode_config = convert::build_mode_config(&config.mode)?;

    let mode = find_posterior_mode(&engine, &start, &mode_config).context("posterior mode search failed")?;
    info!(
        iterations = mode.iterations(),
        log_posterior = mode.log_posterior(),
        "mode found"
    );

    let start_values: BTreeMap<&str, f64> = start.iter().map(|p| (p.name(), p.value())).collect();
    let mode_values: BTreeMap<&str, f64> = mode.parameters().iter().map(|p| (p.name(), p.value())).collect();
    let value = json!({
        "model": engine.model().name(),
        "iterations": mode.iterations(),
        "log_posterior": mode.log_posterior(),
        "log_likelihood": mode.log_likelihood(),
        "start": start_values,
        "parameters": mode_values,
    });
    output::emit(&value, args.common.output.as_deref())
}
