//! Loglik command: evaluate likelihood, prior and posterior at the configured parameters.

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use serde_json::json;
use tracing::{info, info_span};

use dsge_likelihood::LikelihoodEngine;
use dsge_params::ParameterSet;

use crate::cli::LoglikArgs;
use crate::config::DsgeConfig;
use crate::convert;
use crate::output;

/// Resolves the data path: CLI override first, then `data` from config.
pub fn data_path(cli: Option<PathBuf>, config: &DsgeConfig) -> Result<PathBuf> {
    cli.or_else(|| config.data.clone())
        .ok_or_else(|| anyhow!("no data file: set `data` in config or use --data"))
}

/// Builds the likelihood engine described by `config`, with the configured parameters.
pub fn build_engine(config: &DsgeConfig, data: Option<PathBuf>) -> Result<(LikelihoodEngine, ParameterSet)> {
    let (model, params) = convert::build_model(config)?;
    let mapping = convert::build_mapping(config, &model);
    let path = data_path(data, config)?;
    let data = convert::load_data(&path, mapping.len())?;
    info!(path = %path.display(), periods = data.nrows(), "data loaded");

    let engine = LikelihoodEngine::new(model, mapping, data)?
        .with_solver(convert::build_solver(config)?)
        .with_filter(convert::build_filter(&config.filter)?);
    Ok((engine, params))
}

/// Evaluate the configured parameter vector and emit the result as JSON.
pub fn run(args: LoglikArgs) -> Result<()> {
    let _cmd = info_span!("loglik").entered();
    let config = convert::load_config(&args.common.config)?;
    let (engine, params) = build_engine(&config, args.data)?;

    let solution = engine.solve(&params).context("failed to solve model")?;
    let filtered = engine
        .filter()
        .filter(solution.state_space(), engine.data().view())
        .context("Kalman filter failed")?;
    let log_prior = engine.log_prior(&params).context("failed to evaluate prior")?;
    let log_likelihood = filtered.log_likelihood();
    info!(log_likelihood, log_prior, "evaluated");

    let value = json!({
        "model": engine.model().name(),
        "periods": filtered.len(),
        "log_likelihood": log_likelihood,
        "log_prior": log_prior,
        "log_posterior": log_likelihood + log_prior,
        "contributions": filtered.contributions().to_vec(),
    });
    output::emit(&value, args.common.output.as_deref())
}
