//! Pure conversion functions: TOML config structs -> crate API types.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use ndarray::Array2;

use dsge_kalman::{FilterConfig, InitialState, KalmanFilter};
use dsge_likelihood::ModeConfig;
use dsge_model::Model;
use dsge_model::models::{BUILTIN_MODELS, builtin};
use dsge_params::{Parameter, ParameterSet, Prior};
use dsge_perturbation::{ObservationMapping, Observable, PerturbationConfig, PerturbationSolver, Transform};
use dsge_steady::{SteadyStateConfig, SteadyStateSolver};

use crate::config::*;

/// Converts a TOML prior into a [`Prior`].
pub fn build_prior(prior: PriorToml) -> Prior {
    match prior {
        PriorToml::Normal { mean, sd } => Prior::Normal { mean, sd },
        PriorToml::Beta { mean, sd } => Prior::Beta { mean, sd },
        PriorToml::Gamma { mean, sd } => Prior::Gamma { mean, sd },
        PriorToml::InverseGamma { mean, sd } => Prior::InverseGamma { mean, sd },
        PriorToml::Uniform { lower, upper } => Prior::Uniform { lower, upper },
    }
}

/// Converts a TOML transform name into a [`Transform`].
pub fn build_transform(transform: TransformToml) -> Transform {
    match transform {
        TransformToml::Level => Transform::Level,
        TransformToml::Deviation => Transform::Deviation,
        TransformToml::LogDeviation => Transform::LogDeviation,
        TransformToml::Difference => Transform::Difference,
        TransformToml::GrowthRate => Transform::GrowthRate,
    }
}

/// Resolves the built-in model and applies `[parameters.*]` overrides to its defaults.
///
/// Overrides may only name parameters the model declares.
pub fn build_model(config: &DsgeConfig) -> Result<(Model, ParameterSet)> {
    let (system, defaults) = builtin(&config.model)
        .ok_or_else(|| anyhow!("unknown model {:?}; available: {}", config.model, BUILTIN_MODELS.join(", ")))?
        .context("invalid default parameters")?;

    for name in config.parameters.keys() {
        if defaults.get(name).is_none() {
            bail!("model {:?} has no parameter {name:?}", config.model);
        }
    }

    let params = ParameterSet::from_parameters(defaults.iter().map(|param| {
        match config.parameters.get(param.name()) {
            Some(ov) => apply_override(param, ov),
            None => param.clone(),
        }
    }))
    .context("invalid parameter configuration")?;

    let model = Model::new(system, &params).context("failed to build model")?;
    Ok((model, params))
}

fn apply_override(param: &Parameter, ov: &ParameterToml) -> Parameter {
    let bounds = param.bounds();
    let mut out = Parameter::new(param.name(), ov.value.unwrap_or(param.value())).with_bounds(
        ov.lower.unwrap_or(bounds.lower()),
        ov.upper.unwrap_or(bounds.upper()),
    );
    if let Some(prior) = ov.prior.map(build_prior).or_else(|| param.prior().copied()) {
        out = out.with_prior(prior);
    }
    out
}

/// Builds the observation mapping from `[[observables]]`.
///
/// With no observables configured every model variable is observed in deviation form.
pub fn build_mapping(config: &DsgeConfig, model: &Model) -> ObservationMapping {
    if config.observables.is_empty() {
        return ObservationMapping::deviations(model.variables().iter().map(|v| v.name()));
    }
    config.observables.iter().fold(ObservationMapping::new(), |mapping, obs| {
        mapping.with(
            Observable::new(&obs.name, &obs.variable, build_transform(obs.transform))
                .with_offset(obs.offset)
                .with_measurement_error(obs.measurement_sd),
        )
    })
}

/// Builds a [`SteadyStateConfig`] from `[steady_state]`.
pub fn build_steady_config(steady: &SteadyStateToml) -> Result<SteadyStateConfig> {
    let cfg = SteadyStateConfig::new()
        .with_tolerance(steady.tolerance)
        .with_max_iterations(steady.max_iterations)
        .with_timeout(steady.timeout_secs.map(duration_from_secs).transpose()?);
    cfg.validate()?;
    Ok(cfg)
}

/// Builds the perturbation solver, including its steady-state solver.
pub fn build_solver(config: &DsgeConfig) -> Result<PerturbationSolver> {
    let cfg = PerturbationConfig::new()
        .with_qz_criterium(config.perturbation.qz_criterium)
        .with_allow_unit_roots(config.perturbation.allow_unit_roots);
    cfg.validate()?;
    let steady = SteadyStateSolver::new(build_steady_config(&config.steady_state)?);
    Ok(PerturbationSolver::new(cfg).with_steady_state_solver(steady))
}

/// Builds a [`FilterConfig`] from `[filter]`.
pub fn build_filter_config(filter: &FilterToml) -> Result<FilterConfig> {
    let initial = match filter.initial {
        InitialToml::Stationary => InitialState::Stationary,
        InitialToml::Diffuse => InitialState::Diffuse {
            variance: filter.diffuse_variance,
        },
    };
    let mut cfg = FilterConfig::new().with_initial_state(initial);
    if let Some(secs) = filter.timeout_secs {
        cfg = cfg.with_timeout(duration_from_secs(secs)?);
    }
    cfg.validate()?;
    Ok(cfg)
}

/// Builds the Kalman filter from `[filter]`.
pub fn build_filter(filter: &FilterToml) -> Result<KalmanFilter> {
    Ok(KalmanFilter::new(build_filter_config(filter)?))
}

/// Builds a [`ModeConfig`] from `[mode]`.
pub fn build_mode_config(mode: &ModeToml) -> Result<ModeConfig> {
    let mut cfg = ModeConfig::new()
        .with_max_iterations(mode.max_iterations)
        .with_sd_tolerance(mode.sd_tolerance)
        .with_initial_step(mode.initial_step);
    if let Some(ref free) = mode.free {
        cfg = cfg.with_free_parameters(free.iter().cloned());
    }
    cfg.validate()?;
    Ok(cfg)
}

fn duration_from_secs(secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs).with_context(|| format!("invalid timeout: {secs} seconds"))
}

/// Reads a JSON data file into a `T x k` matrix.
///
/// The file holds an array of rows; `null` entries become NaN (missing).
pub fn load_data(path: &Path, n_observables: usize) -> Result<Array2<f64>> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("failed to read data file: {}", path.display()))?;
    let rows: Vec<Vec<Option<f64>>> =
        serde_json::from_str(&text).with_context(|| format!("failed to parse JSON data: {}", path.display()))?;

    let mut data = Array2::from_elem((rows.len(), n_observables), f64::NAN);
    for (t, row) in rows.iter().enumerate() {
        if row.len() != n_observables {
            bail!(
                "data row {t} has {} entries, expected {n_observables} (one per observable)",
                row.len()
            );
        }
        for (j, value) in row.iter().enumerate() {
            data[[t, j]] = value.unwrap_or(f64::NAN);
        }
    }
    Ok(data)
}

/// Reads and parses the TOML configuration file.
pub fn load_config(path: &Path) -> Result<DsgeConfig> {
    let toml_str = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    toml::from_str(&toml_str).context("failed to parse TOML config")
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn parse(s: &str) -> DsgeConfig {
        toml::from_str(s).unwrap()
    }

    #[test]
    fn overrides_replace_defaults() {
        let config = parse(
            r#"
            model = "ar1"
            [parameters.rho]
            value = 0.5
            prior = { family = "beta", mean = 0.5, sd = 0.2 }
            "#,
        );
        let (model, params) = build_model(&config).unwrap();
        assert_eq!(model.n_variables(), 1);
        assert_eq!(params.value("rho"), Some(0.5));
        assert_eq!(params.value("sigma"), Some(1.0));
        assert_eq!(
            params.get("rho").unwrap().prior(),
            Some(&Prior::Beta { mean: 0.5, sd: 0.2 })
        );
    }

    #[test]
    fn unknown_model_and_parameter_are_errors() {
        let err = build_model(&parse(r#"model = "dsge9000""#)).unwrap_err();
        assert!(err.to_string().contains("unknown model"));

        let config = parse(
            r#"
            model = "ar1"
            [parameters.beta]
            value = 0.99
            "#,
        );
        assert!(build_model(&config).is_err());
    }

    #[test]
    fn default_mapping_observes_every_variable() {
        let config = parse(r#"model = "new_keynesian""#);
        let (model, _) = build_model(&config).unwrap();
        let mapping = build_mapping(&config, &model);
        assert_eq!(mapping.len(), model.n_variables());
    }

    #[test]
    fn diffuse_filter_and_bad_timeout() {
        let mut filter = FilterToml {
            initial: InitialToml::Diffuse,
            diffuse_variance: 100.0,
            timeout_secs: None,
        };
        let cfg = build_filter_config(&filter).unwrap();
        assert_eq!(cfg.initial_state(), &InitialState::Diffuse { variance: 100.0 });

        filter.timeout_secs = Some(-1.0);
        assert!(build_filter_config(&filter).is_err());
    }

    #[test]
    fn loads_data_with_missing_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[[1.0, null], [2.5, -0.5]]").unwrap();
        let data = load_data(file.path(), 2).unwrap();
        assert_eq!(data.dim(), (2, 2));
        assert!(data[[0, 1]].is_nan());
        assert_eq!(data[[1, 1]], -0.5);

        assert!(load_data(file.path(), 3).is_err());
    }
}
