use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

/// Top-level configuration file.
///
/// ```toml
/// model = "new_keynesian"
/// data = "observed.json"
///
/// [parameters.phi_pi]
/// value = 1.8
/// prior = { family = "gamma", mean = 1.5, sd = 0.25 }
///
/// [[observables]]
/// name = "inflation"
/// variable = "pi"
/// transform = "deviation"
/// ```
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DsgeConfig {
    /// Built-in model name.
    pub model: String,

    /// JSON data file: an array of rows, one entry per observable, `null` = missing.
    #[serde(default)]
    pub data: Option<PathBuf>,

    /// Overrides of the model's default parameters.
    #[serde(default)]
    pub parameters: BTreeMap<String, ParameterToml>,

    /// Observed series, in data-column order.
    #[serde(default)]
    pub observables: Vec<ObservableToml>,

    /// Steady-state solver settings.
    #[serde(default)]
    pub steady_state: SteadyStateToml,

    /// Perturbation settings.
    #[serde(default)]
    pub perturbation: PerturbationToml,

    /// Filter settings.
    #[serde(default)]
    pub filter: FilterToml,

    /// Mode-search settings.
    #[serde(default)]
    pub mode: ModeToml,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterToml {
    pub value: Option<f64>,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
    pub prior: Option<PriorToml>,
}

/// Prior family with its hyperparameters.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum PriorToml {
    Normal { mean: f64, sd: f64 },
    Beta { mean: f64, sd: f64 },
    Gamma { mean: f64, sd: f64 },
    InverseGamma { mean: f64, sd: f64 },
    Uniform { lower: f64, upper: f64 },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObservableToml {
    pub name: String,
    pub variable: String,
    #[serde(default)]
    pub transform: TransformToml,
    #[serde(default)]
    pub offset: f64,
    #[serde(default)]
    pub measurement_sd: f64,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransformToml {
    Level,
    #[default]
    Deviation,
    LogDeviation,
    Difference,
    GrowthRate,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SteadyStateToml {
    #[serde(default = "default_steady_tolerance")]
    pub tolerance: f64,
    #[serde(default = "default_steady_iterations")]
    pub max_iterations: usize,
    #[serde(default)]
    pub timeout_secs: Option<f64>,
}

impl Default for SteadyStateToml {
    fn default() -> Self {
        Self {
            tolerance: default_steady_tolerance(),
            max_iterations: default_steady_iterations(),
            timeout_secs: None,
        }
    }
}

fn default_steady_tolerance() -> f64 {
    1e-10
}
fn default_steady_iterations() -> usize {
    200
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PerturbationToml {
    #[serde(default = "default_qz_criterium")]
    pub qz_criterium: f64,
    #[serde(default)]
    pub allow_unit_roots: bool,
}

impl Default for PerturbationToml {
    fn default() -> Self {
        Self {
            qz_criterium: default_qz_criterium(),
            allow_unit_roots: false,
        }
    }
}

fn default_qz_criterium() -> f64 {
    1.0 + 1e-6
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct FilterToml {
    #[serde(default)]
    pub initial: InitialToml,
    #[serde(default = "default_diffuse_variance")]
    pub diffuse_variance: f64,
    #[serde(default)]
    pub timeout_secs: Option<f64>,
}

fn default_diffuse_variance() -> f64 {
    1e6
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InitialToml {
    #[default]
    Stationary,
    Diffuse,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModeToml {
    #[serde(default = "default_mode_iterations")]
    pub max_iterations: u64,
    #[serde(default = "default_sd_tolerance")]
    pub sd_tolerance: f64,
    #[serde(default = "default_initial_step")]
    pub initial_step: f64,
    #[serde(default)]
    pub free: Option<Vec<String>>,
}

impl Default for ModeToml {
    fn default() -> Self {
        Self {
            max_iterations: default_mode_iterations(),
            sd_tolerance: default_sd_tolerance(),
            initial_step: default_initial_step(),
            free: None,
        }
    }
}

fn default_mode_iterations() -> u64 {
    2000
}
fn default_sd_tolerance() -> f64 {
    1e-8
}
fn default_initial_step() -> f64 {
    0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_uses_defaults() {
        let config: DsgeConfig = toml::from_str(r#"model = "ar1""#).unwrap();
        assert_eq!(config.model, "ar1");
        assert!(config.parameters.is_empty());
        assert_eq!(config.steady_state.max_iterations, 200);
        assert_eq!(config.filter.initial, InitialToml::Stationary);
        assert!(!config.perturbation.allow_unit_roots);
    }

    #[test]
    fn parses_priors_and_observables() {
        let config: DsgeConfig = toml::from_str(
            r#"
            model = "new_keynesian"

            [parameters.phi_pi]
            value = 1.8
            prior = { family = "inverse_gamma", mean = 1.5, sd = 0.5 }

            [[observables]]
            name = "dy"
            variable = "x"
            transform = "growth_rate"
            measurement_sd = 0.1
            "#,
        )
        .unwrap();
        let phi = &config.parameters["phi_pi"];
        assert_eq!(phi.value, Some(1.8));
        assert_eq!(phi.prior, Some(PriorToml::InverseGamma { mean: 1.5, sd: 0.5 }));
        assert_eq!(config.observables[0].transform, TransformToml::GrowthRate);
    }

    #[test]
    fn rejects_unknown_fields() {
        let result: Result<DsgeConfig, _> = toml::from_str(
            r#"
            model = "ar1"
            [steady_state]
            tolerence = 1e-8
            "#,
        );
        assert!(result.is_err());
    }
}
