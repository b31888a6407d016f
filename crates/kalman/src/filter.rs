//! Forward pass.

use dsge_linalg::{LinalgError, LyapunovOptions, SpdFactor, is_finite, lyapunov, symmetrize};
use dsge_model::{Budget, StateSpaceModel};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use tracing::{debug, warn};

use crate::config::{FilterConfig, InitialState};
use crate::error::FilterError;
use crate::smoother::{SmootherOutput, smooth};

/// `ln(2π)`.
const LN_2PI: f64 = 1.837_877_066_409_345_5;

/// Quantities the smoother needs from one update step.
#[derive(Debug, Clone)]
pub(crate) struct StepRecord {
    pub(crate) observed: Vec<usize>,
    pub(crate) innovation: Array1<f64>,
    pub(crate) f_inv: Array2<f64>,
    pub(crate) gain: Array2<f64>,
}

/// Paths produced by [`KalmanFilter::filter`].
///
/// Row `t` of each matrix refers to observation `t`. Predicted moments are
/// `s_{t|t-1}`, filtered moments `s_{t|t}`.
#[derive(Debug, Clone)]
pub struct FilterOutput {
    log_likelihood: f64,
    contributions: Array1<f64>,
    innovations: Array2<f64>,
    innovation_covariances: Vec<Array2<f64>>,
    predicted_means: Array2<f64>,
    predicted_covariances: Vec<Array2<f64>>,
    filtered_means: Array2<f64>,
    filtered_covariances: Vec<Array2<f64>>,
    initial_mean: Array1<f64>,
    initial_covariance: Array2<f64>,
    pub(crate) steps: Vec<StepRecord>,
}

impl FilterOutput {
    /// Total log-likelihood.
    pub fn log_likelihood(&self) -> f64 {
        self.log_likelihood
    }

    /// Per-step log-likelihood contributions; zero where nothing was observed.
    pub fn contributions(&self) -> &Array1<f64> {
        &self.contributions
    }

    /// Innovations `v_t` (`T × k`), `NaN` where the observation was missing.
    pub fn innovations(&self) -> &Array2<f64> {
        &self.innovations
    }

    /// Innovation covariances `F_t`, restricted to the observed series of
    /// each step (see [`FilterOutput::observed`]).
    pub fn innovation_covariances(&self) -> &[Array2<f64>] {
        &self.innovation_covariances
    }

    /// Indices of the series observed at step `t`.
    pub fn observed(&self, t: usize) -> &[usize] {
        &self.steps[t].observed
    }

    /// One-step-ahead state means (`T × n`).
    pub fn predicted_means(&self) -> &Array2<f64> {
        &self.predicted_means
    }

    /// One-step-ahead state covariances.
    pub fn predicted_covariances(&self) -> &[Array2<f64>] {
        &self.predicted_covariances
    }

    /// Filtered state means (`T × n`).
    pub fn filtered_means(&self) -> &Array2<f64> {
        &self.filtered_means
    }

    /// Filtered state covariances.
    pub fn filtered_covariances(&self) -> &[Array2<f64>] {
        &self.filtered_covariances
    }

    /// Mean of the state before the first observation.
    pub fn initial_mean(&self) -> &Array1<f64> {
        &self.initial_mean
    }

    /// Covariance of the state before the first observation.
    pub fn initial_covariance(&self) -> &Array2<f64> {
        &self.initial_covariance
    }

    /// Filtered mean at the last observation.
    pub fn final_mean(&self) -> ArrayView1<'_, f64> {
        self.filtered_means.row(self.filtered_means.nrows() - 1)
    }

    /// Filtered covariance at the last observation.
    pub fn final_covariance(&self) -> &Array2<f64> {
        &self.filtered_covariances[self.filtered_covariances.len() - 1]
    }

    /// Number of time steps.
    pub fn len(&self) -> usize {
        self.contributions.len()
    }

    /// Always `false`: empty data is rejected before filtering.
    pub fn is_empty(&self) -> bool {
        self.contributions.is_empty()
    }
}

/// Linear-Gaussian filter for
///
/// ```text
/// s_t = A s_{t-1} + B ε_t,            ε_t ~ N(0, I)
/// x_t = c + C s_t + D ε_t + η_t,      η_t ~ N(0, R)
/// ```
///
/// Missing observations are `NaN`; each step uses only the rows of the
/// measurement equation that were observed. The covariance update is the
/// Joseph form generalised to a non-zero `D`:
///
/// ```text
/// P_t = L P_{t-1} Lᵀ + G Gᵀ + K R Kᵀ,   L = (I - K C) A,   G = (I - K C) B - K D
/// ```
///
/// # Example
///
/// ```
/// use dsge_kalman::KalmanFilter;
/// use dsge_model::StateSpaceModel;
/// use ndarray::array;
///
/// let ss = StateSpaceModel::new(array![[0.5]], array![[1.0]], array![[1.0]], array![[0.0]]).unwrap();
/// let data = array![[0.3], [f64::NAN], [-0.2]];
/// let ll = KalmanFilter::default().log_likelihood(&ss, data.view()).unwrap();
/// assert!(ll.is_finite());
/// ```
#[derive(Debug, Clone, Default)]
pub struct KalmanFilter {
    config: FilterConfig,
}

impl KalmanFilter {
    /// Creates a filter.
    pub fn new(config: FilterConfig) -> Self {
        Self { config }
    }

    /// Filter settings.
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Log-likelihood of `data` (`T × k`, `NaN` = missing) without storing paths.
    pub fn log_likelihood(&self, ss: &StateSpaceModel, data: ArrayView2<'_, f64>) -> Result<f64, FilterError> {
        let mut sink = LikelihoodOnly;
        self.run(ss, data, &mut sink)
    }

    /// Runs the filter and keeps every intermediate quantity.
    pub fn filter(&self, ss: &StateSpaceModel, data: ArrayView2<'_, f64>) -> Result<FilterOutput, FilterError> {
        let (t_len, k) = data.dim();
        let n = ss.n_states();
        let mut paths = Paths {
            contributions: Array1::zeros(t_len),
            innovations: Array2::from_elem((t_len, k), f64::NAN),
            innovation_covariances: Vec::with_capacity(t_len),
            predicted_means: Array2::zeros((t_len, n)),
            predicted_covariances: Vec::with_capacity(t_len),
            filtered_means: Array2::zeros((t_len, n)),
            filtered_covariances: Vec::with_capacity(t_len),
            initial: None,
            steps: Vec::with_capacity(t_len),
        };
        let log_likelihood = self.run(ss, data, &mut paths)?;
        let (initial_mean, initial_covariance) = paths
            .initial
            .ok_or_else(|| FilterError::InvalidConfig { reason: "filter produced no initial state".to_string() })?;
        Ok(FilterOutput {
            log_likelihood,
            contributions: paths.contributions,
            innovations: paths.innovations,
            innovation_covariances: paths.innovation_covariances,
            predicted_means: paths.predicted_means,
            predicted_covariances: paths.predicted_covariances,
            filtered_means: paths.filtered_means,
            filtered_covariances: paths.filtered_covariances,
            initial_mean,
            initial_covariance,
            steps: paths.steps,
        })
    }

    /// Filters, then runs the Durbin–Koopman smoother backwards.
    ///
    /// # Errors
    ///
    /// [`FilterError::SmootherRequiresZeroD`] if the model loads shocks
    /// directly into the observables, plus every filter error.
    pub fn smooth(&self, ss: &StateSpaceModel, data: ArrayView2<'_, f64>) -> Result<SmootherOutput, FilterError> {
        if !ss.has_zero_d() {
            return Err(FilterError::SmootherRequiresZeroD);
        }
        let output = self.filter(ss, data)?;
        smooth(ss, output)
    }

    #[tracing::instrument(skip_all, fields(steps = data.nrows(), states = ss.n_states()))]
    fn run(&self, ss: &StateSpaceModel, data: ArrayView2<'_, f64>, sink: &mut impl StepSink) -> Result<f64, FilterError> {
        self.config.validate()?;
        let (t_len, k) = data.dim();
        if t_len == 0 {
            return Err(FilterError::EmptyData);
        }
        if k != ss.n_observables() {
            return Err(FilterError::DimensionMismatch {
                what: "observation columns",
                expected: ss.n_observables(),
                got: k,
            });
        }

        let n = ss.n_states();
        let (a, b, c, d) = (ss.a(), ss.b(), ss.c(), ss.d());
        let r = ss.measurement_covariance();
        let constant = ss.observation_constant();
        let q = ss.state_noise_covariance();
        let eye = Array2::<f64>::eye(n);

        let (mut mean, mut cov) = initial_moments(ss, self.config.initial_state())?;
        sink.initial(&mean, &cov);
        let budget = Budget::start(self.config.timeout());
        let mut total = 0.0;

        for t in 0..t_len {
            if budget.exhausted() {
                warn!(t, "filter budget exhausted");
                return Err(FilterError::BudgetExhausted { t });
            }

            let pred_mean = a.dot(&mean);
            let mut pred_cov = a.dot(&cov).dot(&a.t()) + &q;
            symmetrize(&mut pred_cov);

            let row = data.row(t);
            let observed: Vec<usize> = (0..k).filter(|&i| !row[i].is_nan()).collect();
            if observed.is_empty() {
                sink.step(t, Step {
                    record: StepRecord {
                        observed,
                        innovation: Array1::zeros(0),
                        f_inv: Array2::zeros((0, 0)),
                        gain: Array2::zeros((n, 0)),
                    },
                    contribution: 0.0,
                    f: Array2::zeros((0, 0)),
                    pred_mean: &pred_mean,
                    pred_cov: &pred_cov,
                    mean: &pred_mean,
                    cov: &pred_cov,
                });
                mean = pred_mean;
                cov = pred_cov;
                continue;
            }

            let c_obs = c.select(Axis(0), &observed);
            let d_obs = d.select(Axis(0), &observed);
            let r_obs = r.select(Axis(0), &observed).select(Axis(1), &observed);
            let x: Array1<f64> = observed.iter().map(|&i| row[i] - constant[i]).collect();

            let innovation = &x - &c_obs.dot(&pred_mean);
            let cross = &pred_cov.dot(&c_obs.t()) + &b.dot(&d_obs.t());
            let shock_cross = c_obs.dot(b).dot(&d_obs.t());
            let mut f = c_obs.dot(&pred_cov).dot(&c_obs.t()) + d_obs.dot(&d_obs.t()) + &shock_cross
                + &shock_cross.t()
                + &r_obs;
            symmetrize(&mut f);

            let factor = SpdFactor::new(f.view()).map_err(|_| FilterError::FilterDegenerate { t })?;
            let f_inv = factor.inverse();
            let gain = cross.dot(&f_inv);
            let quad = innovation.dot(&factor.solve_vec(innovation.view()));
            let contribution = -0.5 * (observed.len() as f64 * LN_2PI + factor.log_det() + quad);

            let new_mean = &pred_mean + &gain.dot(&innovation);
            let reduce = &eye - &gain.dot(&c_obs);
            let l = reduce.dot(a);
            let g = reduce.dot(b) - gain.dot(&d_obs);
            let mut new_cov = l.dot(&cov).dot(&l.t()) + g.dot(&g.t()) + gain.dot(&r_obs).dot(&gain.t());
            symmetrize(&mut new_cov);

            if !contribution.is_finite() || !is_finite(new_mean.iter()) || !is_finite(new_cov.iter()) {
                debug!(t, contribution, "non-finite filter update");
                return Err(FilterError::FilterDegenerate { t });
            }
            total += contribution;

            sink.step(t, Step {
                record: StepRecord {
                    observed,
                    innovation,
                    f_inv,
                    gain,
                },
                contribution,
                f,
                pred_mean: &pred_mean,
                pred_cov: &pred_cov,
                mean: &new_mean,
                cov: &new_cov,
            });
            mean = new_mean;
            cov = new_cov;
        }
        debug!(log_likelihood = total, "filter finished");
        Ok(total)
    }
}

/// Mean and covariance of the state before the first observation.
pub(crate) fn initial_moments(
    ss: &StateSpaceModel,
    initial: &InitialState,
) -> Result<(Array1<f64>, Array2<f64>), FilterError> {
    let n = ss.n_states();
    match initial {
        InitialState::Stationary => {
            let q = ss.state_noise_covariance();
            match lyapunov(ss.a().view(), q.view(), LyapunovOptions::default()) {
                Ok(cov) => Ok((Array1::zeros(n), cov)),
                Err(LinalgError::NotStable { radius }) => Err(FilterError::NotStationary { radius }),
                Err(e) => Err(e.into()),
            }
        }
        InitialState::Diffuse { variance } => Ok((Array1::zeros(n), Array2::eye(n) * *variance)),
        InitialState::Given { mean, covariance } => {
            if mean.len() != n {
                return Err(FilterError::DimensionMismatch {
                    what: "initial state mean",
                    expected: n,
                    got: mean.len(),
                });
            }
            if covariance.nrows() != n || covariance.ncols() != n {
                return Err(FilterError::DimensionMismatch {
                    what: "initial state covariance",
                    expected: n,
                    got: covariance.nrows(),
                });
            }
            Ok((mean.clone(), covariance.clone()))
        }
    }
}

/// Everything produced by one filter step.
struct Step<'a> {
    record: StepRecord,
    contribution: f64,
    f: Array2<f64>,
    pred_mean: &'a Array1<f64>,
    pred_cov: &'a Array2<f64>,
    mean: &'a Array1<f64>,
    cov: &'a Array2<f64>,
}

/// Receives per-step results; lets the likelihood-only path skip storage.
trait StepSink {
    fn initial(&mut self, mean: &Array1<f64>, cov: &Array2<f64>);
    fn step(&mut self, t: usize, step: Step<'_>);
}

struct LikelihoodOnly;

impl StepSink for LikelihoodOnly {
    fn initial(&mut self, _mean: &Array1<f64>, _cov: &Array2<f64>) {}
    fn step(&mut self, _t: usize, _step: Step<'_>) {}
}

struct Paths {
    contributions: Array1<f64>,
    innovations: Array2<f64>,
    innovation_covariances: Vec<Array2<f64>>,
    predicted_means: Array2<f64>,
    predicted_covariances: Vec<Array2<f64>>,
    filtered_means: Array2<f64>,
    filtered_covariances: Vec<Array2<f64>>,
    initial: Option<(Array1<f64>, Array2<f64>)>,
    steps: Vec<StepRecord>,
}

impl StepSink for Paths {
    fn initial(&mut self, mean: &Array1<f64>, cov: &Array2<f64>) {
        self.initial = Some((mean.clone(), cov.clone()));
    }

    fn step(&mut self, t: usize, step: Step<'_>) {
        self.contributions[t] = step.contribution;
        for (j, &i) in step.record.observed.iter().enumerate() {
            self.innovations[[t, i]] = step.record.innovation[j];
        }
        self.innovation_covariances.push(step.f);
        self.predicted_means.row_mut(t).assign(step.pred_mean);
        self.predicted_covariances.push(step.pred_cov.clone());
        self.filtered_means.row_mut(t).assign(step.mean);
        self.filtered_covariances.push(step.cov.clone());
        self.steps.push(step.record);
    }
}
