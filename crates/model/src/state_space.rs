//! Linear state-space representation of a solved model.
//!
//! ```text
//! s_t = A s_{t-1} + B ε_t              ε_t ~ N(0, I)
//! x_t = c + C s_t + D ε_t + η_t        η_t ~ N(0, R)
//! ```
//!
//! Shocks are in standard-deviation units; their scale lives in `B`.

use ndarray::{Array1, Array2};

use crate::error::ModelError;

/// Read-only state-space matrices with names for every dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct StateSpaceModel {
    a: Array2<f64>,
    b: Array2<f64>,
    c: Array2<f64>,
    d: Array2<f64>,
    r: Array2<f64>,
    obs_constant: Array1<f64>,
    state_names: Vec<String>,
    shock_names: Vec<String>,
    observable_names: Vec<String>,
}

impl StateSpaceModel {
    /// Creates a model with zero measurement error, zero observation
    /// constant and positional names.
    ///
    /// # Errors
    ///
    /// [`ModelError::DimensionMismatch`] if the four matrices do not conform.
    pub fn new(
        a: Array2<f64>,
        b: Array2<f64>,
        c: Array2<f64>,
        d: Array2<f64>,
    ) -> Result<Self, ModelError> {
        let n = a.nrows();
        check_dim("A columns", n, a.ncols())?;
        check_dim("B rows", n, b.nrows())?;
        let k = b.ncols();
        check_dim("C columns", n, c.ncols())?;
        let m = c.nrows();
        check_dim("D rows", m, d.nrows())?;
        check_dim("D columns", k, d.ncols())?;
        Ok(Self {
            a,
            b,
            c,
            d,
            r: Array2::zeros((m, m)),
            obs_constant: Array1::zeros(m),
            state_names: (0..n).map(|i| format!("s{i}")).collect(),
            shock_names: (0..k).map(|i| format!("e{i}")).collect(),
            observable_names: (0..m).map(|i| format!("x{i}")).collect(),
        })
    }

    /// Sets the measurement-error covariance `R` (`m × m`).
    pub fn with_measurement_covariance(mut self, r: Array2<f64>) -> Result<Self, ModelError> {
        let m = self.n_observables();
        check_dim("R rows", m, r.nrows())?;
        check_dim("R columns", m, r.ncols())?;
        self.r = r;
        Ok(self)
    }

    /// Sets the observation constant `c` (length `m`).
    pub fn with_observation_constant(mut self, constant: Array1<f64>) -> Result<Self, ModelError> {
        check_dim("observation constant", self.n_observables(), constant.len())?;
        self.obs_constant = constant;
        Ok(self)
    }

    /// Names states, shocks and observables.
    pub fn with_names(
        mut self,
        states: Vec<String>,
        shocks: Vec<String>,
        observables: Vec<String>,
    ) -> Result<Self, ModelError> {
        check_dim("state names", self.n_states(), states.len())?;
        check_dim("shock names", self.n_shocks(), shocks.len())?;
        check_dim("observable names", self.n_observables(), observables.len())?;
        self.state_names = states;
        self.shock_names = shocks;
        self.observable_names = observables;
        Ok(self)
    }

    /// Copy with `R = 0`.
    pub fn without_measurement_error(&self) -> Self {
        let mut out = self.clone();
        out.r.fill(0.0);
        out
    }

    /// Copy keeping only the observables at `rows`, in that order.
    pub fn select_observables(&self, rows: &[usize]) -> Result<Self, ModelError> {
        let m = self.n_observables();
        if let Some(&bad) = rows.iter().find(|&&i| i >= m) {
            return Err(ModelError::DimensionMismatch {
                what: "observable index",
                expected: m,
                got: bad,
            });
        }
        let pick = |src: &Array2<f64>| src.select(ndarray::Axis(0), rows);
        Ok(Self {
            a: self.a.clone(),
            b: self.b.clone(),
            c: pick(&self.c),
            d: pick(&self.d),
            r: pick(&self.r).select(ndarray::Axis(1), rows),
            obs_constant: self.obs_constant.select(ndarray::Axis(0), rows),
            state_names: self.state_names.clone(),
            shock_names: self.shock_names.clone(),
            observable_names: rows.iter().map(|&i| self.observable_names[i].clone()).collect(),
        })
    }

    /// Transition matrix `A`.
    pub fn a(&self) -> &Array2<f64> {
        &self.a
    }

    /// Shock loading `B`.
    pub fn b(&self) -> &Array2<f64> {
        &self.b
    }

    /// Measurement matrix `C`.
    pub fn c(&self) -> &Array2<f64> {
        &self.c
    }

    /// Direct shock loading of observables `D`.
    pub fn d(&self) -> &Array2<f64> {
        &self.d
    }

    /// Measurement-error covariance `R`.
    pub fn measurement_covariance(&self) -> &Array2<f64> {
        &self.r
    }

    /// Observation constant `c`.
    pub fn observation_constant(&self) -> &Array1<f64> {
        &self.obs_constant
    }

    /// `B Bᵀ`.
    pub fn state_noise_covariance(&self) -> Array2<f64> {
        self.b.dot(&self.b.t())
    }

    /// Returns `true` if `D` is identically zero.
    pub fn has_zero_d(&self) -> bool {
        self.d.iter().all(|&v| v == 0.0)
    }

    /// Number of states.
    pub fn n_states(&self) -> usize {
        self.a.nrows()
    }

    /// Number of shocks.
    pub fn n_shocks(&self) -> usize {
        self.b.ncols()
    }

    /// Number of observables.
    pub fn n_observables(&self) -> usize {
        self.c.nrows()
    }

    /// State names.
    pub fn state_names(&self) -> &[String] {
        &self.state_names
    }

    /// Shock names.
    pub fn shock_names(&self) -> &[String] {
        &self.shock_names
    }

    /// Observable names.
    pub fn observable_names(&self) -> &[String] {
        &self.observable_names
    }

    /// Index of state `name`.
    pub fn state_index(&self, name: &str) -> Result<usize, ModelError> {
        lookup("state", &self.state_names, name)
    }

    /// Index of shock `name`.
    pub fn shock_index(&self, name: &str) -> Result<usize, ModelError> {
        lookup("shock", &self.shock_names, name)
    }

    /// Index of observable `name`.
    pub fn observable_index(&self, name: &str) -> Result<usize, ModelError> {
        lookup("observable", &self.observable_names, name)
    }
}

fn lookup(kind: &'static str, names: &[String], name: &str) -> Result<usize, ModelError> {
    names
        .iter()
        .position(|n| n == name)
        .ok_or_else(|| ModelError::UnknownName {
            kind,
            name: name.to_string(),
        })
}

fn check_dim(what: &'static str, expected: usize, got: usize) -> Result<(), ModelError> {
    if expected != got {
        return Err(ModelError::DimensionMismatch {
            what,
            expected,
            got,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn two_state() -> StateSpaceModel {
        StateSpaceModel::new(
            array![[0.9, 0.0], [0.1, 0.5]],
            array![[1.0], [0.0]],
            array![[1.0, 0.0], [0.0, 1.0], [1.0, 1.0]],
            Array2::zeros((3, 1)),
        )
        .unwrap()
    }

    #[test]
    fn dimensions() {
        let ss = two_state();
        assert_eq!(ss.n_states(), 2);
        assert_eq!(ss.n_shocks(), 1);
        assert_eq!(ss.n_observables(), 3);
        assert!(ss.has_zero_d());
        assert_eq!(ss.state_names(), ["s0", "s1"]);
    }

    #[test]
    fn rejects_nonconforming_c() {
        let err = StateSpaceModel::new(
            Array2::eye(2),
            Array2::zeros((2, 1)),
            Array2::zeros((1, 3)),
            Array2::zeros((1, 1)),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ModelError::DimensionMismatch {
                what: "C columns",
                expected: 2,
                got: 3
            }
        );
    }

    #[test]
    fn select_observables_keeps_order() {
        let ss = two_state()
            .with_measurement_covariance(Array2::from_diag(&array![1.0, 2.0, 3.0]))
            .unwrap()
            .with_observation_constant(array![10.0, 20.0, 30.0])
            .unwrap();
        let sub = ss.select_observables(&[2, 0]).unwrap();
        assert_eq!(sub.c(), &array![[1.0, 1.0], [1.0, 0.0]]);
        assert_eq!(sub.measurement_covariance(), &array![[3.0, 0.0], [0.0, 1.0]]);
        assert_eq!(sub.observation_constant(), &array![30.0, 10.0]);
        assert_eq!(sub.observable_names(), ["x2", "x0"]);
        assert!(ss.select_observables(&[3]).is_err());
    }

    #[test]
    fn names_and_lookup() {
        let ss = two_state()
            .with_names(
                vec!["y".into(), "z".into()],
                vec!["eps".into()],
                vec!["a".into(), "b".into(), "c".into()],
            )
            .unwrap();
        assert_eq!(ss.state_index("z").unwrap(), 1);
        assert_eq!(ss.shock_index("eps").unwrap(), 0);
        assert!(matches!(
            ss.observable_index("q"),
            Err(ModelError::UnknownName { kind: "observable", .. })
        ));
    }

    #[test]
    fn zero_measurement_error_copy() {
        let ss = two_state()
            .with_measurement_covariance(Array2::eye(3))
            .unwrap();
        let clean = ss.without_measurement_error();
        assert!(clean.measurement_covariance().iter().all(|&v| v == 0.0));
        assert_eq!(ss.measurement_covariance()[[0, 0]], 1.0);
    }
}
