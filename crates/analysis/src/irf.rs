//! Impulse responses.

use dsge_model::StateSpaceModel;
use ndarray::{Array1, Array2};

use crate::error::AnalysisError;

/// Response of states and observables to a one-time shock at `h = 0`.
///
/// Both matrices have `horizon + 1` rows; observables are deviations from
/// their steady-state values (no observation constant).
#[derive(Debug, Clone, PartialEq)]
pub struct ImpulseResponse {
    shock: usize,
    states: Array2<f64>,
    observables: Array2<f64>,
}

impl ImpulseResponse {
    /// Index of the shock.
    pub fn shock(&self) -> usize {
        self.shock
    }

    /// `A^h B e` for `h = 0..=horizon`.
    pub fn states(&self) -> &Array2<f64> {
        &self.states
    }

    /// `C s_h` (plus `D e` at `h = 0`).
    pub fn observables(&self) -> &Array2<f64> {
        &self.observables
    }
}

pub(crate) fn check_shock(ss: &StateSpaceModel, shock: usize) -> Result<(), AnalysisError> {
    if shock >= ss.n_shocks() {
        return Err(AnalysisError::UnknownShock {
            index: shock,
            shocks: ss.n_shocks(),
        });
    }
    Ok(())
}

/// Response to a shock of size `magnitude` (in standard deviations).
///
/// # Example
///
/// ```
/// use dsge_analysis::impulse_response;
/// use dsge_model::StateSpaceModel;
/// use ndarray::array;
///
/// let ss = StateSpaceModel::new(array![[0.5]], array![[2.0]], array![[1.0]], array![[0.0]]).unwrap();
/// let irf = impulse_response(&ss, 0, 1.0, 3).unwrap();
/// assert_eq!(irf.observables().column(0).to_vec(), vec![2.0, 1.0, 0.5, 0.25]);
/// ```
pub fn impulse_response(
    ss: &StateSpaceModel,
    shock: usize,
    magnitude: f64,
    horizon: usize,
) -> Result<ImpulseResponse, AnalysisError> {
    check_shock(ss, shock)?;
    let (n, m) = (ss.n_states(), ss.n_observables());
    let mut states = Array2::zeros((horizon + 1, n));
    let mut observables = Array2::zeros((horizon + 1, m));

    let mut s: Array1<f64> = ss.b().column(shock).mapv(|v| v * magnitude);
    for h in 0..=horizon {
        let mut x = ss.c().dot(&s);
        if h == 0 {
            x.scaled_add(magnitude, &ss.d().column(shock));
        }
        states.row_mut(h).assign(&s);
        observables.row_mut(h).assign(&x);
        s = ss.a().dot(&s);
    }
    Ok(ImpulseResponse {
        shock,
        states,
        observables,
    })
}

/// One-standard-deviation responses to every shock, in shock order.
pub fn impulse_responses(ss: &StateSpaceModel, horizon: usize) -> Result<Vec<ImpulseResponse>, AnalysisError> {
    (0..ss.n_shocks())
        .map(|shock| impulse_response(ss, shock, 1.0, horizon))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn direct_loading_only_at_impact() {
        let ss = StateSpaceModel::new(array![[0.5]], array![[1.0]], array![[2.0]], array![[0.3]]).unwrap();
        let irf = impulse_response(&ss, 0, 1.0, 2).unwrap();
        assert_abs_diff_eq!(irf.observables()[[0, 0]], 2.3, epsilon = 1e-15);
        assert_abs_diff_eq!(irf.observables()[[1, 0]], 1.0, epsilon = 1e-15);
    }

    #[test]
    fn magnitude_scales_linearly() {
        let ss = StateSpaceModel::new(array![[0.9]], array![[0.4]], array![[1.0]], array![[0.0]]).unwrap();
        let one = impulse_response(&ss, 0, 1.0, 5).unwrap();
        let neg = impulse_response(&ss, 0, -2.0, 5).unwrap();
        for (a, b) in one.states().iter().zip(neg.states().iter()) {
            assert_abs_diff_eq!(*b, -2.0 * a, epsilon = 1e-15);
        }
    }

    #[test]
    fn rejects_unknown_shock() {
        let ss = StateSpaceModel::new(array![[0.9]], array![[0.4]], array![[1.0]], array![[0.0]]).unwrap();
        assert_eq!(
            impulse_response(&ss, 1, 1.0, 5),
            Err(AnalysisError::UnknownShock { index: 1, shocks: 1 })
        );
        assert_eq!(impulse_responses(&ss, 5).unwrap().len(), 1);
    }
}
