//! Discrete Lyapunov equation `Σ = A Σ Aᵀ + Q`.
//!
//! Solved by the doubling recursion
//!
//! ```text
//! Σ₀ = Q,  A₀ = A
//! Σₖ₊₁ = Σₖ + Aₖ Σₖ Aₖᵀ,  Aₖ₊₁ = Aₖ²
//! ```
//!
//! which after `k` steps sums the first `2ᵏ` terms of `Σ Aʲ Q Aʲᵀ`.

use ndarray::{Array2, ArrayView2};

use crate::dense::{spectral_radius, symmetrize};
use crate::error::LinalgError;

/// Convergence controls for [`lyapunov`].
#[derive(Debug, Clone, Copy)]
pub struct LyapunovOptions {
    /// Relative change in `Σ` at which doubling stops.
    pub tolerance: f64,
    /// Doubling steps before giving up.
    pub max_iterations: usize,
    /// Spectral radius at or above which the equation is rejected.
    pub stability_limit: f64,
}

impl Default for LyapunovOptions {
    fn default() -> Self {
        Self {
            tolerance: 1e-14,
            max_iterations: 100,
            stability_limit: 1.0,
        }
    }
}

/// Solves `Σ = A Σ Aᵀ + Q` for a stable `A`.
///
/// The result is symmetric whenever `Q` is.
///
/// # Errors
///
/// - [`LinalgError::NotSquare`] / [`LinalgError::DimensionMismatch`] on bad shapes.
/// - [`LinalgError::NotStable`] if the spectral radius of `A` reaches
///   `options.stability_limit`.
/// - [`LinalgError::NoConvergence`] if doubling does not settle.
pub fn lyapunov(
    a: ArrayView2<'_, f64>,
    q: ArrayView2<'_, f64>,
    options: LyapunovOptions,
) -> Result<Array2<f64>, LinalgError> {
    let n = a.nrows();
    if a.ncols() != n {
        return Err(LinalgError::NotSquare {
            rows: n,
            cols: a.ncols(),
        });
    }
    if q.nrows() != n || q.ncols() != n {
        return Err(LinalgError::DimensionMismatch {
            expected: n,
            got: q.nrows(),
        });
    }
    let radius = spectral_radius(a)?;
    if radius >= options.stability_limit {
        return Err(LinalgError::NotStable { radius });
    }

    let mut sigma = q.to_owned();
    let mut ak = a.to_owned();
    for _ in 0..options.max_iterations {
        let increment = ak.dot(&sigma).dot(&ak.t());
        let change = increment.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        sigma += &increment;
        let scale = sigma.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        if !change.is_finite() {
            break;
        }
        if change <= options.tolerance * scale.max(f64::MIN_POSITIVE) {
            symmetrize(&mut sigma);
            return Ok(sigma);
        }
        ak = ak.dot(&ak);
    }
    Err(LinalgError::NoConvergence {
        routine: "lyapunov doubling",
        iterations: options.max_iterations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn scalar_ar1_variance() {
        let a = array![[0.9]];
        let q = array![[1.0]];
        let s = lyapunov(a.view(), q.view(), LyapunovOptions::default()).unwrap();
        assert_abs_diff_eq!(s[[0, 0]], 1.0 / (1.0 - 0.81), epsilon = 1e-10);
    }

    #[test]
    fn satisfies_fixed_point() {
        let a = array![[0.5, 0.2, 0.0], [0.0, 0.3, 0.1], [0.1, 0.0, 0.7]];
        let b = array![[1.0, 0.0], [0.5, 1.0], [0.0, 0.3]];
        let q = b.dot(&b.t());
        let s = lyapunov(a.view(), q.view(), LyapunovOptions::default()).unwrap();
        let rhs = a.dot(&s).dot(&a.t()) + &q;
        for (x, y) in s.iter().zip(rhs.iter()) {
            assert_abs_diff_eq!(x, y, epsilon = 1e-12);
        }
    }

    #[test]
    fn zero_transition() {
        let a = Array2::<f64>::zeros((2, 2));
        let q = array![[2.0, 0.5], [0.5, 1.0]];
        let s = lyapunov(a.view(), q.view(), LyapunovOptions::default()).unwrap();
        assert_eq!(s, q);
    }

    #[test]
    fn unit_root_rejected() {
        let a = array![[1.0, 0.0], [0.0, 0.5]];
        let q = Array2::<f64>::eye(2);
        assert!(matches!(
            lyapunov(a.view(), q.view(), LyapunovOptions::default()),
            Err(LinalgError::NotStable { .. })
        ));
    }

    #[test]
    fn shape_mismatch() {
        let a = Array2::<f64>::zeros((2, 2));
        let q = Array2::<f64>::zeros((3, 3));
        assert!(matches!(
            lyapunov(a.view(), q.view(), LyapunovOptions::default()),
            Err(LinalgError::DimensionMismatch { expected: 2, got: 3 })
        ));
    }
}
