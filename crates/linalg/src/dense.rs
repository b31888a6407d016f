//! LU, Cholesky, SVD and eigenvalue wrappers.

use nalgebra::{Cholesky, DMatrix, DVector, Dyn, SVD, Schur};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::convert::{from_dmatrix, to_dmatrix};
use crate::error::LinalgError;

const MAX_ITER: usize = 1000;

fn check_square(a: ArrayView2<'_, f64>) -> Result<usize, LinalgError> {
    if a.nrows() != a.ncols() {
        return Err(LinalgError::NotSquare {
            rows: a.nrows(),
            cols: a.ncols(),
        });
    }
    Ok(a.nrows())
}

/// Returns `true` if every value is finite.
pub fn is_finite<'a>(values: impl IntoIterator<Item = &'a f64>) -> bool {
    values.into_iter().all(|v| v.is_finite())
}

/// Solves `A X = B` by partial-pivot LU.
///
/// # Errors
///
/// [`LinalgError::Singular`] on a zero pivot or a non-finite solution.
pub fn solve(a: ArrayView2<'_, f64>, b: ArrayView2<'_, f64>) -> Result<Array2<f64>, LinalgError> {
    let n = check_square(a)?;
    if b.nrows() != n {
        return Err(LinalgError::DimensionMismatch {
            expected: n,
            got: b.nrows(),
        });
    }
    let x = to_dmatrix(a)
        .lu()
        .solve(&to_dmatrix(b))
        .ok_or(LinalgError::Singular)?;
    if !is_finite(x.iter()) {
        return Err(LinalgError::Singular);
    }
    Ok(from_dmatrix(&x))
}

/// Solves `A x = b` for a single right-hand side.
pub fn solve_vec(a: ArrayView2<'_, f64>, b: ArrayView1<'_, f64>) -> Result<Array1<f64>, LinalgError> {
    let x = solve(a, b.insert_axis(ndarray::Axis(1)))?;
    Ok(x.column(0).to_owned())
}

/// Inverts a square matrix.
pub fn inverse(a: ArrayView2<'_, f64>) -> Result<Array2<f64>, LinalgError> {
    check_square(a)?;
    let inv = to_dmatrix(a).try_inverse().ok_or(LinalgError::Singular)?;
    if !is_finite(inv.iter()) {
        return Err(LinalgError::Singular);
    }
    Ok(from_dmatrix(&inv))
}

/// Replaces `m` by `(m + mᵀ) / 2`.
pub fn symmetrize(m: &mut Array2<f64>) {
    let n = m.nrows().min(m.ncols());
    for i in 0..n {
        for j in (i + 1)..n {
            let avg = 0.5 * (m[[i, j]] + m[[j, i]]);
            m[[i, j]] = avg;
            m[[j, i]] = avg;
        }
    }
}

/// Ratio of the smallest to the largest singular value; `0` for a zero matrix.
pub fn reciprocal_condition(a: ArrayView2<'_, f64>) -> Result<f64, LinalgError> {
    if a.is_empty() {
        return Ok(1.0);
    }
    if !is_finite(a.iter()) {
        return Ok(0.0);
    }
    let svd = SVD::try_new(to_dmatrix(a), false, false, f64::EPSILON, MAX_ITER).ok_or(
        LinalgError::NoConvergence {
            routine: "singular value decomposition",
            iterations: MAX_ITER,
        },
    )?;
    let max = svd.singular_values.max();
    if max == 0.0 {
        return Ok(0.0);
    }
    Ok(svd.singular_values.min() / max)
}

/// Largest eigenvalue modulus of a square matrix.
pub fn spectral_radius(a: ArrayView2<'_, f64>) -> Result<f64, LinalgError> {
    let n = check_square(a)?;
    if n == 0 {
        return Ok(0.0);
    }
    let schur = Schur::try_new(to_dmatrix(a), f64::EPSILON, MAX_ITER).ok_or(
        LinalgError::NoConvergence {
            routine: "real Schur decomposition",
            iterations: MAX_ITER,
        },
    )?;
    Ok(schur
        .complex_eigenvalues()
        .iter()
        .map(|z| z.norm())
        .fold(0.0, f64::max))
}

/// Cholesky factor `A = L Lᵀ` of a symmetric positive-definite matrix.
#[derive(Debug, Clone)]
pub struct SpdFactor {
    chol: Cholesky<f64, Dyn>,
}

impl SpdFactor {
    /// Factorizes `a`.
    ///
    /// # Errors
    ///
    /// [`LinalgError::NotPositiveDefinite`] if a pivot is not positive or
    /// the input contains non-finite values.
    pub fn new(a: ArrayView2<'_, f64>) -> Result<Self, LinalgError> {
        check_square(a)?;
        if !is_finite(a.iter()) {
            return Err(LinalgError::NotPositiveDefinite);
        }
        let chol = Cholesky::new(to_dmatrix(a)).ok_or(LinalgError::NotPositiveDefinite)?;
        if chol.l_dirty().diagonal().iter().any(|&d| d <= 0.0 || !d.is_finite()) {
            return Err(LinalgError::NotPositiveDefinite);
        }
        Ok(Self { chol })
    }

    /// `ln det A`.
    pub fn log_det(&self) -> f64 {
        2.0 * self.chol.l_dirty().diagonal().iter().map(|d| d.ln()).sum::<f64>()
    }

    /// Solves `A X = B`.
    pub fn solve(&self, b: ArrayView2<'_, f64>) -> Array2<f64> {
        from_dmatrix(&self.chol.solve(&to_dmatrix(b)))
    }

    /// Solves `A x = b`.
    pub fn solve_vec(&self, b: ArrayView1<'_, f64>) -> Array1<f64> {
        let rhs = DVector::from_iterator(b.len(), b.iter().copied());
        let x = self.chol.solve(&rhs);
        Array1::from_iter(x.iter().copied())
    }

    /// `A⁻¹`.
    pub fn inverse(&self) -> Array2<f64> {
        from_dmatrix(&self.chol.inverse())
    }

    /// Lower-triangular factor `L`.
    pub fn lower(&self) -> Array2<f64> {
        let l: DMatrix<f64> = self.chol.l();
        from_dmatrix(&l)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn solve_known_system() {
        let a = array![[2.0, 1.0], [1.0, 3.0]];
        let b = array![[3.0], [5.0]];
        let x = solve(a.view(), b.view()).unwrap();
        assert_abs_diff_eq!(x[[0, 0]], 0.8, epsilon = 1e-12);
        assert_abs_diff_eq!(x[[1, 0]], 1.4, epsilon = 1e-12);
    }

    #[test]
    fn solve_singular() {
        let a = array![[1.0, 2.0], [2.0, 4.0]];
        let b = array![1.0, 1.0];
        assert_eq!(solve_vec(a.view(), b.view()), Err(LinalgError::Singular));
    }

    #[test]
    fn solve_rejects_shape() {
        let a = array![[1.0, 2.0, 3.0]];
        let b = array![[1.0]];
        assert!(matches!(
            solve(a.view(), b.view()),
            Err(LinalgError::NotSquare { rows: 1, cols: 3 })
        ));
    }

    #[test]
    fn inverse_times_matrix_is_identity() {
        let a = array![[4.0, 1.0, 0.0], [1.0, 3.0, 1.0], [0.0, 1.0, 2.0]];
        let inv = inverse(a.view()).unwrap();
        let id = a.dot(&inv);
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_abs_diff_eq!(id[[i, j]], expected, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn symmetrize_averages() {
        let mut m = array![[1.0, 2.0], [4.0, 5.0]];
        symmetrize(&mut m);
        assert_eq!(m, array![[1.0, 3.0], [3.0, 5.0]]);
    }

    #[test]
    fn cholesky_log_det_and_solve() {
        let a = array![[4.0, 2.0], [2.0, 3.0]];
        let f = SpdFactor::new(a.view()).unwrap();
        assert_abs_diff_eq!(f.log_det(), 8.0_f64.ln(), epsilon = 1e-12);
        let x = f.solve_vec(array![2.0, 1.0].view());
        let back = a.dot(&x);
        assert_abs_diff_eq!(back[0], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(back[1], 1.0, epsilon = 1e-12);
        let l = f.lower();
        assert_abs_diff_eq!(l.dot(&l.t())[[0, 1]], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn cholesky_rejects_indefinite() {
        let a = array![[1.0, 2.0], [2.0, 1.0]];
        assert!(matches!(
            SpdFactor::new(a.view()),
            Err(LinalgError::NotPositiveDefinite)
        ));
        let nan = array![[f64::NAN]];
        assert!(SpdFactor::new(nan.view()).is_err());
    }

    #[test]
    fn spectral_radius_of_rotation() {
        // eigenvalues 0.5 ± 0.5i
        let a = array![[0.5, -0.5], [0.5, 0.5]];
        assert_abs_diff_eq!(spectral_radius(a.view()).unwrap(), 0.5_f64.sqrt(), epsilon = 1e-12);
        let empty = Array2::<f64>::zeros((0, 0));
        assert_eq!(spectral_radius(empty.view()).unwrap(), 0.0);
    }

    #[test]
    fn condition_of_rank_deficient() {
        let a = array![[1.0, 1.0], [1.0, 1.0]];
        assert!(reciprocal_condition(a.view()).unwrap() < 1e-12);
        let id = Array2::<f64>::eye(3);
        assert_abs_diff_eq!(reciprocal_condition(id.view()).unwrap(), 1.0, epsilon = 1e-12);
    }
}
