//! Complex generalized Schur (QZ) decomposition with eigenvalue reordering.
//!
//! For a real pencil `(F, G)` finds unitary `Q`, `Z` with
//!
//! ```text
//! Q F Z = S    (upper triangular)
//! Q G Z = T    (upper triangular)
//! ```
//!
//! so the generalized eigenvalues of `F x' = G x` are `t_ii / s_ii`.
//! Steps: QR-triangularize `S`, reduce `T` to Hessenberg form, then
//! single-shift implicit QZ sweeps with deflation. Zero pivots on the
//! diagonal of `S` (infinite eigenvalues) are chased to the bottom of the
//! active block and deflated there.
//!
//! **Not part of the public API.**

use ndarray::Array2;
use num_complex::Complex64;

use crate::error::SolutionError;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);

/// Plane rotation `[[c, s], [-conj(s), c]]` with real `c`.
#[derive(Debug, Clone, Copy)]
struct Rotation {
    c: f64,
    s: Complex64,
}

impl Rotation {
    /// Rotation mapping `[a; b]` to `[r; 0]`.
    fn zeroing(a: Complex64, b: Complex64) -> Self {
        if b == ZERO {
            return Self { c: 1.0, s: ZERO };
        }
        if a == ZERO {
            return Self {
                c: 0.0,
                s: Complex64::new(1.0, 0.0),
            };
        }
        let na = a.norm();
        let norm = na.hypot(b.norm());
        Self {
            c: na / norm,
            s: (a / na) * b.conj() / norm,
        }
    }
}

fn rotate_rows(m: &mut Array2<Complex64>, i: usize, j: usize, rot: Rotation) {
    for k in 0..m.ncols() {
        let x = m[[i, k]];
        let y = m[[j, k]];
        m[[i, k]] = x * rot.c + rot.s * y;
        m[[j, k]] = -rot.s.conj() * x + y * rot.c;
    }
}

fn rotate_cols(m: &mut Array2<Complex64>, i: usize, j: usize, rot: Rotation) {
    for k in 0..m.nrows() {
        let x = m[[k, i]];
        let y = m[[k, j]];
        m[[k, i]] = x * rot.c - rot.s.conj() * y;
        m[[k, j]] = rot.s * x + y * rot.c;
    }
}

fn frobenius(m: &Array2<Complex64>) -> f64 {
    m.iter().map(|z| z.norm_sqr()).sum::<f64>().sqrt()
}

fn complexify(m: &Array2<f64>) -> Array2<Complex64> {
    m.mapv(|v| Complex64::new(v, 0.0))
}

/// Generalized Schur form `(S, T, Q, Z)`.
#[derive(Debug, Clone)]
pub(crate) struct Qz {
    pub(crate) s: Array2<Complex64>,
    pub(crate) t: Array2<Complex64>,
    pub(crate) q: Array2<Complex64>,
    pub(crate) z: Array2<Complex64>,
}

impl Qz {
    /// Decomposes the pencil `(lead, current)`.
    ///
    /// `max_sweeps` bounds the QZ sweeps per eigenvalue.
    pub(crate) fn decompose(
        lead: &Array2<f64>,
        current: &Array2<f64>,
        max_sweeps: usize,
    ) -> Result<Self, SolutionError> {
        let n = lead.nrows();
        let mut qz = Self {
            s: complexify(lead),
            t: complexify(current),
            q: Array2::eye(n),
            z: Array2::eye(n),
        };
        qz.triangularize();
        qz.hessenberg();
        qz.iterate(max_sweeps.saturating_mul(n.max(1)))?;
        Ok(qz)
    }

    fn n(&self) -> usize {
        self.s.nrows()
    }

    fn rows(&mut self, i: usize, j: usize, rot: Rotation) {
        rotate_rows(&mut self.s, i, j, rot);
        rotate_rows(&mut self.t, i, j, rot);
        rotate_rows(&mut self.q, i, j, rot);
    }

    fn cols(&mut self, i: usize, j: usize, rot: Rotation) {
        rotate_cols(&mut self.s, i, j, rot);
        rotate_cols(&mut self.t, i, j, rot);
        rotate_cols(&mut self.z, i, j, rot);
    }

    /// QR of `S` by bottom-up Givens rotations.
    fn triangularize(&mut self) {
        let n = self.n();
        for j in 0..n {
            for i in (j + 1..n).rev() {
                let rot = Rotation::zeroing(self.s[[i - 1, j]], self.s[[i, j]]);
                self.rows(i - 1, i, rot);
                self.s[[i, j]] = ZERO;
            }
        }
    }

    /// Hessenberg-triangular reduction.
    fn hessenberg(&mut self) {
        let n = self.n();
        for j in 0..n.saturating_sub(2) {
            for i in (j + 2..n).rev() {
                let rot = Rotation::zeroing(self.t[[i - 1, j]], self.t[[i, j]]);
                self.rows(i - 1, i, rot);
                self.t[[i, j]] = ZERO;

                let rot = Rotation::zeroing(self.s[[i, i]], self.s[[i, i - 1]]);
                self.cols(i - 1, i, rot);
                self.s[[i, i - 1]] = ZERO;
            }
        }
    }

    fn iterate(&mut self, max_sweeps: usize) -> Result<(), SolutionError> {
        let n = self.n();
        if n < 2 {
            return Ok(());
        }
        let ulp = f64::EPSILON;
        let t_small = ulp * frobenius(&self.t).max(f64::MIN_POSITIVE);
        let s_small = ulp * frobenius(&self.s).max(f64::MIN_POSITIVE);

        let mut hi = n - 1;
        let mut sweeps = 0;
        let mut since_deflation = 0;
        while hi > 0 {
            let mut l = hi;
            while l > 0 {
                let sub = self.t[[l, l - 1]].norm();
                let diag = self.t[[l - 1, l - 1]].norm() + self.t[[l, l]].norm();
                if sub <= ulp * diag || sub <= t_small {
                    self.t[[l, l - 1]] = ZERO;
                    break;
                }
                l -= 1;
            }
            if l == hi {
                hi -= 1;
                since_deflation = 0;
                continue;
            }

            if let Some(k) = (l..=hi).find(|&k| self.s[[k, k]].norm() <= s_small) {
                self.s[[k, k]] = ZERO;
                self.push_infinite_down(k, l, hi);
                continue;
            }

            sweeps += 1;
            since_deflation += 1;
            if sweeps > max_sweeps {
                return Err(SolutionError::QzNotConverged {
                    iterations: max_sweeps,
                });
            }
            let shift = if since_deflation % 10 == 0 {
                self.t[[hi, hi]] / self.s[[hi, hi]]
                    + self.t[[hi, hi - 1]].norm() / self.s[[hi - 1, hi - 1]].norm()
            } else {
                self.wilkinson_shift(hi)
            };
            self.sweep(l, hi, shift);
        }

        for i in 0..n {
            for j in 0..i {
                self.s[[i, j]] = ZERO;
                self.t[[i, j]] = ZERO;
            }
        }
        Ok(())
    }

    /// Moves a zero at `S[k, k]` to `S[hi, hi]` and splits it off.
    fn push_infinite_down(&mut self, k: usize, l: usize, hi: usize) {
        for m in k..hi {
            let rot = Rotation::zeroing(self.s[[m, m + 1]], self.s[[m + 1, m + 1]]);
            self.rows(m, m + 1, rot);
            self.s[[m + 1, m + 1]] = ZERO;
            self.s[[m + 1, m]] = ZERO;
            if m > l {
                let rot = Rotation::zeroing(self.t[[m + 1, m]], self.t[[m + 1, m - 1]]);
                self.cols(m - 1, m, rot);
                self.t[[m + 1, m - 1]] = ZERO;
            }
        }
        let rot = Rotation::zeroing(self.t[[hi, hi]], self.t[[hi, hi - 1]]);
        self.cols(hi - 1, hi, rot);
        self.t[[hi, hi - 1]] = ZERO;
    }

    /// Eigenvalue of the trailing 2x2 pencil closest to `t_hh / s_hh`.
    fn wilkinson_shift(&self, hi: usize) -> Complex64 {
        let (a, b) = (self.t[[hi - 1, hi - 1]], self.t[[hi - 1, hi]]);
        let (c, d) = (self.t[[hi, hi - 1]], self.t[[hi, hi]]);
        let (s11, s12, s22) = (self.s[[hi - 1, hi - 1]], self.s[[hi - 1, hi]], self.s[[hi, hi]]);

        let qa = s11 * s22;
        let qb = -(a * s22 + d * s11 - c * s12);
        let qc = a * d - b * c;
        let disc = (qb * qb - qa * qc * 4.0).sqrt();
        let r1 = (-qb + disc) / (qa * 2.0);
        let r2 = (-qb - disc) / (qa * 2.0);
        let target = d / s22;
        if (r1 - target).norm() <= (r2 - target).norm() {
            r1
        } else {
            r2
        }
    }

    /// One implicit single-shift sweep over the block `l..=hi`.
    fn sweep(&mut self, l: usize, hi: usize, shift: Complex64) {
        let rot = Rotation::zeroing(
            self.t[[l, l]] - shift * self.s[[l, l]],
            self.t[[l + 1, l]],
        );
        self.rows(l, l + 1, rot);
        for k in l..hi {
            let rot = Rotation::zeroing(self.s[[k + 1, k + 1]], self.s[[k + 1, k]]);
            self.cols(k, k + 1, rot);
            self.s[[k + 1, k]] = ZERO;
            if k + 2 <= hi {
                let rot = Rotation::zeroing(self.t[[k + 1, k]], self.t[[k + 2, k]]);
                self.rows(k + 1, k + 2, rot);
                self.t[[k + 2, k]] = ZERO;
            }
        }
    }

    /// `(t_ii, s_ii)` pairs along the diagonal.
    pub(crate) fn diagonal(&self) -> Vec<(Complex64, Complex64)> {
        (0..self.n())
            .map(|i| (self.t[[i, i]], self.s[[i, i]]))
            .collect()
    }

    /// Swaps the adjacent eigenvalues at `k` and `k + 1`.
    fn swap(&mut self, k: usize) {
        let (a, b, c) = (self.s[[k, k]], self.s[[k, k + 1]], self.s[[k + 1, k + 1]]);
        let (d, e, f) = (self.t[[k, k]], self.t[[k, k + 1]], self.t[[k + 1, k + 1]]);

        let mut w = [c * e - f * b, (c * d - f * a).conj()];
        let mut x = [(b * d - e * a).conj(), (c * d - f * a).conj()];
        let nw = (w[0].norm_sqr() + w[1].norm_sqr()).sqrt();
        let nx = (x[0].norm_sqr() + x[1].norm_sqr()).sqrt();
        if nw <= f64::MIN_POSITIVE || nx <= f64::MIN_POSITIVE {
            return;
        }
        for v in &mut w {
            *v /= nw;
        }
        for v in &mut x {
            *v /= nx;
        }

        for m in [&mut self.s, &mut self.t, &mut self.q] {
            for j in 0..m.ncols() {
                let (p, q) = (m[[k, j]], m[[k + 1, j]]);
                m[[k, j]] = x[0] * p + x[1] * q;
                m[[k + 1, j]] = -x[1].conj() * p + x[0].conj() * q;
            }
        }
        for m in [&mut self.s, &mut self.t, &mut self.z] {
            for i in 0..m.nrows() {
                let (p, q) = (m[[i, k]], m[[i, k + 1]]);
                m[[i, k]] = w[0] * p - w[1].conj() * q;
                m[[i, k + 1]] = w[1] * p + w[0].conj() * q;
            }
        }
        self.s[[k + 1, k]] = ZERO;
        self.t[[k + 1, k]] = ZERO;
    }

    /// Reorders so that every root flagged by `is_explosive(t_ii, s_ii)`
    /// sits below every other root. Returns the number of non-explosive
    /// roots, which now occupy the leading block.
    pub(crate) fn reorder<F>(&mut self, is_explosive: F) -> Result<usize, SolutionError>
    where
        F: Fn(Complex64, Complex64) -> bool,
    {
        let n = self.n();
        let mut flags: Vec<bool> = self
            .diagonal()
            .into_iter()
            .map(|(t, s)| is_explosive(t, s))
            .collect();
        for i in (0..n).rev() {
            let Some(m) = (0..=i).rev().find(|&j| flags[j]) else {
                break;
            };
            for k in m..i {
                self.swap(k);
                flags.swap(k, k + 1);
            }
        }

        let n_stable = flags.iter().filter(|&&f| !f).count();
        let after: Vec<bool> = self
            .diagonal()
            .into_iter()
            .map(|(t, s)| is_explosive(t, s))
            .collect();
        let ordered = after[..n_stable].iter().all(|&f| !f) && after[n_stable..].iter().all(|&f| f);
        if !ordered {
            return Err(SolutionError::ReorderFailed);
        }
        Ok(n_stable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn conj_t(m: &Array2<Complex64>) -> Array2<Complex64> {
        m.t().mapv(|z| z.conj())
    }

    fn max_dev(a: &Array2<Complex64>, b: &Array2<Complex64>) -> f64 {
        a.iter().zip(b.iter()).map(|(x, y)| (x - y).norm()).fold(0.0, f64::max)
    }

    fn assert_valid(qz: &Qz, lead: &Array2<f64>, current: &Array2<f64>) {
        let n = lead.nrows();
        let id = Array2::<Complex64>::eye(n);
        assert!(max_dev(&qz.q.dot(&complexify(lead)).dot(&qz.z), &qz.s) < 1e-12);
        assert!(max_dev(&qz.q.dot(&complexify(current)).dot(&qz.z), &qz.t) < 1e-12);
        assert!(max_dev(&qz.q.dot(&conj_t(&qz.q)), &id) < 1e-12);
        assert!(max_dev(&qz.z.dot(&conj_t(&qz.z)), &id) < 1e-12);
        for i in 0..n {
            for j in 0..i {
                assert_eq!(qz.s[[i, j]], ZERO);
                assert_eq!(qz.t[[i, j]], ZERO);
            }
        }
    }

    fn lcg_matrix(n: usize, seed: &mut u64) -> Array2<f64> {
        Array2::from_shape_fn((n, n), |_| {
            *seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((*seed >> 11) as f64 / (1u64 << 53) as f64) * 2.0 - 1.0
        })
    }

    #[test]
    fn rotation_zeroes_second_entry() {
        let a = Complex64::new(1.0, 2.0);
        let b = Complex64::new(-0.5, 0.3);
        let rot = Rotation::zeroing(a, b);
        let y = -rot.s.conj() * a + b * rot.c;
        assert!(y.norm() < 1e-15);
    }

    #[test]
    fn decomposes_random_pencils() {
        let mut seed = 7;
        for n in [1, 2, 3, 5, 8] {
            let lead = lcg_matrix(n, &mut seed);
            let current = lcg_matrix(n, &mut seed);
            let qz = Qz::decompose(&lead, &current, 30).unwrap();
            assert_valid(&qz, &lead, &current);
        }
    }

    #[test]
    fn triangular_pencil_eigenvalues() {
        // roots 2 / 1 and 1.5 / 3
        let lead = array![[1.0, 0.4], [0.0, 3.0]];
        let current = array![[2.0, 0.1], [0.0, 1.5]];
        let qz = Qz::decompose(&lead, &current, 30).unwrap();
        let mut roots: Vec<f64> = qz.diagonal().iter().map(|(t, s)| (t / s).norm()).collect();
        roots.sort_by(f64::total_cmp);
        assert!((roots[0] - 0.5).abs() < 1e-12);
        assert!((roots[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn singular_lead_gives_infinite_root() {
        let lead = array![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 0.0]];
        let current = array![[0.5, 0.2, 0.0], [0.0, 0.9, 0.3], [0.1, 0.0, 1.0]];
        let qz = Qz::decompose(&lead, &current, 30).unwrap();
        assert_valid(&qz, &lead, &current);
        let infinite = qz.diagonal().iter().filter(|(_, s)| s.norm() < 1e-12).count();
        assert_eq!(infinite, 1);
    }

    #[test]
    fn reorder_moves_explosive_roots_last() {
        let mut seed = 42;
        let lead = lcg_matrix(6, &mut seed);
        let current = lcg_matrix(6, &mut seed);
        let mut qz = Qz::decompose(&lead, &current, 30).unwrap();
        let explosive = |t: Complex64, s: Complex64| t.norm() > s.norm();
        let before = qz.diagonal().iter().filter(|(t, s)| explosive(*t, *s)).count();
        let n_stable = qz.reorder(explosive).unwrap();
        assert_eq!(n_stable, 6 - before);
        assert_valid(&qz, &lead, &current);
        for (i, (t, s)) in qz.diagonal().into_iter().enumerate() {
            assert_eq!(explosive(t, s), i >= n_stable);
        }
    }
}
