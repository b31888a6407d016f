//! Blanchard–Kahn check and first-order policy from the ordered Schur form.
//!
//! With predetermined variables `P` and jump variables `J`, the linearized
//! system `f₋ ŷ_{t-1} + f₀ ŷ_t + f₊ E_t ŷ_{t+1} + f_ε ε_t = 0` is written on
//! `x_t = [ŷ^P_{t-1}; ŷ^J_t]` as
//!
//! ```text
//! [f₀^P  f₊^J] E_t x_{t+1} = -[f₋^P  f₀^J] x_t
//! ```
//!
//! After QZ with stable roots first, the stable block `Z₁₁` (rows `P`)
//! and `Z₂₁` (rows `J`) give
//!
//! ```text
//! ŷ^J_t = Z₂₁ Z₁₁⁻¹ ŷ^P_{t-1}
//! ŷ^P_t = Z₁₁ S₁₁⁻¹ T₁₁ Z₁₁⁻¹ ŷ^P_{t-1}
//! ```
//!
//! and the shock response is `g_u = -(f₀ + f₊ g_y)⁻¹ f_ε`.
//!
//! **Not part of the public API.**

use dsge_linalg::{reciprocal_condition, solve};
use dsge_model::{Jacobians, Model};
use nalgebra::{DMatrix, SVD};
use ndarray::{Array2, s};
use num_complex::Complex64;
use tracing::{debug, warn};

use crate::config::PerturbationConfig;
use crate::error::SolutionError;
use crate::qz::Qz;

/// Smallest reciprocal condition number accepted for `Z₁₁`.
const RANK_RCOND: f64 = 1e-12;

/// Decision rule `ŷ_t = g_y ŷ_{t-1} + g_u ε_t` in deviations.
#[derive(Debug, Clone)]
pub(crate) struct Policy {
    pub(crate) g_y: Array2<f64>,
    pub(crate) g_u: Array2<f64>,
    pub(crate) eigenvalues: Vec<Complex64>,
}

pub(crate) fn solve_policy(
    model: &Model,
    jac: &Jacobians,
    config: &PerturbationConfig,
) -> Result<Policy, SolutionError> {
    let n = model.n_variables();
    let pre = model.predetermined();
    let jumps = model.jumps();
    let (np, nj) = (pre.len(), jumps.len());
    model.check_timing(jac)?;

    let mut lead = Array2::<f64>::zeros((n, n));
    let mut current = Array2::<f64>::zeros((n, n));
    for (c, &v) in pre.iter().enumerate() {
        lead.column_mut(c).assign(&jac.current.column(v));
        current.column_mut(c).assign(&(-&jac.lag.column(v)));
    }
    for (c, &v) in jumps.iter().enumerate() {
        lead.column_mut(np + c).assign(&jac.lead.column(v));
        current.column_mut(np + c).assign(&(-&jac.current.column(v)));
    }

    let mut qz = Qz::decompose(&lead, &current, config.qz_max_iterations())?;

    let zero_tol = pencil_zero_tolerance(config.qz_zero_threshold(), &lead, &current);
    for (i, (t, s)) in qz.diagonal().into_iter().enumerate() {
        if t.norm() <= zero_tol && s.norm() <= zero_tol {
            return Err(SolutionError::SingularPencil { index: i });
        }
    }

    let crit = config.qz_criterium();
    let n_stable = qz.reorder(|t, s| t.norm() > crit * s.norm())?;
    let explosive = n - n_stable;
    let eigenvalues: Vec<Complex64> = qz
        .diagonal()
        .into_iter()
        .map(|(t, s)| {
            if s.norm() == 0.0 {
                Complex64::new(f64::INFINITY, 0.0)
            } else {
                t / s
            }
        })
        .collect();
    debug!(explosive, jumps = nj, "blanchard-kahn count");

    if explosive < nj {
        return Err(SolutionError::NoStableSolution { explosive, jumps: nj });
    }
    if explosive > nj {
        return Err(SolutionError::Unstable { explosive, jumps: nj });
    }
    if !config.allow_unit_roots() {
        let band = config.unit_band();
        if let Some(root) = eigenvalues[..n_stable]
            .iter()
            .find(|z| (z.norm() - 1.0).abs() <= band)
        {
            return Err(SolutionError::UnitRoot {
                modulus: root.norm(),
            });
        }
    }

    let mut g_y = Array2::<f64>::zeros((n, n));
    if np > 0 {
        let (transition, jump_rule) = stable_block_rules(&qz, np, config)?;
        for (r, &row_var) in pre.iter().enumerate() {
            for (c, &col_var) in pre.iter().enumerate() {
                g_y[[row_var, col_var]] = transition[[r, c]];
            }
        }
        for (r, &row_var) in jumps.iter().enumerate() {
            for (c, &col_var) in pre.iter().enumerate() {
                g_y[[row_var, col_var]] = jump_rule[[r, c]];
            }
        }
    }

    let impact = &jac.current + &jac.lead.dot(&g_y);
    if reciprocal_condition(impact.view())? < f64::EPSILON {
        return Err(SolutionError::SingularImpact);
    }
    let g_u = if model.n_shocks() == 0 {
        Array2::zeros((n, 0))
    } else {
        let neg_fe = jac.shocks.mapv(|v| -v);
        solve(impact.view(), neg_fe.view()).map_err(|_| SolutionError::SingularImpact)?
    };

    Ok(Policy {
        g_y,
        g_u,
        eigenvalues,
    })
}

/// Absolute cut-off for `0/0` roots: `threshold · (‖A₀‖_F + ‖A₁‖_F)`.
///
/// QZ is unitary, so the Schur diagonal scales with the pencil; rescaling
/// every equation leaves the classification unchanged.
fn pencil_zero_tolerance(threshold: f64, lead: &Array2<f64>, current: &Array2<f64>) -> f64 {
    let frobenius = |m: &Array2<f64>| m.iter().map(|v| v * v).sum::<f64>().sqrt();
    threshold * (frobenius(lead) + frobenius(current))
}

/// `(L, N)` from the leading `np` Schur vectors.
fn stable_block_rules(
    qz: &Qz,
    np: usize,
    config: &PerturbationConfig,
) -> Result<(Array2<f64>, Array2<f64>), SolutionError> {
    let z11 = to_na(&qz.z.slice(s![..np, ..np]).to_owned());
    let z21 = to_na(&qz.z.slice(s![np.., ..np]).to_owned());
    let s11 = to_na(&qz.s.slice(s![..np, ..np]).to_owned());
    let t11 = to_na(&qz.t.slice(s![..np, ..np]).to_owned());

    let rcond = complex_rcond(&z11);
    if rcond < RANK_RCOND {
        return Err(SolutionError::RankCondition { rcond });
    }
    let z11_inv = z11
        .clone()
        .try_inverse()
        .ok_or(SolutionError::RankCondition { rcond })?;
    let s11_inv = s11
        .try_inverse()
        .ok_or(SolutionError::RankCondition { rcond: 0.0 })?;

    let transition = &z11 * s11_inv * t11 * &z11_inv;
    let jump_rule = z21 * &z11_inv;
    Ok((
        real_part(&transition, "transition", config),
        real_part(&jump_rule, "jump rule", config),
    ))
}

fn to_na(m: &Array2<Complex64>) -> DMatrix<Complex64> {
    DMatrix::from_fn(m.nrows(), m.ncols(), |i, j| m[[i, j]])
}

fn complex_rcond(m: &DMatrix<Complex64>) -> f64 {
    match SVD::try_new(m.clone(), false, false, f64::EPSILON, 1000) {
        Some(svd) => {
            let max = svd.singular_values.max();
            if max > 0.0 { svd.singular_values.min() / max } else { 0.0 }
        }
        None => 0.0,
    }
}

fn real_part(m: &DMatrix<Complex64>, what: &str, config: &PerturbationConfig) -> Array2<f64> {
    let max_imag = m.iter().fold(0.0_f64, |acc, z| acc.max(z.im.abs()));
    let scale = m.iter().fold(1.0_f64, |acc, z| acc.max(z.re.abs()));
    if max_imag > config.imaginary_tolerance() * scale {
        warn!(what, max_imag, "discarding imaginary part of policy");
    }
    Array2::from_shape_fn((m.nrows(), m.ncols()), |(i, j)| m[(i, j)].re)
}
