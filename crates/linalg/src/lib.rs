//! # dsge-linalg
//!
//! Dense linear algebra on `ndarray` matrices for the solution and filtering
//! crates. Storage stays in `ndarray`; factorizations are delegated to
//! `nalgebra` through a copy at the boundary.
//!
//! | Function | Purpose |
//! |----------|---------|
//! | [`solve`], [`inverse`] | LU solve / inverse with a singularity check |
//! | [`SpdFactor`] | Cholesky factor with `log_det` and solves |
//! | [`reciprocal_condition`] | smallest / largest singular value |
//! | [`spectral_radius`] | largest eigenvalue modulus |
//! | [`lyapunov`] | `Σ = A Σ Aᵀ + Q` by doubling |
//! | [`symmetrize`] | `(M + Mᵀ) / 2` in place |

mod convert;
mod dense;
mod error;
mod lyapunov;

pub use convert::{from_dmatrix, to_dmatrix};
pub use dense::{
    SpdFactor, inverse, is_finite, reciprocal_condition, solve, solve_vec, spectral_radius,
    symmetrize,
};
pub use error::LinalgError;
pub use lyapunov::{LyapunovOptions, lyapunov};
