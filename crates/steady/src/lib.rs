//! # dsge-steady
//!
//! Deterministic steady state of an equation system: the constant path
//! `ȳ` solving `r(ȳ, ȳ, ȳ, 0; θ) = 0`.
//!
//! At a constant point the three date Jacobians collapse to one,
//! `J = J_{t-1} + J_t + J_{t+1}`, and the solver runs Newton's method on
//! that square system with a backtracking line search on `½‖r‖²`.
//! Convergence is declared when `max |r_i| < tolerance`.
//!
//! ```
//! use std::sync::Arc;
//! use dsge_model::{Model, models::Rbc};
//! use dsge_steady::{SteadyStateConfig, SteadyStateSolver};
//!
//! let params = Rbc::default_parameters().unwrap();
//! let model = Model::new(Arc::new(Rbc::new()), &params).unwrap();
//! let solver = SteadyStateSolver::new(SteadyStateConfig::default());
//! let ss = solver.solve(&model, &params, None).unwrap();
//! assert!(ss.max_residual() < 1e-10);
//! ```

mod config;
mod error;
mod newton;

pub use config::SteadyStateConfig;
pub use error::SteadyStateError;
pub use newton::{SteadyState, SteadyStateSolver};
