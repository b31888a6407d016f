//! # dsge-model
//!
//! The equation-system interface every model implements, its validated
//! binding to a parameter layout, and the state-space form a solved model
//! is expressed in.
//!
//! ```mermaid
//! graph LR
//!     A["EquationSystem"] -->|"Model::new(system, params)"| B["Model"]
//!     B -->|"steady state + perturbation"| C["StateSpaceModel"]
//! ```
//!
//! ## Timing convention
//!
//! Every variable is either predetermined or a jump variable. Residuals are
//! written as `r(y_{t-1}, y_t, y_{t+1}, ε_t; θ)`; predetermined variables may
//! appear at `t-1` and `t`, jump variables at `t` and `t+1`. [`Model::new`]
//! rejects systems that break this, so the solver can rely on it.
//!
//! ## Quick start
//!
//! ```
//! use std::sync::Arc;
//! use dsge_model::{Model, models::Ar1};
//!
//! let params = Ar1::default_parameters().unwrap();
//! let model = Model::new(Arc::new(Ar1::new()), &params).unwrap();
//! assert_eq!(model.predetermined(), &[0]);
//! assert!(model.jumps().is_empty());
//! ```

mod budget;
mod error;
mod model;
pub mod models;
mod state_space;
mod system;
mod variable;

pub use budget::Budget;
pub use error::ModelError;
pub use model::Model;
pub use state_space::StateSpaceModel;
pub use system::{EquationSystem, Jacobians, Point, numeric_jacobians};
pub use variable::{Variable, VariableKind};
