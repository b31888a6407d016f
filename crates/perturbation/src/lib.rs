//! # dsge-perturbation
//!
//! First-order perturbation of a rational-expectations model around its
//! steady state, producing a [`StateSpaceModel`](dsge_model::StateSpaceModel).
//!
//! ```mermaid
//! graph LR
//!     A["Jacobians at ȳ"] -->|"pencil on [ŷᴾ₍ₜ₋₁₎; ŷᴶₜ]"| B["complex QZ"]
//!     B -->|"reorder: stable first"| C["Blanchard–Kahn count"]
//!     C -->|"Z₁₁, Z₂₁"| D["g_y, g_u"]
//!     D -->|"ObservationMapping"| E["StateSpaceModel"]
//! ```
//!
//! ## Conventions
//!
//! - A root `λ = t_ii / s_ii` is explosive iff `|t_ii| > qz_criterium · |s_ii|`,
//!   so infinite roots count as explosive and roots inside the tolerance
//!   band around the unit circle count as stable (unit) roots.
//! - The Blanchard–Kahn condition requires exactly as many explosive roots
//!   as jump variables. Too few is [`SolutionError::NoStableSolution`]
//!   (indeterminacy), too many is [`SolutionError::Unstable`].
//! - Unit roots are rejected unless
//!   [`PerturbationConfig::with_allow_unit_roots`] is set.
//! - The state vector holds deviations of every model variable from steady
//!   state (plus lagged copies needed by differenced observables), so
//!   `D = 0`.

mod config;
mod error;
mod observation;
mod policy;
mod qz;
mod solver;

pub use config::{Order, PerturbationConfig};
pub use error::SolutionError;
pub use observation::{ObservationMapping, Observable, Transform};
pub use solver::{FirstOrderSolution, PerturbationSolver};
