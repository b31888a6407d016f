//! # dsge-likelihood
//!
//! The interface an estimation loop drives: a deterministic,
//! side-effect-free map from a parameter draw to a log-likelihood or log
//! posterior.
//!
//! ```mermaid
//! graph LR
//!     A["ParameterSet"] --> B["steady state"]
//!     B --> C["perturbation"]
//!     C --> D["Kalman filter"]
//!     D --> E["log L"]
//!     A --> F["log prior"]
//!     E --> G["log posterior"]
//!     F --> G
//! ```
//!
//! Failures at any stage are returned as a [`FailureReason`]; the
//! `*_or_reject` methods map them to `-∞` so a sampler can discard the
//! draw and continue. Only construction problems (shape mismatches between
//! model, mapping and data) are reported eagerly as [`EstimateError`].
//!
//! | Item | Use |
//! |------|-----|
//! | [`LikelihoodEngine`] | one model + mapping + data set |
//! | [`LikelihoodEngine::log_posterior_batch`] | parallel evaluation of independent draws |
//! | [`find_posterior_mode`] | Nelder–Mead mode search in unconstrained coordinates |

mod engine;
mod error;
mod mode;

pub use engine::LikelihoodEngine;
pub use error::{EstimateError, FailureReason};
pub use mode::{ModeConfig, PosteriorMode, find_posterior_mode};
