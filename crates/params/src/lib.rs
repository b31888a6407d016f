//! # dsge-params
//!
//! Named structural parameters with bounds and optional priors.
//!
//! A [`ParameterSet`] is declared once per model definition and then cloned
//! per estimation draw. Names and their order are fixed at declaration;
//! only values change, and every value is kept inside its bounds.
//!
//! ```
//! use dsge_params::{Parameter, ParameterSet, Prior};
//!
//! let mut set = ParameterSet::new();
//! set.declare(Parameter::new("rho", 0.9).with_bounds(-0.999, 0.999)).unwrap();
//! set.declare(
//!     Parameter::new("sigma", 0.01)
//!         .with_bounds(0.0, f64::INFINITY)
//!         .with_prior(Prior::InverseGamma { mean: 0.01, sd: 0.02 }),
//! )
//! .unwrap();
//!
//! let draw = set.with_values(&[0.8, 0.02]).unwrap();
//! assert_eq!(draw.value("rho"), Some(0.8));
//! assert!(draw.log_prior().unwrap().is_finite());
//! ```
//!
//! | Module | Contents |
//! |--------|----------|
//! | `parameter` | [`Parameter`] and its [`Bounds`] |
//! | `prior` | [`Prior`] families parameterised by mean / standard deviation |
//! | `set` | ordered [`ParameterSet`] snapshots |
//! | `transform` | bound-respecting map to and from unconstrained space |

mod error;
mod parameter;
mod prior;
mod set;
mod transform;

pub use error::ParamsError;
pub use parameter::{Bounds, Parameter};
pub use prior::Prior;
pub use set::ParameterSet;
pub use transform::{from_unconstrained, to_unconstrained};
