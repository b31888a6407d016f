//! Built-in reference models.
//!
//! | Name | Variables | Shocks |
//! |------|-----------|--------|
//! | `ar1` | `y` | `e` |
//! | `new_keynesian` | `g u x pi i` | `eps_g eps_u eps_i` |
//! | `rbc` | `k z c r` | `eps_z` |

mod ar1;
mod new_keynesian;
mod rbc;

use std::sync::Arc;

use dsge_params::{ParameterSet, ParamsError};

pub use ar1::Ar1;
pub use new_keynesian::NewKeynesian;
pub use rbc::Rbc;

use crate::system::EquationSystem;

/// Names accepted by [`builtin`].
pub const BUILTIN_MODELS: &[&str] = &["ar1", "new_keynesian", "rbc"];

/// Looks up a built-in model by name together with its default parameters.
pub fn builtin(name: &str) -> Option<Result<(Arc<dyn EquationSystem>, ParameterSet), ParamsError>> {
    let out = match name {
        "ar1" => Ar1::default_parameters().map(|p| (Arc::new(Ar1::new()) as Arc<dyn EquationSystem>, p)),
        "new_keynesian" => NewKeynesian::default_parameters()
            .map(|p| (Arc::new(NewKeynesian::new()) as Arc<dyn EquationSystem>, p)),
        "rbc" => Rbc::default_parameters().map(|p| (Arc::new(Rbc::new()) as Arc<dyn EquationSystem>, p)),
        _ => return None,
    };
    Some(out)
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}
