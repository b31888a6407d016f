//! The equation-system interface implemented by every concrete model.

use std::fmt::Debug;

use ndarray::{Array1, Array2, ArrayView1};

use crate::variable::Variable;

/// A point `(y_{t-1}, y_t, y_{t+1}, ε_t)` at which residuals are evaluated.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    /// `y_{t-1}`.
    pub lag: Array1<f64>,
    /// `y_t`.
    pub current: Array1<f64>,
    /// `y_{t+1}`.
    pub lead: Array1<f64>,
    /// `ε_t`.
    pub shocks: Array1<f64>,
}

impl Point {
    /// The deterministic point with `y` at all three dates and zero shocks.
    pub fn steady(y: &Array1<f64>, n_shocks: usize) -> Self {
        Self {
            lag: y.clone(),
            current: y.clone(),
            lead: y.clone(),
            shocks: Array1::zeros(n_shocks),
        }
    }
}

/// First derivatives of the residual vector at a [`Point`].
///
/// Each block has one row per equation.
#[derive(Debug, Clone, PartialEq)]
pub struct Jacobians {
    /// `∂r/∂y_{t-1}`.
    pub lag: Array2<f64>,
    /// `∂r/∂y_t`.
    pub current: Array2<f64>,
    /// `∂r/∂y_{t+1}`.
    pub lead: Array2<f64>,
    /// `∂r/∂ε_t`.
    pub shocks: Array2<f64>,
}

impl Jacobians {
    /// All-zero blocks for `n_eq` equations, `n_vars` variables and `n_shocks` shocks.
    pub fn zeros(n_eq: usize, n_vars: usize, n_shocks: usize) -> Self {
        Self {
            lag: Array2::zeros((n_eq, n_vars)),
            current: Array2::zeros((n_eq, n_vars)),
            lead: Array2::zeros((n_eq, n_vars)),
            shocks: Array2::zeros((n_eq, n_shocks)),
        }
    }

    /// `∂r/∂y` at a constant path: the three date blocks summed.
    pub fn static_jacobian(&self) -> Array2<f64> {
        &self.lag + &self.current + &self.lead
    }

    /// Returns `true` if every entry is finite.
    pub fn is_finite(&self) -> bool {
        [&self.lag, &self.current, &self.lead, &self.shocks]
            .iter()
            .all(|m| m.iter().all(|v| v.is_finite()))
    }
}

/// Nonlinear expectational equations `r(y_{t-1}, y_t, y_{t+1}, ε_t; θ) = 0`.
///
/// Implementations are pure: the same inputs always give the same
/// residuals. `θ` arrives as a slice ordered like [`EquationSystem::parameters`].
pub trait EquationSystem: Debug + Send + Sync {
    /// Short model name.
    fn name(&self) -> &str;

    /// Endogenous variables, in the order used by all vectors.
    fn variables(&self) -> &[Variable];

    /// Exogenous shock names.
    fn shocks(&self) -> &[String];

    /// Parameter names consumed, in the order `θ` is passed.
    fn parameters(&self) -> &[String];

    /// Residual vector, one entry per equation.
    fn evaluate(
        &self,
        lag: ArrayView1<'_, f64>,
        current: ArrayView1<'_, f64>,
        lead: ArrayView1<'_, f64>,
        shocks: ArrayView1<'_, f64>,
        theta: &[f64],
    ) -> Array1<f64>;

    /// Residual Jacobians at `point`. Defaults to central differences.
    fn jacobians(&self, point: &Point, theta: &[f64]) -> Jacobians {
        numeric_jacobians(self, point, theta)
    }

    /// Closed-form steady state, if the model knows one.
    fn steady_state(&self, _theta: &[f64]) -> Option<Array1<f64>> {
        None
    }

    /// Starting point for the steady-state search.
    ///
    /// Defaults to the closed form when available and zeros otherwise.
    fn initial_guess(&self, theta: &[f64]) -> Array1<f64> {
        self.steady_state(theta)
            .unwrap_or_else(|| Array1::zeros(self.variables().len()))
    }
}

/// Central-difference Jacobians of `system` at `point`.
///
/// Step for coordinate `x` is `ε^{1/3} · max(|x|, 1)`.
pub fn numeric_jacobians<S: EquationSystem + ?Sized>(
    system: &S,
    point: &Point,
    theta: &[f64],
) -> Jacobians {
    let eval = |p: &Point| {
        system.evaluate(
            p.lag.view(),
            p.current.view(),
            p.lead.view(),
            p.shocks.view(),
            theta,
        )
    };
    let n_eq = eval(point).len();
    let mut jac = Jacobians::zeros(n_eq, point.current.len(), point.shocks.len());
    let step = f64::EPSILON.cbrt();

    for block in 0..4 {
        let width = match block {
            3 => point.shocks.len(),
            _ => point.current.len(),
        };
        for j in 0..width {
            let mut up = point.clone();
            let mut down = point.clone();
            let (x_up, x_down) = match block {
                0 => (&mut up.lag[j], &mut down.lag[j]),
                1 => (&mut up.current[j], &mut down.current[j]),
                2 => (&mut up.lead[j], &mut down.lead[j]),
                _ => (&mut up.shocks[j], &mut down.shocks[j]),
            };
            let h = step * x_up.abs().max(1.0);
            *x_up += h;
            *x_down -= h;
            let dx = *x_up - *x_down;
            let column = (eval(&up) - eval(&down)) / dx;
            let target = match block {
                0 => &mut jac.lag,
                1 => &mut jac.current,
                2 => &mut jac.lead,
                _ => &mut jac.shocks,
            };
            target.column_mut(j).assign(&column);
        }
    }
    jac
}
