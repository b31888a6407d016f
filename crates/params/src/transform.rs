//! Bijections between a parameter's bounded interval and the real line.
//!
//! | Bounds | Map to ℝ |
//! |--------|----------|
//! | `[l, u]` both finite | `ln((x - l) / (u - x))` |
//! | `[l, ∞)` | `ln(x - l)` |
//! | `(-∞, u]` | `ln(u - x)` |
//! | `(-∞, ∞)` | identity |
//!
//! Used by mode search so that an unconstrained optimiser never proposes an
//! inadmissible value.

use crate::parameter::Bounds;

/// Maps `x` in `bounds` to the real line. Values on a finite bound map to ±∞.
pub fn to_unconstrained(bounds: Bounds, x: f64) -> f64 {
    let (l, u) = (bounds.lower(), bounds.upper());
    match (l.is_finite(), u.is_finite()) {
        (true, true) => ((x - l) / (u - x)).ln(),
        (true, false) => (x - l).ln(),
        (false, true) => (u - x).ln(),
        (false, false) => x,
    }
}

/// Inverse of [`to_unconstrained`]; the result is clamped into `bounds`.
pub fn from_unconstrained(bounds: Bounds, y: f64) -> f64 {
    let (l, u) = (bounds.lower(), bounds.upper());
    let x = match (l.is_finite(), u.is_finite()) {
        (true, true) => l + (u - l) * logistic(y),
        (true, false) => l + y.exp(),
        (false, true) => u - y.exp(),
        (false, false) => y,
    };
    x.clamp(l, u)
}

fn logistic(y: f64) -> f64 {
    if y >= 0.0 {
        1.0 / (1.0 + (-y).exp())
    } else {
        let e = y.exp();
        e / (1.0 + e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn interval_round_trip() {
        let b = Bounds::new(-0.999, 0.999);
        for &x in &[-0.9, -0.1, 0.0, 0.5, 0.95] {
            assert_relative_eq!(from_unconstrained(b, to_unconstrained(b, x)), x, epsilon = 1e-12);
        }
    }

    #[test]
    fn half_lines() {
        let lower = Bounds::new(0.0, f64::INFINITY);
        assert_relative_eq!(to_unconstrained(lower, 1.0), 0.0);
        assert_relative_eq!(from_unconstrained(lower, 2.0_f64.ln()), 2.0, epsilon = 1e-12);

        let upper = Bounds::new(f64::NEG_INFINITY, 1.0);
        assert_relative_eq!(from_unconstrained(upper, 0.0), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn unbounded_is_identity() {
        let b = Bounds::unbounded();
        assert_eq!(to_unconstrained(b, -3.5), -3.5);
        assert_eq!(from_unconstrained(b, 3.5), 3.5);
    }

    #[test]
    fn extreme_inputs_stay_in_bounds() {
        let b = Bounds::new(0.0, 1.0);
        assert!((0.0..=1.0).contains(&from_unconstrained(b, 800.0)));
        assert!((0.0..=1.0).contains(&from_unconstrained(b, -800.0)));
    }
}
