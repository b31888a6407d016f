//! Ordered parameter collections.

use std::collections::HashMap;

use crate::error::ParamsError;
use crate::parameter::Parameter;

/// An ordered, name-indexed set of parameters.
///
/// Declaration order is the order used by [`ParameterSet::values`] and
/// [`ParameterSet::with_values`]. Values are always inside their bounds:
/// every mutating method validates before writing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSet {
    params: Vec<Parameter>,
    index: HashMap<String, usize>,
}

impl ParameterSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from a list of parameters, in order.
    pub fn from_parameters(params: impl IntoIterator<Item = Parameter>) -> Result<Self, ParamsError> {
        let mut set = Self::new();
        for p in params {
            set.declare(p)?;
        }
        Ok(set)
    }

    /// Adds a parameter after validating it.
    ///
    /// # Errors
    ///
    /// [`ParamsError::DuplicateName`] if the name is already declared, or any
    /// error from [`Parameter::validate`].
    pub fn declare(&mut self, param: Parameter) -> Result<(), ParamsError> {
        if self.index.contains_key(param.name()) {
            return Err(ParamsError::DuplicateName {
                name: param.name().to_string(),
            });
        }
        param.validate()?;
        self.index.insert(param.name().to_string(), self.params.len());
        self.params.push(param);
        Ok(())
    }

    /// Number of declared parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns `true` if nothing has been declared.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Position of `name` in declaration order.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Looks up a parameter by name.
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.index_of(name).map(|i| &self.params[i])
    }

    /// Value of `name`, if declared.
    pub fn value(&self, name: &str) -> Option<f64> {
        self.get(name).map(Parameter::value)
    }

    /// Value of `name`, or [`ParamsError::UnknownName`].
    pub fn require(&self, name: &str) -> Result<f64, ParamsError> {
        self.value(name).ok_or_else(|| ParamsError::UnknownName {
            name: name.to_string(),
        })
    }

    /// Parameter names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(Parameter::name)
    }

    /// Iterates over the parameters in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Parameter> {
        self.params.iter()
    }

    /// Current values in declaration order.
    pub fn values(&self) -> Vec<f64> {
        self.params.iter().map(Parameter::value).collect()
    }

    /// Overwrites one value in place.
    pub fn set(&mut self, name: &str, value: f64) -> Result<(), ParamsError> {
        let i = self.index_of(name).ok_or_else(|| ParamsError::UnknownName {
            name: name.to_string(),
        })?;
        self.params[i].check_value(value)?;
        self.params[i].set_value_unchecked(value);
        Ok(())
    }

    /// Returns a copy with one value replaced.
    pub fn with_value(&self, name: &str, value: f64) -> Result<Self, ParamsError> {
        let mut next = self.clone();
        next.set(name, value)?;
        Ok(next)
    }

    /// Returns a copy with all values replaced, in declaration order.
    ///
    /// Nothing is written unless every value passes its bounds check.
    pub fn with_values(&self, values: &[f64]) -> Result<Self, ParamsError> {
        if values.len() != self.params.len() {
            return Err(ParamsError::LengthMismatch {
                expected: self.params.len(),
                got: values.len(),
            });
        }
        for (p, &v) in self.params.iter().zip(values) {
            p.check_value(v)?;
        }
        let mut next = self.clone();
        for (p, &v) in next.params.iter_mut().zip(values) {
            p.set_value_unchecked(v);
        }
        Ok(next)
    }

    /// Sum of the log prior densities of all parameters that carry a prior.
    ///
    /// Parameters without a prior contribute zero (flat on their bounds).
    /// Returns `-inf` when any value lies outside its prior's support.
    pub fn log_prior(&self) -> Result<f64, ParamsError> {
        let mut total = 0.0;
        for p in &self.params {
            if let Some(prior) = p.prior() {
                total += prior.log_density(p.name(), p.value())?;
            }
        }
        Ok(total)
    }
}

impl<'a> IntoIterator for &'a ParameterSet {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prior::Prior;
    use approx::assert_abs_diff_eq;

    fn sample() -> ParameterSet {
        ParameterSet::from_parameters([
            Parameter::new("beta", 0.99).with_bounds(0.0, 1.0),
            Parameter::new("rho", 0.9).with_bounds(-1.0, 1.0),
            Parameter::new("sigma", 0.01).with_bounds(0.0, f64::INFINITY),
        ])
        .unwrap()
    }

    #[test]
    fn declaration_order_is_kept() {
        let set = sample();
        let names: Vec<&str> = set.names().collect();
        assert_eq!(names, ["beta", "rho", "sigma"]);
        assert_eq!(set.values(), vec![0.99, 0.9, 0.01]);
        assert_eq!(set.index_of("sigma"), Some(2));
    }

    #[test]
    fn duplicate_rejected() {
        let mut set = sample();
        let err = set.declare(Parameter::new("rho", 0.5)).unwrap_err();
        assert_eq!(err, ParamsError::DuplicateName { name: "rho".into() });
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn set_checks_bounds() {
        let mut set = sample();
        assert!(matches!(
            set.set("rho", 1.5),
            Err(ParamsError::OutOfBounds { .. })
        ));
        assert_eq!(set.value("rho"), Some(0.9));
        set.set("rho", 0.5).unwrap();
        assert_eq!(set.value("rho"), Some(0.5));
    }

    #[test]
    fn unknown_name() {
        let set = sample();
        assert!(set.value("kappa").is_none());
        assert!(matches!(set.require("kappa"), Err(ParamsError::UnknownName { .. })));
    }

    #[test]
    fn with_values_is_all_or_nothing() {
        let set = sample();
        assert!(set.with_values(&[0.5, 2.0, 0.1]).is_err());
        assert!(matches!(
            set.with_values(&[0.5]),
            Err(ParamsError::LengthMismatch { expected: 3, got: 1 })
        ));
        let next = set.with_values(&[0.5, 0.2, 0.1]).unwrap();
        assert_eq!(next.values(), vec![0.5, 0.2, 0.1]);
        assert_eq!(set.values(), vec![0.99, 0.9, 0.01]);
    }

    #[test]
    fn log_prior_sums_declared_priors() {
        let set = ParameterSet::from_parameters([
            Parameter::new("a", 0.0).with_prior(Prior::Normal { mean: 0.0, sd: 1.0 }),
            Parameter::new("b", 1.0).with_prior(Prior::Normal { mean: 1.0, sd: 1.0 }),
            Parameter::new("c", 7.0),
        ])
        .unwrap();
        let expected = -(2.0 * std::f64::consts::PI).ln();
        assert_abs_diff_eq!(set.log_prior().unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn empty_set_has_zero_prior() {
        let set = ParameterSet::new();
        assert!(set.is_empty());
        assert_eq!(set.log_prior().unwrap(), 0.0);
    }
}
