//! Parameters collection implementation
//!
//! This module provides the Parameters struct, an ordered collection of
//! Parameter objects. The order of insertion is the order in which the
//! parameters are exposed to the minimizer and to raw result tables.

use crate::error::{FindPeaksError, Result};
use crate::parameters::parameter::Parameter;
use serde::{Deserialize, Serialize};

/// An ordered collection of named parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    params: Vec<Parameter>,
}

impl Parameters {
    /// Create a new empty parameters collection
    ///
    /// # Examples
    ///
    /// ```
    /// use findpeaks_rs::parameters::Parameters;
    ///
    /// let params = Parameters::new();
    /// assert_eq!(params.len(), 0);
    /// ```
    pub fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Add a parameter to the collection
    ///
    /// Returns an error if a parameter with the same name already exists.
    pub fn add(&mut self, param: Parameter) -> Result<()> {
        if self.contains(param.name()) {
            return Err(FindPeaksError::InvalidInput(format!(
                "Parameter '{}' already exists",
                param.name()
            )));
        }
        self.params.push(param);
        Ok(())
    }

    /// Add a new parameter with the given name and value
    ///
    /// # Examples
    ///
    /// ```
    /// use findpeaks_rs::parameters::Parameters;
    ///
    /// let mut params = Parameters::new();
    /// params.add_param("A0", 1.0).unwrap();
    /// params.add_param("A1", 0.5).unwrap();
    /// assert_eq!(params.names(), vec!["A0", "A1"]);
    /// ```
    pub fn add_param(&mut self, name: &str, value: f64) -> Result<()> {
        self.add(Parameter::new(name, value))
    }

    /// Get a parameter by name
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().find(|p| p.name() == name)
    }

    /// Get a mutable reference to a parameter by name
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Parameter> {
        self.params.iter_mut().find(|p| p.name() == name)
    }

    /// Get a parameter by position
    pub fn get_index(&self, index: usize) -> Option<&Parameter> {
        self.params.get(index)
    }

    /// Get a mutable reference to a parameter by position
    pub fn get_index_mut(&mut self, index: usize) -> Option<&mut Parameter> {
        self.params.get_mut(index)
    }

    /// Get the value of a named parameter
    pub fn value(&self, name: &str) -> Result<f64> {
        self.get(name)
            .map(|p| p.value())
            .ok_or_else(|| FindPeaksError::ParameterNotFound(name.to_string()))
    }

    /// Set the value of a named parameter
    pub fn set_value(&mut self, name: &str, value: f64) -> Result<()> {
        let param = self
            .get_mut(name)
            .ok_or_else(|| FindPeaksError::ParameterNotFound(name.to_string()))?;
        param.set_value(value);
        Ok(())
    }

    /// Check whether a parameter with the given name exists
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Position of a named parameter
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| p.name() == name)
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Whether the collection is empty
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Parameter names in insertion order
    pub fn names(&self) -> Vec<String> {
        self.params.iter().map(|p| p.name().to_string()).collect()
    }

    /// Iterate over the parameters in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.params.iter()
    }

    /// Parameter values in insertion order
    pub fn values(&self) -> Vec<f64> {
        self.params.iter().map(|p| p.value()).collect()
    }

    /// Values of the parameters that vary during optimization
    pub fn varying_values(&self) -> Vec<f64> {
        self.params
            .iter()
            .filter(|p| p.vary())
            .map(|p| p.value())
            .collect()
    }

    /// Number of varying parameters
    pub fn varying_count(&self) -> usize {
        self.params.iter().filter(|p| p.vary()).count()
    }

    /// Update the varying parameters from a slice, in insertion order
    pub fn update_varying(&mut self, values: &[f64]) -> Result<()> {
        let n_varying = self.varying_count();
        if values.len() != n_varying {
            return Err(FindPeaksError::DimensionMismatch(format!(
                "Expected {} values for varying parameters, got {}",
                n_varying,
                values.len()
            )));
        }

        for (param, &value) in self.params.iter_mut().filter(|p| p.vary()).zip(values) {
            param.set_value(value);
        }
        Ok(())
    }

    /// Fix every parameter
    pub fn fix_all(&mut self) {
        self.params.iter_mut().for_each(|p| p.set_vary(false));
    }

    /// Let every parameter vary
    pub fn unfix_all(&mut self) {
        self.params.iter_mut().for_each(|p| p.set_vary(true));
    }

    /// Reset all parameters to their initial values
    pub fn reset(&mut self) {
        self.params.iter_mut().for_each(|p| p.reset());
    }

    /// Whether any parameter holds NaN or an infinite value
    pub fn has_non_finite(&self) -> bool {
        self.params.iter().any(|p| !p.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_name_rejected() {
        let mut params = Parameters::new();
        params.add_param("A0", 1.0).unwrap();
        assert!(params.add_param("A0", 2.0).is_err());
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_varying_values_follow_insertion_order() {
        let mut params = Parameters::new();
        params.add_param("Height", 10.0).unwrap();
        params.add_param("PeakCentre", 5.0).unwrap();
        params.add_param("Sigma", 0.2).unwrap();

        params.get_mut("PeakCentre").unwrap().set_vary(false);
        assert_eq!(params.varying_values(), vec![10.0, 0.2]);

        params.update_varying(&[12.0, 0.3]).unwrap();
        assert_eq!(params.values(), vec![12.0, 5.0, 0.3]);

        assert!(params.update_varying(&[1.0]).is_err());
    }

    #[test]
    fn test_fix_and_unfix_all() {
        let mut params = Parameters::new();
        params.add_param("A0", 1.0).unwrap();
        params.add_param("A1", 2.0).unwrap();

        params.fix_all();
        assert_eq!(params.varying_count(), 0);

        params.unfix_all();
        assert_eq!(params.varying_count(), 2);
    }

    #[test]
    fn test_missing_parameter() {
        let mut params = Parameters::new();
        assert!(matches!(
            params.value("A2"),
            Err(FindPeaksError::ParameterNotFound(_))
        ));
        assert!(params.set_value("A2", 1.0).is_err());
    }

    #[test]
    fn test_non_finite_detection() {
        let mut params = Parameters::new();
        params.add_param("A0", 1.0).unwrap();
        assert!(!params.has_non_finite());
        params.set_value("A0", f64::NAN).unwrap();
        assert!(params.has_non_finite());
    }
}
