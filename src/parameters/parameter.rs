//! Parameter definition and implementation
//!
//! A parameter is a named scalar of a fit function. Parameters can be fixed,
//! in which case the minimizer leaves them at their current value.

use serde::{Deserialize, Serialize};

/// A named parameter of a fit function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Name of the parameter
    name: String,

    /// Current value of the parameter
    value: f64,

    /// Initial value when created (for reset operations)
    init_value: f64,

    /// Whether this parameter can be varied during optimization
    vary: bool,
}

impl Parameter {
    /// Create a new parameter with the given name and value
    ///
    /// # Examples
    ///
    /// ```
    /// use findpeaks_rs::parameters::Parameter;
    ///
    /// let param = Parameter::new("Height", 10.0);
    /// assert_eq!(param.name(), "Height");
    /// assert_eq!(param.value(), 10.0);
    /// assert!(param.vary());
    /// ```
    pub fn new(name: &str, value: f64) -> Self {
        Self {
            name: name.to_string(),
            value,
            init_value: value,
            vary: true,
        }
    }

    /// Get the current value of the parameter
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Set the value of the parameter
    pub fn set_value(&mut self, value: f64) {
        self.value = value;
    }

    /// Get the initial value of the parameter
    pub fn init_value(&self) -> f64 {
        self.init_value
    }

    /// Reset the parameter to its initial value
    pub fn reset(&mut self) {
        self.value = self.init_value;
    }

    /// Get the name of the parameter
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check if the parameter is varied during optimization
    pub fn vary(&self) -> bool {
        self.vary
    }

    /// Set whether the parameter is varied during optimization
    pub fn set_vary(&mut self, vary: bool) {
        self.vary = vary;
    }

    /// Whether the value is a finite number.
    pub fn is_finite(&self) -> bool {
        self.value.is_finite()
    }
}
