//! Polynomial background functions of order 0, 1 and 2.

use crate::error::{FindPeaksError, Result};
use crate::model::Model;
use crate::parameters::Parameters;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Order of the background polynomial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BackgroundType {
    /// A0
    Flat,
    /// A0 + A1·x
    #[default]
    Linear,
    /// A0 + A1·x + A2·x²
    Quadratic,
}

impl BackgroundType {
    /// All registered background types.
    pub const ALL: [BackgroundType; 3] = [
        BackgroundType::Flat,
        BackgroundType::Linear,
        BackgroundType::Quadratic,
    ];

    /// Registered name.
    pub fn name(&self) -> &'static str {
        match self {
            BackgroundType::Flat => "Flat",
            BackgroundType::Linear => "Linear",
            BackgroundType::Quadratic => "Quadratic",
        }
    }

    /// Number of polynomial coefficients.
    pub fn order_count(&self) -> usize {
        match self {
            BackgroundType::Flat => 1,
            BackgroundType::Linear => 2,
            BackgroundType::Quadratic => 3,
        }
    }

    /// Coefficient names in declaration order.
    pub fn parameter_names(&self) -> &'static [&'static str] {
        &["A0", "A1", "A2"][..self.order_count()]
    }
}

impl fmt::Display for BackgroundType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BackgroundType {
    type Err = FindPeaksError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| FindPeaksError::UnknownFunction(format!("{} background", s)))
    }
}

/// A polynomial background.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundFunction {
    kind: BackgroundType,
    params: Parameters,
}

impl BackgroundFunction {
    /// Create a background with all coefficients zero.
    pub fn new(kind: BackgroundType) -> Self {
        let mut params = Parameters::new();
        for name in kind.parameter_names() {
            let _ = params.add_param(name, 0.0);
        }
        Self { kind, params }
    }

    /// The polynomial order.
    pub fn kind(&self) -> BackgroundType {
        self.kind
    }

    /// Coefficient `A{order}`, zero for orders this background does not have.
    pub fn coefficient(&self, order: usize) -> f64 {
        self.params.get_index(order).map(|p| p.value()).unwrap_or(0.0)
    }

    /// Set coefficient `A{order}`. Orders above the polynomial degree are ignored.
    pub fn set_coefficient(&mut self, order: usize, value: f64) {
        if let Some(p) = self.params.get_index_mut(order) {
            p.set_value(value);
        }
    }

    /// Set every coefficient to zero.
    pub fn zero(&mut self) {
        for order in 0..self.kind.order_count() {
            self.set_coefficient(order, 0.0);
        }
    }

    pub(crate) fn eval_values(values: &[f64], x: &Array1<f64>) -> Array1<f64> {
        x.mapv(|x| values.iter().rev().fold(0.0, |acc, &a| acc * x + a))
    }

    pub(crate) fn jacobian_values(
        order_count: usize,
        x: &Array1<f64>,
        jac: &mut Array2<f64>,
        offset: usize,
    ) {
        for (i, &xi) in x.iter().enumerate() {
            let mut power = 1.0;
            for k in 0..order_count {
                jac[[i, offset + k]] = power;
                power *= xi;
            }
        }
    }
}

impl Model for BackgroundFunction {
    fn name(&self) -> String {
        format!("{}Background", self.kind.name())
    }

    fn parameters(&self) -> &Parameters {
        &self.params
    }

    fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.params
    }

    fn eval_with(&self, values: &[f64], x: &Array1<f64>) -> Result<Array1<f64>> {
        if values.len() != self.kind.order_count() {
            return Err(FindPeaksError::DimensionMismatch(format!(
                "{} takes {} parameters, got {}",
                self.name(),
                self.kind.order_count(),
                values.len()
            )));
        }
        Ok(Self::eval_values(values, x))
    }

    fn jacobian_with(&self, _values: &[f64], x: &Array1<f64>) -> Result<Array2<f64>> {
        let n = self.kind.order_count();
        let mut jac = Array2::zeros((x.len(), n));
        Self::jacobian_values(n, x, &mut jac, 0);
        Ok(jac)
    }

    fn has_custom_jacobian(&self) -> bool {
        true
    }
}
