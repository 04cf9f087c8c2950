//! Model trait and the adapter that turns a model into a least-squares problem.
//!
//! A [`Model`] is a parameterised function of one variable. Its parameters are
//! addressed by position and by name, and each one can be fixed so that the
//! minimizer leaves it alone. [`ModelProblem`] binds a model to a weighted
//! data window and exposes only the free parameters to the optimizer.

use crate::error::{FindPeaksError, Result};
use crate::parameters::Parameters;
use crate::problem::Problem;
use crate::utils::finite_difference;
use ndarray::{Array1, Array2};

/// A trait representing a model that can be fit to data.
pub trait Model: Send + Sync {
    /// Name of the function, e.g. `"Gaussian"`.
    fn name(&self) -> String;

    /// Returns a reference to the model's parameters.
    fn parameters(&self) -> &Parameters;

    /// Returns a mutable reference to the model's parameters.
    fn parameters_mut(&mut self) -> &mut Parameters;

    /// Evaluates the model for an explicit full parameter vector.
    ///
    /// `values` holds one entry per parameter, in declaration order.
    fn eval_with(&self, values: &[f64], x: &Array1<f64>) -> Result<Array1<f64>>;

    /// Jacobian for an explicit full parameter vector: `J[i,j] = ∂f(x_i)/∂p_j`.
    fn jacobian_with(&self, _values: &[f64], _x: &Array1<f64>) -> Result<Array2<f64>> {
        Err(FindPeaksError::FunctionEvaluation(format!(
            "{} does not provide an analytical Jacobian",
            self.name()
        )))
    }

    /// Returns whether this model has a custom Jacobian implementation.
    fn has_custom_jacobian(&self) -> bool {
        false
    }

    /// Evaluates the model at the given x values using the current parameter values.
    fn eval(&self, x: &Array1<f64>) -> Result<Array1<f64>> {
        self.eval_with(&self.parameters().values(), x)
    }

    /// Jacobian at the current parameter values.
    fn jacobian(&self, x: &Array1<f64>) -> Result<Array2<f64>> {
        self.jacobian_with(&self.parameters().values(), x)
    }

    /// Calculates the residuals (y_obs - y_pred) using the current parameter values.
    fn residuals(&self, x: &Array1<f64>, y: &Array1<f64>) -> Result<Array1<f64>> {
        let y_pred = self.eval(x)?;

        if y.len() != y_pred.len() {
            return Err(FindPeaksError::DimensionMismatch(format!(
                "Expected {} observed values, got {}",
                y_pred.len(),
                y.len()
            )));
        }

        Ok(y - &y_pred)
    }

    /// Total number of parameters, fixed or not.
    fn parameter_count(&self) -> usize {
        self.parameters().len()
    }

    /// Returns the names of all parameters in the model.
    fn parameter_names(&self) -> Vec<String> {
        self.parameters().names()
    }

    /// Returns the number of varying parameters in the model.
    fn varying_parameter_count(&self) -> usize {
        self.parameters().varying_count()
    }

    /// Value of the parameter at `index`.
    fn get_parameter(&self, index: usize) -> Result<f64> {
        self.parameters()
            .get_index(index)
            .map(|p| p.value())
            .ok_or_else(|| FindPeaksError::ParameterNotFound(format!("#{}", index)))
    }

    /// Set the value of the parameter at `index`.
    fn set_parameter(&mut self, index: usize, value: f64) -> Result<()> {
        let param = self
            .parameters_mut()
            .get_index_mut(index)
            .ok_or_else(|| FindPeaksError::ParameterNotFound(format!("#{}", index)))?;
        param.set_value(value);
        Ok(())
    }

    /// Whether the parameter at `index` is held fixed.
    fn is_fixed(&self, index: usize) -> bool {
        self.parameters()
            .get_index(index)
            .map(|p| !p.vary())
            .unwrap_or(true)
    }

    /// Hold the parameter at `index` fixed.
    fn fix(&mut self, index: usize) -> Result<()> {
        let param = self
            .parameters_mut()
            .get_index_mut(index)
            .ok_or_else(|| FindPeaksError::ParameterNotFound(format!("#{}", index)))?;
        param.set_vary(false);
        Ok(())
    }

    /// Let the parameter at `index` vary.
    fn unfix(&mut self, index: usize) -> Result<()> {
        let param = self
            .parameters_mut()
            .get_index_mut(index)
            .ok_or_else(|| FindPeaksError::ParameterNotFound(format!("#{}", index)))?;
        param.set_vary(true);
        Ok(())
    }
}

/// A weighted least-squares problem over the free parameters of a model.
///
/// Residuals are `w_i · (f(x_i) − y_i)`.
pub struct ModelProblem<'a, M: Model + ?Sized> {
    model: &'a M,
    x: Array1<f64>,
    y: Array1<f64>,
    weights: Array1<f64>,
    base_values: Vec<f64>,
    free: Vec<usize>,
}

impl<'a, M: Model + ?Sized> ModelProblem<'a, M> {
    /// Bind a model to data. The three arrays must have equal lengths.
    pub fn new(model: &'a M, x: Array1<f64>, y: Array1<f64>, weights: Array1<f64>) -> Result<Self> {
        if x.len() != y.len() || x.len() != weights.len() {
            return Err(FindPeaksError::DimensionMismatch(format!(
                "x, y and weights must have equal lengths ({}, {}, {})",
                x.len(),
                y.len(),
                weights.len()
            )));
        }

        let params = model.parameters();
        let free = params
            .iter()
            .enumerate()
            .filter(|(_, p)| p.vary())
            .map(|(i, _)| i)
            .collect();

        Ok(Self {
            model,
            x,
            y,
            weights,
            base_values: params.values(),
            free,
        })
    }

    /// Starting values of the free parameters.
    pub fn initial_free_values(&self) -> Array1<f64> {
        self.free.iter().map(|&i| self.base_values[i]).collect()
    }

    /// Expand a vector of free values into the full parameter vector.
    pub fn full_values(&self, free_values: &Array1<f64>) -> Vec<f64> {
        let mut values = self.base_values.clone();
        for (slot, &index) in self.free.iter().enumerate() {
            values[index] = free_values[slot];
        }
        values
    }

    /// Number of data points.
    pub fn ndata(&self) -> usize {
        self.x.len()
    }

    /// Number of free parameters.
    pub fn nvarys(&self) -> usize {
        self.free.len()
    }
}

impl<'a, M: Model + ?Sized> Problem for ModelProblem<'a, M> {
    fn eval(&self, params: &Array1<f64>) -> Result<Array1<f64>> {
        if params.len() != self.free.len() {
            return Err(FindPeaksError::DimensionMismatch(format!(
                "Expected {} free parameters, got {}",
                self.free.len(),
                params.len()
            )));
        }
        let values = self.full_values(params);
        let f = self.model.eval_with(&values, &self.x)?;
        Ok((&f - &self.y) * &self.weights)
    }

    fn parameter_count(&self) -> usize {
        self.free.len()
    }

    fn residual_count(&self) -> usize {
        self.x.len()
    }

    fn jacobian(&self, params: &Array1<f64>) -> Result<Array2<f64>>
    where
        Self: Sized,
    {
        if !self.model.has_custom_jacobian() {
            return finite_difference::jacobian(self, params, None);
        }

        let values = self.full_values(params);
        let full = self.model.jacobian_with(&values, &self.x)?;
        let mut jac = Array2::zeros((self.x.len(), self.free.len()));
        for (col, &index) in self.free.iter().enumerate() {
            for row in 0..self.x.len() {
                jac[[row, col]] = full[[row, index]] * self.weights[row];
            }
        }
        Ok(jac)
    }

    fn has_custom_jacobian(&self) -> bool {
        self.model.has_custom_jacobian()
    }
}
