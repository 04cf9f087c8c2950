//! Configuration options for the Levenberg-Marquardt algorithm.
//!
//! This module defines the convergence criteria and damping settings used by
//! [`LevenbergMarquardt`](super::LevenbergMarquardt).

/// Method for calculating the Jacobian matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiffMethod {
    /// Use forward finite differences, ignoring any analytical Jacobian
    FiniteDifference,

    /// Use the Jacobian provided by the problem implementation
    #[default]
    Analytical,
}

/// Configuration options for the Levenberg-Marquardt algorithm.
#[derive(Debug, Clone)]
pub struct LmConfig {
    /// Maximum number of accepted iterations. Default: 50
    pub max_iterations: usize,

    /// Tolerance for relative change in cost. Default: 1e-10
    pub ftol: f64,

    /// Tolerance for relative change in parameter values. Default: 1e-10
    pub xtol: f64,

    /// Tolerance for the largest gradient component. Default: 1e-12
    pub gtol: f64,

    /// Initial value for the damping parameter. Default: 1e-3
    pub initial_lambda: f64,

    /// Factor by which to increase lambda. Default: 10.0
    pub lambda_up_factor: f64,

    /// Factor by which to decrease lambda. Default: 0.1
    pub lambda_down_factor: f64,

    /// Minimum value for lambda. Default: 1e-12
    pub min_lambda: f64,

    /// Maximum value for lambda. Default: 1e10
    pub max_lambda: f64,

    /// Method to use for calculating the Jacobian. Default: Analytical
    pub diff_method: DiffMethod,
}

impl Default for LmConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            ftol: 1e-10,
            xtol: 1e-10,
            gtol: 1e-12,
            initial_lambda: 1e-3,
            lambda_up_factor: 10.0,
            lambda_down_factor: 0.1,
            min_lambda: 1e-12,
            max_lambda: 1e10,
            diff_method: DiffMethod::default(),
        }
    }
}
