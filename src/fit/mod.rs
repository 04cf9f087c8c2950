//! The fit service.
//!
//! Peak fitting talks to the minimizer only through [`FitService`]: it hands
//! over a function, a data view and an x range, and gets back the fitted
//! function, a status and chi-squared over degrees of freedom.
//! [`LeastSquaresFit`] is the default implementation.

mod least_squares;
mod status;

pub use least_squares::LeastSquaresFit;
pub use status::FitStatus;

use crate::error::Result;
use crate::models::CompositeFunction;
use std::fmt;

/// Minimization algorithm requested from the fit service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Minimizer {
    /// Damped Gauss-Newton
    #[default]
    LevenbergMarquardt,
}

impl fmt::Display for Minimizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Minimizer::LevenbergMarquardt => f.write_str("Levenberg-Marquardt"),
        }
    }
}

/// Cost function requested from the fit service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CostFunction {
    /// Σ ((f(x) − y)/e)²
    #[default]
    LeastSquares,
}

impl fmt::Display for CostFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CostFunction::LeastSquares => f.write_str("Least squares"),
        }
    }
}

/// Borrowed point data: x positions, values and uncertainties.
#[derive(Debug, Clone, Copy)]
pub struct FitData<'a> {
    pub x: &'a [f64],
    pub y: &'a [f64],
    pub e: &'a [f64],
}

impl<'a> FitData<'a> {
    pub fn new(x: &'a [f64], y: &'a [f64], e: &'a [f64]) -> Self {
        Self { x, y, e }
    }
}

/// One call to the fit service.
#[derive(Debug, Clone)]
pub struct FitRequest<'a> {
    /// Function to fit; its current values are the starting point.
    pub function: &'a CompositeFunction,
    pub data: FitData<'a>,
    /// Spectrum the data came from, for diagnostics.
    pub workspace_index: usize,
    pub start_x: f64,
    pub end_x: f64,
    pub max_iterations: usize,
    pub minimizer: Minimizer,
    pub cost_function: CostFunction,
}

impl<'a> FitRequest<'a> {
    /// A least-squares Levenberg-Marquardt request.
    pub fn new(
        function: &'a CompositeFunction,
        data: FitData<'a>,
        workspace_index: usize,
        start_x: f64,
        end_x: f64,
        max_iterations: usize,
    ) -> Self {
        Self {
            function,
            data,
            workspace_index,
            start_x,
            end_x,
            max_iterations,
            minimizer: Minimizer::default(),
            cost_function: CostFunction::default(),
        }
    }
}

/// Result of one call to the fit service.
#[derive(Debug, Clone)]
pub struct FitOutcome {
    pub status: FitStatus,
    /// Chi-squared over degrees of freedom at the fitted parameters.
    pub chi_squared: f64,
    /// The same measure at the starting parameters.
    pub initial_chi_squared: f64,
    /// The function with fitted parameter values.
    pub function: CompositeFunction,
}

/// A fit backend.
///
/// `Err` means the service itself could not run; a fit that ran but did not
/// converge is an `Ok` outcome with a non-success status.
pub trait FitService: Send + Sync {
    fn fit(&self, request: &FitRequest<'_>) -> Result<FitOutcome>;
}
