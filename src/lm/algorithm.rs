//! Implementation of the Levenberg-Marquardt algorithm.
//!
//! The normal equations are damped with Marquardt's diagonal scaling,
//! `(JᵀJ + λ·diag(JᵀJ)) δ = -Jᵀr`, and solved with a Cholesky factorisation.
//! A singular system or a step that fails to lower the cost raises λ; an
//! accepted step lowers it.

use ndarray::{Array1, Array2};
use std::fmt;

use crate::error::{FindPeaksError, Result};
use crate::problem::Problem;
use crate::utils::finite_difference;

use super::config::{DiffMethod, LmConfig};

/// Floor for diagonal scaling so that parameters with a vanishing column
/// in the Jacobian still receive damping.
const MIN_DIAGONAL: f64 = 1e-12;

/// Why the optimizer stopped.
#[derive(Debug, Clone, PartialEq)]
pub enum LmTermination {
    /// A convergence criterion was met
    Converged(String),

    /// λ reached its maximum without finding a step that lowers the cost
    ToleranceUnreachable,

    /// The iteration limit was reached
    MaxIterations(usize),
}

/// Result of the Levenberg-Marquardt optimization.
#[derive(Debug, Clone)]
pub struct LmResult {
    /// Optimized parameter values
    pub params: Array1<f64>,

    /// Residuals at the solution
    pub residuals: Array1<f64>,

    /// Sum of squared residuals at the solution
    pub cost: f64,

    /// Sum of squared residuals at the starting point
    pub initial_cost: f64,

    /// Number of accepted iterations
    pub iterations: usize,

    /// Number of function evaluations
    pub func_evals: usize,

    /// Why the optimization stopped
    pub termination: LmTermination,
}

impl LmResult {
    /// Whether a convergence criterion was met.
    pub fn success(&self) -> bool {
        matches!(self.termination, LmTermination::Converged(_))
    }
}

impl fmt::Display for LmResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Optimization Result:")?;
        writeln!(f, "  Termination: {:?}", self.termination)?;
        writeln!(f, "  Cost: {:.6e} (initial {:.6e})", self.cost, self.initial_cost)?;
        writeln!(f, "  Iterations: {}", self.iterations)?;
        writeln!(f, "  Function evaluations: {}", self.func_evals)?;
        writeln!(f, "  Parameters: {:?}", self.params)?;
        Ok(())
    }
}

/// The Levenberg-Marquardt optimizer.
#[derive(Debug, Clone, Default)]
pub struct LevenbergMarquardt {
    config: LmConfig,
}

impl LevenbergMarquardt {
    /// Create a new Levenberg-Marquardt optimizer with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new Levenberg-Marquardt optimizer with the given configuration.
    pub fn with_config(config: LmConfig) -> Self {
        Self { config }
    }

    /// Set the maximum number of iterations.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.max_iterations = max_iterations;
        self
    }

    /// Minimize the sum of squared residuals for the given problem.
    ///
    /// Returns an error only when the problem cannot be evaluated at the
    /// starting point. Failing to converge is reported through
    /// [`LmResult::termination`].
    pub fn minimize<P: Problem>(&self, problem: &P, initial_params: Array1<f64>) -> Result<LmResult> {
        let n_params = problem.parameter_count();
        if initial_params.len() != n_params {
            return Err(FindPeaksError::DimensionMismatch(format!(
                "Expected {} parameters, got {}",
                n_params,
                initial_params.len()
            )));
        }

        let mut params = initial_params;
        let mut residuals = problem.eval(&params)?;
        let mut func_evals = 1;
        let mut cost = sum_of_squares(&residuals);
        let initial_cost = cost;

        if !cost.is_finite() {
            return Err(FindPeaksError::FunctionEvaluation(
                "non-finite residuals at the starting point".to_string(),
            ));
        }

        if n_params == 0 {
            return Ok(LmResult {
                params,
                residuals,
                cost,
                initial_cost,
                iterations: 0,
                func_evals,
                termination: LmTermination::Converged("no free parameters".to_string()),
            });
        }

        let mut lambda = self.config.initial_lambda;
        let mut iterations = 0;

        let termination = 'outer: loop {
            if iterations >= self.config.max_iterations {
                break LmTermination::MaxIterations(self.config.max_iterations);
            }

            let jac = self.jacobian(problem, &params)?;
            let jt = jac.t();
            let gradient = jt.dot(&residuals);

            let gradient_norm = gradient.iter().fold(0.0_f64, |acc, g| acc.max(g.abs()));
            if gradient_norm < self.config.gtol {
                break LmTermination::Converged(format!(
                    "Gradient convergence: |g| = {:.2e} < {:.2e}",
                    gradient_norm, self.config.gtol
                ));
            }

            let jtj = jt.dot(&jac);
            let rhs = gradient.mapv(|g| -g);

            loop {
                let mut damped = jtj.clone();
                for i in 0..n_params {
                    damped[[i, i]] += lambda * jtj[[i, i]].max(MIN_DIAGONAL);
                }

                if let Some(step) = cholesky_solve(&damped, &rhs) {
                    let trial = &params + &step;
                    let trial_residuals = problem.eval(&trial)?;
                    func_evals += 1;
                    let trial_cost = sum_of_squares(&trial_residuals);

                    if trial_cost.is_finite() && trial_cost < cost {
                        let param_change = step
                            .iter()
                            .zip(params.iter())
                            .map(|(d, p)| d.abs() / (p.abs() + self.config.xtol))
                            .fold(0.0_f64, f64::max);
                        let cost_change = (cost - trial_cost) / cost.max(f64::MIN_POSITIVE);

                        params = trial;
                        residuals = trial_residuals;
                        cost = trial_cost;
                        iterations += 1;
                        lambda = (lambda * self.config.lambda_down_factor).max(self.config.min_lambda);

                        if cost_change < self.config.ftol {
                            break 'outer LmTermination::Converged(format!(
                                "Cost convergence: |df|/|f| = {:.2e} < {:.2e}",
                                cost_change, self.config.ftol
                            ));
                        }
                        if param_change < self.config.xtol {
                            break 'outer LmTermination::Converged(format!(
                                "Parameter convergence: |dx|/|x| = {:.2e} < {:.2e}",
                                param_change, self.config.xtol
                            ));
                        }
                        continue 'outer;
                    }
                }

                lambda *= self.config.lambda_up_factor;
                if lambda > self.config.max_lambda {
                    break 'outer LmTermination::ToleranceUnreachable;
                }
            }
        };

        Ok(LmResult {
            params,
            residuals,
            cost,
            initial_cost,
            iterations,
            func_evals,
            termination,
        })
    }

    fn jacobian<P: Problem>(&self, problem: &P, params: &Array1<f64>) -> Result<Array2<f64>> {
        match self.config.diff_method {
            DiffMethod::FiniteDifference => finite_difference::jacobian(problem, params, None),
            DiffMethod::Analytical => problem.jacobian(params),
        }
    }
}

fn sum_of_squares(values: &Array1<f64>) -> f64 {
    values.iter().map(|r| r * r).sum()
}

/// Solve `a x = b` for a symmetric positive definite `a`.
///
/// Returns `None` when the factorisation breaks down.
pub(crate) fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    let mut l = Array2::<f64>::zeros((n, n));

    for k in 0..n {
        let mut diag = a[[k, k]];
        for j in 0..k {
            diag -= l[[k, j]] * l[[k, j]];
        }
        if !(diag > 0.0) || !diag.is_finite() {
            return None;
        }
        let lkk = diag.sqrt();
        l[[k, k]] = lkk;

        for i in (k + 1)..n {
            let mut value = a[[i, k]];
            for j in 0..k {
                value -= l[[i, j]] * l[[k, j]];
            }
            l[[i, k]] = value / lkk;
        }
    }

    // Forward substitution (L * y = b)
    let mut y = b.clone();
    for i in 0..n {
        for j in 0..i {
            y[i] -= l[[i, j]] * y[j];
        }
        y[i] /= l[[i, i]];
    }

    // Backward substitution (L^T * x = y)
    let mut x = Array1::zeros(n);
    for i in (0..n).rev() {
        x[i] = y[i];
        for j in (i + 1)..n {
            x[i] -= l[[j, i]] * x[j];
        }
        x[i] /= l[[i, i]];
    }

    if x.iter().all(|v: &f64| v.is_finite()) {
        Some(x)
    } else {
        None
    }
}
