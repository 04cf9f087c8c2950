//! Finite difference methods for numerical differentiation.

use crate::error::{FindPeaksError, Result};
use crate::problem::Problem;
use ndarray::{Array1, Array2};

/// Default step size for finite differences.
const DEFAULT_EPSILON: f64 = 1e-8;

/// Compute the Jacobian matrix using forward finite differences.
///
/// The Jacobian is the matrix of partial derivatives of the residuals with
/// respect to the parameters: J[i,j] = ∂residual[i]/∂param[j].
///
/// # Arguments
///
/// * `problem` - The problem to evaluate
/// * `params` - The parameter values at which to evaluate the Jacobian
/// * `epsilon` - The step size for finite differences (optional)
pub fn jacobian(
    problem: &dyn Problem,
    params: &Array1<f64>,
    epsilon: Option<f64>,
) -> Result<Array2<f64>> {
    let eps = epsilon.unwrap_or(DEFAULT_EPSILON);
    let n_params = params.len();
    let n_residuals = problem.residual_count();

    let residuals = problem.eval(params)?;
    if residuals.len() != n_residuals {
        return Err(FindPeaksError::DimensionMismatch(format!(
            "Expected {} residuals, got {}",
            n_residuals,
            residuals.len()
        )));
    }

    let mut jac = Array2::zeros((n_residuals, n_params));

    for j in 0..n_params {
        let mut params_perturbed = params.clone();

        // Adapt epsilon to parameter scale
        let param_j = params[j];
        let eps_j = if param_j.abs() > 1.0 {
            param_j.abs() * eps.sqrt()
        } else {
            eps.sqrt()
        };

        params_perturbed[j] += eps_j;
        let residuals_perturbed = problem.eval(&params_perturbed)?;

        for i in 0..n_residuals {
            jac[[i, j]] = (residuals_perturbed[i] - residuals[i]) / eps_j;
        }
    }

    Ok(jac)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    struct Quadratic;

    impl Problem for Quadratic {
        fn eval(&self, params: &Array1<f64>) -> Result<Array1<f64>> {
            Ok(array![params[0] * params[0], params[0] * params[1]])
        }

        fn parameter_count(&self) -> usize {
            2
        }

        fn residual_count(&self) -> usize {
            2
        }
    }

    #[test]
    fn test_forward_difference_jacobian() {
        let jac = jacobian(&Quadratic, &array![3.0, 2.0], None).unwrap();
        assert_relative_eq!(jac[[0, 0]], 6.0, epsilon = 1e-3);
        assert_relative_eq!(jac[[0, 1]], 0.0, epsilon = 1e-6);
        assert_relative_eq!(jac[[1, 0]], 2.0, epsilon = 1e-3);
        assert_relative_eq!(jac[[1, 1]], 3.0, epsilon = 1e-3);
    }
}
