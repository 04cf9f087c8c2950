use log::debug;
use ndarray::Array1;

use crate::error::{FindPeaksError, Result};
use crate::lm::{LevenbergMarquardt, LmConfig, LmTermination};
use crate::model::{Model, ModelProblem};

use super::{FitOutcome, FitRequest, FitService, FitStatus};

/// Weighted least squares with the in-crate Levenberg-Marquardt minimizer.
#[derive(Debug, Clone, Default)]
pub struct LeastSquaresFit {
    config: LmConfig,
}

impl LeastSquaresFit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom minimizer configuration. The iteration cap of each
    /// request overrides `max_iterations`.
    pub fn with_config(config: LmConfig) -> Self {
        Self { config }
    }

    fn failed(request: &FitRequest<'_>, message: String) -> FitOutcome {
        debug!(
            "fit on spectrum {} over [{}, {}] failed: {}",
            request.workspace_index, request.start_x, request.end_x, message
        );
        FitOutcome {
            status: FitStatus::Failed(message),
            chi_squared: f64::INFINITY,
            initial_chi_squared: f64::INFINITY,
            function: request.function.clone(),
        }
    }
}

impl FitService for LeastSquaresFit {
    fn fit(&self, request: &FitRequest<'_>) -> Result<FitOutcome> {
        let data = request.data;
        if data.x.len() != data.y.len() || data.y.len() != data.e.len() {
            return Err(FindPeaksError::DimensionMismatch(format!(
                "fit data has {} x, {} y and {} e values",
                data.x.len(),
                data.y.len(),
                data.e.len()
            )));
        }

        if !(request.start_x <= request.end_x) {
            return Ok(Self::failed(
                request,
                format!("invalid fit range [{}, {}]", request.start_x, request.end_x),
            ));
        }

        let mut x = Vec::new();
        let mut y = Vec::new();
        let mut w = Vec::new();
        for i in 0..data.x.len() {
            let xi = data.x[i];
            if xi >= request.start_x && xi <= request.end_x {
                x.push(xi);
                y.push(data.y[i]);
                let e = data.e[i];
                w.push(if e.is_finite() && e > 0.0 { 1.0 / e } else { 1.0 });
            }
        }

        let function = request.function;
        let n_points = x.len();
        let n_free = function.varying_parameter_count();
        if n_points == 0 {
            return Ok(Self::failed(request, "no data points in the fit range".to_string()));
        }
        if n_points < n_free {
            return Ok(Self::failed(
                request,
                format!("{} data points cannot constrain {} parameters", n_points, n_free),
            ));
        }

        let problem = ModelProblem::new(
            function,
            Array1::from(x),
            Array1::from(y),
            Array1::from(w),
        )?;
        let start = problem.initial_free_values();

        let lm = LevenbergMarquardt::with_config(self.config.clone())
            .with_max_iterations(request.max_iterations);

        let result = match lm.minimize(&problem, start) {
            Ok(result) => result,
            Err(FindPeaksError::FunctionEvaluation(message)) => {
                return Ok(Self::failed(request, message));
            }
            Err(err) => return Err(err),
        };

        let dof = problem.ndata().saturating_sub(problem.nvarys()).max(1) as f64;
        let mut fitted = function.clone();
        let values = problem.full_values(&result.params);
        for (i, value) in values.into_iter().enumerate() {
            fitted.set_parameter(i, value)?;
        }

        let status = match result.termination {
            LmTermination::Converged(_) => FitStatus::Success,
            LmTermination::ToleranceUnreachable => FitStatus::ToleranceUnreachable,
            LmTermination::MaxIterations(n) => FitStatus::MaxIterations(n),
        };

        debug!(
            "{} fit on spectrum {} over [{}, {}] with {}: {} after {} iterations, chi2 {:.6e}",
            request.minimizer,
            request.workspace_index,
            request.start_x,
            request.end_x,
            request.cost_function,
            status,
            result.iterations,
            result.cost / dof
        );

        Ok(FitOutcome {
            status,
            chi_squared: result.cost / dof,
            initial_chi_squared: result.initial_cost / dof,
            function: fitted,
        })
    }
}
