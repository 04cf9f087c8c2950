//! Peak functions.
//!
//! Each shape exposes its own raw parameters and a common set of effective
//! descriptors: centre, height and full width at half maximum.

use crate::error::{FindPeaksError, Result};
use crate::model::Model;
use crate::parameters::Parameters;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// FWHM = 2·sqrt(2·ln 2)·σ for a Gaussian.
pub const GAUSSIAN_FWHM_PER_SIGMA: f64 = 2.354_820_045_030_949;

/// The registered peak shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PeakShape {
    /// f(x) = Height · exp(−(x − PeakCentre)² / (2·Sigma²))
    #[default]
    Gaussian,
    /// f(x) = Amplitude · (Γ/2)/π / ((x − PeakCentre)² + (Γ/2)²), Γ = FWHM
    Lorentzian,
}

impl PeakShape {
    /// All registered shapes.
    pub const ALL: [PeakShape; 2] = [PeakShape::Gaussian, PeakShape::Lorentzian];

    /// Registered name of the shape.
    pub fn name(&self) -> &'static str {
        match self {
            PeakShape::Gaussian => "Gaussian",
            PeakShape::Lorentzian => "Lorentzian",
        }
    }

    /// Names of all registered shapes.
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|s| s.name()).collect()
    }

    /// Raw parameter names in declaration order.
    pub fn parameter_names(&self) -> [&'static str; 3] {
        match self {
            PeakShape::Gaussian => ["Height", "PeakCentre", "Sigma"],
            PeakShape::Lorentzian => ["Amplitude", "PeakCentre", "FWHM"],
        }
    }
}

impl fmt::Display for PeakShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PeakShape {
    type Err = FindPeaksError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|shape| shape.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| FindPeaksError::UnknownFunction(s.to_string()))
    }
}

const CENTRE: usize = 1;
const WIDTH: usize = 2;

/// A peak function of one of the registered shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct PeakFunction {
    shape: PeakShape,
    params: Parameters,
}

impl PeakFunction {
    /// Create a peak with unit height and width, centred at zero.
    pub fn new(shape: PeakShape) -> Self {
        let mut params = Parameters::new();
        for name in shape.parameter_names() {
            // names are distinct per shape
            let _ = params.add_param(name, 0.0);
        }
        let mut peak = Self { shape, params };
        peak.set_raw_width(1.0);
        peak.set_height(1.0);
        peak
    }

    /// Create a peak by registered name.
    pub fn from_name(name: &str) -> Result<Self> {
        Ok(Self::new(name.parse()?))
    }

    /// Create a peak with the given effective descriptors.
    pub fn with_shape(shape: PeakShape, centre: f64, height: f64, fwhm: f64) -> Self {
        let mut peak = Self::new(shape);
        peak.set_centre(centre);
        peak.set_fwhm(fwhm);
        peak.set_height(height);
        peak
    }

    /// The shape of this peak.
    pub fn shape(&self) -> PeakShape {
        self.shape
    }

    /// Peak position.
    pub fn centre(&self) -> f64 {
        self.value(CENTRE)
    }

    /// Maximum value of the peak above zero.
    pub fn height(&self) -> f64 {
        match self.shape {
            PeakShape::Gaussian => self.value(0),
            PeakShape::Lorentzian => {
                let gamma = self.value(WIDTH);
                if gamma == 0.0 {
                    0.0
                } else {
                    2.0 * self.value(0) / (PI * gamma)
                }
            }
        }
    }

    /// Full width at half maximum.
    pub fn fwhm(&self) -> f64 {
        match self.shape {
            PeakShape::Gaussian => GAUSSIAN_FWHM_PER_SIGMA * self.value(WIDTH).abs(),
            PeakShape::Lorentzian => self.value(WIDTH),
        }
    }

    /// Move the peak.
    pub fn set_centre(&mut self, centre: f64) {
        self.set_value(CENTRE, centre);
    }

    /// Set the peak height, keeping the width.
    pub fn set_height(&mut self, height: f64) {
        match self.shape {
            PeakShape::Gaussian => self.set_value(0, height),
            PeakShape::Lorentzian => {
                let gamma = self.value(WIDTH);
                self.set_value(0, height * PI * gamma / 2.0);
            }
        }
    }

    /// Set the full width at half maximum, keeping the height.
    pub fn set_fwhm(&mut self, fwhm: f64) {
        let height = self.height();
        self.set_raw_width(match self.shape {
            PeakShape::Gaussian => fwhm / GAUSSIAN_FWHM_PER_SIGMA,
            PeakShape::Lorentzian => fwhm,
        });
        if self.shape == PeakShape::Lorentzian {
            self.set_height(height);
        }
    }

    fn set_raw_width(&mut self, width: f64) {
        self.set_value(WIDTH, width);
    }

    fn value(&self, index: usize) -> f64 {
        self.params.get_index(index).map(|p| p.value()).unwrap_or(0.0)
    }

    fn set_value(&mut self, index: usize, value: f64) {
        if let Some(p) = self.params.get_index_mut(index) {
            p.set_value(value);
        }
    }

    /// Evaluate the shape for explicit raw parameter values.
    pub(crate) fn eval_values(shape: PeakShape, values: &[f64], x: &Array1<f64>) -> Array1<f64> {
        let (p0, c, width) = (values[0], values[CENTRE], values[WIDTH]);
        match shape {
            PeakShape::Gaussian => x.mapv(|x| {
                let z = (x - c) / width;
                p0 * (-0.5 * z * z).exp()
            }),
            PeakShape::Lorentzian => {
                let g = width / 2.0;
                x.mapv(|x| {
                    let dx = x - c;
                    p0 / PI * g / (dx * dx + g * g)
                })
            }
        }
    }

    /// Fill three Jacobian columns starting at `offset` for explicit raw values.
    pub(crate) fn jacobian_values(
        shape: PeakShape,
        values: &[f64],
        x: &Array1<f64>,
        jac: &mut Array2<f64>,
        offset: usize,
    ) {
        let (p0, c, width) = (values[0], values[CENTRE], values[WIDTH]);
        match shape {
            PeakShape::Gaussian => {
                let s2 = width * width;
                for (i, &xi) in x.iter().enumerate() {
                    let dx = xi - c;
                    let e = (-0.5 * dx * dx / s2).exp();
                    jac[[i, offset]] = e;
                    jac[[i, offset + 1]] = p0 * e * dx / s2;
                    jac[[i, offset + 2]] = p0 * e * dx * dx / (s2 * width);
                }
            }
            PeakShape::Lorentzian => {
                let g = width / 2.0;
                for (i, &xi) in x.iter().enumerate() {
                    let dx = xi - c;
                    let d = dx * dx + g * g;
                    jac[[i, offset]] = g / (PI * d);
                    jac[[i, offset + 1]] = p0 / PI * g * 2.0 * dx / (d * d);
                    jac[[i, offset + 2]] = 0.5 * p0 / PI * (dx * dx - g * g) / (d * d);
                }
            }
        }
    }
}

impl Model for PeakFunction {
    fn name(&self) -> String {
        self.shape.name().to_string()
    }

    fn parameters(&self) -> &Parameters {
        &self.params
    }

    fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.params
    }

    fn eval_with(&self, values: &[f64], x: &Array1<f64>) -> Result<Array1<f64>> {
        if values.len() != 3 {
            return Err(FindPeaksError::DimensionMismatch(format!(
                "{} takes 3 parameters, got {}",
                self.shape,
                values.len()
            )));
        }
        Ok(Self::eval_values(self.shape, values, x))
    }

    fn jacobian_with(&self, values: &[f64], x: &Array1<f64>) -> Result<Array2<f64>> {
        if values.len() != 3 {
            return Err(FindPeaksError::DimensionMismatch(format!(
                "{} takes 3 parameters, got {}",
                self.shape,
                values.len()
            )));
        }
        let mut jac = Array2::zeros((x.len(), 3));
        Self::jacobian_values(self.shape, values, x, &mut jac, 0);
        Ok(jac)
    }

    fn has_custom_jacobian(&self) -> bool {
        true
    }
}
