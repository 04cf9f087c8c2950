//! Spectra and the store they are read from.
//!
//! A spectrum is either point data (one x per value) or histogram data (bin
//! edges, one more x than values). Peak fitting works on point positions, so
//! histogram spectra also expose their bin centres.

use crate::error::{FindPeaksError, Result};
use serde::{Deserialize, Serialize};

/// One spectrum: x values, intensities and their uncertainties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spectrum {
    x: Vec<f64>,
    y: Vec<f64>,
    e: Vec<f64>,
}

impl Spectrum {
    /// Build a spectrum, checking lengths and that x is strictly increasing.
    pub fn new(x: Vec<f64>, y: Vec<f64>, e: Vec<f64>) -> Result<Self> {
        if y.len() != e.len() {
            return Err(FindPeaksError::DimensionMismatch(format!(
                "{} intensities but {} uncertainties",
                y.len(),
                e.len()
            )));
        }
        if x.len() != y.len() && x.len() != y.len() + 1 {
            return Err(FindPeaksError::DimensionMismatch(format!(
                "{} x values for {} intensities",
                x.len(),
                y.len()
            )));
        }
        if let Some(i) = x.windows(2).position(|w| !(w[0] < w[1])) {
            return Err(FindPeaksError::InvalidInput(format!(
                "x values must be strictly increasing (x[{}] = {}, x[{}] = {})",
                i,
                x[i],
                i + 1,
                x[i + 1]
            )));
        }
        Ok(Self { x, y, e })
    }

    /// Point data with Poisson uncertainties, sqrt(y) clamped below at 1.
    pub fn with_counting_errors(x: Vec<f64>, y: Vec<f64>) -> Result<Self> {
        let e = y.iter().map(|&v| if v >= 1.0 { v.sqrt() } else { 1.0 }).collect();
        Self::new(x, y, e)
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn e(&self) -> &[f64] {
        &self.e
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    /// Whether x holds bin edges.
    pub fn is_histogram(&self) -> bool {
        self.x.len() == self.y.len() + 1
    }

    /// x positions to pair with y: bin centres for histograms, x otherwise.
    pub fn points(&self) -> Vec<f64> {
        if self.is_histogram() {
            self.x.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect()
        } else {
            self.x.clone()
        }
    }
}

/// Read access to a collection of spectra.
pub trait SpectrumStore: Sync {
    fn read_x(&self, index: usize) -> Result<&[f64]>;
    fn read_y(&self, index: usize) -> Result<&[f64]>;
    fn read_e(&self, index: usize) -> Result<&[f64]>;
    fn number_of_spectra(&self) -> usize;
    /// Values per spectrum.
    fn blocksize(&self) -> usize;
    /// Whether x has one more element than y.
    fn is_histogram_data(&self) -> bool;
}

/// An in-memory collection of equally sized spectra.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workspace2D {
    spectra: Vec<Spectrum>,
}

impl Workspace2D {
    /// Collect spectra that share one blocksize and one x layout.
    pub fn new(spectra: Vec<Spectrum>) -> Result<Self> {
        if let Some(first) = spectra.first() {
            for (i, s) in spectra.iter().enumerate().skip(1) {
                if s.len() != first.len() || s.is_histogram() != first.is_histogram() {
                    return Err(FindPeaksError::DimensionMismatch(format!(
                        "spectrum {} does not match the layout of spectrum 0",
                        i
                    )));
                }
            }
        }
        Ok(Self { spectra })
    }

    /// A workspace holding a single spectrum.
    pub fn from_spectrum(spectrum: Spectrum) -> Self {
        Self {
            spectra: vec![spectrum],
        }
    }

    /// Borrow one spectrum.
    pub fn spectrum(&self, index: usize) -> Result<&Spectrum> {
        self.spectra.get(index).ok_or(FindPeaksError::IndexError {
            index,
            count: self.spectra.len(),
        })
    }

    pub fn spectra(&self) -> &[Spectrum] {
        &self.spectra
    }
}

impl SpectrumStore for Workspace2D {
    fn read_x(&self, index: usize) -> Result<&[f64]> {
        Ok(self.spectrum(index)?.x())
    }

    fn read_y(&self, index: usize) -> Result<&[f64]> {
        Ok(self.spectrum(index)?.y())
    }

    fn read_e(&self, index: usize) -> Result<&[f64]> {
        Ok(self.spectrum(index)?.e())
    }

    fn number_of_spectra(&self) -> usize {
        self.spectra.len()
    }

    fn blocksize(&self) -> usize {
        self.spectra.first().map(|s| s.len()).unwrap_or(0)
    }

    fn is_histogram_data(&self) -> bool {
        self.spectra.first().map(|s| s.is_histogram()).unwrap_or(false)
    }
}
