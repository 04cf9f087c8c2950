//! Options of a peak search.
//!
//! [`FindPeaksConfig`] holds every recognised option with its default. It
//! can be built in code with the `with_*` methods or loaded from JSON, where
//! missing fields take their defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{FindPeaksError, Result};
use crate::fitting::FitSettings;
use crate::models::{BackgroundType, PeakShape};
use crate::search::SMOOTHING_PASSES;

/// Configuration of a [`FindPeaks`](crate::FindPeaks) run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FindPeaksConfig {
    /// Expected peak FWHM in bins, for the automatic search. Default: 7
    pub fwhm: usize,

    /// Slack in bins on the search's width criteria. Default: 4
    pub tolerance: usize,

    /// Centres of known peaks. When empty the peaks are searched for.
    pub peak_positions: Vec<f64>,

    /// Left and right x bound for each peak position, flattened.
    pub fit_windows: Vec<f64>,

    /// Name of the peak shape. Default: "Gaussian"
    pub peak_function: String,

    /// Background polynomial. Default: Linear
    pub background_type: BackgroundType,

    /// Restrict the run to one spectrum.
    pub workspace_index: Option<usize>,

    /// Fit the background on its own before the peak. Default: true
    pub high_background: bool,

    /// Smallest guessed peak width in bins. Default: 2
    pub min_guessed_peak_width: usize,

    /// Largest guessed peak width in bins. Default: 10
    pub max_guessed_peak_width: usize,

    /// Step between guessed peak widths. Default: 2
    pub guessed_peak_width_step: usize,

    /// Largest accepted distance between fitted and given centre.
    pub peak_position_tolerance: Option<f64>,

    /// Largest accepted ratio of fitted to observed height.
    pub peak_height_tolerance: Option<f64>,

    /// Report the raw parameters of the fitted function. Default: false
    pub raw_peak_parameters: bool,

    /// Iteration cap of every fit. Default: 50
    pub max_iterations: usize,

    /// Smoothing passes of the search. Default: 5
    pub smoothing_passes: usize,
}

impl Default for FindPeaksConfig {
    fn default() -> Self {
        Self {
            fwhm: 7,
            tolerance: 4,
            peak_positions: Vec::new(),
            fit_windows: Vec::new(),
            peak_function: PeakShape::Gaussian.name().to_string(),
            background_type: BackgroundType::Linear,
            workspace_index: None,
            high_background: true,
            min_guessed_peak_width: 2,
            max_guessed_peak_width: 10,
            guessed_peak_width_step: 2,
            peak_position_tolerance: None,
            peak_height_tolerance: None,
            raw_peak_parameters: false,
            max_iterations: 50,
            smoothing_passes: SMOOTHING_PASSES,
        }
    }
}

impl FindPeaksConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fwhm(mut self, fwhm: usize) -> Self {
        self.fwhm = fwhm;
        self
    }

    pub fn with_tolerance(mut self, tolerance: usize) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_peak_positions(mut self, positions: Vec<f64>) -> Self {
        self.peak_positions = positions;
        self
    }

    /// Fit windows as `[left0, right0, left1, right1, ...]`.
    pub fn with_fit_windows(mut self, windows: Vec<f64>) -> Self {
        self.fit_windows = windows;
        self
    }

    pub fn with_peak_function(mut self, name: &str) -> Self {
        self.peak_function = name.to_string();
        self
    }

    pub fn with_background_type(mut self, background: BackgroundType) -> Self {
        self.background_type = background;
        self
    }

    pub fn with_workspace_index(mut self, index: usize) -> Self {
        self.workspace_index = Some(index);
        self
    }

    pub fn with_high_background(mut self, high_background: bool) -> Self {
        self.high_background = high_background;
        self
    }

    /// Guessed peak widths from `min` to `max` in steps of `step` bins.
    pub fn with_guessed_peak_widths(mut self, min: usize, max: usize, step: usize) -> Self {
        self.min_guessed_peak_width = min;
        self.max_guessed_peak_width = max;
        self.guessed_peak_width_step = step;
        self
    }

    pub fn with_peak_position_tolerance(mut self, tolerance: f64) -> Self {
        self.peak_position_tolerance = Some(tolerance);
        self
    }

    pub fn with_peak_height_tolerance(mut self, tolerance: f64) -> Self {
        self.peak_height_tolerance = Some(tolerance);
        self
    }

    pub fn with_raw_peak_parameters(mut self, raw: bool) -> Self {
        self.raw_peak_parameters = raw;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_smoothing_passes(mut self, passes: usize) -> Self {
        self.smoothing_passes = passes;
        self
    }

    /// The configured peak shape.
    pub fn peak_shape(&self) -> Result<PeakShape> {
        self.peak_function.parse()
    }

    /// Whether peaks are given rather than searched for.
    pub fn has_given_peaks(&self) -> bool {
        !self.peak_positions.is_empty()
    }

    /// Fit window of the `i`-th given peak.
    pub fn fit_window(&self, i: usize) -> Option<(f64, f64)> {
        let left = *self.fit_windows.get(2 * i)?;
        let right = *self.fit_windows.get(2 * i + 1)?;
        Some((left, right))
    }

    /// Check option values and their combinations.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| Err(FindPeaksError::InvalidConfiguration(message));

        if self.fwhm < 1 {
            return invalid(format!("FWHM must be at least 1, got {}", self.fwhm));
        }
        if self.tolerance < 1 {
            return invalid(format!("Tolerance must be at least 1, got {}", self.tolerance));
        }
        if self.min_guessed_peak_width < 1 || self.guessed_peak_width_step < 1 {
            return invalid(format!(
                "guessed peak widths need a minimum and step of at least 1, got {} and {}",
                self.min_guessed_peak_width, self.guessed_peak_width_step
            ));
        }
        if self.min_guessed_peak_width > self.max_guessed_peak_width {
            return invalid(format!(
                "MinGuessedPeakWidth {} is larger than MaxGuessedPeakWidth {}",
                self.min_guessed_peak_width, self.max_guessed_peak_width
            ));
        }
        if !self.fit_windows.is_empty() && self.fit_windows.len() != 2 * self.peak_positions.len() {
            return invalid(format!(
                "{} fit window bounds given for {} peak positions",
                self.fit_windows.len(),
                self.peak_positions.len()
            ));
        }
        if self.max_iterations < 1 {
            return invalid("the fit iteration cap must be at least 1".to_string());
        }
        if let Err(err) = self.peak_shape() {
            return invalid(err.to_string());
        }
        Ok(())
    }

    /// Fit settings for this configuration. Tolerances apply to given peaks
    /// only.
    pub fn fit_settings(&self) -> Result<FitSettings> {
        let settings = FitSettings {
            peak_shape: self.peak_shape()?,
            background_type: self.background_type,
            min_guessed_width: self.min_guessed_peak_width,
            max_guessed_width: self.max_guessed_peak_width,
            guessed_width_step: self.guessed_peak_width_step,
            max_iterations: self.max_iterations,
            position_tolerance: self.peak_position_tolerance,
            height_tolerance: self.peak_height_tolerance,
            high_background: self.high_background,
        };
        Ok(if self.has_given_peaks() {
            settings
        } else {
            settings.without_tolerances()
        })
    }

    /// Parse a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a JSON file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FindPeaksConfig::default();
        assert_eq!(config.fwhm, 7);
        assert_eq!(config.tolerance, 4);
        assert_eq!(config.peak_function, "Gaussian");
        assert_eq!(config.background_type, BackgroundType::Linear);
        assert!(config.high_background);
        assert_eq!(
            (
                config.min_guessed_peak_width,
                config.max_guessed_peak_width,
                config.guessed_peak_width_step
            ),
            (2, 10, 2)
        );
        assert!(!config.raw_peak_parameters);
        assert_eq!(config.max_iterations, 50);
        assert_eq!(config.smoothing_passes, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_combinations() {
        let bad = [
            FindPeaksConfig::new().with_fwhm(0),
            FindPeaksConfig::new().with_tolerance(0),
            FindPeaksConfig::new().with_guessed_peak_widths(6, 4, 2),
            FindPeaksConfig::new().with_guessed_peak_widths(2, 10, 0),
            FindPeaksConfig::new()
                .with_peak_positions(vec![1.0, 2.0])
                .with_fit_windows(vec![0.5, 1.5]),
            FindPeaksConfig::new().with_peak_function("Voigtish"),
            FindPeaksConfig::new().with_max_iterations(0),
        ];
        for config in bad {
            assert!(
                matches!(config.validate(), Err(FindPeaksError::InvalidConfiguration(_))),
                "{:?}",
                config
            );
        }
    }

    #[test]
    fn test_fit_windows() {
        let config = FindPeaksConfig::new()
            .with_peak_positions(vec![1.0, 2.0])
            .with_fit_windows(vec![0.5, 1.5, 1.6, 2.4]);
        assert!(config.validate().is_ok());
        assert_eq!(config.fit_window(1), Some((1.6, 2.4)));
        assert_eq!(config.fit_window(2), None);
    }

    #[test]
    fn test_tolerances_dropped_for_search() {
        let config = FindPeaksConfig::new()
            .with_peak_position_tolerance(0.1)
            .with_peak_height_tolerance(2.0);
        let settings = config.fit_settings().unwrap();
        assert_eq!(settings.position_tolerance(), None);
        assert_eq!(settings.height_tolerance(), None);

        let settings = config.with_peak_positions(vec![5.0]).fit_settings().unwrap();
        assert_eq!(settings.position_tolerance(), Some(0.1));
        assert_eq!(settings.height_tolerance(), Some(2.0));
    }

    #[test]
    fn test_json() {
        let config = FindPeaksConfig::from_json(
            r#"{ "fwhm": 9, "peak_positions": [5.0], "background_type": "Quadratic",
                 "peak_function": "lorentzian", "peak_height_tolerance": 0.01 }"#,
        )
        .unwrap();
        assert_eq!(config.fwhm, 9);
        assert_eq!(config.tolerance, 4);
        assert_eq!(config.background_type, BackgroundType::Quadratic);
        assert_eq!(config.peak_shape().unwrap(), PeakShape::Lorentzian);
        assert_eq!(config.peak_height_tolerance, Some(0.01));

        let back = FindPeaksConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(back, config);

        assert!(FindPeaksConfig::from_json("{ \"fwhm\": -1 }").is_err());
    }
}
