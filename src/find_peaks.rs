//! The peak search driver.
//!
//! For every selected spectrum the driver either resolves the given peak
//! positions into candidates or runs the automatic search, then fits each
//! candidate and collects one row per candidate. Spectra are independent
//! and are processed in parallel when the `parallel` feature is on.

use log::{info, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::FindPeaksConfig;
use crate::error::{FindPeaksError, Result};
use crate::fit::{FitService, LeastSquaresFit};
use crate::fitting::{FitSettings, PeakFitter, SpectrumData};
use crate::locator::{candidate_from_centre, candidate_from_window};
use crate::search::{MariscottiDetector, PeakCandidate};
use crate::smoothing::{BoxcarSmoother, Smoother};
use crate::table::{ParameterLayout, PeakRow, PeakTable};
use crate::workspace::SpectrumStore;

/// Finds and fits peaks in the spectra of a store.
///
/// # Example
///
/// ```
/// use findpeaks_rs::{FindPeaks, FindPeaksConfig, Spectrum, Workspace2D};
///
/// let x: Vec<f64> = (0..=200).map(|i| i as f64 * 0.05).collect();
/// let y: Vec<f64> = x
///     .iter()
///     .map(|&x| 10.0 + 50.0 * (-0.5 * ((x - 5.0) / 0.2123).powi(2)).exp())
///     .collect();
/// let workspace = Workspace2D::from_spectrum(Spectrum::with_counting_errors(x, y).unwrap());
///
/// let config = FindPeaksConfig::new().with_peak_positions(vec![5.0]);
/// let table = FindPeaks::new(config).unwrap().execute(&workspace).unwrap();
/// assert_eq!(table.len(), 1);
/// assert!(table.rows()[0].good);
/// ```
pub struct FindPeaks {
    config: FindPeaksConfig,
    settings: FitSettings,
    fit_service: Box<dyn FitService>,
    smoother: Box<dyn Smoother>,
}

impl FindPeaks {
    /// Validate `config` and set up the default fit service and smoother.
    pub fn new(config: FindPeaksConfig) -> Result<Self> {
        config.validate()?;
        let settings = config.fit_settings()?;
        Ok(Self {
            config,
            settings,
            fit_service: Box::new(LeastSquaresFit::new()),
            smoother: Box::new(BoxcarSmoother),
        })
    }

    /// Fit with another service.
    pub fn with_fit_service<S: FitService + 'static>(mut self, service: S) -> Self {
        self.fit_service = Box::new(service);
        self
    }

    /// Smooth with another smoother.
    pub fn with_smoother<S: Smoother + 'static>(mut self, smoother: S) -> Self {
        self.smoother = Box::new(smoother);
        self
    }

    pub fn config(&self) -> &FindPeaksConfig {
        &self.config
    }

    pub fn settings(&self) -> &FitSettings {
        &self.settings
    }

    /// Parameter columns of the output table.
    pub fn layout(&self) -> ParameterLayout {
        if self.config.raw_peak_parameters {
            ParameterLayout::raw_for(self.settings.peak_shape, self.settings.background_type)
        } else {
            ParameterLayout::Effective
        }
    }

    /// Process the selected spectra of `store`.
    ///
    /// Rows appear in spectrum order, then candidate order. Fits that fail
    /// give bad rows; errors are reserved for invalid input and failures of
    /// the fit service or smoother.
    pub fn execute(&self, store: &dyn SpectrumStore) -> Result<PeakTable> {
        let indices = self.spectrum_indices(store)?;
        let per_spectrum = self.process_all(store, &indices)?;

        let mut table = PeakTable::new(self.layout());
        for row in per_spectrum.into_iter().flatten() {
            table.push(row);
        }
        info!(
            "{} peaks fitted in {} spectra, {} with a good fit",
            table.len(),
            indices.len(),
            table.good_rows().count()
        );
        Ok(table)
    }

    fn spectrum_indices(&self, store: &dyn SpectrumStore) -> Result<Vec<usize>> {
        let count = store.number_of_spectra();
        match self.config.workspace_index {
            Some(index) if index >= count => Err(FindPeaksError::IndexError { index, count }),
            Some(index) => Ok(vec![index]),
            None => Ok((0..count).collect()),
        }
    }

    #[cfg(feature = "parallel")]
    fn process_all(&self, store: &dyn SpectrumStore, indices: &[usize]) -> Result<Vec<Vec<PeakRow>>> {
        indices
            .par_iter()
            .map(|&index| self.process_spectrum(store, index))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn process_all(&self, store: &dyn SpectrumStore, indices: &[usize]) -> Result<Vec<Vec<PeakRow>>> {
        indices
            .iter()
            .map(|&index| self.process_spectrum(store, index))
            .collect()
    }

    /// Find and fit the peaks of one spectrum.
    pub fn process_spectrum(&self, store: &dyn SpectrumStore, index: usize) -> Result<Vec<PeakRow>> {
        info!("Finding peaks in spectrum {}", index);
        let data = SpectrumData::new(
            index,
            store.read_x(index)?,
            store.read_y(index)?,
            store.read_e(index)?,
        )?;
        if data.is_empty() {
            warn!("Spectrum {} is empty", index);
            return Ok(Vec::new());
        }

        let candidates = if self.config.has_given_peaks() {
            self.given_candidates(&data)
        } else {
            self.search_candidates(&data)?
        };

        let fitter = PeakFitter::new(self.fit_service.as_ref(), &self.settings);
        candidates
            .into_iter()
            .map(|candidate| fitter.fit_candidate(&data, candidate))
            .collect()
    }

    /// Candidates for the configured peak positions. Positions not strictly
    /// inside the x range are skipped.
    fn given_candidates(&self, data: &SpectrumData<'_>) -> Vec<PeakCandidate> {
        let last = data.len() - 1;
        let (x_min, x_max) = data.x_range();
        let mut candidates = Vec::with_capacity(self.config.peak_positions.len());

        for (i, &position) in self.config.peak_positions.iter().enumerate() {
            if !(position > x_min && position < x_max) {
                warn!(
                    "Spectrum {}: peak position {} is outside [{}, {}], skipped",
                    data.index, position, x_min, x_max
                );
                continue;
            }
            let candidate = match self.config.fit_window(i) {
                Some((left, right)) => candidate_from_window(data.x, data.y, position, left, right, last),
                None => candidate_from_centre(data.x, position, self.config.fwhm, last),
            };
            candidates.push(candidate);
        }
        candidates
    }

    fn search_candidates(&self, data: &SpectrumData<'_>) -> Result<Vec<PeakCandidate>> {
        let candidates = MariscottiDetector::new(self.config.fwhm, self.config.tolerance)
            .with_passes(self.config.smoothing_passes)
            .detect(self.smoother.as_ref(), data.y, data.e)?;
        info!("Spectrum {}: {} peaks found", data.index, candidates.len());
        Ok(candidates)
    }
}
