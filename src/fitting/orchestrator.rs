//! Width sweep over one candidate.

use log::{debug, warn};

use crate::error::Result;
use crate::fit::{FitData, FitRequest, FitService};
use crate::models::{CompositeFunction, PeakFunction};
use crate::search::PeakCandidate;
use crate::table::PeakRow;

use super::{BackgroundEstimate, FitSettings, FitTracker, HighBackgroundRefiner, SpectrumData};

/// Half-width of the fit window, in units of the candidate width.
const FIT_WINDOW_FACTOR: f64 = 5.0;

/// Fits candidates of one invocation through a fit service.
pub struct PeakFitter<'s> {
    service: &'s dyn FitService,
    settings: &'s FitSettings,
}

impl<'s> PeakFitter<'s> {
    pub fn new(service: &'s dyn FitService, settings: &'s FitSettings) -> Self {
        Self { service, settings }
    }

    pub fn settings(&self) -> &FitSettings {
        self.settings
    }

    /// Fit one candidate and produce its result row.
    ///
    /// Fits that fail or are rejected give a bad row. Only a failure of the
    /// fit service itself is returned as an error.
    pub fn fit_candidate(&self, data: &SpectrumData<'_>, candidate: PeakCandidate) -> Result<PeakRow> {
        if data.len() < 3 || candidate.right >= data.len() || candidate.left > candidate.centre {
            warn!(
                "Spectrum {}: candidate {:?} cannot be fitted with {} values",
                data.index,
                candidate,
                data.len()
            );
            return Ok(PeakRow::bad(data.index));
        }

        let estimate = BackgroundEstimate::from_shoulders(data.y, candidate);
        let expected_height = data.y[candidate.centre] - estimate.a0;
        let expected_centre = expected_centre(data, candidate.centre);
        let mut tracker = FitTracker::new(expected_centre, expected_height, self.settings);

        debug!(
            "Spectrum {}: fitting candidate {:?} over bins [{}, {}], background {} + {} x",
            data.index, candidate, estimate.i_min, estimate.i_max, estimate.a0, estimate.a1
        );

        if self.settings.high_background {
            HighBackgroundRefiner::new(self.service, self.settings).refine(
                data,
                candidate,
                &estimate,
                &mut tracker,
            )?;
        } else {
            self.fit_one_step(data, candidate, &estimate, &mut tracker)?;
        }

        let (x_min, x_max) = data.x_range();
        Ok(match tracker.into_best() {
            Some(best) => PeakRow::from_fit(data.index, &best.function, best.chi_squared, x_min, x_max),
            None => {
                warn!(
                    "Spectrum {}: no acceptable fit for the peak near {}",
                    data.index, expected_centre
                );
                PeakRow::bad(data.index)
            }
        })
    }

    /// Fit peak and background together once per guessed width.
    pub fn fit_one_step(
        &self,
        data: &SpectrumData<'_>,
        candidate: PeakCandidate,
        estimate: &BackgroundEstimate,
        tracker: &mut FitTracker,
    ) -> Result<()> {
        let x = data.x;
        let in_height = data.y[candidate.centre] - estimate.a0;
        let in_centre = expected_centre(data, candidate.centre);
        let half_window = FIT_WINDOW_FACTOR * (x[candidate.right] - x[candidate.left]).abs();
        let background = estimate.background(self.settings.background_type);
        let fit_data = FitData::new(data.points(), data.y, data.e);

        for width in self.settings.guessed_widths() {
            let Some(fwhm) = width_guess(x, candidate.right, width) else {
                debug!("guessed width {} runs past the data", width);
                continue;
            };

            let peak = PeakFunction::with_shape(self.settings.peak_shape, in_centre, in_height, fwhm);
            let function = CompositeFunction::new(Some(&peak), &background);
            let request = FitRequest::new(
                &function,
                fit_data,
                data.index,
                in_centre - half_window,
                in_centre + half_window,
                self.settings.max_iterations,
            );
            let outcome = self.service.fit(&request)?;

            let accepted = tracker.offer(&outcome.status, outcome.chi_squared, &outcome.function);
            debug!(
                "width {} (fwhm {}): {} chi2 = {}{}",
                width,
                fwhm,
                outcome.status,
                outcome.chi_squared,
                if accepted { " (best)" } else { "" }
            );
        }
        Ok(())
    }
}

/// Position of bin `index`: the bin centre for histograms.
pub(crate) fn expected_centre(data: &SpectrumData<'_>, index: usize) -> f64 {
    if data.is_histogram() {
        0.5 * (data.x[index] + data.x[index + 1])
    } else {
        data.x[index]
    }
}

/// FWHM guess spanning `width` bins from `from`, if it stays inside the data.
pub(crate) fn width_guess(x: &[f64], from: usize, width: usize) -> Option<f64> {
    let to = x.get(from + width)?;
    let fwhm = to - x[from];
    (fwhm > 0.0).then_some(fwhm)
}
