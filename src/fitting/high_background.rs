//! Peak fitting on top of a strong background.
//!
//! The background is fitted first on the shoulders of the peak. The peak is
//! then fitted alone against the background-subtracted residual, and finally
//! both are refined together starting from the two partial results.

use log::{debug, warn};
use ndarray::Array1;

use crate::error::Result;
use crate::fit::{FitData, FitRequest, FitService, FitStatus};
use crate::model::Model;
use crate::models::{BackgroundFunction, CompositeFunction, PeakFunction};
use crate::search::PeakCandidate;

use super::estimate::estimate_peak;
use super::orchestrator::width_guess;
use super::{BackgroundEstimate, FitSettings, FitTracker, SpectrumData};

/// Background fits need at least this many points outside the peak.
const MIN_BACKGROUND_POINTS: usize = 3;

/// Three-phase fit for peaks that are weak against their background.
pub struct HighBackgroundRefiner<'s> {
    service: &'s dyn FitService,
    settings: &'s FitSettings,
}

/// Peak fitted against the residual in phase two.
#[derive(Debug, Clone)]
struct ResidualFit {
    peak: PeakFunction,
    rwp: f64,
}

impl<'s> HighBackgroundRefiner<'s> {
    pub fn new(service: &'s dyn FitService, settings: &'s FitSettings) -> Self {
        Self { service, settings }
    }

    /// Run all three phases and offer the final fit to `tracker`.
    pub fn refine(
        &self,
        data: &SpectrumData<'_>,
        candidate: PeakCandidate,
        estimate: &BackgroundEstimate,
        tracker: &mut FitTracker,
    ) -> Result<()> {
        let background = self.fit_background(data, candidate, estimate)?;

        let Some(residual_fit) = self.fit_residual(data, candidate, estimate, &background)? else {
            warn!(
                "Spectrum {}: no acceptable peak fit against the background-subtracted data",
                data.index
            );
            return Ok(());
        };
        debug!(
            "Spectrum {}: residual fit centre {} fwhm {} height {} (Rwp {})",
            data.index,
            residual_fit.peak.centre(),
            residual_fit.peak.fwhm(),
            residual_fit.peak.height(),
            residual_fit.rwp
        );

        let (status, chi_squared, function) =
            self.fit_joint(data, estimate, &residual_fit.peak, &background)?;
        tracker.offer(&status, chi_squared, &function);
        Ok(())
    }

    /// Phase one: fit the background alone, leaving out the peak.
    ///
    /// Bins in `[left, right]` of the candidate are left out. A failed fit
    /// gives a zero background.
    pub fn fit_background(
        &self,
        data: &SpectrumData<'_>,
        candidate: PeakCandidate,
        estimate: &BackgroundEstimate,
    ) -> Result<BackgroundFunction> {
        let kind = self.settings.background_type;
        let points = data.points();

        let mut x = Vec::new();
        let mut y = Vec::new();
        let mut e = Vec::new();
        let outside = |i: &usize| *i < candidate.left || *i > candidate.right;
        for i in (estimate.i_min..=estimate.i_max).filter(outside) {
            x.push(points[i]);
            y.push(data.y[i]);
            e.push(data.e[i]);
        }

        if x.len() < MIN_BACKGROUND_POINTS {
            warn!(
                "Spectrum {}: only {} background points around the peak, using a zero background",
                data.index,
                x.len()
            );
            return Ok(BackgroundFunction::new(kind));
        }

        let function = CompositeFunction::background_only(&estimate.background(kind));
        let request = FitRequest::new(
            &function,
            FitData::new(&x, &y, &e),
            data.index,
            x[0],
            x[x.len() - 1],
            self.settings.max_iterations,
        );
        let outcome = self.service.fit(&request)?;

        if !outcome.status.is_acceptable() {
            warn!(
                "Spectrum {}: background fit failed ({}), using a zero background",
                data.index, outcome.status
            );
            return Ok(BackgroundFunction::new(kind));
        }
        debug!(
            "Spectrum {}: background fit {} with chi2 = {}",
            data.index, outcome.status, outcome.chi_squared
        );
        Ok(outcome.function.background())
    }

    /// Phase two: fit the peak against the data minus the background.
    ///
    /// Negative residuals are clipped to zero. Every guessed width plus the
    /// FWHM observed in the residual is tried, and the fit with the lowest
    /// Rwp wins.
    fn fit_residual(
        &self,
        data: &SpectrumData<'_>,
        candidate: PeakCandidate,
        estimate: &BackgroundEstimate,
        background: &BackgroundFunction,
    ) -> Result<Option<ResidualFit>> {
        let range = estimate.i_min..=estimate.i_max;
        let x = &data.points()[range.clone()];
        let baseline = background.eval(&Array1::from(x.to_vec()))?;
        let residual: Vec<f64> = data.y[range]
            .iter()
            .zip(baseline.iter())
            .map(|(y, b)| (y - b).max(0.0))
            .collect();
        let e: Vec<f64> = residual
            .iter()
            .map(|&r| if r >= 1.0 { r.sqrt() } else { 1.0 })
            .collect();

        let observed = estimate_peak(x, &residual)?;
        let centre_offset = candidate.centre.clamp(estimate.i_min, estimate.i_max) - estimate.i_min;
        let centre = x[centre_offset];

        let mut guesses: Vec<f64> = self
            .settings
            .guessed_widths()
            .filter_map(|width| width_guess(x, centre_offset, width))
            .collect();
        if observed.fwhm > 0.0 {
            guesses.push(observed.fwhm);
        }

        let mut zero = BackgroundFunction::new(self.settings.background_type);
        zero.zero();
        let fit_data = FitData::new(x, &residual, &e);
        let x_array = Array1::from(x.to_vec());

        let mut best: Option<ResidualFit> = None;
        for fwhm in guesses {
            let peak = PeakFunction::with_shape(self.settings.peak_shape, centre, observed.height, fwhm);
            let mut function = CompositeFunction::new(Some(&peak), &zero);
            function.fix_background();

            let request = FitRequest::new(
                &function,
                fit_data,
                data.index,
                x[0],
                x[x.len() - 1],
                self.settings.max_iterations,
            );
            let outcome = self.service.fit(&request)?;
            if !outcome.status.is_acceptable() {
                continue;
            }
            let Some(fitted) = outcome.function.peak() else {
                continue;
            };
            if !(fitted.height() > 0.0) || outcome.function.parameters().has_non_finite() {
                continue;
            }

            let model = outcome.function.eval(&x_array)?;
            let rwp = weighted_profile_r(&residual, &e, model.as_slice().unwrap_or(&[]));
            debug!("residual fit with fwhm guess {}: Rwp = {}", fwhm, rwp);
            if rwp.is_finite() && best.as_ref().map_or(true, |b| rwp < b.rwp) {
                best = Some(ResidualFit { peak: fitted, rwp });
            }
        }
        Ok(best)
    }

    /// Phase three: refine peak and background together over the fit range.
    ///
    /// Keeps the starting point, with its cost, unless the joint fit
    /// succeeds and lowers the cost.
    fn fit_joint(
        &self,
        data: &SpectrumData<'_>,
        estimate: &BackgroundEstimate,
        peak: &PeakFunction,
        background: &BackgroundFunction,
    ) -> Result<(FitStatus, f64, CompositeFunction)> {
        let points = data.points();
        let mut start = CompositeFunction::new(Some(peak), background);
        start.unfix_background();

        let request = FitRequest::new(
            &start,
            FitData::new(points, data.y, data.e),
            data.index,
            points[estimate.i_min],
            points[estimate.i_max],
            self.settings.max_iterations,
        );
        let outcome = self.service.fit(&request)?;
        debug!(
            "Spectrum {}: joint fit {} chi2 = {} (start {})",
            data.index, outcome.status, outcome.chi_squared, outcome.initial_chi_squared
        );

        if outcome.status.is_acceptable() && outcome.chi_squared < outcome.initial_chi_squared {
            Ok((outcome.status, outcome.chi_squared, outcome.function))
        } else {
            Ok((FitStatus::Success, outcome.initial_chi_squared, start))
        }
    }
}

/// Weighted profile R factor: sqrt(Σ (y − f)²/e² / Σ y²/e²).
pub fn weighted_profile_r(y: &[f64], e: &[f64], model: &[f64]) -> f64 {
    let mut num = 0.0;
    let mut denom = 0.0;
    for ((y, e), f) in y.iter().zip(e).zip(model) {
        let w2 = 1.0 / (e * e);
        num += w2 * (y - f) * (y - f);
        denom += w2 * y * y;
    }
    (num / denom).sqrt()
}
