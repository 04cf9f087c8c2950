//! Best-of tracking across the fits of one candidate.

use log::debug;

use crate::fit::FitStatus;
use crate::model::Model;
use crate::models::CompositeFunction;
use crate::table::EffectiveParameters;

use super::FitSettings;

/// Cost every fit has to beat to be recorded.
pub const INITIAL_MIN_COST: f64 = 1e10;

/// The best fit found so far.
#[derive(Debug, Clone)]
pub struct BestFit {
    pub function: CompositeFunction,
    pub chi_squared: f64,
    pub effective: EffectiveParameters,
}

/// Keeps the lowest-cost fit that passes the validity checks.
#[derive(Debug, Clone)]
pub struct FitTracker {
    expected_centre: f64,
    expected_height: f64,
    position_tolerance: Option<f64>,
    height_tolerance: Option<f64>,
    min_cost: f64,
    best: Option<BestFit>,
}

impl FitTracker {
    /// A tracker for fits expected near `expected_centre` with a height of
    /// about `expected_height`.
    pub fn new(expected_centre: f64, expected_height: f64, settings: &FitSettings) -> Self {
        Self {
            expected_centre,
            expected_height,
            position_tolerance: settings.position_tolerance(),
            height_tolerance: settings.height_tolerance(),
            min_cost: INITIAL_MIN_COST,
            best: None,
        }
    }

    /// Consider a fit result. Returns whether it became the new best.
    ///
    /// A fit is rejected when its status is not acceptable, its cost does
    /// not beat the best so far, its height is not positive, it violates an
    /// enabled height or position tolerance, or any parameter is NaN.
    pub fn offer(&mut self, status: &FitStatus, chi_squared: f64, function: &CompositeFunction) -> bool {
        if !status.is_acceptable() {
            debug!("fit rejected: status '{}'", status);
            return false;
        }
        if !(chi_squared < self.min_cost) {
            debug!("fit rejected: chi2 {} does not beat {}", chi_squared, self.min_cost);
            return false;
        }

        let effective = EffectiveParameters::from_function(function);
        if !(effective.height > 0.0) {
            debug!("fit rejected: height {}", effective.height);
            return false;
        }
        if let Some(tolerance) = self.height_tolerance {
            if effective.height > self.expected_height * tolerance {
                debug!(
                    "fit rejected: height {} above {} x {}",
                    effective.height, self.expected_height, tolerance
                );
                return false;
            }
        }
        if let Some(tolerance) = self.position_tolerance {
            if (effective.centre - self.expected_centre).abs() > tolerance {
                debug!(
                    "fit rejected: centre {} more than {} from {}",
                    effective.centre, tolerance, self.expected_centre
                );
                return false;
            }
        }
        if effective.has_nan() || function.parameters().values().iter().any(|v| v.is_nan()) {
            debug!("fit rejected: NaN parameter");
            return false;
        }

        self.min_cost = chi_squared;
        self.best = Some(BestFit {
            function: function.clone(),
            chi_squared,
            effective,
        });
        true
    }

    pub fn best(&self) -> Option<&BestFit> {
        self.best.as_ref()
    }

    pub fn into_best(self) -> Option<BestFit> {
        self.best
    }

    pub fn min_cost(&self) -> f64 {
        self.min_cost
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BackgroundFunction, BackgroundType, PeakFunction, PeakShape};

    fn function(centre: f64, height: f64) -> CompositeFunction {
        let peak = PeakFunction::with_shape(PeakShape::Gaussian, centre, height, 0.5);
        CompositeFunction::new(Some(&peak), &BackgroundFunction::new(BackgroundType::Linear))
    }

    #[test]
    fn test_keeps_lowest_cost() {
        let mut tracker = FitTracker::new(5.0, 50.0, &FitSettings::default());
        assert!(tracker.offer(&FitStatus::Success, 3.0, &function(5.0, 40.0)));
        assert!(!tracker.offer(&FitStatus::Success, 3.0, &function(5.0, 45.0)));
        assert!(tracker.offer(&FitStatus::ToleranceUnreachable, 1.0, &function(5.1, 50.0)));
        assert!(!tracker.offer(&FitStatus::Success, 2.0, &function(5.0, 50.0)));

        let best = tracker.best().unwrap();
        assert_eq!(best.chi_squared, 1.0);
        assert_eq!(best.effective.centre, 5.1);
        assert_eq!(tracker.min_cost(), 1.0);
    }

    #[test]
    fn test_rejects_bad_status_and_height() {
        let mut tracker = FitTracker::new(5.0, 50.0, &FitSettings::default());
        assert!(!tracker.offer(&FitStatus::MaxIterations(50), 1.0, &function(5.0, 50.0)));
        assert!(!tracker.offer(&FitStatus::Failed("boom".into()), 1.0, &function(5.0, 50.0)));
        assert!(!tracker.offer(&FitStatus::Success, 1.0, &function(5.0, -1.0)));
        assert!(!tracker.offer(&FitStatus::Success, f64::NAN, &function(5.0, 50.0)));
        assert!(!tracker.offer(&FitStatus::Success, 1.0, &function(f64::NAN, 50.0)));
        assert!(!tracker.offer(&FitStatus::Success, 2e10, &function(5.0, 50.0)));
        assert!(tracker.into_best().is_none());
    }

    #[test]
    fn test_tolerances() {
        let settings = FitSettings {
            position_tolerance: Some(0.2),
            height_tolerance: Some(1.5),
            ..FitSettings::default()
        };
        let mut tracker = FitTracker::new(5.0, 50.0, &settings);
        assert!(!tracker.offer(&FitStatus::Success, 1.0, &function(5.3, 50.0)));
        assert!(!tracker.offer(&FitStatus::Success, 1.0, &function(5.0, 80.0)));
        assert!(tracker.offer(&FitStatus::Success, 1.0, &function(5.1, 70.0)));

        // a negative expectation rejects every positive height
        let mut tracker = FitTracker::new(5.0, -0.3, &settings);
        assert!(!tracker.offer(&FitStatus::Success, 1.0, &function(5.0, 0.1)));
    }

    #[test]
    fn test_non_positive_tolerance_is_disabled() {
        let settings = FitSettings {
            position_tolerance: Some(0.0),
            height_tolerance: Some(-1.0),
            ..FitSettings::default()
        };
        let mut tracker = FitTracker::new(0.0, 1.0, &settings);
        assert!(tracker.offer(&FitStatus::Success, 1.0, &function(5.0, 50.0)));
    }
}
