//! Fitting a peak plus background to each candidate.
//!
//! [`PeakFitter`] sweeps a range of guessed peak widths and keeps the best
//! fit accepted by a [`FitTracker`]. With a high background it delegates to
//! the three-phase [`HighBackgroundRefiner`] instead.

pub mod estimate;
pub mod high_background;
pub mod orchestrator;
pub mod tracker;

pub use estimate::{estimate_peak, PeakEstimate};
pub use high_background::HighBackgroundRefiner;
pub use orchestrator::PeakFitter;
pub use tracker::{BestFit, FitTracker};

use crate::error::{FindPeaksError, Result};
use crate::models::{BackgroundFunction, BackgroundType, PeakShape};
use crate::search::PeakCandidate;

/// Options shared by every fit of one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct FitSettings {
    pub peak_shape: PeakShape,
    pub background_type: BackgroundType,
    pub min_guessed_width: usize,
    pub max_guessed_width: usize,
    pub guessed_width_step: usize,
    pub max_iterations: usize,
    /// Largest accepted distance between fitted and expected centre.
    pub position_tolerance: Option<f64>,
    /// Largest accepted ratio between fitted and expected height.
    pub height_tolerance: Option<f64>,
    pub high_background: bool,
}

impl Default for FitSettings {
    fn default() -> Self {
        Self {
            peak_shape: PeakShape::Gaussian,
            background_type: BackgroundType::Linear,
            min_guessed_width: 2,
            max_guessed_width: 10,
            guessed_width_step: 2,
            max_iterations: 50,
            position_tolerance: None,
            height_tolerance: None,
            high_background: true,
        }
    }
}

impl FitSettings {
    /// Guessed widths in bins, from min to max inclusive.
    pub fn guessed_widths(&self) -> impl Iterator<Item = usize> {
        (self.min_guessed_width..=self.max_guessed_width).step_by(self.guessed_width_step.max(1))
    }

    /// The position tolerance if it is enabled.
    pub fn position_tolerance(&self) -> Option<f64> {
        self.position_tolerance.filter(|t| *t > 0.0)
    }

    /// The height tolerance if it is enabled.
    pub fn height_tolerance(&self) -> Option<f64> {
        self.height_tolerance.filter(|t| *t > 0.0)
    }

    /// Drop both tolerances.
    pub fn without_tolerances(mut self) -> Self {
        self.position_tolerance = None;
        self.height_tolerance = None;
        self
    }
}

/// Borrowed view of one spectrum, with the point positions used for fitting.
#[derive(Debug, Clone)]
pub struct SpectrumData<'a> {
    pub index: usize,
    /// Bin edges for histograms, points otherwise.
    pub x: &'a [f64],
    pub y: &'a [f64],
    pub e: &'a [f64],
    points: Vec<f64>,
}

impl<'a> SpectrumData<'a> {
    pub fn new(index: usize, x: &'a [f64], y: &'a [f64], e: &'a [f64]) -> Result<Self> {
        if y.len() != e.len() || (x.len() != y.len() && x.len() != y.len() + 1) {
            return Err(FindPeaksError::DimensionMismatch(format!(
                "spectrum {} has {} x, {} y and {} e values",
                index,
                x.len(),
                y.len(),
                e.len()
            )));
        }
        let points = if x.len() == y.len() + 1 {
            x.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect()
        } else {
            x.to_vec()
        };
        Ok(Self {
            index,
            x,
            y,
            e,
            points,
        })
    }

    pub fn is_histogram(&self) -> bool {
        self.x.len() == self.y.len() + 1
    }

    /// Positions paired with `y`.
    pub fn points(&self) -> &[f64] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    /// Smallest and largest x.
    pub fn x_range(&self) -> (f64, f64) {
        match (self.x.first(), self.x.last()) {
            (Some(&first), Some(&last)) => (first, last),
            _ => (0.0, 0.0),
        }
    }
}

/// Fit range around a candidate and a background guess from its shoulders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackgroundEstimate {
    pub i_min: usize,
    pub i_max: usize,
    pub a0: f64,
    pub a1: f64,
    pub a2: f64,
}

impl BackgroundEstimate {
    /// The range reaches five candidate widths past the right edge on both
    /// sides, staying one bin inside the data. The background is the mean
    /// of the three bins around each end, and the slope between them in
    /// counts per bin. Needs at least three values.
    pub fn from_shoulders(y: &[f64], candidate: PeakCandidate) -> Self {
        let n = y.len();
        let fit_width = candidate.right.saturating_sub(candidate.left).max(1);
        let i_min = candidate.right.saturating_sub(5 * fit_width).max(1);
        let i_max = (candidate.right + 5 * fit_width).min(n.saturating_sub(2)).max(i_min);

        let sum3 = |i: usize| y[i - 1] + y[i] + y[i + 1];
        let lower = sum3(i_min);
        let upper = sum3(i_max);

        Self {
            i_min,
            i_max,
            a0: (lower + upper) / 6.0,
            a1: (upper - lower) / (3.0 * (i_max - i_min + 1) as f64),
            a2: 0.0,
        }
    }

    /// The estimate as a background function of the given kind.
    pub fn background(&self, kind: BackgroundType) -> BackgroundFunction {
        let mut background = BackgroundFunction::new(kind);
        background.set_coefficient(0, self.a0);
        background.set_coefficient(1, self.a1);
        background.set_coefficient(2, self.a2);
        background
    }
}
