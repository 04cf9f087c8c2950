//! Mariscotti's smoothed second-difference peak search.
//!
//! A peak in the data shows up in the smoothed second difference `S` as a
//! negative lobe flanked by two positive lobes. The scan classifies each bin
//! against the propagated error `F` and records the breakpoints
//! `i1 <= i2 <= i3 <= i4 < i5` of that pattern:
//!
//! - `i1`: rises above noise on the left flank
//! - `i2`: last bin above noise on the left flank
//! - `i3`: first non-positive bin
//! - `i4`: minimum of `S` in `[i3, i5]`
//! - `i5`: last non-positive bin
//!
//! Once a full set is collected the lobe widths are checked against the
//! expected FWHM before a candidate is emitted.

use log::{debug, trace};

use crate::error::{FindPeaksError, Result};
use crate::search::second_difference::second_difference;
use crate::search::variance::{smoothed_error, SMOOTHING_PASSES};
use crate::search::PeakCandidate;
use crate::smoothing::{odd_width, smooth_passes, Smoother};

/// Relates the width of the negative lobe to the peak FWHM for five passes
/// of a window 0.6·FWHM wide.
const KZ: f64 = 1.22;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    AboveNoise,
    Positive,
    NonPositive,
}

impl Level {
    fn of(s: f64, f: f64) -> Self {
        if s > f {
            Level::AboveNoise
        } else if s > 0.0 {
            Level::Positive
        } else {
            Level::NonPositive
        }
    }
}

#[derive(Debug, Default)]
struct Breakpoints {
    i1: Option<usize>,
    i2: Option<usize>,
    i3: Option<usize>,
}

/// Peak search over one spectrum at a time.
#[derive(Debug, Clone)]
pub struct MariscottiDetector {
    fwhm: usize,
    tolerance: usize,
    passes: usize,
}

impl MariscottiDetector {
    /// A detector for peaks about `fwhm` bins wide.
    pub fn new(fwhm: usize, tolerance: usize) -> Self {
        Self {
            fwhm,
            tolerance,
            passes: SMOOTHING_PASSES,
        }
    }

    /// Change the number of smoothing passes. The width criteria are only
    /// calibrated for the default of five.
    pub fn with_passes(mut self, passes: usize) -> Self {
        self.passes = passes;
        self
    }

    /// Boxcar width: 0.6·FWHM, rounded down then made odd.
    pub fn smoothing_width(&self) -> usize {
        odd_width((0.6 * self.fwhm as f64) as usize)
    }

    /// Expected width of the negative lobe in bins.
    pub fn n1(&self) -> i64 {
        (KZ * self.fwhm as f64 + 0.5) as i64
    }

    /// Smooth the second difference of `y` and scan it.
    pub fn detect(&self, smoother: &dyn Smoother, y: &[f64], e: &[f64]) -> Result<Vec<PeakCandidate>> {
        if y.len() != e.len() {
            return Err(FindPeaksError::DimensionMismatch(format!(
                "{} values but {} errors",
                y.len(),
                e.len()
            )));
        }
        let w = self.smoothing_width();
        let s = smooth_passes(smoother, &second_difference(y), w, self.passes)?;
        let f = smoothed_error(e, w, self.passes)?;
        Ok(self.scan(&s, &f))
    }

    /// Run the breakpoint state machine over a smoothed signal `s` with errors `f`.
    pub fn scan(&self, s: &[f64], f: &[f64]) -> Vec<PeakCandidate> {
        let n = s.len().min(f.len());
        let mut candidates = Vec::new();
        let mut bp = Breakpoints::default();

        for i in 1..n {
            let current = Level::of(s[i], f[i]);
            let mut i5 = None;

            match (Level::of(s[i - 1], f[i - 1]), current) {
                (Level::AboveNoise, Level::NonPositive) => {
                    bp.i3 = Some(i);
                    bp.i2 = Some(i - 1);
                }
                (Level::AboveNoise, Level::Positive) => bp.i2 = Some(i - 1),
                (Level::Positive, Level::NonPositive) => bp.i3 = Some(i),
                (Level::Positive, Level::AboveNoise) => bp.i1 = Some(i),
                (Level::NonPositive, Level::AboveNoise | Level::Positive) => i5 = Some(i - 1),
                _ => {}
            }

            let (Some(i5), Some(i1), Some(i2), Some(i3)) = (i5, bp.i1, bp.i2, bp.i3) else {
                continue;
            };
            bp = Breakpoints::default();

            if let Some(candidate) = self.evaluate(s, f, i1, i2, i3, i5) {
                candidates.push(candidate);
            }
        }

        candidates
    }

    fn evaluate(
        &self,
        s: &[f64],
        f: &[f64],
        i1: usize,
        i2: usize,
        i3: usize,
        i5: usize,
    ) -> Option<PeakCandidate> {
        let tolerance = self.tolerance as i64;

        let mut i4 = i3;
        let mut num = 0.0;
        let mut denom = 0.0;
        for j in i3..=i5 {
            if s[j] <= s[i4] {
                i4 = j;
            }
            num += j as f64 * s[j];
            denom += s[j];
        }

        if !(i1 <= i2 && i2 <= i3 && i3 <= i4 && i4 < i5) {
            trace!("rejected i1={} i2={} i3={} i4={} i5={}: ordering", i1, i2, i3, i4, i5);
            return None;
        }
        if s[i4].abs() < 2.0 * f[i4] {
            trace!("rejected i4={}: |S| below 2F", i4);
            return None;
        }
        if !(denom < 0.0) {
            return None;
        }
        let i0 = (num / denom) as usize;
        if i0 >= s.len() {
            return None;
        }

        let n1 = self.n1();
        if (i5 as i64 - i3 as i64 + 1 - n1).abs() > tolerance {
            trace!("rejected i3={} i5={}: negative lobe width", i3, i5);
            return None;
        }

        let ratio = f[i0] / s[i0];
        if !ratio.is_finite() {
            return None;
        }

        let n2 = ((0.5 * ratio * (n1 + tolerance) as f64 + 0.5) as i64)
            .abs()
            .max(((0.5 * ratio * (n1 - tolerance) as f64 + 0.5) as i64).abs());
        let test_val = if n2 == 0 { 1 } else { n2 };
        if i3 as i64 - i2 as i64 - 1 > test_val {
            trace!("rejected i2={} i3={}: gap {} > {}", i2, i3, i3 - i2 - 1, test_val);
            return None;
        }

        let n3 = ((((n1 + tolerance) as f64) * (1.0 - 2.0 * ratio) + 0.5) as i64)
            .abs()
            .min(((((n1 - tolerance) as f64) * (1.0 - 2.0 * ratio) + 0.5) as i64).abs());
        if (i2 as i64 - i1 as i64 + 1) < n3 {
            trace!("rejected i1={} i2={}: positive lobe narrower than {}", i1, i2, n3);
            return None;
        }

        debug!(
            "candidate i0={} i1={} i2={} i3={} i4={} i5={}",
            i0, i1, i2, i3, i4, i5
        );
        Some(PeakCandidate::new(i2, i4, i0.max(i4)))
    }
}
