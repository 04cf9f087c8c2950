//! Index lookups on sorted x arrays.
//!
//! Used to turn user supplied peak positions and fit windows into bin
//! indices.

use crate::search::PeakCandidate;

/// Index of the element of `x` closest to `value`.
///
/// Values at or below `x[0]` give 0 and values at or above the last element
/// give the last index. `x` must be sorted and non-empty.
///
/// A value exactly halfway between two elements resolves to the lower of
/// the two, so `nearest_index(&[0.0, 1.0], 0.5)` is 0.
pub fn nearest_index(x: &[f64], value: f64) -> usize {
    let last = x.len().saturating_sub(1);
    if x.is_empty() || value <= x[0] {
        return 0;
    }
    if value >= x[last] {
        return last;
    }

    // first element >= value; 0 < upper <= last
    let upper = x.partition_point(|&v| v < value);
    let lower = upper - 1;
    if value - x[lower] <= x[upper] - value {
        lower
    } else {
        upper
    }
}

/// Largest index in `[lo, hi]` whose element is `<= value`, clamped to the range.
pub fn bounded_lower_bound(x: &[f64], lo: usize, hi: usize, value: f64) -> usize {
    if x.is_empty() {
        return 0;
    }
    let hi = hi.min(x.len() - 1);
    let lo = lo.min(hi);
    if value <= x[lo] {
        return lo;
    }
    if value >= x[hi] {
        return hi;
    }
    lo + x[lo..=hi].partition_point(|&v| v <= value) - 1
}

/// Index of the largest value in `y[left..right]`, or `left` when empty.
pub fn max_height_index(y: &[f64], left: usize, right: usize) -> usize {
    let right = right.min(y.len());
    let mut best = left;
    let mut best_value = f64::NEG_INFINITY;
    for i in left..right {
        if y[i] > best_value {
            best_value = y[i];
            best = i;
        }
    }
    best
}

/// Resolve a user supplied centre, with no explicit window, into a candidate
/// `FWHM` bins wide. `last` is the largest valid index.
pub fn candidate_from_centre(x: &[f64], centre: f64, fwhm: usize, last: usize) -> PeakCandidate {
    let i_centre = nearest_index(x, centre).min(last);
    let left = i_centre.saturating_sub(fwhm / 2);
    let right = (left + fwhm).min(last);
    PeakCandidate::new(left, i_centre, right.max(i_centre))
}

/// Resolve a user supplied centre and window `[left_x, right_x]`.
///
/// The centre index ends up at the largest y inside the window.
pub fn candidate_from_window(
    x: &[f64],
    y: &[f64],
    centre: f64,
    left_x: f64,
    right_x: f64,
    last: usize,
) -> PeakCandidate {
    let i_centre = nearest_index(x, centre).min(last);

    let mut left = bounded_lower_bound(x, 0, last, left_x).min(last);
    if left > i_centre {
        left = i_centre.saturating_sub(1);
    }

    let mut right = bounded_lower_bound(x, 0, last, right_x).min(last);
    if right < i_centre {
        right = (i_centre + 1).min(last);
    }

    let peak = max_height_index(y, left, right).min(last);
    PeakCandidate::new(left, peak, right.max(peak))
}
