//! Peak statistics from a background-free signal.

use crate::error::{FindPeaksError, Result};

/// Rough centre, height and FWHM of the dominant peak in a signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakEstimate {
    pub centre: f64,
    pub height: f64,
    pub fwhm: f64,
}

/// Estimate the tallest peak of `y` over the positions `x`.
///
/// The height is the maximum of `y`; the FWHM is the distance between the
/// first samples on either side that drop to half of it. Without two
/// crossings the FWHM falls back to a fifth of the x range.
pub fn estimate_peak(x: &[f64], y: &[f64]) -> Result<PeakEstimate> {
    if x.len() != y.len() || x.is_empty() {
        return Err(FindPeaksError::DimensionMismatch(
            "x and y must have the same non-zero length".to_string(),
        ));
    }

    let (max_idx, max_y) = y
        .iter()
        .copied()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (i, v)| if v > best.1 { (i, v) } else { best });

    let half_height = max_y / 2.0;

    let mut left_idx = max_idx;
    while left_idx > 0 && y[left_idx] > half_height {
        left_idx -= 1;
    }

    let mut right_idx = max_idx;
    while right_idx < y.len() - 1 && y[right_idx] > half_height {
        right_idx += 1;
    }

    let fwhm = if left_idx < right_idx {
        (x[right_idx] - x[left_idx]).abs()
    } else {
        (x[x.len() - 1] - x[0]).abs() / 5.0
    };

    Ok(PeakEstimate {
        centre: x[max_idx],
        height: max_y,
        fwhm,
    })
}
