//! Statistical error of the smoothed second difference.
//!
//! Smoothing the second difference `z` times with a boxcar of width `w` is
//! a linear filter whose integer coefficients come from convolving the
//! kernel `[1, -2, 1]` with a box of `w` ones, `z` times. The sum of their
//! squares, phi, propagates the raw uncertainty through the filter.

use crate::error::{FindPeaksError, Result};

/// Number of smoothing passes the detector's width criteria were derived for.
pub const SMOOTHING_PASSES: usize = 5;

/// Sum of squared filter coefficients for `z` passes of width `w`.
///
/// `compute_phi(w, 0)` is 6 for any `w`. Only `z = 5` matches the detector's
/// width criteria. Large windows or many passes overflow the 64-bit
/// accumulator and return [`FindPeaksError::NumericOverflow`].
pub fn compute_phi(w: usize, z: usize) -> Result<i64> {
    let m = (w.max(1) - 1) / 2;
    let overflow = || FindPeaksError::NumericOverflow(format!("phi for w = {}, z = {}", w, z));

    let mut coefficients: Vec<i64> = vec![1, -2, 1];
    for _ in 0..z {
        let n = coefficients.len() + 2 * m;
        let mut next = vec![0_i64; n];
        for (i, &c) in coefficients.iter().enumerate() {
            for slot in &mut next[i..=i + 2 * m] {
                *slot = slot.checked_add(c).ok_or_else(overflow)?;
            }
        }
        coefficients = next;
    }

    coefficients.iter().try_fold(0_i64, |acc, &c| {
        c.checked_mul(c)
            .and_then(|sq| acc.checked_add(sq))
            .ok_or_else(overflow)
    })
}

/// Error of each smoothed bin: `sqrt(phi) / w^z · e_raw`.
pub fn smoothed_error(e_raw: &[f64], w: usize, z: usize) -> Result<Vec<f64>> {
    let phi = compute_phi(w, z)?;
    let factor = (phi as f64).sqrt() / (w as f64).powi(z as i32);
    Ok(e_raw.iter().map(|e| factor * e).collect())
}
