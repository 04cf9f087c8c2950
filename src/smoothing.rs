//! Boxcar smoothing.
//!
//! The detector smooths its second-difference signal with several passes of
//! a moving average. The smoother is a trait so another implementation can
//! be plugged in.

use crate::error::{FindPeaksError, Result};

/// A signal smoother.
pub trait Smoother: Send + Sync {
    /// Smooth `signal` with a window of `width` points.
    fn smooth(&self, signal: &[f64], width: usize) -> Result<Vec<f64>>;
}

/// Centred moving average of odd width.
///
/// Near the ends the window is truncated and the average is taken over the
/// points that exist. An even width is widened by one.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoxcarSmoother;

impl Smoother for BoxcarSmoother {
    fn smooth(&self, signal: &[f64], width: usize) -> Result<Vec<f64>> {
        if width == 0 {
            return Err(FindPeaksError::Smoothing(
                "the smoothing window must hold at least one point".to_string(),
            ));
        }
        let half = odd_width(width) / 2;
        if half == 0 {
            return Ok(signal.to_vec());
        }
        let n = signal.len();

        let mut running = Vec::with_capacity(n + 1);
        running.push(0.0);
        for (i, &value) in signal.iter().enumerate() {
            running.push(running[i] + value);
        }

        Ok((0..n)
            .map(|i| {
                let lo = i.saturating_sub(half);
                let hi = (i + half + 1).min(n);
                (running[hi] - running[lo]) / (hi - lo) as f64
            })
            .collect())
    }
}

/// Round a window width up to the next odd number.
pub fn odd_width(width: usize) -> usize {
    if width % 2 == 0 {
        width + 1
    } else {
        width
    }
}

/// Apply `passes` rounds of smoothing in sequence.
pub fn smooth_passes(
    smoother: &dyn Smoother,
    signal: &[f64],
    width: usize,
    passes: usize,
) -> Result<Vec<f64>> {
    let width = odd_width(width);
    let mut smoothed = signal.to_vec();
    for _ in 0..passes {
        smoothed = smoother.smooth(&smoothed, width)?;
    }
    Ok(smoothed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_width_one_is_identity() {
        let signal = vec![3.0, -1.0, 4.0, 1.0, -5.0];
        assert_eq!(smooth_passes(&BoxcarSmoother, &signal, 1, 1).unwrap(), signal);
    }

    #[test]
    fn test_truncated_window_at_edges() {
        let signal = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let smoothed = BoxcarSmoother.smooth(&signal, 3).unwrap();
        assert_relative_eq!(smoothed[0], 1.5);
        assert_relative_eq!(smoothed[2], 3.0);
        assert_relative_eq!(smoothed[4], 4.5);
    }

    #[test]
    fn test_even_width_is_widened() {
        assert_eq!(odd_width(4), 5);
        assert_eq!(odd_width(5), 5);
        let signal = vec![0.0, 0.0, 5.0, 0.0, 0.0];
        let smoothed = BoxcarSmoother.smooth(&signal, 2).unwrap();
        assert_relative_eq!(smoothed[1], 5.0 / 3.0);
    }

    #[test]
    fn test_passes_preserve_constant_signal() {
        let signal = vec![2.5; 12];
        let smoothed = smooth_passes(&BoxcarSmoother, &signal, 5, 5).unwrap();
        for v in smoothed {
            assert_relative_eq!(v, 2.5, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_zero_width_is_an_error() {
        assert!(matches!(
            BoxcarSmoother.smooth(&[1.0], 0),
            Err(FindPeaksError::Smoothing(_))
        ));
    }
}
