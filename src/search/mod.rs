//! Automatic peak search.
//!
//! The second difference of a spectrum is smoothed, its statistical error is
//! propagated through the smoothing, and the [`MariscottiDetector`] scans the
//! result for the sign pattern a peak leaves behind.

pub mod mariscotti;
pub mod second_difference;
pub mod variance;

pub use mariscotti::MariscottiDetector;
pub use second_difference::second_difference;
pub use variance::{compute_phi, smoothed_error, SMOOTHING_PASSES};

/// Bin indices of a tentative peak: the window `[left, right]` and the
/// index of its centre.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeakCandidate {
    pub left: usize,
    pub centre: usize,
    pub right: usize,
}

impl PeakCandidate {
    pub fn new(left: usize, centre: usize, right: usize) -> Self {
        Self { left, centre, right }
    }
}
