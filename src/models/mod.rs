//! Built-in fit functions.
//!
//! Peak shapes and polynomial backgrounds are plain tagged variants resolved
//! by name. A [`CompositeFunction`] adds an optional peak to a background and
//! is the function handed to the fit service.

mod background;
mod composite;
mod peak;

pub use background::{BackgroundFunction, BackgroundType};
pub use composite::CompositeFunction;
pub use peak::{PeakFunction, PeakShape, GAUSSIAN_FWHM_PER_SIGMA};

use crate::error::Result;

/// Create a peak function by registered name, e.g. `"Gaussian"`.
pub fn create_peak(name: &str) -> Result<PeakFunction> {
    PeakFunction::from_name(name)
}

/// Create a zeroed background function by registered name, e.g. `"Linear"`.
pub fn create_background(name: &str) -> Result<BackgroundFunction> {
    Ok(BackgroundFunction::new(name.parse()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Model;

    #[test]
    fn test_factories() {
        assert_eq!(create_peak("Lorentzian").unwrap().shape(), PeakShape::Lorentzian);
        assert_eq!(create_background("Quadratic").unwrap().parameter_count(), 3);
        assert!(create_peak("BackToBackExponential").is_err());
        assert!(create_background("Cubic").is_err());
    }
}
