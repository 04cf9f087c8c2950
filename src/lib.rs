//! # findpeaks-rs
//!
//! `findpeaks-rs` locates peaks in 1-D spectra and fits each one with a peak
//! shape on top of a polynomial background.
//!
//! The library provides:
//! - Mariscotti's smoothed second-difference peak search
//! - Peak fitting at given positions, optionally inside given windows
//! - A width sweep of Levenberg-Marquardt fits per peak, keeping the best
//! - A three-phase fit for peaks sitting on a strong background
//! - A result table with effective or raw parameters and chi-squared
//!
//! ## Basic Usage
//!
//! ```
//! use findpeaks_rs::{FindPeaks, FindPeaksConfig, Spectrum, Workspace2D};
//!
//! let x: Vec<f64> = (0..200).map(|i| i as f64).collect();
//! let y: Vec<f64> = x
//!     .iter()
//!     .map(|&x| 100.0 + 1000.0 * (-0.5 * ((x - 60.0) / 2.97).powi(2)).exp())
//!     .collect();
//! let workspace = Workspace2D::from_spectrum(Spectrum::with_counting_errors(x, y).unwrap());
//!
//! let finder = FindPeaks::new(FindPeaksConfig::new().with_fwhm(7)).unwrap();
//! let table = finder.execute(&workspace).unwrap();
//! for row in table.good_rows() {
//!     println!("peak at {} with height {}", row.effective.centre, row.effective.height);
//! }
//! ```

pub mod config;
pub mod error;
pub mod find_peaks;
pub mod fit;
pub mod fitting;
pub mod lm;
pub mod locator;
pub mod model;
pub mod models;
pub mod parameters;
pub mod problem;
pub mod search;
pub mod smoothing;
pub mod table;
mod utils;
pub mod workspace;

// Re-exports for convenience
pub use config::FindPeaksConfig;
pub use error::{FindPeaksError, Result};
pub use find_peaks::FindPeaks;
pub use fit::{FitService, FitStatus, LeastSquaresFit};
pub use models::{BackgroundType, PeakShape};
pub use search::{MariscottiDetector, PeakCandidate};
pub use table::{EffectiveParameters, ParameterLayout, PeakRow, PeakTable};
pub use workspace::{Spectrum, SpectrumStore, Workspace2D};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
