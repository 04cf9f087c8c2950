//! Integration tests for the findpeaks-rs library
//!
//! These run whole searches through `FindPeaks`, rather than individual
//! components.

// Peaks at user supplied positions
pub mod given_peaks;

// Automatic search
pub mod peak_search;

// Seeded noisy data
pub mod noisy_data;
