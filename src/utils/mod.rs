//! Utility functions and helpers for the findpeaks-rs library.

pub mod finite_difference;
