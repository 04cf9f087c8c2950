//! Levenberg-Marquardt algorithm implementation.
//!
//! This module provides the damped least-squares minimizer that backs the
//! fit service. It works on any [`Problem`](crate::problem::Problem).

pub mod algorithm;
pub mod config;

pub use algorithm::{LevenbergMarquardt, LmResult, LmTermination};
pub use config::{DiffMethod, LmConfig};
