//! # Parameter System
//!
//! Named, ordered parameters for fit functions.
//!
//! - [`Parameter`]: an individual parameter with a value and a vary/fixed flag
//! - [`Parameters`]: an ordered collection, mapped to and from the flat vector
//!   of varying values that the minimizer works on
//!
//! ## Example Usage
//!
//! ```rust
//! use findpeaks_rs::parameters::Parameters;
//!
//! let mut params = Parameters::new();
//! params.add_param("A0", 10.0).unwrap();
//! params.add_param("A1", 0.5).unwrap();
//!
//! // Fix a parameter (won't be varied during optimization)
//! params.get_mut("A1").unwrap().set_vary(false);
//!
//! assert_eq!(params.varying_values(), vec![10.0]);
//! ```

pub mod parameter;
pub mod parameters;

// Re-export key types
pub use parameter::Parameter;
pub use parameters::Parameters;
