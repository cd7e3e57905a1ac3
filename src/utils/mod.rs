//! Utility functions
//!
//! Provides logging and validation utilities.

pub mod logging;
pub mod validation;

pub use validation::is_valid_name;
