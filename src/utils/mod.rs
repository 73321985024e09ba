//! Utility functions

pub mod filename;
pub mod validation;

pub use filename::{get_available_name, get_valid_name};
pub use validation::{validate_file_extension, validate_problem_file};
