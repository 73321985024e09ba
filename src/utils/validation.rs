//! Input validation utilities

use std::path::Path;

use crate::constants::{ALLOWED_PROBLEM_FILE_EXTENSIONS, MAX_PROBLEM_FILE_PATH_LENGTH};

/// Check that `filename` ends in one of `allowed` (case-insensitive)
pub fn validate_file_extension(filename: &str, allowed: &[&str]) -> Result<(), &'static str> {
    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    if allowed.contains(&extension.as_str()) {
        Ok(())
    } else {
        Err("File extension is not allowed")
    }
}

/// Validate a stored problem file reference
pub fn validate_problem_file(path: &str) -> Result<(), &'static str> {
    if path.trim().is_empty() {
        return Err("Problem file path cannot be empty");
    }
    if path.chars().count() as u64 > MAX_PROBLEM_FILE_PATH_LENGTH {
        return Err("Problem file path must be at most 100 characters");
    }
    if path.starts_with('/') || path.split(['/', '\\']).any(|segment| segment == "..") {
        return Err("Problem file path must be relative to the storage root");
    }
    validate_file_extension(path, ALLOWED_PROBLEM_FILE_EXTENSIONS)
        .map_err(|_| "Problem file must be a PDF")
}
