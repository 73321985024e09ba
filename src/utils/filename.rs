//! Upload filename normalization

use std::sync::LazyLock;

use rand::{Rng, distr::Alphanumeric};
use regex::Regex;

use crate::constants::AVAILABLE_NAME_SUFFIX_LENGTH;

static INVALID_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^-\w.]").expect("invalid filename pattern"));

/// Turn a client-supplied filename into a safe flat storage name.
///
/// Only the final path component is kept, surrounding whitespace is trimmed,
/// inner spaces become underscores and anything outside `[-\w.]` is dropped.
pub fn get_valid_name(filename: &str) -> Result<String, &'static str> {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim()
        .replace(' ', "_");
    let cleaned = INVALID_FILENAME_CHARS.replace_all(&base, "").into_owned();

    match cleaned.as_str() {
        "" | "." | ".." => Err("Could not derive a valid filename"),
        _ => Ok(cleaned),
    }
}

/// Build an alternative name for `filename` with a random suffix on the stem.
///
/// `spec.pdf` becomes e.g. `spec_a1B2c3D.pdf`.
pub fn get_available_name(filename: &str) -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(AVAILABLE_NAME_SUFFIX_LENGTH)
        .map(char::from)
        .collect();

    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}_{suffix}.{ext}"),
        _ => format!("{filename}_{suffix}"),
    }
}
