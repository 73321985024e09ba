//! Application-wide constants
//!
//! This module contains all constant values used throughout the application.
//! Constants are grouped by their purpose for better organization.

// =============================================================================
// DATABASE DEFAULTS
// =============================================================================

/// Default maximum database connections in the pool
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 20;

// =============================================================================
// STORAGE LAYOUT
// =============================================================================

/// Default root for the bank directory tree (process working directory)
pub const DEFAULT_BANK_ROOT: &str = ".";

/// Default root for uploaded problem files
pub const DEFAULT_MEDIA_ROOT: &str = ".";

/// Testcase directories live at `<bank_root>/bank/testcases/<problem_id>/`
pub const TESTCASES_DIR: &str = "bank/testcases";

/// Uploaded problem files live at `<media_root>/bank/problem_files/<filename>`
pub const PROBLEM_FILES_DIR: &str = "bank/problem_files";

/// Length of the random suffix appended when a stored filename is taken
pub const AVAILABLE_NAME_SUFFIX_LENGTH: usize = 7;

// =============================================================================
// VALIDATION
// =============================================================================

/// Maximum problem title length (characters)
pub const MAX_PROBLEM_TITLE_LENGTH: u64 = 50;

/// Maximum problem statement length (characters)
pub const MAX_PROBLEM_STATEMENT_LENGTH: u64 = 3000;

/// Maximum length of a stored problem file reference
pub const MAX_PROBLEM_FILE_PATH_LENGTH: u64 = 100;

/// Extensions accepted for uploaded problem files (compared lowercase)
pub const ALLOWED_PROBLEM_FILE_EXTENSIONS: &[&str] = &["pdf"];
