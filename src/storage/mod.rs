//! Filesystem state owned by the problem bank
//!
//! - `file_storage`: blob storage for uploaded problem files.
//! - `testcases`: per-problem testcase directories.

pub mod file_storage;
pub mod testcases;

pub use file_storage::{FileStorage, LocalFileStorage};
pub use testcases::{RemovalStats, TestcaseDirectories};
