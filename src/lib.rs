//! Problem Bank - problem storage with filesystem lifecycle management
//!
//! This library stores problems for the judge and keeps the filesystem state
//! that belongs to each problem consistent with its database row.
//!
//! # Features
//!
//! - Problem records with length, file type and uploader validation
//! - Per-problem testcase directories under `bank/testcases/<problem_id>/`
//! - Uploaded PDF statements under `bank/problem_files/`
//! - Ordered cleanup on delete: problem file, row, testcase directory
//!
//! # Architecture
//!
//! The application follows a layered architecture:
//! - **Services**: Problem lifecycle (`ProblemStore`)
//! - **Repositories**: Database access
//! - **Storage**: Problem files and testcase directories on disk
//! - **Models**: Domain models and payloads

pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod storage;
pub mod utils;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, AppResult};
pub use services::ProblemStore;
pub use state::AppState;
