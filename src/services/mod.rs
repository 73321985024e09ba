//! Business logic services
//!
//! Services coordinate repositories and filesystem state.

pub mod problem_store;

pub use problem_store::{ProblemStore, ReconcileStats};
