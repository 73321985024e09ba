//! Database repositories
//!
//! Repositories handle all direct database interactions.

pub mod problem_repo;
pub mod user_repo;

pub use problem_repo::{PgProblemRepository, ProblemRepository};
pub use user_repo::{PgUserRepository, UserRepository};

#[cfg(test)]
pub use problem_repo::MockProblemRepository;
#[cfg(test)]
pub use user_repo::MockUserRepository;
