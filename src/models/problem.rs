//! Problem model

use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::constants::{MAX_PROBLEM_STATEMENT_LENGTH, MAX_PROBLEM_TITLE_LENGTH};

/// Problem database model
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Problem {
    pub problem_id: i32,
    pub title: String,
    pub statement: String,
    /// Storage-relative path, e.g. `bank/problem_files/two_sum.pdf`
    pub problem_file: Option<String>,
    /// Owning staff user ("problem-setter")
    pub uploadedby: i32,
}

impl Problem {
    /// Whether a problem file is attached
    pub fn has_problem_file(&self) -> bool {
        self.problem_file
            .as_deref()
            .is_some_and(|path| !path.is_empty())
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.problem_id, self.title)
    }
}

/// Insert-or-update payload for a problem
///
/// `problem_id: None` inserts a new row and lets the database assign the id.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SaveProblem {
    pub problem_id: Option<i32>,

    #[validate(length(max = MAX_PROBLEM_TITLE_LENGTH))]
    pub title: String,

    #[validate(length(max = MAX_PROBLEM_STATEMENT_LENGTH))]
    pub statement: String,

    /// Reference returned by `ProblemStore::upload_problem_file`
    pub problem_file: Option<String>,

    pub uploadedby: i32,
}

impl SaveProblem {
    /// Payload for a new problem
    pub fn new(title: impl Into<String>, statement: impl Into<String>, uploadedby: i32) -> Self {
        Self {
            problem_id: None,
            title: title.into(),
            statement: statement.into(),
            problem_file: None,
            uploadedby,
        }
    }

    /// Attach a stored problem file reference
    pub fn with_problem_file(mut self, path: impl Into<String>) -> Self {
        self.problem_file = Some(path.into());
        self
    }

    /// Payload that rewrites an existing problem
    pub fn from_existing(problem: &Problem) -> Self {
        Self {
            problem_id: Some(problem.problem_id),
            title: problem.title.clone(),
            statement: problem.statement.clone(),
            problem_file: problem.problem_file.clone(),
            uploadedby: problem.uploadedby,
        }
    }
}
