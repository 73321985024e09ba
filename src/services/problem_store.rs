//! Problem store
//!
//! Owns the problem lifecycle. Filesystem side effects run as explicit steps
//! around the row mutation:
//!
//! - save: persist the row, then provision `bank/testcases/<problem_id>/`
//! - delete: remove the attached problem file, remove the row, then remove
//!   the testcase directory and everything under it
//!
//! Row and filesystem changes are not atomic. A failed provisioning step
//! after an insert deletes the inserted row again; any other divergence is
//! repaired by [`ProblemStore::reconcile_testcase_dirs`].

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use validator::Validate;

use crate::{
    constants::{ALLOWED_PROBLEM_FILE_EXTENSIONS, PROBLEM_FILES_DIR},
    db::repositories::{ProblemRepository, UserRepository},
    error::{AppError, AppResult},
    models::{Problem, SaveProblem},
    storage::{FileStorage, TestcaseDirectories},
    utils::{get_valid_name, validate_file_extension, validate_problem_file},
};

/// Outcome of a testcase directory reconciliation pass
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileStats {
    /// Problems inspected
    pub checked: usize,
    /// Directories that were missing and got created
    pub created: usize,
    /// Directories on disk with no matching problem (left in place)
    pub orphaned: Vec<i32>,
}

/// Problem persistence plus testcase directory and problem file housekeeping
pub struct ProblemStore {
    problems: Arc<dyn ProblemRepository>,
    users: Arc<dyn UserRepository>,
    files: Arc<dyn FileStorage>,
    testcases: TestcaseDirectories,
}

impl ProblemStore {
    pub fn new(
        problems: Arc<dyn ProblemRepository>,
        users: Arc<dyn UserRepository>,
        files: Arc<dyn FileStorage>,
        testcases: TestcaseDirectories,
    ) -> Self {
        Self {
            problems,
            users,
            files,
            testcases,
        }
    }

    /// Testcase directory layout used by this store
    pub fn testcases(&self) -> &TestcaseDirectories {
        &self.testcases
    }

    /// Insert (`problem_id: None`) or update a problem, then make sure its
    /// testcase directory exists.
    pub async fn create_or_update(&self, payload: SaveProblem) -> AppResult<Problem> {
        self.validate(&payload).await?;

        let (problem, inserted) = match payload.problem_id {
            None => (self.problems.insert(&payload).await?, true),
            Some(problem_id) => {
                let updated = self
                    .problems
                    .update(problem_id, &payload)
                    .await?
                    .ok_or_else(|| problem_not_found(problem_id))?;
                (updated, false)
            }
        };

        if let Err(e) = self.after_save(&problem).await {
            if inserted {
                self.undo_insert(&problem).await;
            }
            return Err(e);
        }

        tracing::info!(
            problem_id = problem.problem_id,
            inserted,
            "Saved problem {}",
            problem
        );

        Ok(problem)
    }

    /// Store an uploaded problem file under `bank/problem_files/` and return
    /// the reference to put in `SaveProblem::problem_file`.
    pub async fn upload_problem_file(&self, filename: &str, contents: &[u8]) -> AppResult<String> {
        let name = get_valid_name(filename).map_err(|e| AppError::Validation(e.to_string()))?;
        validate_file_extension(&name, ALLOWED_PROBLEM_FILE_EXTENSIONS)
            .map_err(|_| AppError::Validation("Problem file must be a PDF".to_string()))?;

        let path = format!("{}/{}", PROBLEM_FILES_DIR, name);
        validate_problem_file(&path).map_err(|e| AppError::Validation(e.to_string()))?;

        let stored = self.files.save(contents, &path).await?;

        // A collision suffix can push the reference past the column width
        if let Err(e) = validate_problem_file(&stored) {
            self.files.delete(&stored).await?;
            return Err(AppError::Validation(e.to_string()));
        }

        tracing::info!(path = %stored, bytes = contents.len(), "Uploaded problem file");
        Ok(stored)
    }

    /// Get problem by ID
    pub async fn get(&self, problem_id: i32) -> AppResult<Problem> {
        self.problems
            .find_by_id(problem_id)
            .await?
            .ok_or_else(|| problem_not_found(problem_id))
    }

    /// All problems ascending by `problem_id`
    pub async fn list(&self) -> AppResult<Vec<Problem>> {
        self.problems.list().await
    }

    /// Problems owned by `user_id` ascending by `problem_id`
    pub async fn list_by_uploader(&self, user_id: i32) -> AppResult<Vec<Problem>> {
        self.problems.list_by_uploader(user_id).await
    }

    /// Delete a problem together with its problem file and testcase directory.
    ///
    /// A missing problem fails with `NotFound` before anything is touched.
    pub async fn delete(&self, problem_id: i32) -> AppResult<()> {
        let problem = self.get(problem_id).await?;
        self.delete_loaded(&problem).await
    }

    /// Run the full delete pipeline for every problem owned by `user_id`.
    ///
    /// Must run before the user row is removed: the database cascade alone
    /// would leave problem files and testcase directories behind.
    pub async fn delete_by_uploader(&self, user_id: i32) -> AppResult<usize> {
        let owned = self.problems.list_by_uploader(user_id).await?;

        for problem in &owned {
            self.delete_loaded(problem).await?;
        }

        tracing::info!(user_id, deleted = owned.len(), "Deleted problems of uploader");
        Ok(owned.len())
    }

    /// Provision missing testcase directories for every stored problem and
    /// report directories that have no problem.
    pub async fn reconcile_testcase_dirs(&self) -> AppResult<ReconcileStats> {
        let problems = self.problems.list().await?;
        let mut stats = ReconcileStats {
            checked: problems.len(),
            ..Default::default()
        };

        for problem in &problems {
            if self.testcases.ensure(problem.problem_id).await? {
                tracing::warn!(
                    problem_id = problem.problem_id,
                    "Recreated missing testcase directory"
                );
                stats.created += 1;
            }
        }

        let known: BTreeSet<i32> = problems.iter().map(|p| p.problem_id).collect();
        for problem_id in self.testcases.problem_ids_on_disk().await? {
            if !known.contains(&problem_id) {
                tracing::warn!(problem_id, "Testcase directory has no problem");
                stats.orphaned.push(problem_id);
            }
        }

        tracing::info!(
            checked = stats.checked,
            created = stats.created,
            orphaned = stats.orphaned.len(),
            "Testcase directory reconciliation complete"
        );

        Ok(stats)
    }

    async fn validate(&self, payload: &SaveProblem) -> AppResult<()> {
        payload.validate()?;

        if let Some(path) = payload.problem_file.as_deref() {
            validate_problem_file(path).map_err(|e| AppError::Validation(e.to_string()))?;
        }

        match self.users.find_by_id(payload.uploadedby).await? {
            Some(user) if user.can_upload_problems() => Ok(()),
            Some(user) => Err(AppError::Validation(format!(
                "User {} is not allowed to upload problems",
                user.username
            ))),
            None => Err(AppError::Validation(format!(
                "Uploader {} does not exist",
                payload.uploadedby
            ))),
        }
    }

    async fn delete_loaded(&self, problem: &Problem) -> AppResult<()> {
        let problem_id = problem.problem_id;

        self.before_delete(problem).await?;

        if !self.problems.delete(problem_id).await? {
            tracing::warn!(problem_id, "Problem row was already removed");
        }

        self.after_delete(problem).await?;

        tracing::info!(problem_id, "Deleted problem {}", problem);
        Ok(())
    }

    async fn after_save(&self, problem: &Problem) -> AppResult<()> {
        self.testcases.ensure(problem.problem_id).await?;
        Ok(())
    }

    async fn before_delete(&self, problem: &Problem) -> AppResult<()> {
        if !problem.has_problem_file() {
            return Ok(());
        }
        let path = problem.problem_file.as_deref().unwrap_or_default();

        if !self.files.exists(path).await? {
            tracing::warn!(
                problem_id = problem.problem_id,
                path = %path,
                "Problem file already missing from storage"
            );
            return Ok(());
        }

        self.files.delete(path).await?;
        tracing::debug!(problem_id = problem.problem_id, path = %path, "Removed problem file");
        Ok(())
    }

    async fn after_delete(&self, problem: &Problem) -> AppResult<()> {
        match self.testcases.remove(problem.problem_id).await {
            Ok(stats) => {
                tracing::debug!(
                    problem_id = problem.problem_id,
                    files = stats.files_deleted,
                    bytes = stats.bytes_freed,
                    "Removed testcase directory"
                );
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    problem_id = problem.problem_id,
                    error = %e,
                    "Problem row deleted but testcase directory removal failed"
                );
                Err(e)
            }
        }
    }

    async fn undo_insert(&self, problem: &Problem) {
        match self.problems.delete(problem.problem_id).await {
            Ok(_) => tracing::warn!(
                problem_id = problem.problem_id,
                "Rolled back problem insert after provisioning failure"
            ),
            Err(e) => tracing::error!(
                problem_id = problem.problem_id,
                error = %e,
                "Failed to roll back problem insert"
            ),
        }
    }
}

fn problem_not_found(problem_id: i32) -> AppError {
    AppError::NotFound(format!("Problem {} not found", problem_id))
}
