//! Problem repository

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    error::AppResult,
    models::{Problem, SaveProblem},
};

/// Row-level access to the `problems` table.
///
/// Implementations only move rows; validation and filesystem side effects
/// belong to `ProblemStore`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProblemRepository: Send + Sync {
    /// Insert a new row; the database assigns `problem_id`
    async fn insert(&self, problem: &SaveProblem) -> AppResult<Problem>;

    /// Overwrite an existing row, `None` if it does not exist
    async fn update(&self, problem_id: i32, problem: &SaveProblem) -> AppResult<Option<Problem>>;

    /// Find problem by ID
    async fn find_by_id(&self, problem_id: i32) -> AppResult<Option<Problem>>;

    /// Delete a row, `false` if nothing was deleted
    async fn delete(&self, problem_id: i32) -> AppResult<bool>;

    /// All problems ordered by `problem_id`
    async fn list(&self) -> AppResult<Vec<Problem>>;

    /// Problems owned by one user ordered by `problem_id`
    async fn list_by_uploader(&self, user_id: i32) -> AppResult<Vec<Problem>>;
}

/// PostgreSQL-backed problem repository
#[derive(Debug, Clone)]
pub struct PgProblemRepository {
    pool: PgPool,
}

impl PgProblemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Count total problems
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM problems"#)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[async_trait]
impl ProblemRepository for PgProblemRepository {
    async fn insert(&self, problem: &SaveProblem) -> AppResult<Problem> {
        let created = sqlx::query_as::<_, Problem>(
            r#"
            INSERT INTO problems (title, statement, problem_file, uploadedby)
            VALUES ($1, $2, $3, $4)
            RETURNING problem_id, title, statement, problem_file, uploadedby
            "#,
        )
        .bind(&problem.title)
        .bind(&problem.statement)
        .bind(problem.problem_file.as_deref())
        .bind(problem.uploadedby)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn update(&self, problem_id: i32, problem: &SaveProblem) -> AppResult<Option<Problem>> {
        let updated = sqlx::query_as::<_, Problem>(
            r#"
            UPDATE problems
            SET
                title = $2,
                statement = $3,
                problem_file = $4,
                uploadedby = $5
            WHERE problem_id = $1
            RETURNING problem_id, title, statement, problem_file, uploadedby
            "#,
        )
        .bind(problem_id)
        .bind(&problem.title)
        .bind(&problem.statement)
        .bind(problem.problem_file.as_deref())
        .bind(problem.uploadedby)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn find_by_id(&self, problem_id: i32) -> AppResult<Option<Problem>> {
        let problem = sqlx::query_as::<_, Problem>(
            r#"
            SELECT problem_id, title, statement, problem_file, uploadedby
            FROM problems
            WHERE problem_id = $1
            "#,
        )
        .bind(problem_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(problem)
    }

    async fn delete(&self, problem_id: i32) -> AppResult<bool> {
        let result = sqlx::query(r#"DELETE FROM problems WHERE problem_id = $1"#)
            .bind(problem_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self) -> AppResult<Vec<Problem>> {
        let problems = sqlx::query_as::<_, Problem>(
            r#"
            SELECT problem_id, title, statement, problem_file, uploadedby
            FROM problems
            ORDER BY problem_id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(problems)
    }

    async fn list_by_uploader(&self, user_id: i32) -> AppResult<Vec<Problem>> {
        let problems = sqlx::query_as::<_, Problem>(
            r#"
            SELECT problem_id, title, statement, problem_file, uploadedby
            FROM problems
            WHERE uploadedby = $1
            ORDER BY problem_id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(problems)
    }
}
