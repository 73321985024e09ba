//! Test utilities
//!
//! In-memory repositories and a `ProblemStore` wired to a temporary bank root,
//! so lifecycle tests run without a database.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use tempfile::TempDir;

use crate::{
    db::repositories::{ProblemRepository, UserRepository},
    error::AppResult,
    models::{Problem, SaveProblem, User},
    services::ProblemStore,
    storage::{LocalFileStorage, TestcaseDirectories},
};

/// Staff account allowed to own problems
pub fn staff_user(id: i32) -> User {
    User {
        id,
        username: format!("setter{}", id),
        is_staff: true,
        date_joined: Utc::now(),
    }
}

/// Regular account without upload rights
pub fn student_user(id: i32) -> User {
    User {
        is_staff: false,
        username: format!("student{}", id),
        ..staff_user(id)
    }
}

/// `problems` table stand-in with SERIAL-style id assignment
#[derive(Default)]
pub struct InMemoryProblemRepository {
    rows: Mutex<(i32, BTreeMap<i32, Problem>)>,
}

#[async_trait]
impl ProblemRepository for InMemoryProblemRepository {
    async fn insert(&self, problem: &SaveProblem) -> AppResult<Problem> {
        let mut guard = self.rows.lock().unwrap();
        let (last_id, rows) = &mut *guard;
        *last_id += 1;

        let created = Problem {
            problem_id: *last_id,
            title: problem.title.clone(),
            statement: problem.statement.clone(),
            problem_file: problem.problem_file.clone(),
            uploadedby: problem.uploadedby,
        };
        rows.insert(created.problem_id, created.clone());
        Ok(created)
    }

    async fn update(&self, problem_id: i32, problem: &SaveProblem) -> AppResult<Option<Problem>> {
        let mut guard = self.rows.lock().unwrap();
        let Some(row) = guard.1.get_mut(&problem_id) else {
            return Ok(None);
        };

        row.title = problem.title.clone();
        row.statement = problem.statement.clone();
        row.problem_file = problem.problem_file.clone();
        row.uploadedby = problem.uploadedby;
        Ok(Some(row.clone()))
    }

    async fn find_by_id(&self, problem_id: i32) -> AppResult<Option<Problem>> {
        Ok(self.rows.lock().unwrap().1.get(&problem_id).cloned())
    }

    async fn delete(&self, problem_id: i32) -> AppResult<bool> {
        Ok(self.rows.lock().unwrap().1.remove(&problem_id).is_some())
    }

    async fn list(&self) -> AppResult<Vec<Problem>> {
        Ok(self.rows.lock().unwrap().1.values().cloned().collect())
    }

    async fn list_by_uploader(&self, user_id: i32) -> AppResult<Vec<Problem>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .1
            .values()
            .filter(|p| p.uploadedby == user_id)
            .cloned()
            .collect())
    }
}

/// `users` table stand-in
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<BTreeMap<i32, User>>,
}

impl InMemoryUserRepository {
    pub fn insert(&self, user: User) {
        self.users.lock().unwrap().insert(user.id, user);
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<User>> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }
}

/// `ProblemStore` over in-memory tables and a temporary bank root.
///
/// User 1 is a staff account.
pub struct StoreFixture {
    pub store: ProblemStore,
    pub users: Arc<InMemoryUserRepository>,
    temp: TempDir,
}

impl StoreFixture {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let users = Arc::new(InMemoryUserRepository::default());
        users.insert(staff_user(1));

        let store = ProblemStore::new(
            Arc::new(InMemoryProblemRepository::default()),
            users.clone(),
            Arc::new(LocalFileStorage::new(temp.path())),
            TestcaseDirectories::new(temp.path()),
        );

        Self { store, users, temp }
    }

    /// Bank and media root
    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn testcase_dir(&self, problem_id: i32) -> PathBuf {
        self.store.testcases().path_for(problem_id)
    }
}
