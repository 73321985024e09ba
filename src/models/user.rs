//! User model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User database model
///
/// Accounts are managed elsewhere; the bank only reads them to check who may
/// own a problem.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub is_staff: bool,
    pub date_joined: DateTime<Utc>,
}

impl User {
    /// Check if the user may upload and own problems
    pub fn can_upload_problems(&self) -> bool {
        self.is_staff
    }
}
