//! Database layer.
//!
//! `FirestoreDb` is the production document store; `MemoryDb` keeps the same
//! semantics in process for tests and local development.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryDb;

use crate::error::AppError;
use crate::models::{Course, NewCourse, User};
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const COURSES: &str = "courses";
}

/// Record storage used by the request handlers.
#[async_trait]
pub trait Database: Send + Sync {
    /// Verify the store is reachable. Run once at startup; safe to repeat.
    async fn init(&self) -> Result<(), AppError>;

    /// Find the user whose email and password both match exactly.
    async fn find_user_by_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, AppError>;

    /// Create a user. Fails with `Conflict` if the email is already taken.
    async fn create_user(&self, user: &User) -> Result<(), AppError>;

    /// Persist a new course and return the stored record.
    async fn insert_course(&self, course: NewCourse) -> Result<Course, AppError>;

    /// All courses in insertion order.
    async fn list_courses(&self) -> Result<Vec<Course>, AppError>;
}

/// Reject users missing a required field.
pub(crate) fn validate_user(user: &User) -> Result<(), AppError> {
    let missing = user.missing_fields();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "Missing required field(s): {}",
            missing.join(", ")
        )))
    }
}

pub(crate) fn duplicate_email(email: &str) -> AppError {
    AppError::Conflict(format!("User with email {} already exists", email))
}
