//! User model for storage.

use serde::{Deserialize, Serialize};

/// Account stored in the `users` collection.
///
/// Users are provisioned out of band (see the `create_user` tool) and are
/// only ever read by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Email address, unique across all users (also the document ID)
    pub email: String,
    /// Password, stored and compared verbatim
    pub password: String,
}

impl User {
    /// Both fields are required and must be non-empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.email.is_empty() {
            missing.push("email");
        }
        if self.password.is_empty() {
            missing.push("password");
        }
        missing
    }
}
