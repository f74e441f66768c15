// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process document store.

use super::{duplicate_email, validate_user, Database};
use crate::error::AppError;
use crate::models::{Course, NewCourse, User};
use crate::time_utils::format_utc_rfc3339_millis;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::RwLock;

/// Document store held entirely in memory.
#[derive(Default)]
pub struct MemoryDb {
    /// Users keyed by email
    users: DashMap<String, User>,
    /// Courses in insertion order
    courses: RwLock<Vec<Course>>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored courses.
    pub async fn course_count(&self) -> usize {
        self.courses.read().await.len()
    }
}

#[async_trait]
impl Database for MemoryDb {
    async fn init(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn find_user_by_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .get(email)
            .filter(|user| user.password == password)
            .map(|user| user.value().clone()))
    }

    async fn create_user(&self, user: &User) -> Result<(), AppError> {
        validate_user(user)?;
        match self.users.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(duplicate_email(&user.email)),
            Entry::Vacant(slot) => {
                slot.insert(user.clone());
                Ok(())
            }
        }
    }

    async fn insert_course(&self, course: NewCourse) -> Result<Course, AppError> {
        let course = course.into_course(
            uuid::Uuid::new_v4().to_string(),
            format_utc_rfc3339_millis(chrono::Utc::now()),
        );
        self.courses.write().await.push(course.clone());
        Ok(course)
    }

    async fn list_courses(&self) -> Result<Vec<Course>, AppError> {
        Ok(self.courses.read().await.clone())
    }
}
