// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (credential records, keyed by email)
//! - Courses (uploaded media descriptions)

use super::{collections, duplicate_email, validate_user, Database};
use crate::error::AppError;
use crate::models::course::sort_by_creation;
use crate::models::{Course, NewCourse, User};
use crate::time_utils::format_utc_rfc3339_millis;
use async_trait::async_trait;
use firestore::errors::FirestoreError;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a client and verify the database answers.
    pub async fn connect(project_id: &str) -> Result<Self, AppError> {
        let db = Self::new(project_id).await?;
        db.init().await?;
        Ok(db)
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        // The emulator accepts any bearer token.
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }
}

/// Document ID for a user. Emails may contain characters Firestore
/// reserves in IDs, so the address is URL-encoded.
fn user_document_id(email: &str) -> String {
    urlencoding::encode(email).into_owned()
}

#[async_trait]
impl Database for FirestoreDb {
    async fn init(&self) -> Result<(), AppError> {
        // Any read forces the channel open and checks credentials.
        let _: Vec<User> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── User Operations ─────────────────────────────────────────

    async fn find_user_by_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, AppError> {
        let users: Vec<User> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(|q| {
                q.for_all([
                    q.field("email").eq(email),
                    q.field("password").eq(password),
                ])
            })
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(users.into_iter().next())
    }

    async fn create_user(&self, user: &User) -> Result<(), AppError> {
        validate_user(user)?;

        // `insert` fails if the document already exists, which is what
        // enforces email uniqueness.
        let _: User = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::USERS)
            .document_id(user_document_id(&user.email))
            .object(user)
            .execute()
            .await
            .map_err(|e| match e {
                FirestoreError::DataConflictError(_) => duplicate_email(&user.email),
                other => AppError::Database(other.to_string()),
            })?;
        Ok(())
    }

    // ─── Course Operations ───────────────────────────────────────

    async fn insert_course(&self, course: NewCourse) -> Result<Course, AppError> {
        let course = course.into_course(
            uuid::Uuid::new_v4().to_string(),
            format_utc_rfc3339_millis(chrono::Utc::now()),
        );

        let stored: Course = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::COURSES)
            .document_id(&course.id)
            .object(&course)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(stored)
    }

    async fn list_courses(&self) -> Result<Vec<Course>, AppError> {
        // No `order_by`: Firestore would drop documents lacking the field.
        let mut courses: Vec<Course> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::COURSES)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        sort_by_creation(&mut courses);
        Ok(courses)
    }
}
