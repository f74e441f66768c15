// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use course_uploader::config::Config;
use course_uploader::db::{Database, FirestoreDb, MemoryDb};
use course_uploader::models::User;
use course_uploader::routes::create_router;
use course_uploader::services::storage::{ObjectBody, ObjectUpload};
use course_uploader::services::{ObjectStore, StorageError, UploadService};
use course_uploader::AppState;
use futures_util::TryStreamExt;
use std::sync::{Arc, Mutex};

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Object written to the in-memory store.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct RecordedObject {
    pub key: String,
    pub field_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
    pub location: String,
}

/// Object store that keeps everything in memory.
#[derive(Default)]
pub struct RecordingStore {
    objects: Mutex<Vec<RecordedObject>>,
    /// Fail every write after consuming the body
    fail: bool,
}

impl RecordingStore {
    #[allow(dead_code)]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    #[allow(dead_code)]
    pub fn objects(&self) -> Vec<RecordedObject> {
        self.objects.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for RecordingStore {
    async fn put_object(
        &self,
        object: ObjectUpload<'_>,
        body: ObjectBody<'_>,
    ) -> Result<String, StorageError> {
        let chunks: Vec<_> = body.try_collect().await.map_err(StorageError::Body)?;
        if self.fail {
            return Err(StorageError::S3("bucket unavailable".to_string()));
        }

        let location = format!("https://storage.test/{}", object.key);
        self.objects.lock().unwrap().push(RecordedObject {
            key: object.key.to_string(),
            field_name: object.field_name.to_string(),
            content_type: object.content_type.to_string(),
            data: chunks.concat(),
            location: location.clone(),
        });
        Ok(location)
    }
}

/// Test app and handles to its in-memory backends.
#[allow(dead_code)]
pub struct TestApp {
    pub router: axum::Router,
    pub db: Arc<MemoryDb>,
    pub storage: Arc<RecordingStore>,
}

fn build_state(
    config: Config,
    db: Arc<dyn Database>,
    storage: Arc<dyn ObjectStore>,
) -> Arc<AppState> {
    Arc::new(AppState {
        config,
        db,
        uploads: UploadService::new(storage),
    })
}

/// Create a test app backed by in-memory stores.
#[allow(dead_code)]
pub fn create_test_app() -> TestApp {
    create_test_app_with_storage(RecordingStore::default())
}

/// Create a test app with a specific object store.
#[allow(dead_code)]
pub fn create_test_app_with_storage(storage: RecordingStore) -> TestApp {
    build_test_app(Config::test_default(), storage)
}

/// Create a test app whose `/upload` accepts at most `max_upload_bytes`.
#[allow(dead_code)]
pub fn create_test_app_with_upload_limit(max_upload_bytes: usize) -> TestApp {
    let config = Config {
        max_upload_bytes,
        ..Config::test_default()
    };
    build_test_app(config, RecordingStore::default())
}

fn build_test_app(config: Config, storage: RecordingStore) -> TestApp {
    let db = Arc::new(MemoryDb::new());
    let storage = Arc::new(storage);
    let router = create_router(build_state(config, db.clone(), storage.clone()));
    TestApp {
        router,
        db,
        storage,
    }
}

/// Create a test app whose database is offline; every query fails.
#[allow(dead_code)]
pub fn create_offline_app() -> (axum::Router, Arc<RecordingStore>) {
    let storage = Arc::new(RecordingStore::default());
    let router = create_router(build_state(
        Config::test_default(),
        Arc::new(FirestoreDb::new_mock()),
        storage.clone(),
    ));
    (router, storage)
}

/// Seed a user directly into the store.
#[allow(dead_code)]
pub async fn seed_user(db: &MemoryDb, email: &str, password: &str) {
    db.create_user(&User {
        email: email.to_string(),
        password: password.to_string(),
    })
    .await
    .expect("seed user");
}

// ─── Multipart Bodies ────────────────────────────────────────

pub const BOUNDARY: &str = "----course-uploader-test-boundary";

/// One part of a multipart form.
#[allow(dead_code)]
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        data: &'a [u8],
    },
}

/// Encode parts as a `multipart/form-data` body.
#[allow(dead_code)]
pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)
                        .as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                name,
                file_name,
                content_type,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        name, file_name, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

/// Content-Type header value matching `multipart_body`.
#[allow(dead_code)]
pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={}", BOUNDARY)
}

/// A complete, valid upload form.
#[allow(dead_code)]
pub fn full_upload_parts(description: &str) -> Vec<Part<'_>> {
    vec![
        Part::Text("description", description),
        Part::File {
            name: "thumbnail",
            file_name: "cover.png",
            content_type: "image/png",
            data: b"\x89PNG fake image",
        },
        Part::File {
            name: "video",
            file_name: "lesson.mp4",
            content_type: "video/mp4",
            data: b"fake video bytes",
        },
    ]
}

/// Build a `POST /upload` request from parts.
#[allow(dead_code)]
pub fn upload_request(parts: &[Part<'_>]) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::builder()
        .method("POST")
        .uri("/upload")
        .header(axum::http::header::CONTENT_TYPE, multipart_content_type())
        .body(axum::body::Body::from(multipart_body(parts)))
        .unwrap()
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
