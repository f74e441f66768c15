// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Course upload pipeline.
//!
//! Reads a multipart form, streams the `thumbnail` and `video` files to the
//! object store as they arrive, and turns the result into a `NewCourse`.
//! Files are written before the form is validated, so a rejected request
//! may leave objects behind in the bucket.

use super::storage::{KeyGenerator, ObjectStore, ObjectUpload};
use crate::error::{AppError, Result};
use crate::models::NewCourse;
use axum::extract::multipart::{Field, Multipart, MultipartError};
use axum::http::StatusCode;
use futures_util::{StreamExt, TryStreamExt};
use std::sync::Arc;

pub const DESCRIPTION_FIELD: &str = "description";
pub const THUMBNAIL_FIELD: &str = "thumbnail";
pub const VIDEO_FIELD: &str = "video";

/// Returned when any of the three inputs is missing.
pub const MISSING_FIELDS_MESSAGE: &str = "All fields are required.";

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A file written to the object store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub key: String,
    pub location: String,
}

/// Everything read from an upload form.
#[derive(Debug, Default)]
pub struct ReceivedUpload {
    pub description: Option<String>,
    pub thumbnail: Option<StoredFile>,
    pub video: Option<StoredFile>,
}

impl ReceivedUpload {
    /// Require a non-empty description and both files.
    pub fn into_new_course(self) -> Result<NewCourse> {
        match (self.description, self.thumbnail, self.video) {
            (Some(description), Some(thumbnail), Some(video)) if !description.is_empty() => {
                Ok(NewCourse {
                    description,
                    thumbnail_url: thumbnail.location,
                    video_url: video.location,
                })
            }
            _ => Err(AppError::BadRequest(MISSING_FIELDS_MESSAGE.to_string())),
        }
    }
}

/// Streams form files into object storage.
pub struct UploadService {
    storage: Arc<dyn ObjectStore>,
    keys: KeyGenerator,
}

impl UploadService {
    pub fn new(storage: Arc<dyn ObjectStore>) -> Self {
        Self {
            storage,
            keys: KeyGenerator::new(),
        }
    }

    /// Consume the form, storing each file part as it is reached.
    ///
    /// Each file field accepts at most one file; a repeated or unknown file
    /// field fails the request. Unknown text fields are ignored.
    pub async fn receive(&self, multipart: &mut Multipart) -> Result<ReceivedUpload> {
        let mut upload = ReceivedUpload::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();

            match field.file_name().map(str::is_empty) {
                // An empty file input: the part is skipped and the field
                // counts as absent.
                Some(true) => continue,
                Some(false) => {}
                None => {
                    if name == DESCRIPTION_FIELD {
                        let text = field.text().await.map_err(multipart_error)?;
                        upload.description = Some(text);
                    }
                    continue;
                }
            }

            let slot = match name.as_str() {
                THUMBNAIL_FIELD => &mut upload.thumbnail,
                VIDEO_FIELD => &mut upload.video,
                _ => return Err(unexpected_field(&name)),
            };
            if slot.is_some() {
                return Err(unexpected_field(&name));
            }
            *slot = Some(self.store_file(&name, field).await?);
        }

        Ok(upload)
    }

    async fn store_file(&self, name: &str, field: Field<'_>) -> Result<StoredFile> {
        let original_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field
            .content_type()
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();
        let key = self.keys.next_key(&original_name);

        let body = field.map_err(std::io::Error::other).boxed();

        let location = self
            .storage
            .put_object(
                ObjectUpload {
                    key: &key,
                    field_name: name,
                    content_type: &content_type,
                },
                body,
            )
            .await?;

        tracing::info!(
            field = name,
            key = %key,
            location = %location,
            "Stored uploaded file"
        );

        Ok(StoredFile { key, location })
    }
}

/// Keep the status the parser reports (413 for an over-limit body).
pub(crate) fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        AppError::BadRequest(err.body_text())
    }
}

fn unexpected_field(name: &str) -> AppError {
    AppError::BadRequest(format!("Unexpected field: {}", name))
}
