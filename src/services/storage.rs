// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Object storage for uploaded media.
//!
//! Uploads are streamed to S3 with public-read access. Bodies that fit in a
//! single part go out as one `PutObject`; larger bodies use a multipart
//! upload so nothing larger than one part is ever buffered.

use crate::config::Config;
use crate::error::AppError;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart, ObjectCannedAcl};
use aws_sdk_s3::Client;
use axum::body::Bytes;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use chrono::Utc;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use std::sync::atomic::{AtomicI64, Ordering};

/// Size of each multipart part. S3 requires at least 5 MiB for all but the last.
const PART_SIZE: usize = 8 * 1024 * 1024;

/// Streamed object contents.
pub type ObjectBody<'a> = BoxStream<'a, Result<Bytes, std::io::Error>>;

/// Metadata for an object about to be written.
#[derive(Debug, Clone, Copy)]
pub struct ObjectUpload<'a> {
    pub key: &'a str,
    /// Form field the file arrived under
    pub field_name: &'a str,
    pub content_type: &'a str,
}

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to read upload body: {0}")]
    Body(#[source] std::io::Error),

    #[error("S3 request failed: {0}")]
    S3(String),
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match &err {
            StorageError::Body(io) => {
                // Multipart parse failures travel inside the io::Error.
                match io
                    .get_ref()
                    .and_then(|inner| inner.downcast_ref::<MultipartError>())
                {
                    Some(multipart) if multipart.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                        AppError::PayloadTooLarge
                    }
                    _ => AppError::BadRequest(err.to_string()),
                }
            }
            StorageError::S3(_) => AppError::Storage(err.to_string()),
        }
    }
}

fn s3_error<E: std::error::Error>(err: E) -> StorageError {
    StorageError::S3(DisplayErrorContext(err).to_string())
}

/// Blob store receiving uploaded files.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write an object and return its public location.
    async fn put_object(
        &self,
        object: ObjectUpload<'_>,
        body: ObjectBody<'_>,
    ) -> Result<String, StorageError>;
}

// ─── Key Generation ──────────────────────────────────────────

/// Produces storage keys of the form `<unix millis><extension>`.
///
/// The timestamp is strictly increasing within a process, so files handled
/// in the same millisecond still get distinct keys.
#[derive(Debug, Default)]
pub struct KeyGenerator {
    last_millis: AtomicI64,
}

impl KeyGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key for a file originally named `original_name`.
    pub fn next_key(&self, original_name: &str) -> String {
        format!("{}{}", self.next_timestamp(), extension(original_name))
    }

    fn next_timestamp(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        match self
            .last_millis
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            }) {
            Ok(prev) | Err(prev) => now.max(prev + 1),
        }
    }
}

/// Extension of a file name including the leading dot.
///
/// Empty when the base name has no dot or only a leading one (`.bashrc`).
pub fn extension(file_name: &str) -> &str {
    let base = file_name.rsplit('/').next().unwrap_or(file_name);
    if base.trim_start_matches('.').is_empty() {
        return "";
    }
    match base.rfind('.') {
        None | Some(0) => "",
        Some(idx) => &base[idx..],
    }
}

// ─── S3 ──────────────────────────────────────────────────────

/// Where objects go and how their public URLs are formed.
#[derive(Debug, Clone)]
pub struct S3Settings {
    pub bucket: String,
    pub region: String,
    pub endpoint_url: Option<String>,
    pub public_base_url: Option<String>,
}

impl S3Settings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            bucket: config.s3_bucket_name.clone(),
            region: config.aws_region.clone(),
            endpoint_url: config.s3_endpoint_url.clone(),
            public_base_url: config.s3_public_base_url.clone(),
        }
    }

    /// Public URL of an object.
    pub fn object_url(&self, key: &str) -> String {
        let key = urlencoding::encode(key);
        if let Some(base) = &self.public_base_url {
            format!("{}/{}", base.trim_end_matches('/'), key)
        } else if let Some(endpoint) = &self.endpoint_url {
            format!("{}/{}/{}", endpoint.trim_end_matches('/'), self.bucket, key)
        } else {
            format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, key
            )
        }
    }
}

/// S3-backed object store.
#[derive(Clone)]
pub struct S3Storage {
    client: Client,
    settings: S3Settings,
}

impl S3Storage {
    /// Build a client from configuration.
    ///
    /// Static credentials are used when both halves are configured;
    /// otherwise the default AWS provider chain applies.
    pub async fn new(config: &Config) -> Self {
        let settings = S3Settings::from_config(config);

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()));
        if let (Some(key_id), Some(secret)) =
            (&config.aws_access_key_id, &config.aws_secret_access_key)
        {
            loader = loader.credentials_provider(Credentials::new(
                key_id.clone(),
                secret.clone(),
                None,
                None,
                "environment",
            ));
        }
        let sdk_config = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(endpoint) = &settings.endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        tracing::info!(
            bucket = %settings.bucket,
            region = %settings.region,
            "S3 storage initialized"
        );

        Self {
            client: Client::from_conf(builder.build()),
            settings,
        }
    }

    async fn put_single(&self, object: ObjectUpload<'_>, data: Vec<u8>) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(&self.settings.bucket)
            .key(object.key)
            .acl(ObjectCannedAcl::PublicRead)
            .content_type(object.content_type)
            .metadata("fieldName", object.field_name)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(s3_error)?;
        Ok(())
    }

    async fn put_multipart(
        &self,
        object: ObjectUpload<'_>,
        first: Vec<u8>,
        body: &mut ObjectBody<'_>,
    ) -> Result<(), StorageError> {
        let created = self
            .client
            .create_multipart_upload()
            .bucket(&self.settings.bucket)
            .key(object.key)
            .acl(ObjectCannedAcl::PublicRead)
            .content_type(object.content_type)
            .metadata("fieldName", object.field_name)
            .send()
            .await
            .map_err(s3_error)?;
        let upload_id = created
            .upload_id()
            .ok_or_else(|| StorageError::S3("No upload ID in multipart response".to_string()))?
            .to_string();

        match self.upload_parts(object.key, &upload_id, first, body).await {
            Ok(parts) => {
                self.client
                    .complete_multipart_upload()
                    .bucket(&self.settings.bucket)
                    .key(object.key)
                    .upload_id(&upload_id)
                    .multipart_upload(
                        CompletedMultipartUpload::builder()
                            .set_parts(Some(parts))
                            .build(),
                    )
                    .send()
                    .await
                    .map_err(s3_error)?;
                Ok(())
            }
            Err(err) => {
                if let Err(abort_err) = self
                    .client
                    .abort_multipart_upload()
                    .bucket(&self.settings.bucket)
                    .key(object.key)
                    .upload_id(&upload_id)
                    .send()
                    .await
                {
                    tracing::warn!(
                        key = object.key,
                        error = %DisplayErrorContext(abort_err),
                        "Failed to abort multipart upload"
                    );
                }
                Err(err)
            }
        }
    }

    async fn upload_parts(
        &self,
        key: &str,
        upload_id: &str,
        first: Vec<u8>,
        body: &mut ObjectBody<'_>,
    ) -> Result<Vec<CompletedPart>, StorageError> {
        let mut parts = Vec::new();
        let mut next = Some(first);
        let mut part_number = 1;

        while let Some(data) = next.take() {
            let uploaded = self
                .client
                .upload_part()
                .bucket(&self.settings.bucket)
                .key(key)
                .upload_id(upload_id)
                .part_number(part_number)
                .body(ByteStream::from(data))
                .send()
                .await
                .map_err(s3_error)?;

            parts.push(
                CompletedPart::builder()
                    .set_e_tag(uploaded.e_tag().map(str::to_string))
                    .part_number(part_number)
                    .build(),
            );
            part_number += 1;

            let (data, _) = read_part(body).await?;
            if !data.is_empty() {
                next = Some(data);
            }
        }

        Ok(parts)
    }
}

#[async_trait]
impl ObjectStore for S3Storage {
    async fn put_object(
        &self,
        object: ObjectUpload<'_>,
        mut body: ObjectBody<'_>,
    ) -> Result<String, StorageError> {
        let (first, finished) = read_part(&mut body).await?;
        if finished {
            self.put_single(object, first).await?;
        } else {
            self.put_multipart(object, first, &mut body).await?;
        }

        let location = self.settings.object_url(object.key);
        tracing::debug!(key = object.key, location = %location, "Object stored");
        Ok(location)
    }
}

/// Buffer up to one part from the body.
///
/// Returns the data and whether the body is exhausted.
async fn read_part(body: &mut ObjectBody<'_>) -> Result<(Vec<u8>, bool), StorageError> {
    let mut buf = Vec::new();
    while buf.len() < PART_SIZE {
        match body.next().await {
            Some(chunk) => buf.extend_from_slice(&chunk.map_err(StorageError::Body)?),
            None => return Ok((buf, true)),
        }
    }
    Ok((buf, false))
}
