// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.

use std::env;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 1024 * 1024 * 1024;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// GCP project hosting the Firestore database
    pub gcp_project_id: String,

    // --- Object storage ---
    /// AWS region of the upload bucket
    pub aws_region: String,
    /// Bucket receiving uploaded media
    pub s3_bucket_name: String,
    /// Static access key; the default credential chain is used when unset
    pub aws_access_key_id: Option<String>,
    /// Static secret key; the default credential chain is used when unset
    pub aws_secret_access_key: Option<String>,
    /// Endpoint override for S3-compatible stores
    pub s3_endpoint_url: Option<String>,
    /// Base URL for public object links
    pub s3_public_base_url: Option<String>,

    /// Request body cap for media uploads
    pub max_upload_bytes: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is read first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            gcp_project_id: required("GCP_PROJECT_ID")?,
            aws_region: required("AWS_REGION")?,
            s3_bucket_name: required("S3_BUCKET_NAME")?,
            aws_access_key_id: optional("AWS_ACCESS_KEY_ID"),
            aws_secret_access_key: optional("AWS_SECRET_ACCESS_KEY"),
            s3_endpoint_url: optional("S3_ENDPOINT_URL"),
            s3_public_base_url: optional("S3_PUBLIC_BASE_URL"),
            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
        })
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            port: DEFAULT_PORT,
            gcp_project_id: "test-project".to_string(),
            aws_region: "us-east-1".to_string(),
            s3_bucket_name: "test-bucket".to_string(),
            aws_access_key_id: None,
            aws_secret_access_key: None,
            s3_endpoint_url: None,
            s3_public_base_url: None,
            max_upload_bytes: 16 * 1024 * 1024,
        }
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::Missing(name))
}

/// Read a variable, treating blank values as unset.
fn optional(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
