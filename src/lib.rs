// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Course uploader backend
//!
//! This crate provides a small HTTP API for checking user credentials,
//! uploading course media to object storage, and listing stored courses.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Database;
use services::UploadService;
use std::sync::Arc;

/// Shared application state.
///
/// Built once at startup and shared read-only by every request handler.
pub struct AppState {
    pub config: Config,
    pub db: Arc<dyn Database>,
    pub uploads: UploadService,
}
