// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - storage and upload handling.

pub mod storage;
pub mod upload;

pub use storage::{KeyGenerator, ObjectStore, S3Storage, StorageError};
pub use upload::UploadService;
