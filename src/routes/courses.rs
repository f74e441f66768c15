// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Course upload and listing routes.

use crate::error::{MessageResponse, Result};
use crate::models::Course;
use crate::services::upload::ReceivedUpload;
use crate::AppState;
use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

/// Course routes. `max_upload_bytes` caps the `/upload` request body.
pub fn routes(max_upload_bytes: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/upload",
            post(upload_course).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/courses", get(list_courses))
}

/// Store the thumbnail and video, then record the course.
async fn upload_course(
    State(state): State<Arc<AppState>>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<MessageResponse>> {
    let upload = match multipart {
        Ok(mut multipart) => state.uploads.receive(&mut multipart).await?,
        Err(rejection) => {
            // Not a multipart request: nothing was sent.
            tracing::debug!(reason = %rejection.body_text(), "Upload without multipart body");
            ReceivedUpload::default()
        }
    };

    let course = state.db.insert_course(upload.into_new_course()?).await?;
    tracing::info!(course_id = %course.id, "Course uploaded");

    Ok(Json(MessageResponse::new("Upload successful!")))
}

/// Every stored course, unfiltered.
async fn list_courses(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Course>>> {
    let courses = state.db.list_courses().await?;
    Ok(Json(courses))
}
