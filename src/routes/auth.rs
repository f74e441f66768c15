// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Login route.
//!
//! Login is a one-shot credential check: no session or token is issued.
//! Passwords are compared as stored, without hashing.

use axum::{
    extract::{FromRequest, Request, State},
    http::header,
    routing::post,
    Form, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{AppError, MessageResponse, Result};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/logins", post(login))
}

/// Login request body.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Login body accepted as JSON or as an urlencoded form.
///
/// Other content types yield an empty request. A body that fails to parse
/// is reported as invalid credentials.
pub struct LoginForm(pub LoginRequest);

impl<S> FromRequest<S> for LoginForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> std::result::Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let parsed = if content_type.starts_with("application/json") {
            Json::<LoginRequest>::from_request(req, state)
                .await
                .map(|Json(body)| body)
                .map_err(|e| e.body_text())
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            Form::<LoginRequest>::from_request(req, state)
                .await
                .map(|Form(body)| body)
                .map_err(|e| e.body_text())
        } else {
            Ok(LoginRequest::default())
        };

        match parsed {
            Ok(body) => Ok(Self(body)),
            Err(reason) => {
                tracing::debug!(reason = %reason, "Unreadable login body");
                Err(AppError::InvalidCredentials)
            }
        }
    }
}

/// Check an email/password pair against stored users.
async fn login(
    State(state): State<Arc<AppState>>,
    LoginForm(body): LoginForm,
) -> Result<Json<MessageResponse>> {
    let (Some(email), Some(password)) = (non_empty(body.email), non_empty(body.password)) else {
        return Err(AppError::InvalidCredentials);
    };

    match state.db.find_user_by_credentials(&email, &password).await? {
        Some(_) => Ok(Json(MessageResponse::new("Login successful!"))),
        None => {
            tracing::info!("Login rejected: no matching user");
            Err(AppError::InvalidCredentials)
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
