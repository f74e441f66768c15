// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Course Uploader API Server
//!
//! Serves login checks, course media uploads to S3, and course listings
//! backed by Firestore.

use course_uploader::{
    config::Config,
    db::FirestoreDb,
    routes::create_router,
    services::{S3Storage, UploadService},
    AppState,
};
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load configuration");
            std::process::exit(1);
        }
    };
    tracing::info!(
        port = config.port,
        project = %config.gcp_project_id,
        bucket = %config.s3_bucket_name,
        "Starting course uploader API"
    );

    // The API is useless without its database: fail fast, no retry.
    let db = match FirestoreDb::connect(&config.gcp_project_id).await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!(error = %e, "Database connection failed");
            std::process::exit(1);
        }
    };

    let storage = S3Storage::new(&config).await;

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db: Arc::new(db),
        uploads: UploadService::new(Arc::new(storage)),
    });

    let app = create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("course_uploader=debug,info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal");
        },
    }
}
