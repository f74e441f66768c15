// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Provision a login.
//!
//! The API has no registration endpoint; accounts are created here.

use anyhow::Context;
use clap::Parser;
use course_uploader::db::{Database, FirestoreDb};
use course_uploader::models::User;

#[derive(Parser)]
#[command(name = "create_user")]
#[command(about = "Create a user account for the course uploader")]
struct Cli {
    /// Login email (must not already exist)
    #[arg(long)]
    email: String,
    /// Login password, stored as given
    #[arg(long)]
    password: String,
    /// Firestore project; defaults to GCP_PROJECT_ID
    #[arg(long)]
    project: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let project = cli
        .project
        .or_else(|| std::env::var("GCP_PROJECT_ID").ok())
        .context("GCP_PROJECT_ID is not set and --project was not given")?;

    let db = FirestoreDb::connect(&project).await?;
    db.create_user(&User {
        email: cli.email.clone(),
        password: cli.password,
    })
    .await?;

    tracing::info!(email = %cli.email, project = %project, "User created");
    Ok(())
}
