// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These run against the Firestore emulator and are skipped unless
//! FIRESTORE_EMULATOR_HOST is set.

use course_uploader::db::{Database, FirestoreDb};
use course_uploader::error::AppError;
use course_uploader::models::{NewCourse, User};

mod common;

async fn test_db() -> FirestoreDb {
    FirestoreDb::connect("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

fn unique_email() -> String {
    format!("user-{}@example.com", uuid::Uuid::new_v4())
}

#[tokio::test]
async fn test_init_is_repeatable() {
    require_emulator!();
    let db = test_db().await;
    db.init().await.unwrap();
    db.init().await.unwrap();
}

#[tokio::test]
async fn test_user_lookup_requires_both_fields() {
    require_emulator!();
    let db = test_db().await;
    let email = unique_email();

    db.create_user(&User {
        email: email.clone(),
        password: "x".to_string(),
    })
    .await
    .unwrap();

    let found = db.find_user_by_credentials(&email, "x").await.unwrap();
    assert_eq!(found.map(|u| u.email), Some(email.clone()));
    assert!(db
        .find_user_by_credentials(&email, "wrong")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_duplicate_user_email_conflicts() {
    require_emulator!();
    let db = test_db().await;
    let user = User {
        email: unique_email(),
        password: "x".to_string(),
    };

    db.create_user(&user).await.unwrap();
    let err = db.create_user(&user).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_inserted_course_is_listed() {
    require_emulator!();
    let db = test_db().await;
    let description = format!("course {}", uuid::Uuid::new_v4());

    let stored = db
        .insert_course(NewCourse {
            description: description.clone(),
            thumbnail_url: "https://storage.test/1.png".to_string(),
            video_url: "https://storage.test/2.mp4".to_string(),
        })
        .await
        .unwrap();

    let courses = db.list_courses().await.unwrap();
    let listed = courses.iter().find(|c| c.id == stored.id).unwrap();
    assert_eq!(listed.description.as_deref(), Some(description.as_str()));
    assert_eq!(
        listed.video_url.as_deref(),
        Some("https://storage.test/2.mp4")
    );

    // Listing is ordered by creation time.
    let times: Vec<_> = courses.iter().map(|c| c.created_at.clone()).collect();
    let mut sorted = times.clone();
    sorted.sort();
    assert_eq!(times, sorted);
}
