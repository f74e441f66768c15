// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Course model for storage and API.

use serde::{Deserialize, Serialize};

/// Course stored in the `courses` collection and returned by `GET /courses`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// Generated document ID
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Public URL of the uploaded thumbnail
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    /// Public URL of the uploaded video
    #[serde(default)]
    pub video_url: Option<String>,
    /// Insertion time (RFC 3339, millisecond precision); listing order.
    /// Empty for records written without one.
    #[serde(default)]
    pub created_at: String,
}

/// Order courses oldest first. Records without a creation time come first,
/// in the order they were retrieved.
pub fn sort_by_creation(courses: &mut [Course]) {
    courses.sort_by(|a, b| a.created_at.cmp(&b.created_at));
}

/// A validated upload, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCourse {
    pub description: String,
    pub thumbnail_url: String,
    pub video_url: String,
}

impl NewCourse {
    /// Build the stored record with a fresh ID and timestamp.
    pub fn into_course(self, id: String, created_at: String) -> Course {
        Course {
            id,
            description: Some(self.description),
            thumbnail_url: Some(self.thumbnail_url),
            video_url: Some(self.video_url),
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_serializes_with_api_field_names() {
        let course = NewCourse {
            description: "Intro to Rust".to_string(),
            thumbnail_url: "https://cdn.test/1.png".to_string(),
            video_url: "https://cdn.test/2.mp4".to_string(),
        }
        .into_course("abc".to_string(), "2026-01-01T00:00:00.000Z".to_string());

        let json = serde_json::to_value(&course).unwrap();
        assert_eq!(json["_id"], "abc");
        assert_eq!(json["description"], "Intro to Rust");
        assert_eq!(json["thumbnailUrl"], "https://cdn.test/1.png");
        assert_eq!(json["videoUrl"], "https://cdn.test/2.mp4");
        assert_eq!(json["createdAt"], "2026-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_course_tolerates_missing_optional_fields() {
        let course: Course =
            serde_json::from_str(r#"{"_id":"x","createdAt":"2026-01-01T00:00:00.000Z"}"#).unwrap();
        assert_eq!(course.description, None);
        assert_eq!(course.thumbnail_url, None);

        let course: Course = serde_json::from_str(r#"{"_id":"legacy"}"#).unwrap();
        assert_eq!(course.created_at, "");
    }

    fn course(id: &str, created_at: &str) -> Course {
        Course {
            id: id.to_string(),
            description: None,
            thumbnail_url: None,
            video_url: None,
            created_at: created_at.to_string(),
        }
    }

    #[test]
    fn test_sort_keeps_records_without_creation_time() {
        let mut courses = vec![
            course("b", "2026-01-02T00:00:00.000Z"),
            course("legacy-1", ""),
            course("a", "2026-01-01T00:00:00.000Z"),
            course("legacy-2", ""),
        ];

        sort_by_creation(&mut courses);

        let ids: Vec<_> = courses.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["legacy-1", "legacy-2", "a", "b"]);
    }
}
