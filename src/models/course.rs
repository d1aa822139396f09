use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::common::Resource;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum CourseStatus {
    #[default]
    Active,
    Inactive,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub title: String,
    pub description: String,
    pub instructor_id: String,
    pub category: String,
    pub level: String,
    pub duration: String,
    /// Ids only; kept for API compatibility and never written by the enrollment ledger.
    #[sqlx(json)]
    pub enrolled_students: Vec<String>,
    pub max_students: i64,
    pub start_date: String,
    pub end_date: String,
    pub status: CourseStatus,
    #[sqlx(json)]
    pub syllabus: Vec<String>,
    #[sqlx(skip)]
    pub resources: Vec<Resource>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewCourseRequest {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    #[validate(length(min = 1, message = "category is required"))]
    pub category: String,
    #[validate(length(min = 1, message = "level is required"))]
    pub level: String,
    #[validate(length(min = 1, message = "duration is required"))]
    pub duration: String,
    #[validate(range(min = 1, message = "maxStudents must be positive"))]
    pub max_students: i64,
    #[validate(length(min = 1, message = "startDate is required"))]
    pub start_date: String,
    #[validate(length(min = 1, message = "endDate is required"))]
    pub end_date: String,
    #[serde(default)]
    pub syllabus: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourseRequest {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub level: Option<String>,
    pub duration: Option<String>,
    #[validate(range(min = 1, message = "maxStudents must be positive"))]
    pub max_students: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: Option<CourseStatus>,
    pub syllabus: Option<Vec<String>>,
}
