use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::common::{Attachment, NewAttachment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum AssignmentType {
    Quiz,
    Essay,
    Project,
    Exam,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum AssignmentStatus {
    #[default]
    Active,
    Closed,
}

/// `Submitted` is the only entry state; `Graded` is terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum SubmissionStatus {
    #[default]
    Submitted,
    Graded,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: String,
    pub title: String,
    pub description: String,
    pub course_id: String,
    pub instructor_id: String,
    #[serde(rename = "type")]
    pub assignment_type: AssignmentType,
    pub total_points: i64,
    pub due_date: String,
    pub status: AssignmentStatus,
    pub instructions: String,
    #[sqlx(skip)]
    pub attachments: Vec<Attachment>,
    #[sqlx(skip)]
    pub submissions: Vec<Submission>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: String,
    pub assignment_id: String,
    pub student_id: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    pub status: SubmissionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graded_by: Option<String>,
    #[sqlx(skip)]
    pub attachments: Vec<Attachment>,
    pub submitted_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewAssignmentRequest {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    #[validate(length(min = 1, message = "courseId is required"))]
    pub course_id: String,
    #[serde(rename = "type")]
    pub assignment_type: AssignmentType,
    #[validate(range(min = 1, message = "totalPoints must be positive"))]
    pub total_points: i64,
    #[validate(length(min = 1, message = "dueDate is required"))]
    pub due_date: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    #[validate(nested)]
    pub attachments: Vec<NewAttachment>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAssignmentRequest {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub instructions: Option<String>,
    #[validate(range(min = 1, message = "totalPoints must be positive"))]
    pub total_points: Option<i64>,
    pub due_date: Option<String>,
    pub status: Option<AssignmentStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAssignmentRequest {
    #[validate(length(min = 1, message = "assignmentId is required"))]
    pub assignment_id: String,
    #[validate(length(min = 1, message = "content is required"))]
    pub content: String,
    #[serde(default)]
    #[validate(nested)]
    pub attachments: Vec<NewAttachment>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GradeAssignmentRequest {
    #[validate(length(min = 1, message = "submissionId is required"))]
    pub submission_id: String,
    #[validate(range(min = 0, message = "score must not be negative"))]
    pub score: i64,
    #[serde(default)]
    pub feedback: String,
    /// Needed to regrade a graded submission when the regrade guard is on.
    #[serde(default, rename = "override")]
    pub override_graded: bool,
}
