use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Grade {
    pub id: String,
    pub student_id: String,
    pub student_name: String,
    pub assignment_id: String,
    pub assignment_title: String,
    pub course_id: String,
    pub course_name: String,
    pub score: i64,
    pub total_points: i64,
    pub letter_grade: String,
    pub feedback: String,
    pub graded_by: String,
    pub graded_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Letter grade for `score` out of `total_points`, on the plus/minus scale.
pub fn letter_grade(score: i64, total_points: i64) -> &'static str {
    if total_points <= 0 {
        return "F";
    }
    let percent = score as f64 * 100.0 / total_points as f64;
    match percent {
        p if p >= 93.0 => "A",
        p if p >= 90.0 => "A-",
        p if p >= 87.0 => "B+",
        p if p >= 83.0 => "B",
        p if p >= 80.0 => "B-",
        p if p >= 77.0 => "C+",
        p if p >= 73.0 => "C",
        p if p >= 70.0 => "C-",
        p if p >= 60.0 => "D",
        _ => "F",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecordGradeRequest {
    #[validate(length(min = 1, message = "studentId is required"))]
    pub student_id: String,
    #[serde(default)]
    pub student_name: String,
    #[validate(length(min = 1, message = "assignmentId is required"))]
    pub assignment_id: String,
    #[validate(range(min = 0, message = "score must not be negative"))]
    pub score: i64,
    #[serde(default)]
    pub feedback: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    #[default]
    Active,
    Completed,
    Dropped,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: String,
    pub student_id: String,
    pub course_id: String,
    pub enrolled_at: DateTime<Utc>,
    pub status: EnrollmentStatus,
    /// Percentage, 0..=100.
    pub progress: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_accessed: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewEnrollmentRequest {
    #[validate(length(min = 1, message = "courseId is required"))]
    pub course_id: String,
    #[validate(length(min = 1, message = "studentId is required"))]
    pub student_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEnrollmentRequest {
    pub status: Option<EnrollmentStatus>,
    #[validate(range(min = 0, max = 100, message = "progress must be between 0 and 100"))]
    pub progress: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentQuery {
    pub student_id: Option<String>,
}
