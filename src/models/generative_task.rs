use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GenerativeTask {
    pub id: String,
    pub activity_id: String,
    pub student_id: String,
    pub title: String,
    pub description: String,
    #[sqlx(json)]
    pub requirements: Vec<String>,
    pub difficulty: Difficulty,
    /// Minutes.
    pub estimated_time: i64,
    #[sqlx(json)]
    pub hints: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub id: String,
    pub submission_id: String,
    pub name: String,
    pub passed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GenerativeTaskSubmission {
    pub id: String,
    pub task_id: String,
    pub student_id: String,
    pub code: String,
    pub score: i64,
    pub feedback: String,
    #[sqlx(skip)]
    pub test_cases: Vec<TestCase>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerateTaskRequest {
    #[validate(length(min = 1, message = "activityId is required"))]
    pub activity_id: String,
    pub difficulty: Difficulty,
    #[validate(length(min = 1, message = "studentId is required"))]
    pub student_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTaskRequest {
    #[validate(length(min = 1, message = "taskId is required"))]
    pub task_id: String,
    #[validate(length(min = 1, message = "code is required"))]
    pub code: String,
    #[validate(length(min = 1, message = "studentId is required"))]
    pub student_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HintsQuery {
    pub difficulty: Option<String>,
}
