use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Uniform success envelope; failures are rendered by `AppError`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: &str) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: Some(message.to_string()),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: &str) -> Self {
        Self {
            success: true,
            data: None,
            error: None,
            message: Some(message.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: String,
    pub course_id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub url: String,
    pub description: String,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewResourceRequest {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[serde(rename = "type")]
    #[validate(length(min = 1, message = "type is required"))]
    pub resource_type: String,
    #[validate(length(min = 1, message = "url is required"))]
    pub url: String,
    #[serde(default)]
    pub description: String,
}

/// A file reference owned by either an assignment or a submission.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission_id: Option<String>,
    pub title: String,
    #[serde(rename = "type")]
    pub attachment_type: String,
    pub url: String,
    pub description: String,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewAttachment {
    #[validate(length(min = 1, message = "attachment title is required"))]
    pub title: String,
    #[serde(rename = "type")]
    pub attachment_type: String,
    #[validate(length(min = 1, message = "attachment url is required"))]
    pub url: String,
    #[serde(default)]
    pub description: String,
}
