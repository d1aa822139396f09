use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A post or a reply. Replies point at their parent through `parent_id`;
/// `replies` is filled one level deep on reads.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ForumPost {
    pub id: String,
    pub forum_id: String,
    pub author_id: String,
    pub author_name: String,
    pub title: String,
    pub content: String,
    pub is_pinned: bool,
    #[sqlx(skip)]
    pub replies: Vec<ForumPost>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewPostRequest {
    #[validate(length(min = 1, message = "forumId is required"))]
    pub forum_id: String,
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "content is required"))]
    pub content: String,
    #[validate(length(min = 1, message = "authorId is required"))]
    pub author_id: String,
    #[validate(length(min = 1, message = "authorName is required"))]
    pub author_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewReplyRequest {
    #[validate(length(min = 1, message = "postId is required"))]
    pub post_id: String,
    #[validate(length(min = 1, message = "content is required"))]
    pub content: String,
    #[validate(length(min = 1, message = "authorId is required"))]
    pub author_id: String,
    #[validate(length(min = 1, message = "authorName is required"))]
    pub author_name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForumPostsQuery {
    pub forum_id: Option<String>,
}
