use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::db::forum;
use crate::error::AppError;
use crate::ids::generate_id;
use crate::models::{ForumPost, NewPostRequest, NewReplyRequest};

/// Threaded discussion boards. Reads attach one level of replies.
pub struct ForumService {
    db: SqlitePool,
}

impl ForumService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn list_posts(&self, forum_id: &str) -> Result<Vec<ForumPost>, AppError> {
        let posts = forum::fetch_top_level_posts(&self.db, forum_id).await?;
        debug!("forum {} has {} top-level posts", forum_id, posts.len());
        Ok(posts)
    }

    pub async fn get_post(&self, id: &str) -> Result<ForumPost, AppError> {
        let mut post = forum::find_post_by_id(&self.db, id)
            .await?
            .ok_or_else(|| AppError::not_found("Forum post"))?;
        post.replies = forum::fetch_replies(&self.db, &post.id).await?;
        Ok(post)
    }

    pub async fn create_post(&self, req: NewPostRequest) -> Result<ForumPost, AppError> {
        let now = Utc::now();
        let post = ForumPost {
            id: generate_id(),
            forum_id: req.forum_id,
            author_id: req.author_id,
            author_name: req.author_name,
            title: req.title,
            content: req.content,
            is_pinned: false,
            replies: Vec::new(),
            parent_id: None,
            created_at: now,
            updated_at: now,
        };
        forum::insert_post(&self.db, &post).await?;
        info!("created post {} in forum {}", post.id, post.forum_id);
        Ok(post)
    }

    /// Replies carry an empty title and the parent's forum id.
    pub async fn create_reply(&self, req: NewReplyRequest) -> Result<ForumPost, AppError> {
        let parent = forum::find_post_by_id(&self.db, &req.post_id)
            .await?
            .ok_or_else(|| AppError::not_found("Forum post"))?;

        let now = Utc::now();
        let reply = ForumPost {
            id: generate_id(),
            forum_id: parent.forum_id,
            author_id: req.author_id,
            author_name: req.author_name,
            title: String::new(),
            content: req.content,
            is_pinned: false,
            replies: Vec::new(),
            parent_id: Some(parent.id),
            created_at: now,
            updated_at: now,
        };
        forum::insert_post(&self.db, &reply).await?;
        info!("reply {} added to post {}", reply.id, req.post_id);
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory_pool;

    fn post_request(forum_id: &str, title: &str) -> NewPostRequest {
        NewPostRequest {
            forum_id: forum_id.to_string(),
            title: title.to_string(),
            content: "Hello".to_string(),
            author_id: "student-1".to_string(),
            author_name: "Ada".to_string(),
        }
    }

    fn reply_request(post_id: &str, content: &str) -> NewReplyRequest {
        NewReplyRequest {
            post_id: post_id.to_string(),
            content: content.to_string(),
            author_id: "student-2".to_string(),
            author_name: "Grace".to_string(),
        }
    }

    async fn service() -> ForumService {
        ForumService::new(memory_pool().await.unwrap())
    }

    #[tokio::test]
    async fn test_top_level_posts_with_direct_replies() {
        let service = service().await;
        let first = service.create_post(post_request("forum-1", "first")).await.unwrap();
        let second = service.create_post(post_request("forum-1", "second")).await.unwrap();
        service.create_post(post_request("forum-2", "elsewhere")).await.unwrap();

        let reply = service.create_reply(reply_request(&first.id, "a reply")).await.unwrap();
        service.create_reply(reply_request(&reply.id, "nested")).await.unwrap();

        let posts = service.list_posts("forum-1").await.unwrap();
        assert_eq!(posts.len(), 2);
        assert!(posts.iter().all(|p| p.forum_id == "forum-1" && p.parent_id.is_none()));

        let first_listed = posts.iter().find(|p| p.id == first.id).unwrap();
        assert_eq!(first_listed.replies.len(), 1);
        assert_eq!(first_listed.replies[0].id, reply.id);
        assert!(first_listed.replies[0].replies.is_empty());

        let second_listed = posts.iter().find(|p| p.id == second.id).unwrap();
        assert!(second_listed.replies.is_empty());
    }

    #[tokio::test]
    async fn test_reply_inherits_forum_and_has_no_title() {
        let service = service().await;
        let post = service.create_post(post_request("forum-1", "topic")).await.unwrap();
        assert!(!post.is_pinned);

        let reply = service.create_reply(reply_request(&post.id, "agreed")).await.unwrap();
        assert_eq!(reply.forum_id, "forum-1");
        assert_eq!(reply.parent_id.as_deref(), Some(post.id.as_str()));
        assert!(reply.title.is_empty());

        let loaded = service.get_post(&post.id).await.unwrap();
        assert_eq!(loaded.replies.len(), 1);
    }

    #[tokio::test]
    async fn test_reply_to_missing_post() {
        let service = service().await;
        let err = service.create_reply(reply_request("missing", "hi")).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(service.get_post("missing").await.is_err());
    }
}
