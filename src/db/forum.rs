use sqlx::SqlitePool;

use crate::db::group_by_parent;
use crate::models::ForumPost;

const POST_COLUMNS: &str = "id, forum_id, author_id, author_name, title, content, is_pinned, \
    parent_id, created_at, updated_at";

/// Top-level posts of a forum (no parent), each with its direct replies.
pub async fn fetch_top_level_posts(
    db: &SqlitePool,
    forum_id: &str,
) -> Result<Vec<ForumPost>, sqlx::Error> {
    let mut posts = sqlx::query_as::<_, ForumPost>(&format!(
        "SELECT {POST_COLUMNS} FROM forum_posts \
         WHERE forum_id = ? AND parent_id IS NULL \
         ORDER BY is_pinned DESC, created_at, id"
    ))
    .bind(forum_id)
    .fetch_all(db)
    .await?;

    let replies = sqlx::query_as::<_, ForumPost>(&format!(
        "SELECT {POST_COLUMNS} FROM forum_posts \
         WHERE parent_id IN (SELECT id FROM forum_posts WHERE forum_id = ? AND parent_id IS NULL) \
         ORDER BY created_at, id"
    ))
    .bind(forum_id)
    .fetch_all(db)
    .await?;
    let mut by_parent = group_by_parent(replies, |r| r.parent_id.as_deref());

    for post in &mut posts {
        post.replies = by_parent.remove(&post.id).unwrap_or_default();
    }
    Ok(posts)
}

pub async fn find_post_by_id(db: &SqlitePool, id: &str) -> Result<Option<ForumPost>, sqlx::Error> {
    sqlx::query_as::<_, ForumPost>(&format!("SELECT {POST_COLUMNS} FROM forum_posts WHERE id = ?"))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn fetch_replies(db: &SqlitePool, parent_id: &str) -> Result<Vec<ForumPost>, sqlx::Error> {
    sqlx::query_as::<_, ForumPost>(&format!(
        "SELECT {POST_COLUMNS} FROM forum_posts WHERE parent_id = ? ORDER BY created_at, id"
    ))
    .bind(parent_id)
    .fetch_all(db)
    .await
}

pub async fn insert_post(db: &SqlitePool, post: &ForumPost) -> Result<(), sqlx::Error> {
    sqlx::query(&format!(
        "INSERT INTO forum_posts ({POST_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    ))
    .bind(&post.id)
    .bind(&post.forum_id)
    .bind(&post.author_id)
    .bind(&post.author_name)
    .bind(&post.title)
    .bind(&post.content)
    .bind(post.is_pinned)
    .bind(&post.parent_id)
    .bind(post.created_at)
    .bind(post.updated_at)
    .execute(db)
    .await?;
    Ok(())
}
