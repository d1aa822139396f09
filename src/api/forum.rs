use axum::extract::{Path, Query, State};
use validator::Validate;

use super::{ApiResult, Created, created, ok};
use crate::error::AppError;
use crate::extractors::AppJson;
use crate::models::*;
use crate::services::ForumService;
use crate::state::AppState;

fn service(state: &AppState) -> ForumService {
    ForumService::new(state.db.clone())
}

pub(super) async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<ForumPostsQuery>,
) -> ApiResult<Vec<ForumPost>> {
    let forum_id = query
        .forum_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::Validation("forumId is required".to_string()))?;
    let posts = service(&state).list_posts(&forum_id).await?;
    ok(posts, "Forum posts retrieved successfully")
}

pub(super) async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> ApiResult<ForumPost> {
    let post = service(&state).get_post(&post_id).await?;
    ok(post, "Forum post retrieved successfully")
}

pub(super) async fn create_post(
    State(state): State<AppState>,
    AppJson(req): AppJson<NewPostRequest>,
) -> Created<ForumPost> {
    req.validate()?;
    let post = service(&state).create_post(req).await?;
    created(post, "Forum post created successfully")
}

pub(super) async fn create_reply(
    State(state): State<AppState>,
    AppJson(req): AppJson<NewReplyRequest>,
) -> Created<ForumPost> {
    req.validate()?;
    let reply = service(&state).create_reply(req).await?;
    created(reply, "Reply created successfully")
}
