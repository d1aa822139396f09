use axum::extract::{Path, State};
use validator::Validate;

use super::{ApiResult, Created, created, ok};
use crate::extractors::AppJson;
use crate::models::*;
use crate::services::UserService;
use crate::state::AppState;

fn service(state: &AppState) -> UserService {
    UserService::new(state.db.clone())
}

pub(super) async fn list_users(State(state): State<AppState>) -> ApiResult<Vec<User>> {
    let users = service(&state).list_users().await?;
    ok(users, "Users retrieved successfully")
}

pub(super) async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<User> {
    let user = service(&state).get_user(&user_id).await?;
    ok(user, "User retrieved successfully")
}

pub(super) async fn get_user_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> ApiResult<User> {
    let user = service(&state).get_user_by_email(&email).await?;
    ok(user, "User retrieved successfully")
}

pub(super) async fn create_user(
    State(state): State<AppState>,
    AppJson(req): AppJson<NewUserRequest>,
) -> Created<User> {
    req.validate()?;
    let user = service(&state).create_user(req).await?;
    created(user, "User created successfully")
}

pub(super) async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    AppJson(req): AppJson<UpdateUserRequest>,
) -> ApiResult<User> {
    req.validate()?;
    let user = service(&state).update_user(&user_id, req).await?;
    ok(user, "User updated successfully")
}
