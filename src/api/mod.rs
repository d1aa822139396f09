mod assignments;
mod catalog;
mod forum;
mod generative_tasks;
mod ledger;
mod users;

use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router, extract::State};
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::models::ApiResponse;
use crate::state::AppState;

pub(crate) type ApiResult<T> = Result<Json<ApiResponse<T>>, AppError>;
pub(crate) type Created<T> = Result<(StatusCode, Json<ApiResponse<T>>), AppError>;

pub(crate) fn ok<T>(data: T, message: &str) -> ApiResult<T> {
    Ok(Json(ApiResponse::ok(data, message)))
}

pub(crate) fn created<T>(data: T, message: &str) -> Created<T> {
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(data, message))))
}

/// The full HTTP surface, mounted under `/api`.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .route("/courses", get(catalog::list_courses).post(catalog::create_course))
        .route(
            "/courses/{course_id}",
            get(catalog::get_course)
                .put(catalog::update_course)
                .delete(catalog::delete_course),
        )
        .route("/courses/{course_id}/resources", post(catalog::add_resource))
        .route(
            "/courses/{course_id}/sections",
            get(catalog::list_sections).post(catalog::create_section),
        )
        .route(
            "/courses/{course_id}/activities/{activity_id}",
            get(catalog::get_course_activity),
        )
        .route("/sections/{section_id}/activities", post(catalog::create_activity))
        .route(
            "/activities/{activity_id}",
            get(catalog::get_activity)
                .put(catalog::update_activity)
                .delete(catalog::delete_activity),
        )
        .route(
            "/assignments",
            get(assignments::list_assignments).post(assignments::create_assignment),
        )
        .route("/assignments/submit", post(assignments::submit_assignment))
        .route("/assignments/grade", post(assignments::grade_assignment))
        .route(
            "/assignments/{assignment_id}",
            get(assignments::get_assignment).put(assignments::update_assignment),
        )
        .route("/generative-tasks/generate", post(generative_tasks::generate_task))
        .route("/generative-tasks/submit", post(generative_tasks::submit_task))
        .route(
            "/generative-tasks/submissions/{submission_id}",
            get(generative_tasks::get_submission),
        )
        .route("/generative-tasks/{task_id}/hints", get(generative_tasks::get_hints))
        .route("/grades", get(ledger::list_grades).post(ledger::record_grade))
        .route("/grades/student/{student_id}", get(ledger::grades_by_student))
        .route(
            "/enrollments",
            get(ledger::list_enrollments).post(ledger::create_enrollment),
        )
        .route("/enrollments/{enrollment_id}", put(ledger::update_enrollment))
        .route("/forum-posts", get(forum::list_posts).post(forum::create_post))
        .route("/forum-posts/reply", post(forum::create_reply))
        .route("/forum-posts/{post_id}", get(forum::get_post))
        .route("/users", get(users::list_users).post(users::create_user))
        .route("/users/by-email/{email}", get(users::get_user_by_email))
        .route("/users/{user_id}", get(users::get_user).put(users::update_user));

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}
