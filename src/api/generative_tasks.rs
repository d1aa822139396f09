use axum::extract::{Path, Query, State};
use validator::Validate;

use super::{ApiResult, Created, created, ok};
use crate::extractors::AppJson;
use crate::models::*;
use crate::services::GenerativeTaskService;
use crate::state::AppState;

fn service(state: &AppState) -> GenerativeTaskService {
    GenerativeTaskService::new(
        state.db.clone(),
        state.generator.clone(),
        state.evaluator.clone(),
    )
}

pub(super) async fn generate_task(
    State(state): State<AppState>,
    AppJson(req): AppJson<GenerateTaskRequest>,
) -> Created<GenerativeTask> {
    req.validate()?;
    let task = service(&state).generate(req).await?;
    created(task, "Task generated successfully")
}

pub(super) async fn submit_task(
    State(state): State<AppState>,
    AppJson(req): AppJson<SubmitTaskRequest>,
) -> Created<GenerativeTaskSubmission> {
    req.validate()?;
    let submission = service(&state).submit(req).await?;
    created(submission, "Task submitted successfully")
}

pub(super) async fn get_hints(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Query(query): Query<HintsQuery>,
) -> ApiResult<Vec<String>> {
    let hints = service(&state)
        .hints(&task_id, query.difficulty.as_deref())
        .await?;
    ok(hints, "Hints retrieved successfully")
}

pub(super) async fn get_submission(
    State(state): State<AppState>,
    Path(submission_id): Path<String>,
) -> ApiResult<GenerativeTaskSubmission> {
    let submission = service(&state).get_submission(&submission_id).await?;
    ok(submission, "Submission retrieved successfully")
}
