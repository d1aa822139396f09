use axum::extract::{Path, State};
use validator::Validate;

use super::{ApiResult, Created, created, ok};
use crate::collaborators::Actor;
use crate::extractors::AppJson;
use crate::models::*;
use crate::services::AssignmentService;
use crate::state::AppState;

fn service(state: &AppState) -> AssignmentService {
    AssignmentService::new(state.db.clone(), state.policy)
}

pub(super) async fn list_assignments(State(state): State<AppState>) -> ApiResult<Vec<Assignment>> {
    let assignments = service(&state).list_assignments().await?;
    ok(assignments, "Assignments retrieved successfully")
}

pub(super) async fn get_assignment(
    State(state): State<AppState>,
    Path(assignment_id): Path<String>,
) -> ApiResult<Assignment> {
    let assignment = service(&state).get_assignment(&assignment_id).await?;
    ok(assignment, "Assignment retrieved successfully")
}

pub(super) async fn create_assignment(
    State(state): State<AppState>,
    actor: Actor,
    AppJson(req): AppJson<NewAssignmentRequest>,
) -> Created<Assignment> {
    actor.require_instructor("create assignments")?;
    req.validate()?;
    let assignment = service(&state).create_assignment(&actor.id, req).await?;
    created(assignment, "Assignment created successfully")
}

pub(super) async fn update_assignment(
    State(state): State<AppState>,
    Path(assignment_id): Path<String>,
    AppJson(req): AppJson<UpdateAssignmentRequest>,
) -> ApiResult<Assignment> {
    req.validate()?;
    let assignment = service(&state).update_assignment(&assignment_id, req).await?;
    ok(assignment, "Assignment updated successfully")
}

pub(super) async fn submit_assignment(
    State(state): State<AppState>,
    actor: Actor,
    AppJson(req): AppJson<SubmitAssignmentRequest>,
) -> Created<Submission> {
    req.validate()?;
    let submission = service(&state).submit(&actor.id, req).await?;
    created(submission, "Assignment submitted successfully")
}

pub(super) async fn grade_assignment(
    State(state): State<AppState>,
    actor: Actor,
    AppJson(req): AppJson<GradeAssignmentRequest>,
) -> ApiResult<Submission> {
    actor.require_instructor("grade submissions")?;
    req.validate()?;
    let submission = service(&state).grade(&actor.id, req).await?;
    ok(submission, "Assignment graded successfully")
}
