use axum::extract::{Path, Query, State};
use validator::Validate;

use super::{ApiResult, Created, created, ok};
use crate::collaborators::Actor;
use crate::extractors::AppJson;
use crate::models::*;
use crate::services::LedgerService;
use crate::state::AppState;

fn service(state: &AppState) -> LedgerService {
    LedgerService::new(state.db.clone(), state.policy)
}

pub(super) async fn list_grades(State(state): State<AppState>) -> ApiResult<Vec<Grade>> {
    let grades = service(&state).list_grades().await?;
    ok(grades, "Grades retrieved successfully")
}

pub(super) async fn grades_by_student(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> ApiResult<Vec<Grade>> {
    let grades = service(&state).grades_by_student(&student_id).await?;
    ok(grades, "Grades retrieved successfully")
}

pub(super) async fn record_grade(
    State(state): State<AppState>,
    actor: Actor,
    AppJson(req): AppJson<RecordGradeRequest>,
) -> Created<Grade> {
    actor.require_instructor("record grades")?;
    req.validate()?;
    let grade = service(&state).record_grade(&actor.id, req).await?;
    created(grade, "Grade recorded successfully")
}

pub(super) async fn list_enrollments(
    State(state): State<AppState>,
    Query(query): Query<EnrollmentQuery>,
) -> ApiResult<Vec<Enrollment>> {
    let enrollments = service(&state)
        .list_enrollments(query.student_id.as_deref())
        .await?;
    ok(enrollments, "Enrollments retrieved successfully")
}

pub(super) async fn create_enrollment(
    State(state): State<AppState>,
    AppJson(req): AppJson<NewEnrollmentRequest>,
) -> Created<Enrollment> {
    req.validate()?;
    let enrollment = service(&state).create_enrollment(req).await?;
    created(enrollment, "Enrollment created successfully")
}

pub(super) async fn update_enrollment(
    State(state): State<AppState>,
    Path(enrollment_id): Path<String>,
    AppJson(req): AppJson<UpdateEnrollmentRequest>,
) -> ApiResult<Enrollment> {
    req.validate()?;
    let enrollment = service(&state).update_enrollment(&enrollment_id, req).await?;
    ok(enrollment, "Enrollment updated successfully")
}
