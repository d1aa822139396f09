use axum::extract::{Path, State};
use validator::Validate;

use super::{ApiResult, Created, created, ok};
use crate::collaborators::Actor;
use crate::extractors::AppJson;
use crate::models::*;
use crate::services::CatalogService;
use crate::state::AppState;

fn service(state: &AppState) -> CatalogService {
    CatalogService::new(state.db.clone())
}

pub(super) async fn list_courses(State(state): State<AppState>) -> ApiResult<Vec<Course>> {
    let courses = service(&state).list_courses().await?;
    ok(courses, "Courses retrieved successfully")
}

pub(super) async fn get_course(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> ApiResult<Course> {
    let course = service(&state).get_course(&course_id).await?;
    ok(course, "Course retrieved successfully")
}

pub(super) async fn create_course(
    State(state): State<AppState>,
    actor: Actor,
    AppJson(req): AppJson<NewCourseRequest>,
) -> Created<Course> {
    actor.require_instructor("create courses")?;
    req.validate()?;
    let course = service(&state).create_course(&actor.id, req).await?;
    created(course, "Course created successfully")
}

pub(super) async fn update_course(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
    AppJson(req): AppJson<UpdateCourseRequest>,
) -> ApiResult<Course> {
    req.validate()?;
    let course = service(&state).update_course(&course_id, req).await?;
    ok(course, "Course updated successfully")
}

pub(super) async fn delete_course(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> ApiResult<()> {
    service(&state).delete_course(&course_id).await?;
    Ok(axum::Json(ApiResponse::message("Course deleted successfully")))
}

pub(super) async fn add_resource(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
    AppJson(req): AppJson<NewResourceRequest>,
) -> Created<Resource> {
    req.validate()?;
    let resource = service(&state).add_resource(&course_id, req).await?;
    created(resource, "Resource added successfully")
}

pub(super) async fn list_sections(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> ApiResult<Vec<Section>> {
    let sections = service(&state).list_sections(&course_id).await?;
    ok(sections, "Sections retrieved successfully")
}

pub(super) async fn create_section(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
    AppJson(req): AppJson<NewSectionRequest>,
) -> Created<Section> {
    req.validate()?;
    let section = service(&state).create_section(&course_id, req).await?;
    created(section, "Section created successfully")
}

pub(super) async fn get_course_activity(
    State(state): State<AppState>,
    Path((course_id, activity_id)): Path<(String, String)>,
) -> ApiResult<Activity> {
    let activity = service(&state).get_course_activity(&course_id, &activity_id).await?;
    ok(activity, "Activity retrieved successfully")
}

pub(super) async fn create_activity(
    State(state): State<AppState>,
    Path(section_id): Path<String>,
    AppJson(req): AppJson<NewActivityRequest>,
) -> Created<Activity> {
    req.validate()?;
    let activity = service(&state).create_activity(&section_id, req).await?;
    created(activity, "Activity created successfully")
}

pub(super) async fn get_activity(
    State(state): State<AppState>,
    Path(activity_id): Path<String>,
) -> ApiResult<Activity> {
    let activity = service(&state).get_activity(&activity_id).await?;
    ok(activity, "Activity retrieved successfully")
}

pub(super) async fn update_activity(
    State(state): State<AppState>,
    Path(activity_id): Path<String>,
    AppJson(req): AppJson<UpdateActivityRequest>,
) -> ApiResult<Activity> {
    req.validate()?;
    let activity = service(&state).update_activity(&activity_id, req).await?;
    ok(activity, "Activity updated successfully")
}

pub(super) async fn delete_activity(
    State(state): State<AppState>,
    Path(activity_id): Path<String>,
) -> ApiResult<()> {
    service(&state).delete_activity(&activity_id).await?;
    Ok(axum::Json(ApiResponse::message("Activity deleted successfully")))
}
