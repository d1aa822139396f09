#![allow(dead_code)]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use skillspace::config::Policy;
use skillspace::{AppState, db, router};

pub const INSTRUCTOR: (&str, &str) = ("professor-1", "instructor");
pub const STUDENT: (&str, &str) = ("student-1", "student");

pub async fn create_test_app() -> Router {
    create_test_app_with(Policy::default()).await
}

pub async fn create_test_app_with(policy: Policy) -> Router {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    let pool = db::memory_pool().await.expect("Failed to create test database");
    router(AppState::local(pool, policy))
}

/// Sends one request and returns the status with the decoded JSON body
/// (`Value::Null` when the body is empty).
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    actor: Option<(&str, &str)>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some((id, role)) = actor {
        builder = builder.header("x-user-id", id).header("x-user-role", role);
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            panic!("non-JSON body: {}", String::from_utf8_lossy(&bytes))
        })
    };
    (status, json)
}

pub fn course_body(title: &str, max_students: i64) -> Value {
    serde_json::json!({
        "title": title,
        "description": "Introduction to programming",
        "category": "Computer Science",
        "level": "beginner",
        "duration": "12 weeks",
        "maxStudents": max_students,
        "startDate": "2025-09-01",
        "endDate": "2025-12-15",
        "syllabus": ["Variables", "Control flow"]
    })
}

/// Creates a course as the instructor and returns its id.
pub async fn create_course(app: &Router, title: &str, max_students: i64) -> String {
    let (status, json) = send(
        app,
        "POST",
        "/api/courses",
        Some(course_body(title, max_students)),
        Some(INSTRUCTOR),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", json);
    json["data"]["id"].as_str().unwrap().to_string()
}

pub fn id_of(json: &Value) -> String {
    json["data"]["id"].as_str().unwrap().to_string()
}
