use async_trait::async_trait;
use axum::http::HeaderMap;
use serde::Serialize;

use crate::error::AppError;
use crate::models::UserRole;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// The authenticated caller of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Actor {
    pub id: String,
    pub role: UserRole,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: UserRole) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }

    pub fn require_instructor(&self, action: &str) -> Result<(), AppError> {
        if self.role == UserRole::Instructor {
            Ok(())
        } else {
            tracing::warn!("{} rejected for non-instructor {}", action, self.id);
            Err(AppError::Forbidden(format!("only instructors may {}", action)))
        }
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn authenticate(&self, headers: &HeaderMap) -> Result<Actor, AppError>;
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn parse_role(raw: &str) -> Result<UserRole, AppError> {
    match raw.to_ascii_lowercase().as_str() {
        "student" => Ok(UserRole::Student),
        "instructor" | "professor" => Ok(UserRole::Instructor),
        _ => Err(AppError::Unauthorized),
    }
}

/// Trusts the caller id and role forwarded by an upstream gateway.
pub struct HeaderIdentityProvider;

#[async_trait]
impl IdentityProvider for HeaderIdentityProvider {
    async fn authenticate(&self, headers: &HeaderMap) -> Result<Actor, AppError> {
        let id = header_str(headers, USER_ID_HEADER).ok_or(AppError::Unauthorized)?;
        let role = header_str(headers, USER_ROLE_HEADER).ok_or(AppError::Unauthorized)?;
        Ok(Actor::new(id, parse_role(role)?))
    }
}

/// Fixed development identities: `professor-1` by default, `student-1` when
/// the request asks for the student role.
pub struct StaticIdentityProvider;

impl StaticIdentityProvider {
    pub const INSTRUCTOR_ID: &'static str = "professor-1";
    pub const STUDENT_ID: &'static str = "student-1";
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn authenticate(&self, headers: &HeaderMap) -> Result<Actor, AppError> {
        let role = match header_str(headers, USER_ROLE_HEADER) {
            Some(raw) => parse_role(raw)?,
            None => UserRole::Instructor,
        };
        let id = match role {
            UserRole::Instructor => Self::INSTRUCTOR_ID,
            UserRole::Student => Self::STUDENT_ID,
        };
        Ok(Actor::new(id, role))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[tokio::test]
    async fn test_header_provider_requires_both_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("u-1"));
        let err = HeaderIdentityProvider.authenticate(&headers).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));

        headers.insert(USER_ROLE_HEADER, HeaderValue::from_static("professor"));
        let actor = HeaderIdentityProvider.authenticate(&headers).await.unwrap();
        assert_eq!(actor, Actor::new("u-1", UserRole::Instructor));
    }

    #[tokio::test]
    async fn test_static_provider_identities() {
        let actor = StaticIdentityProvider.authenticate(&HeaderMap::new()).await.unwrap();
        assert_eq!(actor.id, "professor-1");

        let mut headers = HeaderMap::new();
        headers.insert(USER_ROLE_HEADER, HeaderValue::from_static("student"));
        let actor = StaticIdentityProvider.authenticate(&headers).await.unwrap();
        assert_eq!(actor, Actor::new("student-1", UserRole::Student));
    }

    #[test]
    fn test_require_instructor() {
        assert!(Actor::new("p", UserRole::Instructor).require_instructor("grade").is_ok());
        let err = Actor::new("s", UserRole::Student).require_instructor("grade").unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}
