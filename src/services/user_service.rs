use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::db::users;
use crate::error::AppError;
use crate::ids::generate_id;
use crate::models::{NewUserRequest, UpdateUserRequest, User};

const DUPLICATE_EMAIL: &str = "a user with this email already exists";

pub struct UserService {
    db: SqlitePool,
}

impl UserService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let users = users::fetch_users(&self.db).await?;
        debug!("loaded {} users", users.len());
        Ok(users)
    }

    pub async fn get_user(&self, id: &str) -> Result<User, AppError> {
        users::find_user_by_id(&self.db, id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<User, AppError> {
        users::find_user_by_email(&self.db, email)
            .await?
            .ok_or_else(|| AppError::not_found("User"))
    }

    pub async fn create_user(&self, req: NewUserRequest) -> Result<User, AppError> {
        let now = Utc::now();
        let user = User {
            id: generate_id(),
            name: req.name,
            email: req.email,
            role: req.role,
            avatar: req.avatar,
            profile: req.profile,
            last_login: None,
            created_at: now,
            updated_at: now,
        };
        users::insert_user(&self.db, &user)
            .await
            .map_err(|e| AppError::from_unique_violation(e, DUPLICATE_EMAIL))?;
        info!("created {:?} user {}", user.role, user.id);
        Ok(user)
    }

    pub async fn update_user(&self, id: &str, req: UpdateUserRequest) -> Result<User, AppError> {
        let mut user = self.get_user(id).await?;

        if let Some(name) = req.name {
            user.name = name;
        }
        if let Some(email) = req.email {
            user.email = email;
        }
        if let Some(avatar) = req.avatar {
            user.avatar = avatar;
        }
        if let Some(profile) = req.profile {
            user.profile = profile;
        }
        user.updated_at = Utc::now();

        let updated = users::update_user(&self.db, &user)
            .await
            .map_err(|e| AppError::from_unique_violation(e, DUPLICATE_EMAIL))?;
        if !updated {
            return Err(AppError::not_found("User"));
        }
        info!("updated user {}", user.id);
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory_pool;
    use crate::models::{UserProfile, UserRole};

    fn user_request(email: &str) -> NewUserRequest {
        NewUserRequest {
            name: "Ada Lovelace".to_string(),
            email: email.to_string(),
            role: UserRole::default(),
            avatar: String::new(),
            profile: UserProfile {
                department: "Mathematics".to_string(),
                ..Default::default()
            },
        }
    }

    async fn service() -> UserService {
        UserService::new(memory_pool().await.unwrap())
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let service = service().await;
        let user = service.create_user(user_request("ada@example.com")).await.unwrap();
        assert_eq!(user.role, UserRole::Student);

        let by_id = service.get_user(&user.id).await.unwrap();
        assert_eq!(by_id.profile.department, "Mathematics");
        let by_email = service.get_user_by_email("ada@example.com").await.unwrap();
        assert_eq!(by_email.id, user.id);
        assert_eq!(service.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let service = service().await;
        service.create_user(user_request("ada@example.com")).await.unwrap();
        let err = service.create_user(user_request("ada@example.com")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let other = service.create_user(user_request("grace@example.com")).await.unwrap();
        let err = service
            .update_user(
                &other.id,
                UpdateUserRequest {
                    email: Some("ada@example.com".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_partial_update() {
        let service = service().await;
        let user = service.create_user(user_request("ada@example.com")).await.unwrap();

        let updated = service
            .update_user(
                &user.id,
                UpdateUserRequest {
                    name: Some("Ada King".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Ada King");
        assert_eq!(updated.email, "ada@example.com");
        assert_eq!(updated.profile.department, "Mathematics");

        let err = service
            .update_user("missing", UpdateUserRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
