use sqlx::SqlitePool;

use crate::models::User;

const USER_COLUMNS: &str = "id, name, email, role, avatar, bio, department, phone, address, \
    last_login, created_at, updated_at";

pub async fn fetch_users(db: &SqlitePool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at, id"))
        .fetch_all(db)
        .await
}

pub async fn find_user_by_id(db: &SqlitePool, id: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn find_user_by_email(db: &SqlitePool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
        .bind(email)
        .fetch_optional(db)
        .await
}

pub async fn insert_user(db: &SqlitePool, user: &User) -> Result<(), sqlx::Error> {
    sqlx::query(&format!(
        "INSERT INTO users ({USER_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    ))
    .bind(&user.id)
    .bind(&user.name)
    .bind(&user.email)
    .bind(user.role)
    .bind(&user.avatar)
    .bind(&user.profile.bio)
    .bind(&user.profile.department)
    .bind(&user.profile.phone)
    .bind(&user.profile.address)
    .bind(user.last_login)
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn update_user(db: &SqlitePool, user: &User) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET name = ?, email = ?, avatar = ?, bio = ?, department = ?, phone = ?,
            address = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.avatar)
    .bind(&user.profile.bio)
    .bind(&user.profile.department)
    .bind(&user.profile.phone)
    .bind(&user.profile.address)
    .bind(user.updated_at)
    .bind(&user.id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}
