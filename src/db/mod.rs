pub mod assignments;
pub mod catalog;
pub mod forum;
pub mod generative_tasks;
pub mod ledger;
pub mod users;

use std::collections::HashMap;

use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

/// Groups child rows by their parent id, preserving query order inside each group.
pub(crate) fn group_by_parent<T>(
    rows: Vec<T>,
    parent_id: impl Fn(&T) -> Option<&str>,
) -> HashMap<String, Vec<T>> {
    let mut grouped: HashMap<String, Vec<T>> = HashMap::new();
    for row in rows {
        if let Some(key) = parent_id(&row).map(str::to_string) {
            grouped.entry(key).or_default().push(row);
        }
    }
    grouped
}

pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

pub async fn migrate(db: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(db).await
}

/// Single-connection in-memory database with the schema applied.
pub async fn memory_pool() -> Result<SqlitePool, crate::error::AppError> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;
    migrate(&pool).await?;
    Ok(pool)
}
