use sqlx::types::Json;
use sqlx::{Executor, Sqlite, SqlitePool};

use crate::models::{GenerativeTask, GenerativeTaskSubmission, TestCase};

const TASK_COLUMNS: &str = "id, activity_id, student_id, title, description, requirements, \
    difficulty, estimated_time, hints, created_at, updated_at";

const SUBMISSION_COLUMNS: &str = "id, task_id, student_id, code, score, feedback, created_at";

pub async fn find_task_by_id(
    db: &SqlitePool,
    id: &str,
) -> Result<Option<GenerativeTask>, sqlx::Error> {
    sqlx::query_as::<_, GenerativeTask>(&format!(
        "SELECT {TASK_COLUMNS} FROM generative_tasks WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn insert_task(db: &SqlitePool, task: &GenerativeTask) -> Result<(), sqlx::Error> {
    sqlx::query(&format!(
        "INSERT INTO generative_tasks ({TASK_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    ))
    .bind(&task.id)
    .bind(&task.activity_id)
    .bind(&task.student_id)
    .bind(&task.title)
    .bind(&task.description)
    .bind(Json(&task.requirements))
    .bind(task.difficulty)
    .bind(task.estimated_time)
    .bind(Json(&task.hints))
    .bind(task.created_at)
    .bind(task.updated_at)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn find_submission_by_id(
    db: &SqlitePool,
    id: &str,
) -> Result<Option<GenerativeTaskSubmission>, sqlx::Error> {
    let submission = sqlx::query_as::<_, GenerativeTaskSubmission>(&format!(
        "SELECT {SUBMISSION_COLUMNS} FROM generative_task_submissions WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;

    let Some(mut submission) = submission else {
        return Ok(None);
    };
    submission.test_cases = sqlx::query_as::<_, TestCase>(
        "SELECT id, submission_id, name, passed FROM test_cases \
         WHERE submission_id = ? ORDER BY position",
    )
    .bind(id)
    .fetch_all(db)
    .await?;
    Ok(Some(submission))
}

pub async fn insert_submission<'e, E>(
    db: E,
    submission: &GenerativeTaskSubmission,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(&format!(
        "INSERT INTO generative_task_submissions ({SUBMISSION_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?)"
    ))
    .bind(&submission.id)
    .bind(&submission.task_id)
    .bind(&submission.student_id)
    .bind(&submission.code)
    .bind(submission.score)
    .bind(&submission.feedback)
    .bind(submission.created_at)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn insert_test_case<'e, E>(
    db: E,
    test_case: &TestCase,
    position: i64,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        "INSERT INTO test_cases (id, submission_id, name, passed, position) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&test_case.id)
    .bind(&test_case.submission_id)
    .bind(&test_case.name)
    .bind(test_case.passed)
    .bind(position)
    .execute(db)
    .await?;
    Ok(())
}
