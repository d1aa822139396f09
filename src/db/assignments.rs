use sqlx::{Executor, Sqlite, SqlitePool};

use crate::db::group_by_parent;
use crate::models::{Assignment, Attachment, Submission};

const ASSIGNMENT_COLUMNS: &str = "id, title, description, course_id, instructor_id, \
    assignment_type, total_points, due_date, status, instructions, created_at, updated_at";

const SUBMISSION_COLUMNS: &str = "id, assignment_id, student_id, content, score, feedback, \
    status, graded_by, submitted_at, graded_at";

const ATTACHMENT_COLUMNS: &str = "id, assignment_id, submission_id, title, attachment_type, \
    url, description, uploaded_at";

pub async fn fetch_assignments(db: &SqlitePool) -> Result<Vec<Assignment>, sqlx::Error> {
    let assignments = sqlx::query_as::<_, Assignment>(&format!(
        "SELECT {ASSIGNMENT_COLUMNS} FROM assignments ORDER BY created_at, id"
    ))
    .fetch_all(db)
    .await?;

    let attachments = sqlx::query_as::<_, Attachment>(&format!(
        "SELECT {ATTACHMENT_COLUMNS} FROM attachments ORDER BY uploaded_at, id"
    ))
    .fetch_all(db)
    .await?;
    let submissions = sqlx::query_as::<_, Submission>(&format!(
        "SELECT {SUBMISSION_COLUMNS} FROM submissions ORDER BY submitted_at, id"
    ))
    .fetch_all(db)
    .await?;

    Ok(assemble(assignments, submissions, attachments))
}

pub async fn find_assignment_by_id(
    db: &SqlitePool,
    id: &str,
) -> Result<Option<Assignment>, sqlx::Error> {
    let Some(assignment) = find_assignment_row(db, id).await? else {
        return Ok(None);
    };

    let submissions = sqlx::query_as::<_, Submission>(&format!(
        "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE assignment_id = ? \
         ORDER BY submitted_at, id"
    ))
    .bind(id)
    .fetch_all(db)
    .await?;

    let attachments = sqlx::query_as::<_, Attachment>(&format!(
        "SELECT {ATTACHMENT_COLUMNS} FROM attachments \
         WHERE assignment_id = ? \
            OR submission_id IN (SELECT id FROM submissions WHERE assignment_id = ?) \
         ORDER BY uploaded_at, id"
    ))
    .bind(id)
    .bind(id)
    .fetch_all(db)
    .await?;

    Ok(assemble(vec![assignment], submissions, attachments).pop())
}

/// The assignment row without its attachments and submissions.
pub async fn find_assignment_row(
    db: &SqlitePool,
    id: &str,
) -> Result<Option<Assignment>, sqlx::Error> {
    sqlx::query_as::<_, Assignment>(&format!(
        "SELECT {ASSIGNMENT_COLUMNS} FROM assignments WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(db)
    .await
}

fn assemble(
    mut assignments: Vec<Assignment>,
    submissions: Vec<Submission>,
    attachments: Vec<Attachment>,
) -> Vec<Assignment> {
    let (for_submissions, for_assignments): (Vec<_>, Vec<_>) = attachments
        .into_iter()
        .partition(|a| a.submission_id.is_some());

    let mut by_submission = group_by_parent(for_submissions, |a| a.submission_id.as_deref());
    let mut by_assignment = group_by_parent(for_assignments, |a| a.assignment_id.as_deref());

    let submissions: Vec<Submission> = submissions
        .into_iter()
        .map(|mut s| {
            s.attachments = by_submission.remove(&s.id).unwrap_or_default();
            s
        })
        .collect();
    let mut submissions_by_assignment =
        group_by_parent(submissions, |s| Some(s.assignment_id.as_str()));

    for assignment in &mut assignments {
        assignment.attachments = by_assignment.remove(&assignment.id).unwrap_or_default();
        assignment.submissions = submissions_by_assignment
            .remove(&assignment.id)
            .unwrap_or_default();
    }
    assignments
}

pub async fn insert_assignment<'e, E>(db: E, assignment: &Assignment) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(&format!(
        "INSERT INTO assignments ({ASSIGNMENT_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    ))
    .bind(&assignment.id)
    .bind(&assignment.title)
    .bind(&assignment.description)
    .bind(&assignment.course_id)
    .bind(&assignment.instructor_id)
    .bind(assignment.assignment_type)
    .bind(assignment.total_points)
    .bind(&assignment.due_date)
    .bind(assignment.status)
    .bind(&assignment.instructions)
    .bind(assignment.created_at)
    .bind(assignment.updated_at)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn update_assignment(db: &SqlitePool, assignment: &Assignment) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE assignments
        SET title = ?, description = ?, instructions = ?, total_points = ?,
            due_date = ?, status = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&assignment.title)
    .bind(&assignment.description)
    .bind(&assignment.instructions)
    .bind(assignment.total_points)
    .bind(&assignment.due_date)
    .bind(assignment.status)
    .bind(assignment.updated_at)
    .bind(&assignment.id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn insert_attachment<'e, E>(db: E, attachment: &Attachment) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(&format!(
        "INSERT INTO attachments ({ATTACHMENT_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"
    ))
    .bind(&attachment.id)
    .bind(&attachment.assignment_id)
    .bind(&attachment.submission_id)
    .bind(&attachment.title)
    .bind(&attachment.attachment_type)
    .bind(&attachment.url)
    .bind(&attachment.description)
    .bind(attachment.uploaded_at)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn find_submission_by_id(
    db: &SqlitePool,
    id: &str,
) -> Result<Option<Submission>, sqlx::Error> {
    let submission = sqlx::query_as::<_, Submission>(&format!(
        "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;

    let Some(mut submission) = submission else {
        return Ok(None);
    };
    submission.attachments = sqlx::query_as::<_, Attachment>(&format!(
        "SELECT {ATTACHMENT_COLUMNS} FROM attachments WHERE submission_id = ? ORDER BY uploaded_at, id"
    ))
    .bind(id)
    .fetch_all(db)
    .await?;
    Ok(Some(submission))
}

pub async fn insert_submission<'e, E>(db: E, submission: &Submission) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(&format!(
        "INSERT INTO submissions ({SUBMISSION_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    ))
    .bind(&submission.id)
    .bind(&submission.assignment_id)
    .bind(&submission.student_id)
    .bind(&submission.content)
    .bind(submission.score)
    .bind(&submission.feedback)
    .bind(submission.status)
    .bind(&submission.graded_by)
    .bind(submission.submitted_at)
    .bind(submission.graded_at)
    .execute(db)
    .await?;
    Ok(())
}

/// Writes the grading fields; last write wins.
pub async fn update_submission_grade<'e, E>(
    db: E,
    submission: &Submission,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        UPDATE submissions
        SET score = ?, feedback = ?, status = ?, graded_by = ?, graded_at = ?
        WHERE id = ?
        "#,
    )
    .bind(submission.score)
    .bind(&submission.feedback)
    .bind(submission.status)
    .bind(&submission.graded_by)
    .bind(submission.graded_at)
    .bind(&submission.id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}
