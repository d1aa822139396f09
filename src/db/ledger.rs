use sqlx::{Executor, Sqlite, SqlitePool};

use crate::models::{Enrollment, EnrollmentStatus, Grade};

const GRADE_COLUMNS: &str = "id, student_id, student_name, assignment_id, assignment_title, \
    course_id, course_name, score, total_points, letter_grade, feedback, graded_by, graded_at, \
    created_at, updated_at";

const ENROLLMENT_COLUMNS: &str = "id, student_id, course_id, enrolled_at, status, progress, \
    last_accessed, created_at, updated_at";

pub async fn fetch_grades(db: &SqlitePool) -> Result<Vec<Grade>, sqlx::Error> {
    sqlx::query_as::<_, Grade>(&format!(
        "SELECT {GRADE_COLUMNS} FROM grades ORDER BY graded_at, id"
    ))
    .fetch_all(db)
    .await
}

pub async fn fetch_grades_by_student(
    db: &SqlitePool,
    student_id: &str,
) -> Result<Vec<Grade>, sqlx::Error> {
    sqlx::query_as::<_, Grade>(&format!(
        "SELECT {GRADE_COLUMNS} FROM grades WHERE student_id = ? ORDER BY graded_at, id"
    ))
    .bind(student_id)
    .fetch_all(db)
    .await
}

pub async fn insert_grade<'e, E>(db: E, grade: &Grade) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(&format!(
        "INSERT INTO grades ({GRADE_COLUMNS}) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    ))
    .bind(&grade.id)
    .bind(&grade.student_id)
    .bind(&grade.student_name)
    .bind(&grade.assignment_id)
    .bind(&grade.assignment_title)
    .bind(&grade.course_id)
    .bind(&grade.course_name)
    .bind(grade.score)
    .bind(grade.total_points)
    .bind(&grade.letter_grade)
    .bind(&grade.feedback)
    .bind(&grade.graded_by)
    .bind(grade.graded_at)
    .bind(grade.created_at)
    .bind(grade.updated_at)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn fetch_enrollments(db: &SqlitePool) -> Result<Vec<Enrollment>, sqlx::Error> {
    sqlx::query_as::<_, Enrollment>(&format!(
        "SELECT {ENROLLMENT_COLUMNS} FROM enrollments ORDER BY enrolled_at, id"
    ))
    .fetch_all(db)
    .await
}

pub async fn fetch_enrollments_by_student(
    db: &SqlitePool,
    student_id: &str,
) -> Result<Vec<Enrollment>, sqlx::Error> {
    sqlx::query_as::<_, Enrollment>(&format!(
        "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE student_id = ? ORDER BY enrolled_at, id"
    ))
    .bind(student_id)
    .fetch_all(db)
    .await
}

pub async fn find_enrollment_by_id(
    db: &SqlitePool,
    id: &str,
) -> Result<Option<Enrollment>, sqlx::Error> {
    sqlx::query_as::<_, Enrollment>(&format!(
        "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn count_active_enrollments<'e, E>(
    db: E,
    course_id: &str,
    student_id: Option<&str>,
) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM enrollments
        WHERE course_id = ?1 AND status = ?2 AND (?3 IS NULL OR student_id = ?3)
        "#,
    )
    .bind(course_id)
    .bind(EnrollmentStatus::Active)
    .bind(student_id)
    .fetch_one(db)
    .await
}

pub async fn insert_enrollment<'e, E>(db: E, enrollment: &Enrollment) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(&format!(
        "INSERT INTO enrollments ({ENROLLMENT_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"
    ))
    .bind(&enrollment.id)
    .bind(&enrollment.student_id)
    .bind(&enrollment.course_id)
    .bind(enrollment.enrolled_at)
    .bind(enrollment.status)
    .bind(enrollment.progress)
    .bind(enrollment.last_accessed)
    .bind(enrollment.created_at)
    .bind(enrollment.updated_at)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn update_enrollment(db: &SqlitePool, enrollment: &Enrollment) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE enrollments
        SET status = ?, progress = ?, last_accessed = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(enrollment.status)
    .bind(enrollment.progress)
    .bind(enrollment.last_accessed)
    .bind(enrollment.updated_at)
    .bind(&enrollment.id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}
