use sqlx::types::Json;
use sqlx::{Executor, Sqlite, SqlitePool};

use crate::db::group_by_parent;
use crate::models::{Activity, Course, Resource, Section};

const COURSE_COLUMNS: &str = "id, title, description, instructor_id, category, level, duration, \
    enrolled_students, max_students, start_date, end_date, status, syllabus, created_at, updated_at";

const RESOURCE_COLUMNS: &str =
    "id, course_id, title, resource_type, url, description, uploaded_at";

const SECTION_COLUMNS: &str =
    "id, course_id, title, description, sort_order, visible, created_at, updated_at";

const ACTIVITY_COLUMNS: &str = "a.id, a.section_id, a.title, a.description, a.activity_type, \
    a.sort_order, a.visible, a.completed, a.due_date, a.available_from, a.available_until, \
    a.metadata, a.created_at, a.updated_at";

pub async fn fetch_courses(db: &SqlitePool) -> Result<Vec<Course>, sqlx::Error> {
    let mut courses = sqlx::query_as::<_, Course>(&format!(
        "SELECT {COURSE_COLUMNS} FROM courses ORDER BY created_at, id"
    ))
    .fetch_all(db)
    .await?;

    let resources = sqlx::query_as::<_, Resource>(&format!(
        "SELECT {RESOURCE_COLUMNS} FROM resources ORDER BY uploaded_at, id"
    ))
    .fetch_all(db)
    .await?;
    let mut by_course = group_by_parent(resources, |r| Some(r.course_id.as_str()));

    for course in &mut courses {
        course.resources = by_course.remove(&course.id).unwrap_or_default();
    }
    Ok(courses)
}

pub async fn find_course_by_id(db: &SqlitePool, id: &str) -> Result<Option<Course>, sqlx::Error> {
    let course = sqlx::query_as::<_, Course>(&format!(
        "SELECT {COURSE_COLUMNS} FROM courses WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;

    let Some(mut course) = course else {
        return Ok(None);
    };
    course.resources = fetch_resources_for_course(db, id).await?;
    Ok(Some(course))
}

pub async fn insert_course<'e, E>(db: E, course: &Course) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(&format!(
        "INSERT INTO courses ({COURSE_COLUMNS}) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    ))
    .bind(&course.id)
    .bind(&course.title)
    .bind(&course.description)
    .bind(&course.instructor_id)
    .bind(&course.category)
    .bind(&course.level)
    .bind(&course.duration)
    .bind(Json(&course.enrolled_students))
    .bind(course.max_students)
    .bind(&course.start_date)
    .bind(&course.end_date)
    .bind(course.status)
    .bind(Json(&course.syllabus))
    .bind(course.created_at)
    .bind(course.updated_at)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn update_course<'e, E>(db: E, course: &Course) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        UPDATE courses
        SET title = ?, description = ?, category = ?, level = ?, duration = ?,
            enrolled_students = ?, max_students = ?, start_date = ?, end_date = ?,
            status = ?, syllabus = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&course.title)
    .bind(&course.description)
    .bind(&course.category)
    .bind(&course.level)
    .bind(&course.duration)
    .bind(Json(&course.enrolled_students))
    .bind(course.max_students)
    .bind(&course.start_date)
    .bind(&course.end_date)
    .bind(course.status)
    .bind(Json(&course.syllabus))
    .bind(course.updated_at)
    .bind(&course.id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Removes the course row only; sections, activities and resources stay behind.
pub async fn delete_course(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM courses WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn fetch_resources_for_course(
    db: &SqlitePool,
    course_id: &str,
) -> Result<Vec<Resource>, sqlx::Error> {
    sqlx::query_as::<_, Resource>(&format!(
        "SELECT {RESOURCE_COLUMNS} FROM resources WHERE course_id = ? ORDER BY uploaded_at, id"
    ))
    .bind(course_id)
    .fetch_all(db)
    .await
}

pub async fn insert_resource(db: &SqlitePool, resource: &Resource) -> Result<(), sqlx::Error> {
    sqlx::query(&format!(
        "INSERT INTO resources ({RESOURCE_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?)"
    ))
    .bind(&resource.id)
    .bind(&resource.course_id)
    .bind(&resource.title)
    .bind(&resource.resource_type)
    .bind(&resource.url)
    .bind(&resource.description)
    .bind(resource.uploaded_at)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn fetch_sections_by_course(
    db: &SqlitePool,
    course_id: &str,
) -> Result<Vec<Section>, sqlx::Error> {
    let mut sections = sqlx::query_as::<_, Section>(&format!(
        "SELECT {SECTION_COLUMNS} FROM sections WHERE course_id = ? ORDER BY sort_order, created_at"
    ))
    .bind(course_id)
    .fetch_all(db)
    .await?;

    let activities = sqlx::query_as::<_, Activity>(&format!(
        "SELECT {ACTIVITY_COLUMNS} FROM activities a \
         JOIN sections s ON s.id = a.section_id \
         WHERE s.course_id = ? ORDER BY a.sort_order, a.created_at"
    ))
    .bind(course_id)
    .fetch_all(db)
    .await?;
    let mut by_section = group_by_parent(activities, |a| Some(a.section_id.as_str()));

    for section in &mut sections {
        section.activities = by_section.remove(&section.id).unwrap_or_default();
    }
    Ok(sections)
}

pub async fn find_section_by_id(db: &SqlitePool, id: &str) -> Result<Option<Section>, sqlx::Error> {
    sqlx::query_as::<_, Section>(&format!("SELECT {SECTION_COLUMNS} FROM sections WHERE id = ?"))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn insert_section(db: &SqlitePool, section: &Section) -> Result<(), sqlx::Error> {
    sqlx::query(&format!(
        "INSERT INTO sections ({SECTION_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"
    ))
    .bind(&section.id)
    .bind(&section.course_id)
    .bind(&section.title)
    .bind(&section.description)
    .bind(section.order)
    .bind(section.visible)
    .bind(section.created_at)
    .bind(section.updated_at)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn find_activity_by_id(
    db: &SqlitePool,
    id: &str,
) -> Result<Option<Activity>, sqlx::Error> {
    sqlx::query_as::<_, Activity>(&format!(
        "SELECT {ACTIVITY_COLUMNS} FROM activities a WHERE a.id = ?"
    ))
    .bind(id)
    .fetch_optional(db)
    .await
}

/// Activity lookup constrained to the course that owns its section.
pub async fn find_course_activity(
    db: &SqlitePool,
    course_id: &str,
    activity_id: &str,
) -> Result<Option<Activity>, sqlx::Error> {
    sqlx::query_as::<_, Activity>(&format!(
        "SELECT {ACTIVITY_COLUMNS} FROM activities a \
         JOIN sections s ON s.id = a.section_id \
         WHERE a.id = ? AND s.course_id = ?"
    ))
    .bind(activity_id)
    .bind(course_id)
    .fetch_optional(db)
    .await
}

pub async fn insert_activity(db: &SqlitePool, activity: &Activity) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO activities
            (id, section_id, title, description, activity_type, sort_order, visible,
            completed, due_date, available_from, available_until, metadata,
            created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&activity.id)
    .bind(&activity.section_id)
    .bind(&activity.title)
    .bind(&activity.description)
    .bind(activity.activity_type)
    .bind(activity.order)
    .bind(activity.visible)
    .bind(activity.completed)
    .bind(&activity.due_date)
    .bind(&activity.available_from)
    .bind(&activity.available_until)
    .bind(Json(&activity.metadata))
    .bind(activity.created_at)
    .bind(activity.updated_at)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn update_activity(db: &SqlitePool, activity: &Activity) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE activities
        SET title = ?, description = ?, activity_type = ?, sort_order = ?, visible = ?,
            completed = ?, due_date = ?, available_from = ?, available_until = ?,
            metadata = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&activity.title)
    .bind(&activity.description)
    .bind(activity.activity_type)
    .bind(activity.order)
    .bind(activity.visible)
    .bind(activity.completed)
    .bind(&activity.due_date)
    .bind(&activity.available_from)
    .bind(&activity.available_until)
    .bind(Json(&activity.metadata))
    .bind(activity.updated_at)
    .bind(&activity.id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_activity(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM activities WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
