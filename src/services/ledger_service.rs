use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::config::Policy;
use crate::db::{assignments, catalog, ledger, users};
use crate::error::AppError;
use crate::ids::generate_id;
use crate::models::{
    Assignment, Enrollment, EnrollmentStatus, Grade, NewEnrollmentRequest, RecordGradeRequest,
    UpdateEnrollmentRequest, letter_grade,
};

/// Inputs for one grade ledger entry.
pub struct GradeEntry<'a> {
    pub student_id: &'a str,
    pub student_name: String,
    pub score: i64,
    pub feedback: String,
    pub graded_by: &'a str,
    pub graded_at: DateTime<Utc>,
}

/// Builds a ledger row for `assignment`; the letter grade is derived from the
/// assignment's total points.
pub fn build_grade(assignment: &Assignment, course_name: String, entry: GradeEntry<'_>) -> Grade {
    let now = Utc::now();
    Grade {
        id: generate_id(),
        student_id: entry.student_id.to_string(),
        student_name: entry.student_name,
        assignment_id: assignment.id.clone(),
        assignment_title: assignment.title.clone(),
        course_id: assignment.course_id.clone(),
        course_name,
        score: entry.score,
        total_points: assignment.total_points,
        letter_grade: letter_grade(entry.score, assignment.total_points).to_string(),
        feedback: entry.feedback,
        graded_by: entry.graded_by.to_string(),
        graded_at: entry.graded_at,
        created_at: now,
        updated_at: now,
    }
}

pub(crate) fn check_score(score: i64, total_points: i64) -> Result<(), AppError> {
    if !(0..=total_points).contains(&score) {
        return Err(AppError::Validation(format!(
            "score must be between 0 and {}",
            total_points
        )));
    }
    Ok(())
}

pub(crate) async fn course_name(db: &SqlitePool, course_id: &str) -> Result<String, AppError> {
    Ok(catalog::find_course_by_id(db, course_id)
        .await?
        .map(|c| c.title)
        .unwrap_or_default())
}

pub(crate) async fn student_name(db: &SqlitePool, student_id: &str) -> Result<String, AppError> {
    Ok(users::find_user_by_id(db, student_id)
        .await?
        .map(|u| u.name)
        .unwrap_or_default())
}

/// Grade records and enrollments.
pub struct LedgerService {
    db: SqlitePool,
    policy: Policy,
}

impl LedgerService {
    pub fn new(db: SqlitePool, policy: Policy) -> Self {
        Self { db, policy }
    }

    pub async fn list_grades(&self) -> Result<Vec<Grade>, AppError> {
        let grades = ledger::fetch_grades(&self.db).await?;
        debug!("loaded {} grades", grades.len());
        Ok(grades)
    }

    pub async fn grades_by_student(&self, student_id: &str) -> Result<Vec<Grade>, AppError> {
        Ok(ledger::fetch_grades_by_student(&self.db, student_id).await?)
    }

    pub async fn record_grade(
        &self,
        graded_by: &str,
        req: RecordGradeRequest,
    ) -> Result<Grade, AppError> {
        let assignment = assignments::find_assignment_row(&self.db, &req.assignment_id)
            .await?
            .ok_or_else(|| AppError::not_found("Assignment"))?;
        check_score(req.score, assignment.total_points)?;

        let student_name = if req.student_name.is_empty() {
            student_name(&self.db, &req.student_id).await?
        } else {
            req.student_name
        };
        let course_name = course_name(&self.db, &assignment.course_id).await?;

        let grade = build_grade(
            &assignment,
            course_name,
            GradeEntry {
                student_id: &req.student_id,
                student_name,
                score: req.score,
                feedback: req.feedback,
                graded_by,
                graded_at: Utc::now(),
            },
        );
        ledger::insert_grade(&self.db, &grade).await?;
        info!(
            "recorded grade {} for student {} on assignment {}",
            grade.letter_grade, grade.student_id, grade.assignment_id
        );
        Ok(grade)
    }

    pub async fn list_enrollments(&self, student_id: Option<&str>) -> Result<Vec<Enrollment>, AppError> {
        let enrollments = match student_id {
            Some(student_id) => ledger::fetch_enrollments_by_student(&self.db, student_id).await?,
            None => ledger::fetch_enrollments(&self.db).await?,
        };
        debug!("loaded {} enrollments", enrollments.len());
        Ok(enrollments)
    }

    /// Without policies a repeated (student, course) pair yields another record.
    pub async fn create_enrollment(&self, req: NewEnrollmentRequest) -> Result<Enrollment, AppError> {
        let course = if self.policy.enforce_capacity {
            let course = catalog::find_course_by_id(&self.db, &req.course_id)
                .await?
                .ok_or_else(|| AppError::not_found("Course"))?;
            Some(course)
        } else {
            None
        };

        let mut tx = self.db.begin().await?;

        if let Some(course) = course {
            let active = ledger::count_active_enrollments(&mut *tx, &course.id, None).await?;
            if active >= course.max_students {
                warn!("course {} is full ({} of {})", course.id, active, course.max_students);
                return Err(AppError::Conflict(format!(
                    "course {} has reached its capacity of {}",
                    course.id, course.max_students
                )));
            }
        }

        if self.policy.unique_enrollment {
            let existing =
                ledger::count_active_enrollments(&mut *tx, &req.course_id, Some(req.student_id.as_str()))
                    .await?;
            if existing > 0 {
                warn!("student {} already enrolled in {}", req.student_id, req.course_id);
                return Err(AppError::Conflict(format!(
                    "student {} already has an active enrollment in course {}",
                    req.student_id, req.course_id
                )));
            }
        }

        let now = Utc::now();
        let enrollment = Enrollment {
            id: generate_id(),
            student_id: req.student_id,
            course_id: req.course_id,
            enrolled_at: now,
            status: EnrollmentStatus::Active,
            progress: 0,
            last_accessed: None,
            created_at: now,
            updated_at: now,
        };
        ledger::insert_enrollment(&mut *tx, &enrollment).await?;
        tx.commit().await?;

        info!(
            "enrolled student {} in course {} ({})",
            enrollment.student_id, enrollment.course_id, enrollment.id
        );
        Ok(enrollment)
    }

    pub async fn update_enrollment(
        &self,
        id: &str,
        req: UpdateEnrollmentRequest,
    ) -> Result<Enrollment, AppError> {
        let mut enrollment = ledger::find_enrollment_by_id(&self.db, id)
            .await?
            .ok_or_else(|| AppError::not_found("Enrollment"))?;

        if let Some(status) = req.status {
            enrollment.status = status;
        }
        if let Some(progress) = req.progress {
            enrollment.progress = progress;
        }
        let now = Utc::now();
        enrollment.last_accessed = Some(now);
        enrollment.updated_at = now;

        if !ledger::update_enrollment(&self.db, &enrollment).await? {
            return Err(AppError::not_found("Enrollment"));
        }
        info!(
            "enrollment {} is {:?} at {}%",
            enrollment.id, enrollment.status, enrollment.progress
        );
        Ok(enrollment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory_pool;
    use crate::models::{AssignmentStatus, AssignmentType, Course, CourseStatus};

    async fn seed_course(db: &SqlitePool, max_students: i64) -> Course {
        let now = Utc::now();
        let course = Course {
            id: generate_id(),
            title: "CS101".to_string(),
            description: "Intro".to_string(),
            instructor_id: "professor-1".to_string(),
            category: "cs".to_string(),
            level: "beginner".to_string(),
            duration: "12 weeks".to_string(),
            enrolled_students: Vec::new(),
            max_students,
            start_date: "2025-09-01".to_string(),
            end_date: "2025-12-15".to_string(),
            status: CourseStatus::Active,
            syllabus: Vec::new(),
            resources: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        catalog::insert_course(db, &course).await.unwrap();
        course
    }

    async fn seed_assignment(db: &SqlitePool, course_id: &str, total_points: i64) -> Assignment {
        let now = Utc::now();
        let assignment = Assignment {
            id: generate_id(),
            title: "Essay 1".to_string(),
            description: "Write".to_string(),
            course_id: course_id.to_string(),
            instructor_id: "professor-1".to_string(),
            assignment_type: AssignmentType::Essay,
            total_points,
            due_date: "2025-10-01".to_string(),
            status: AssignmentStatus::Active,
            instructions: String::new(),
            attachments: Vec::new(),
            submissions: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        assignments::insert_assignment(db, &assignment).await.unwrap();
        assignment
    }

    fn enrollment_request(course_id: &str, student_id: &str) -> NewEnrollmentRequest {
        NewEnrollmentRequest {
            course_id: course_id.to_string(),
            student_id: student_id.to_string(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_enrollment_creates_two_records() {
        let db = memory_pool().await.unwrap();
        let service = LedgerService::new(db, Policy::default());

        let first = service.create_enrollment(enrollment_request("c-1", "s-1")).await.unwrap();
        let second = service.create_enrollment(enrollment_request("c-1", "s-1")).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(first.status, EnrollmentStatus::Active);
        assert_eq!(first.progress, 0);
        assert_eq!(service.list_enrollments(Some("s-1")).await.unwrap().len(), 2);
        assert!(service.list_enrollments(Some("s-2")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unique_enrollment_policy() {
        let db = memory_pool().await.unwrap();
        let policy = Policy {
            unique_enrollment: true,
            ..Default::default()
        };
        let service = LedgerService::new(db, policy);

        let first = service.create_enrollment(enrollment_request("c-1", "s-1")).await.unwrap();
        let err = service.create_enrollment(enrollment_request("c-1", "s-1")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        service
            .update_enrollment(
                &first.id,
                UpdateEnrollmentRequest {
                    status: Some(EnrollmentStatus::Dropped),
                    progress: None,
                },
            )
            .await
            .unwrap();
        service.create_enrollment(enrollment_request("c-1", "s-1")).await.unwrap();
    }

    #[tokio::test]
    async fn test_capacity_policy() {
        let db = memory_pool().await.unwrap();
        let course = seed_course(&db, 1).await;
        let policy = Policy {
            enforce_capacity: true,
            ..Default::default()
        };
        let service = LedgerService::new(db, policy);

        service.create_enrollment(enrollment_request(&course.id, "s-1")).await.unwrap();
        let err = service
            .create_enrollment(enrollment_request(&course.id, "s-2"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let err = service
            .create_enrollment(enrollment_request("missing", "s-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_enrollment_is_partial() {
        let db = memory_pool().await.unwrap();
        let service = LedgerService::new(db, Policy::default());
        let enrollment = service.create_enrollment(enrollment_request("c-1", "s-1")).await.unwrap();
        assert!(enrollment.last_accessed.is_none());

        let updated = service
            .update_enrollment(
                &enrollment.id,
                UpdateEnrollmentRequest {
                    status: None,
                    progress: Some(40),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.progress, 40);
        assert_eq!(updated.status, EnrollmentStatus::Active);
        assert!(updated.last_accessed.is_some());

        let err = service
            .update_enrollment("missing", UpdateEnrollmentRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_record_grade_derives_letter() {
        let db = memory_pool().await.unwrap();
        let course = seed_course(&db, 30).await;
        let assignment = seed_assignment(&db, &course.id, 50).await;
        let service = LedgerService::new(db, Policy::default());

        let grade = service
            .record_grade(
                "professor-1",
                RecordGradeRequest {
                    student_id: "s-1".to_string(),
                    student_name: "Ada".to_string(),
                    assignment_id: assignment.id.clone(),
                    score: 45,
                    feedback: "solid".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(grade.letter_grade, "A-");
        assert_eq!(grade.total_points, 50);
        assert_eq!(grade.course_id, course.id);
        assert_eq!(grade.course_name, "CS101");
        assert_eq!(grade.assignment_title, "Essay 1");
        assert_eq!(grade.graded_by, "professor-1");

        let grades = service.grades_by_student("s-1").await.unwrap();
        assert_eq!(grades.len(), 1);
        assert_eq!(service.list_grades().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_record_grade_rejects_bad_input() {
        let db = memory_pool().await.unwrap();
        let assignment = seed_assignment(&db, "c-1", 50).await;
        let service = LedgerService::new(db, Policy::default());

        let request = |assignment_id: &str, score: i64| RecordGradeRequest {
            student_id: "s-1".to_string(),
            student_name: String::new(),
            assignment_id: assignment_id.to_string(),
            score,
            feedback: String::new(),
        };

        let err = service.record_grade("p", request("missing", 10)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = service.record_grade("p", request(&assignment.id, 51)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
