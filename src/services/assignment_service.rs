use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::config::Policy;
use crate::db::{assignments, ledger};
use crate::error::AppError;
use crate::ids::generate_id;
use crate::models::{
    Assignment, AssignmentStatus, Attachment, GradeAssignmentRequest, NewAssignmentRequest,
    NewAttachment, Submission, SubmissionStatus, SubmitAssignmentRequest, UpdateAssignmentRequest,
};
use crate::services::ledger_service::{self, GradeEntry};

fn to_attachments(
    items: Vec<NewAttachment>,
    assignment_id: Option<&str>,
    submission_id: Option<&str>,
    uploaded_at: DateTime<Utc>,
) -> Vec<Attachment> {
    items
        .into_iter()
        .map(|a| Attachment {
            id: generate_id(),
            assignment_id: assignment_id.map(str::to_string),
            submission_id: submission_id.map(str::to_string),
            title: a.title,
            attachment_type: a.attachment_type,
            url: a.url,
            description: a.description,
            uploaded_at,
        })
        .collect()
}

/// Assignments and the `submitted -> graded` submission workflow.
pub struct AssignmentService {
    db: SqlitePool,
    policy: Policy,
}

impl AssignmentService {
    pub fn new(db: SqlitePool, policy: Policy) -> Self {
        Self { db, policy }
    }

    pub async fn list_assignments(&self) -> Result<Vec<Assignment>, AppError> {
        let assignments = assignments::fetch_assignments(&self.db).await?;
        debug!("loaded {} assignments", assignments.len());
        Ok(assignments)
    }

    pub async fn get_assignment(&self, id: &str) -> Result<Assignment, AppError> {
        assignments::find_assignment_by_id(&self.db, id)
            .await?
            .ok_or_else(|| AppError::not_found("Assignment"))
    }

    pub async fn create_assignment(
        &self,
        instructor_id: &str,
        req: NewAssignmentRequest,
    ) -> Result<Assignment, AppError> {
        let now = Utc::now();
        let id = generate_id();
        let attachments = to_attachments(req.attachments, Some(id.as_str()), None, now);
        let assignment = Assignment {
            id,
            title: req.title,
            description: req.description,
            course_id: req.course_id,
            instructor_id: instructor_id.to_string(),
            assignment_type: req.assignment_type,
            total_points: req.total_points,
            due_date: req.due_date,
            status: AssignmentStatus::Active,
            instructions: req.instructions,
            attachments,
            submissions: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.db.begin().await?;
        assignments::insert_assignment(&mut *tx, &assignment).await?;
        for attachment in &assignment.attachments {
            assignments::insert_attachment(&mut *tx, attachment).await?;
        }
        tx.commit().await?;

        info!(
            "created assignment {} in course {} by {}",
            assignment.id, assignment.course_id, assignment.instructor_id
        );
        Ok(assignment)
    }

    pub async fn update_assignment(
        &self,
        id: &str,
        req: UpdateAssignmentRequest,
    ) -> Result<Assignment, AppError> {
        let mut assignment = self.get_assignment(id).await?;

        if let Some(title) = req.title {
            assignment.title = title;
        }
        if let Some(description) = req.description {
            assignment.description = description;
        }
        if let Some(instructions) = req.instructions {
            assignment.instructions = instructions;
        }
        if let Some(total_points) = req.total_points {
            assignment.total_points = total_points;
        }
        if let Some(due_date) = req.due_date {
            assignment.due_date = due_date;
        }
        if let Some(status) = req.status {
            assignment.status = status;
        }
        assignment.updated_at = Utc::now();

        if !assignments::update_assignment(&self.db, &assignment).await? {
            return Err(AppError::not_found("Assignment"));
        }
        info!("updated assignment {} ({:?})", assignment.id, assignment.status);
        Ok(assignment)
    }

    /// Every call stores a new submission; earlier ones for the same student are kept.
    pub async fn submit(
        &self,
        student_id: &str,
        req: SubmitAssignmentRequest,
    ) -> Result<Submission, AppError> {
        let assignment = assignments::find_assignment_row(&self.db, &req.assignment_id)
            .await?
            .ok_or_else(|| AppError::not_found("Assignment"))?;
        if assignment.status == AssignmentStatus::Closed {
            warn!("submission to closed assignment {} rejected", assignment.id);
            return Err(AppError::Conflict(format!(
                "assignment {} is closed",
                assignment.id
            )));
        }

        let now = Utc::now();
        let id = generate_id();
        let attachments = to_attachments(req.attachments, None, Some(id.as_str()), now);
        let submission = Submission {
            id,
            assignment_id: assignment.id,
            student_id: student_id.to_string(),
            content: req.content,
            score: None,
            feedback: None,
            status: SubmissionStatus::Submitted,
            graded_by: None,
            attachments,
            submitted_at: now,
            graded_at: None,
        };

        let mut tx = self.db.begin().await?;
        assignments::insert_submission(&mut *tx, &submission).await?;
        for attachment in &submission.attachments {
            assignments::insert_attachment(&mut *tx, attachment).await?;
        }
        tx.commit().await?;

        info!(
            "student {} submitted {} for assignment {}",
            submission.student_id, submission.id, submission.assignment_id
        );
        Ok(submission)
    }

    /// Moves a submission to `graded`. Regrading overwrites unless the regrade
    /// guard is on, in which case it needs `override`.
    pub async fn grade(
        &self,
        graded_by: &str,
        req: GradeAssignmentRequest,
    ) -> Result<Submission, AppError> {
        let mut submission = assignments::find_submission_by_id(&self.db, &req.submission_id)
            .await?
            .ok_or_else(|| AppError::not_found("Submission"))?;
        let assignment = assignments::find_assignment_row(&self.db, &submission.assignment_id)
            .await?
            .ok_or_else(|| AppError::not_found("Assignment"))?;
        ledger_service::check_score(req.score, assignment.total_points)?;

        if submission.status == SubmissionStatus::Graded {
            if self.policy.guard_regrade && !req.override_graded {
                warn!("regrade of {} rejected without override", submission.id);
                return Err(AppError::Conflict(format!(
                    "submission {} is already graded",
                    submission.id
                )));
            }
            info!("regrading submission {}", submission.id);
        }

        let now = Utc::now();
        submission.score = Some(req.score);
        submission.feedback = Some(req.feedback);
        submission.status = SubmissionStatus::Graded;
        submission.graded_by = Some(graded_by.to_string());
        submission.graded_at = Some(now);

        if self.policy.sync_grade_ledger {
            let course_name = ledger_service::course_name(&self.db, &assignment.course_id).await?;
            let student_name = ledger_service::student_name(&self.db, &submission.student_id).await?;
            let grade = ledger_service::build_grade(
                &assignment,
                course_name,
                GradeEntry {
                    student_id: &submission.student_id,
                    student_name,
                    score: req.score,
                    feedback: submission.feedback.clone().unwrap_or_default(),
                    graded_by,
                    graded_at: now,
                },
            );

            let mut tx = self.db.begin().await?;
            if !assignments::update_submission_grade(&mut *tx, &submission).await? {
                return Err(AppError::not_found("Submission"));
            }
            ledger::insert_grade(&mut *tx, &grade).await?;
            tx.commit().await?;
            info!("grade {} recorded for submission {}", grade.id, submission.id);
        } else if !assignments::update_submission_grade(&self.db, &submission).await? {
            return Err(AppError::not_found("Submission"));
        }

        info!(
            "graded submission {} with {}/{} by {}",
            submission.id, req.score, assignment.total_points, graded_by
        );
        Ok(submission)
    }
}
