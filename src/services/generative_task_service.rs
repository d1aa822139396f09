use std::sync::Arc;

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, error, info};

use crate::collaborators::{CodeEvaluator, TaskGenerator};
use crate::db::{catalog, generative_tasks};
use crate::error::AppError;
use crate::ids::generate_id;
use crate::models::{
    GenerateTaskRequest, GenerativeTask, GenerativeTaskSubmission, SubmitTaskRequest, TestCase,
};

pub struct GenerativeTaskService {
    db: SqlitePool,
    generator: Arc<dyn TaskGenerator>,
    evaluator: Arc<dyn CodeEvaluator>,
}

impl GenerativeTaskService {
    pub fn new(
        db: SqlitePool,
        generator: Arc<dyn TaskGenerator>,
        evaluator: Arc<dyn CodeEvaluator>,
    ) -> Self {
        Self {
            db,
            generator,
            evaluator,
        }
    }

    /// Each call produces a fresh task, even for a repeated (activity, student, difficulty).
    pub async fn generate(&self, req: GenerateTaskRequest) -> Result<GenerativeTask, AppError> {
        let activity = catalog::find_activity_by_id(&self.db, &req.activity_id)
            .await?
            .ok_or_else(|| AppError::not_found("Activity"))?;

        let generated = self.generator.generate(&activity, req.difficulty).await?;

        let now = Utc::now();
        let task = GenerativeTask {
            id: generate_id(),
            activity_id: activity.id,
            student_id: req.student_id,
            title: generated.title,
            description: generated.description,
            requirements: generated.requirements,
            difficulty: req.difficulty,
            estimated_time: generated.estimated_time,
            hints: generated.hints,
            created_at: now,
            updated_at: now,
        };
        generative_tasks::insert_task(&self.db, &task).await?;
        info!(
            "generated {} task {} for student {}",
            task.difficulty, task.id, task.student_id
        );
        Ok(task)
    }

    pub async fn submit(&self, req: SubmitTaskRequest) -> Result<GenerativeTaskSubmission, AppError> {
        let task = self.get_task(&req.task_id).await?;

        let evaluation = self.evaluator.evaluate(&task, &req.code).await?;
        if !(0..=100).contains(&evaluation.score) {
            error!("evaluator returned score {} for task {}", evaluation.score, task.id);
            return Err(AppError::Collaborator(format!(
                "evaluator score {} is outside 0..=100",
                evaluation.score
            )));
        }

        let id = generate_id();
        let test_cases: Vec<TestCase> = evaluation
            .test_cases
            .into_iter()
            .map(|outcome| TestCase {
                id: generate_id(),
                submission_id: id.clone(),
                name: outcome.name,
                passed: outcome.passed,
            })
            .collect();
        let submission = GenerativeTaskSubmission {
            id,
            task_id: task.id,
            student_id: req.student_id,
            code: req.code,
            score: evaluation.score,
            feedback: evaluation.feedback,
            test_cases,
            created_at: Utc::now(),
        };

        let mut tx = self.db.begin().await?;
        generative_tasks::insert_submission(&mut *tx, &submission).await?;
        for (position, test_case) in submission.test_cases.iter().enumerate() {
            generative_tasks::insert_test_case(&mut *tx, test_case, position as i64).await?;
        }
        tx.commit().await?;

        let passed = submission.test_cases.iter().filter(|t| t.passed).count();
        info!(
            "task submission {} scored {} ({}/{} checks passed)",
            submission.id,
            submission.score,
            passed,
            submission.test_cases.len()
        );
        Ok(submission)
    }

    /// The stored hints; `difficulty` does not filter them.
    pub async fn hints(&self, task_id: &str, difficulty: Option<&str>) -> Result<Vec<String>, AppError> {
        let task = self.get_task(task_id).await?;
        debug!(
            "hints for task {} (requested difficulty {:?}, task difficulty {})",
            task.id, difficulty, task.difficulty
        );
        Ok(task.hints)
    }

    pub async fn get_task(&self, id: &str) -> Result<GenerativeTask, AppError> {
        generative_tasks::find_task_by_id(&self.db, id)
            .await?
            .ok_or_else(|| AppError::not_found("Generative task"))
    }

    pub async fn get_submission(&self, id: &str) -> Result<GenerativeTaskSubmission, AppError> {
        generative_tasks::find_submission_by_id(&self.db, id)
            .await?
            .ok_or_else(|| AppError::not_found("Task submission"))
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::collaborators::{
        Evaluation, MockCodeEvaluator, TemplateTaskGenerator, TestOutcome,
    };
    use crate::db::memory_pool;
    use crate::models::{Activity, ActivityMetadata, ActivityType, Difficulty};

    struct FixedEvaluator(i64);

    #[async_trait]
    impl CodeEvaluator for FixedEvaluator {
        async fn evaluate(&self, _task: &GenerativeTask, _code: &str) -> Result<Evaluation, AppError> {
            Ok(Evaluation {
                score: self.0,
                feedback: "fixed".to_string(),
                test_cases: vec![TestOutcome {
                    name: "Compiles".to_string(),
                    passed: true,
                }],
            })
        }
    }

    async fn seed_activity(db: &SqlitePool) -> Activity {
        let now = Utc::now();
        let activity = Activity {
            id: generate_id(),
            section_id: "section-1".to_string(),
            title: "Build a card".to_string(),
            description: String::new(),
            activity_type: ActivityType::GenerativeTask,
            order: 1,
            visible: true,
            completed: false,
            due_date: None,
            available_from: None,
            available_until: None,
            metadata: ActivityMetadata::default(),
            created_at: now,
            updated_at: now,
        };
        catalog::insert_activity(db, &activity).await.unwrap();
        activity
    }

    fn generate_request(activity_id: &str) -> GenerateTaskRequest {
        GenerateTaskRequest {
            activity_id: activity_id.to_string(),
            difficulty: Difficulty::Medium,
            student_id: "student-1".to_string(),
        }
    }

    fn submit_request(task_id: &str) -> SubmitTaskRequest {
        SubmitTaskRequest {
            task_id: task_id.to_string(),
            code: ".card { display: grid; }".to_string(),
            student_id: "student-1".to_string(),
        }
    }

    async fn local_service() -> (SqlitePool, GenerativeTaskService) {
        let db = memory_pool().await.unwrap();
        let service = GenerativeTaskService::new(
            db.clone(),
            Arc::new(TemplateTaskGenerator),
            Arc::new(MockCodeEvaluator),
        );
        (db, service)
    }

    #[tokio::test]
    async fn test_generate_and_submit() {
        let (db, service) = local_service().await;
        let activity = seed_activity(&db).await;

        let task = service.generate(generate_request(&activity.id)).await.unwrap();
        assert_eq!(task.title, "AI Generated Task - medium");
        assert_eq!(task.requirements.len(), 4);
        assert_eq!(task.hints.len(), 3);
        assert_eq!(task.estimated_time, 30);

        let submission = service.submit(submit_request(&task.id)).await.unwrap();
        assert!((60..=100).contains(&submission.score));
        assert_eq!(submission.test_cases.len(), 3);
        assert_eq!(submission.test_cases[2].name, "Accessibility");
        assert_eq!(submission.test_cases[2].passed, submission.score > 80);

        let stored = service.get_submission(&submission.id).await.unwrap();
        assert_eq!(stored.score, submission.score);
        let names: Vec<&str> = stored.test_cases.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Responsive Design", "CSS Implementation", "Accessibility"]);
    }

    #[tokio::test]
    async fn test_generate_is_not_deduplicated() {
        let (db, service) = local_service().await;
        let activity = seed_activity(&db).await;

        let first = service.generate(generate_request(&activity.id)).await.unwrap();
        let second = service.generate(generate_request(&activity.id)).await.unwrap();
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_missing_activity_and_task() {
        let (_db, service) = local_service().await;
        let err = service.generate(generate_request("missing")).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = service.submit(submit_request("missing")).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = service.hints("missing", None).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_hints_ignore_difficulty() {
        let (db, service) = local_service().await;
        let activity = seed_activity(&db).await;
        let task = service.generate(generate_request(&activity.id)).await.unwrap();

        let easy = service.hints(&task.id, Some("easy")).await.unwrap();
        let none = service.hints(&task.id, None).await.unwrap();
        assert_eq!(easy, task.hints);
        assert_eq!(none, task.hints);
    }

    #[tokio::test]
    async fn test_out_of_range_evaluator_score_is_rejected() {
        let db = memory_pool().await.unwrap();
        let activity = seed_activity(&db).await;
        let service = GenerativeTaskService::new(
            db.clone(),
            Arc::new(TemplateTaskGenerator),
            Arc::new(FixedEvaluator(140)),
        );
        let task = service.generate(generate_request(&activity.id)).await.unwrap();

        let err = service.submit(submit_request(&task.id)).await.unwrap_err();
        assert!(matches!(err, AppError::Collaborator(_)));
    }

    #[tokio::test]
    async fn test_injected_evaluator_results_are_stored() {
        let db = memory_pool().await.unwrap();
        let activity = seed_activity(&db).await;
        let service = GenerativeTaskService::new(
            db.clone(),
            Arc::new(TemplateTaskGenerator),
            Arc::new(FixedEvaluator(42)),
        );
        let task = service.generate(generate_request(&activity.id)).await.unwrap();
        let submission = service.submit(submit_request(&task.id)).await.unwrap();

        let stored = service.get_submission(&submission.id).await.unwrap();
        assert_eq!(stored.score, 42);
        assert_eq!(stored.feedback, "fixed");
        assert_eq!(stored.test_cases.len(), 1);
        assert!(stored.test_cases[0].passed);
    }
}
