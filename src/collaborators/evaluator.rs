use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::Client;
use serde::Serialize;

use super::dto::{EvaluateCodePayload, EvaluationResponse};
use super::{http_client, post_json};
use crate::error::AppError;
use crate::models::GenerativeTask;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestOutcome {
    pub name: String,
    pub passed: bool,
}

/// Result of evaluating one code submission. Callers check `score` is within 0..=100.
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub score: i64,
    pub feedback: String,
    pub test_cases: Vec<TestOutcome>,
}

#[async_trait]
pub trait CodeEvaluator: Send + Sync {
    async fn evaluate(&self, task: &GenerativeTask, code: &str) -> Result<Evaluation, AppError>;
}

/// Local evaluator drawing a score in 60..=100; nothing is executed.
pub struct MockCodeEvaluator;

impl MockCodeEvaluator {
    pub const MIN_SCORE: i64 = 60;
    pub const MAX_SCORE: i64 = 100;

    /// The fixed outcome set for `score`; "Accessibility" passes above 80.
    pub fn evaluation_for_score(score: i64) -> Evaluation {
        let outcome = |name: &str, passed: bool| TestOutcome {
            name: name.to_string(),
            passed,
        };
        Evaluation {
            score,
            feedback: "Good work! Your solution demonstrates understanding of the concepts."
                .to_string(),
            test_cases: vec![
                outcome("Responsive Design", true),
                outcome("CSS Implementation", true),
                outcome("Accessibility", score > 80),
            ],
        }
    }
}

#[async_trait]
impl CodeEvaluator for MockCodeEvaluator {
    async fn evaluate(&self, _task: &GenerativeTask, _code: &str) -> Result<Evaluation, AppError> {
        let score = rand::rng().random_range(Self::MIN_SCORE..=Self::MAX_SCORE);
        Ok(Self::evaluation_for_score(score))
    }
}

pub struct HttpCodeEvaluator {
    client: Client,
    url: String,
}

impl HttpCodeEvaluator {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        Ok(Self {
            client: http_client(timeout)?,
            url: url.into(),
        })
    }
}

#[async_trait]
impl CodeEvaluator for HttpCodeEvaluator {
    async fn evaluate(&self, task: &GenerativeTask, code: &str) -> Result<Evaluation, AppError> {
        let payload = EvaluateCodePayload {
            task_id: &task.id,
            code,
            requirements: &task.requirements,
        };
        let response: EvaluationResponse = post_json(&self.client, &self.url, &payload).await?;

        Ok(Evaluation {
            score: response.score,
            feedback: response.feedback,
            test_cases: response
                .test_cases
                .into_iter()
                .map(|t| TestOutcome {
                    name: t.name,
                    passed: t.passed,
                })
                .collect(),
        })
    }
}
