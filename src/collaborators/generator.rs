use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::dto::GenerateTaskPayload;
use super::{http_client, post_json};
use crate::error::AppError;
use crate::models::{Activity, Difficulty};

/// Task content produced for one (activity, difficulty) request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedTask {
    pub title: String,
    pub description: String,
    pub requirements: Vec<String>,
    /// Minutes.
    pub estimated_time: i64,
    pub hints: Vec<String>,
}

#[async_trait]
pub trait TaskGenerator: Send + Sync {
    async fn generate(
        &self,
        activity: &Activity,
        difficulty: Difficulty,
    ) -> Result<GeneratedTask, AppError>;
}

/// Local generator with fixed texts; only the title varies with difficulty.
pub struct TemplateTaskGenerator;

#[async_trait]
impl TaskGenerator for TemplateTaskGenerator {
    async fn generate(
        &self,
        _activity: &Activity,
        difficulty: Difficulty,
    ) -> Result<GeneratedTask, AppError> {
        Ok(GeneratedTask {
            title: format!("AI Generated Task - {}", difficulty),
            description: "Create a responsive web component using modern CSS techniques"
                .to_string(),
            requirements: vec![
                "Use CSS Grid or Flexbox for layout".to_string(),
                "Make it responsive for all screen sizes".to_string(),
                "Include hover effects and transitions".to_string(),
                "Follow accessibility guidelines".to_string(),
            ],
            estimated_time: 30,
            hints: vec![
                "Start with mobile-first approach".to_string(),
                "Use CSS custom properties for theming".to_string(),
                "Test your code frequently".to_string(),
            ],
        })
    }
}

pub struct HttpTaskGenerator {
    client: Client,
    url: String,
}

impl HttpTaskGenerator {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        Ok(Self {
            client: http_client(timeout)?,
            url: url.into(),
        })
    }
}

#[async_trait]
impl TaskGenerator for HttpTaskGenerator {
    async fn generate(
        &self,
        activity: &Activity,
        difficulty: Difficulty,
    ) -> Result<GeneratedTask, AppError> {
        let payload = GenerateTaskPayload {
            activity_id: &activity.id,
            activity_title: &activity.title,
            difficulty,
        };
        let task: GeneratedTask = post_json(&self.client, &self.url, &payload).await?;
        tracing::debug!(
            "generator returned {} requirements for activity {}",
            task.requirements.len(),
            activity.id
        );
        Ok(task)
    }
}
