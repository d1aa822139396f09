pub mod dto;
pub mod evaluator;
pub mod generator;
pub mod identity;

use std::time::Duration;

use reqwest::Client;

use crate::error::AppError;

pub use evaluator::{CodeEvaluator, Evaluation, HttpCodeEvaluator, MockCodeEvaluator, TestOutcome};
pub use generator::{GeneratedTask, HttpTaskGenerator, TaskGenerator, TemplateTaskGenerator};
pub use identity::{Actor, HeaderIdentityProvider, IdentityProvider, StaticIdentityProvider};

fn http_client(timeout: Duration) -> Result<Client, AppError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| AppError::Collaborator(format!("Failed to build http client: {}", e)))
}

/// Sends `body` as JSON to `url` and decodes the JSON answer.
async fn post_json<B, T>(client: &Client, url: &str, body: &B) -> Result<T, AppError>
where
    B: serde::Serialize + ?Sized,
    T: serde::de::DeserializeOwned,
{
    let response = client
        .post(url)
        .json(body)
        .send()
        .await
        .map_err(|e| AppError::Collaborator(format!("request to {} failed: {}", url, e)))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(AppError::Collaborator(format!("{} answered {}: {}", url, status, body)));
    }

    let body_text = response
        .text()
        .await
        .map_err(|e| AppError::Collaborator(format!("failed to read response: {}", e)))?;
    serde_json::from_str::<T>(&body_text).map_err(|e| {
        tracing::error!("Failed to parse collaborator response: {}", e);
        AppError::Collaborator(format!("Failed to parse response from {}: {}", url, e))
    })
}
