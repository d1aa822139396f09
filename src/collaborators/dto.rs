use serde::{Deserialize, Serialize};

use crate::models::Difficulty;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateTaskPayload<'a> {
    pub activity_id: &'a str,
    pub activity_title: &'a str,
    pub difficulty: Difficulty,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateCodePayload<'a> {
    pub task_id: &'a str,
    pub code: &'a str,
    pub requirements: &'a [String],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResponse {
    pub score: i64,
    #[serde(default)]
    pub feedback: String,
    #[serde(default)]
    pub test_cases: Vec<TestCaseResult>,
}

#[derive(Debug, Deserialize)]
pub struct TestCaseResult {
    pub name: String,
    pub passed: bool,
}
