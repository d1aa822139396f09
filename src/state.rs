use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::info;

use crate::collaborators::{
    CodeEvaluator, HeaderIdentityProvider, HttpCodeEvaluator, HttpTaskGenerator,
    IdentityProvider, MockCodeEvaluator, StaticIdentityProvider, TaskGenerator,
    TemplateTaskGenerator,
};
use crate::config::{Config, IdentityMode, Policy};
use crate::error::AppError;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub identity: Arc<dyn IdentityProvider>,
    pub generator: Arc<dyn TaskGenerator>,
    pub evaluator: Arc<dyn CodeEvaluator>,
    pub policy: Policy,
}

impl AppState {
    /// State wired with the local collaborators only.
    pub fn local(db: SqlitePool, policy: Policy) -> Self {
        Self {
            db,
            identity: Arc::new(HeaderIdentityProvider),
            generator: Arc::new(TemplateTaskGenerator),
            evaluator: Arc::new(MockCodeEvaluator),
            policy,
        }
    }

    pub fn from_config(db: SqlitePool, config: &Config) -> Result<Self, AppError> {
        let identity: Arc<dyn IdentityProvider> = match config.identity_mode {
            IdentityMode::Header => Arc::new(HeaderIdentityProvider),
            IdentityMode::Static => Arc::new(StaticIdentityProvider),
        };

        let generator: Arc<dyn TaskGenerator> = match &config.task_generator_url {
            Some(url) => {
                info!("using task generator at {}", url);
                Arc::new(HttpTaskGenerator::new(url.as_str(), config.collaborator_timeout)?)
            }
            None => Arc::new(TemplateTaskGenerator),
        };

        let evaluator: Arc<dyn CodeEvaluator> = match &config.code_evaluator_url {
            Some(url) => {
                info!("using code evaluator at {}", url);
                Arc::new(HttpCodeEvaluator::new(url.as_str(), config.collaborator_timeout)?)
            }
            None => Arc::new(MockCodeEvaluator),
        };

        Ok(Self {
            db,
            identity,
            generator,
            evaluator,
            policy: config.policy,
        })
    }
}
