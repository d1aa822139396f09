use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} has an invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityMode {
    Header,
    Static,
}

impl FromStr for IdentityMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "header" => Ok(IdentityMode::Header),
            "static" => Ok(IdentityMode::Static),
            other => Err(format!("expected header or static, got {}", other)),
        }
    }
}

/// Workflow guards. All off by default, which keeps the permissive behaviour
/// of enrollments, grading and the grade ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Policy {
    pub enforce_capacity: bool,
    pub unique_enrollment: bool,
    pub guard_regrade: bool,
    pub sync_grade_ledger: bool,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub bind_addr: SocketAddr,
    pub identity_mode: IdentityMode,
    pub task_generator_url: Option<String>,
    pub code_evaluator_url: Option<String>,
    pub collaborator_timeout: Duration,
    pub policy: Policy,
}

impl Config {
    /// Loads `.env` when present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL")
            .unwrap_or_else(|| "sqlite://skillspace.db?mode=rwc".to_string());

        Ok(Self {
            database_url,
            max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 5)?,
            bind_addr: parse_or(&lookup, "BIND_ADDR", SocketAddr::from(([127, 0, 0, 1], 8080)))?,
            identity_mode: parse_or(&lookup, "IDENTITY_MODE", IdentityMode::Header)?,
            task_generator_url: lookup("TASK_GENERATOR_URL").filter(|v| !v.trim().is_empty()),
            code_evaluator_url: lookup("CODE_EVALUATOR_URL").filter(|v| !v.trim().is_empty()),
            collaborator_timeout: Duration::from_secs(parse_or(
                &lookup,
                "COLLABORATOR_TIMEOUT_SECS",
                10u64,
            )?),
            policy: Policy {
                enforce_capacity: parse_flag(&lookup, "POLICY_ENFORCE_CAPACITY")?,
                unique_enrollment: parse_flag(&lookup, "POLICY_UNIQUE_ENROLLMENT")?,
                guard_regrade: parse_flag(&lookup, "POLICY_GUARD_REGRADE")?,
                sync_grade_ledger: parse_flag(&lookup, "POLICY_SYNC_GRADE_LEDGER")?,
            },
        })
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: ToString,
{
    match lookup(name) {
        Some(value) => value.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
            name,
            value,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn parse_flag(lookup: &impl Fn(&str) -> Option<String>, name: &'static str) -> Result<bool, ConfigError> {
    match lookup(name) {
        None => Ok(false),
        Some(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" | "" => Ok(false),
            _ => Err(ConfigError::Invalid {
                name,
                value,
                reason: "expected a boolean".to_string(),
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.database_url, "sqlite://skillspace.db?mode=rwc");
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.identity_mode, IdentityMode::Header);
        assert_eq!(config.collaborator_timeout, Duration::from_secs(10));
        assert_eq!(config.policy, Policy::default());
        assert!(config.task_generator_url.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("IDENTITY_MODE", "static"),
            ("POLICY_GUARD_REGRADE", "true"),
            ("POLICY_UNIQUE_ENROLLMENT", "1"),
            ("CODE_EVALUATOR_URL", "http://localhost:9000/evaluate"),
        ])
        .unwrap();
        assert_eq!(config.identity_mode, IdentityMode::Static);
        assert!(config.policy.guard_regrade);
        assert!(config.policy.unique_enrollment);
        assert!(!config.policy.enforce_capacity);
        assert_eq!(
            config.code_evaluator_url.as_deref(),
            Some("http://localhost:9000/evaluate")
        );
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(config_from(&[("DB_MAX_CONNECTIONS", "many")]).is_err());
        assert!(config_from(&[("POLICY_ENFORCE_CAPACITY", "maybe")]).is_err());
        assert!(config_from(&[("IDENTITY_MODE", "oauth")]).is_err());
    }
}
