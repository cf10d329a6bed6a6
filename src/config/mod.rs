#[cfg(feature = "cli")]
pub mod cli;
pub mod defaults;
pub mod toml_config;

use crate::utils::error::Result;
use crate::utils::validation::{validate_identifier, validate_range, validate_url, Validate};
use defaults::{ConfigDefaults, RelationshipExpectation, TableExpectation, API_KEY_ENV, ENDPOINT_ENV};
use serde::Serialize;

/// 命令列或呼叫端明確指定的值，優先權最高
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub probe_table: Option<String>,
    pub timeout_seconds: Option<u64>,
}

/// override → environment → default
pub fn resolve_endpoint(
    override_value: Option<&str>,
    env_value: Option<&str>,
    default: &str,
) -> String {
    pick(override_value, env_value, default)
}

fn pick(override_value: Option<&str>, env_value: Option<&str>, default: &str) -> String {
    override_value
        .filter(|v| !v.trim().is_empty())
        .or_else(|| env_value.filter(|v| !v.trim().is_empty()))
        .unwrap_or(default)
        .trim()
        .to_string()
}

#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticsConfig {
    pub endpoint: String,
    #[serde(skip_serializing)]
    pub api_key: String,
    pub probe_table: String,
    pub timeout_seconds: u64,
    pub tables: Vec<TableExpectation>,
    pub relationships: Vec<RelationshipExpectation>,
    pub remediation: Vec<String>,
}

impl DiagnosticsConfig {
    /// Resolve against the process environment.
    pub fn resolve(overrides: &Overrides, defaults: ConfigDefaults) -> Result<Self> {
        Self::resolve_with_env(overrides, defaults, |name| std::env::var(name).ok())
    }

    /// 環境變數查詢以函式傳入，方便測試三種優先順序
    pub fn resolve_with_env<F>(overrides: &Overrides, defaults: ConfigDefaults, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_endpoint = env(ENDPOINT_ENV);
        let env_api_key = env(API_KEY_ENV);

        let endpoint = resolve_endpoint(
            overrides.endpoint.as_deref(),
            env_endpoint.as_deref(),
            &defaults.endpoint,
        );
        if overrides.endpoint.is_none() && env_endpoint.is_none() {
            tracing::debug!("No endpoint override, using default {}", defaults.endpoint);
        }

        let api_key = pick(
            overrides.api_key.as_deref(),
            env_api_key.as_deref(),
            &defaults.api_key,
        );

        let config = Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            probe_table: overrides
                .probe_table
                .clone()
                .unwrap_or(defaults.probe_table),
            timeout_seconds: overrides.timeout_seconds.unwrap_or(defaults.timeout_seconds),
            tables: defaults.tables,
            relationships: defaults.relationships,
            remediation: defaults.remediation,
        };

        config.validate()?;
        Ok(config)
    }
}

impl Validate for DiagnosticsConfig {
    fn validate(&self) -> Result<()> {
        validate_url("endpoint", &self.endpoint)?;
        validate_identifier("probe_table", &self.probe_table)?;
        validate_range("timeout_seconds", self.timeout_seconds, 1, 300)?;

        for expectation in &self.tables {
            validate_identifier("structure.tables.table", &expectation.table)?;
            for column in &expectation.columns {
                validate_identifier("structure.tables.columns", column)?;
            }
        }
        for relationship in &self.relationships {
            validate_identifier("relationships.from", &relationship.from)?;
            validate_identifier("relationships.to", &relationship.to)?;
        }

        if self.api_key.is_empty() {
            tracing::warn!("No API key configured; the backend will likely reject requests");
        }
        Ok(())
    }
}
