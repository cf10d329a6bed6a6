use crate::config::defaults::{ConfigDefaults, RelationshipExpectation, TableExpectation};
use crate::utils::error::{DiagError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 診斷設定檔（可選）
///
/// ```toml
/// [backend]
/// url = "${SUPABASE_URL}"
/// probe_table = "profiles"
///
/// [[structure.tables]]
/// table = "doctors"
/// columns = ["id", "specialty"]
///
/// [[relationships]]
/// from = "appointments"
/// to = "doctors"
///
/// [remediation]
/// steps = ["Run supabase db reset"]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    pub structure: Option<StructureConfig>,
    pub relationships: Option<Vec<RelationshipExpectation>>,
    pub remediation: Option<RemediationConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendConfig {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub probe_table: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureConfig {
    #[serde(default)]
    pub tables: Vec<TableExpectation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemediationConfig {
    #[serde(default)]
    pub steps: Vec<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入設定
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| DiagError::ConfigError {
            message: format!("cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析設定
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;
        Ok(toml::from_str(&processed_content)?)
    }

    /// 替換環境變數 (例如 ${SUPABASE_URL})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").map_err(|e| DiagError::ConfigError {
            message: format!("invalid placeholder pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 以設定檔內容覆蓋內建預設值
    pub fn apply_to(self, mut defaults: ConfigDefaults) -> ConfigDefaults {
        if let Some(url) = resolved(self.backend.url) {
            defaults.endpoint = url;
        }
        if let Some(key) = resolved(self.backend.api_key) {
            defaults.api_key = key;
        }
        if let Some(table) = resolved(self.backend.probe_table) {
            defaults.probe_table = table;
        }
        if let Some(timeout) = self.backend.timeout_seconds {
            defaults.timeout_seconds = timeout;
        }
        if let Some(structure) = self.structure {
            defaults.tables = structure.tables;
        }
        if let Some(relationships) = self.relationships {
            defaults.relationships = relationships;
        }
        if let Some(remediation) = self.remediation {
            defaults.remediation = remediation.steps;
        }
        defaults
    }
}

/// 空值或仍含未替換的 `${VAR}` 視為未設定，保留原本的預設值
fn resolved(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty() && !v.contains("${"))
}
