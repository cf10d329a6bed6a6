use crate::config::defaults::ConfigDefaults;
use crate::config::toml_config::TomlConfig;
use crate::config::{DiagnosticsConfig, Overrides};
use crate::utils::error::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "booking-diag")]
#[command(about = "Staged health check for the appointment booking backend")]
pub struct CliConfig {
    #[arg(long, help = "Backend URL (overrides SUPABASE_URL)")]
    pub url: Option<String>,

    #[arg(long, help = "API key (overrides SUPABASE_ANON_KEY)")]
    pub api_key: Option<String>,

    #[arg(long, help = "Optional TOML file with expectations and remediation steps")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Table used for the connectivity query")]
    pub probe_table: Option<String>,

    #[arg(long, help = "HTTP client timeout in seconds")]
    pub timeout_seconds: Option<u64>,

    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            endpoint: self.url.clone(),
            api_key: self.api_key.clone(),
            probe_table: self.probe_table.clone(),
            timeout_seconds: self.timeout_seconds,
        }
    }

    /// 設定檔 < 環境變數 < 命令列
    pub fn into_diagnostics_config(&self) -> Result<DiagnosticsConfig> {
        let defaults = match &self.config {
            Some(path) => {
                tracing::debug!("Loading configuration file {}", path.display());
                TomlConfig::from_file(path)?.apply_to(ConfigDefaults::default())
            }
            None => ConfigDefaults::default(),
        };
        DiagnosticsConfig::resolve(&self.overrides(), defaults)
    }
}
