pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::{CliConfig, OutputFormat};

pub use config::{defaults::ConfigDefaults, DiagnosticsConfig, Overrides};
pub use core::runner::{DiagnosticsRunner, RestDiagnosticsRunner};
pub use domain::model::{DiagnosticResult, DiagnosticStage, DiagnosticsReport, RunOutcome};
pub use utils::error::{DiagError, Result};
