pub mod report;
pub mod runner;

pub use crate::domain::model::{DiagnosticResult, DiagnosticStage, DiagnosticsReport, RunOutcome};
pub use crate::domain::ports::{ConnectivityProbe, DiagnosticCheck, ProbeOutcome};
pub use crate::utils::error::Result;
