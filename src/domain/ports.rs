use crate::domain::model::{DiagnosticResult, DiagnosticStage, ErrorDetail};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 連線檢查的結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Reachable { count: Option<u64> },
    Rejected(ErrorDetail),
}

#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    /// Issue one read-only query. A transport failure is returned as `Err`.
    async fn check(&self) -> Result<ProbeOutcome>;

    fn target(&self) -> &str;
}

/// 連線通過後才會被呼叫的診斷模組
///
/// `Ok` with `success == false` is a diagnosed failure and the run continues.
/// `Err` aborts the run.
#[async_trait]
pub trait DiagnosticCheck: Send + Sync {
    fn stage(&self) -> DiagnosticStage;

    fn name(&self) -> &str;

    async fn run(&self) -> Result<DiagnosticResult>;
}
