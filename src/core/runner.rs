use crate::adapters::checks::{RelationshipCheck, StructureCheck, TableCountProbe};
use crate::adapters::rest::RestClient;
use crate::config::DiagnosticsConfig;
use crate::domain::model::{
    DiagnosticResult, DiagnosticStage, DiagnosticsReport, ErrorDetail, RunOutcome, RunState,
};
use crate::domain::ports::{ConnectivityProbe, DiagnosticCheck, ProbeOutcome};
use crate::utils::error::{DiagError, ErrorCategory, Result};
use chrono::Utc;
use std::time::Instant;

/// 依序執行三個診斷階段：連線 → 結構 → 關聯
///
/// Connectivity failure ends the run before any collaborator is called.
/// Structural and relationship stages always both run once connectivity passed.
pub struct DiagnosticsRunner<P: ConnectivityProbe, S: DiagnosticCheck, R: DiagnosticCheck> {
    endpoint: String,
    probe: P,
    structural: S,
    relationship: R,
    remediation: Vec<String>,
}

/// 執行過程中累積的結果
struct RunProgress {
    state: RunState,
    results: Vec<DiagnosticResult>,
}

impl RunProgress {
    /// 記錄已完成的階段並推進狀態
    fn record(&mut self, result: DiagnosticResult) {
        log_result(&result);
        self.state = self.state.advance(true);
        self.results.push(result);
    }

    fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.success)
    }
}

pub type RestDiagnosticsRunner = DiagnosticsRunner<TableCountProbe, StructureCheck, RelationshipCheck>;

impl RestDiagnosticsRunner {
    /// 以設定建立連到 REST 後端的完整 runner
    pub fn from_config(config: &DiagnosticsConfig) -> Result<Self> {
        let client = RestClient::new(config)?;

        Ok(DiagnosticsRunner::new(
            config.endpoint.clone(),
            TableCountProbe::new(client.clone(), config.probe_table.clone()),
            StructureCheck::new(client.clone(), config.tables.clone()),
            RelationshipCheck::new(client, config.relationships.clone()),
        )
        .with_remediation(config.remediation.clone()))
    }
}

impl<P: ConnectivityProbe, S: DiagnosticCheck, R: DiagnosticCheck> DiagnosticsRunner<P, S, R> {
    pub fn new(endpoint: impl Into<String>, probe: P, structural: S, relationship: R) -> Self {
        Self {
            endpoint: endpoint.into(),
            probe,
            structural,
            relationship,
            remediation: Vec::new(),
        }
    }

    pub fn with_remediation(mut self, remediation: Vec<String>) -> Self {
        self.remediation = remediation;
        self
    }

    /// 執行整個診斷流程，任何錯誤都收斂在報告內，不向外傳遞
    pub async fn run(&self) -> DiagnosticsReport {
        let started_at = Utc::now();
        tracing::info!("🚀 Running diagnostics against {}", self.endpoint);

        let mut progress = RunProgress {
            state: RunState::NotStarted,
            results: Vec::with_capacity(DiagnosticStage::ALL.len()),
        };

        let (outcome, error) = match self.execute(&mut progress).await {
            Ok(outcome) => (outcome, None),
            Err(e) => {
                tracing::error!("❌ Diagnostics aborted: {}", e);
                progress.state = RunState::Done(RunOutcome::Aborted);
                (RunOutcome::Aborted, Some(e.to_string()))
            }
        };

        let remediation = if outcome == RunOutcome::ConnectivityFailed {
            self.remediation.clone()
        } else {
            Vec::new()
        };

        // 中止時，下一個尚未記錄的階段就是回傳錯誤的那一個
        let aborted_stage = if outcome == RunOutcome::Aborted {
            DiagnosticStage::ALL.get(progress.results.len()).copied()
        } else {
            None
        };

        log_summary(&progress, outcome);

        DiagnosticsReport {
            endpoint: self.endpoint.clone(),
            started_at,
            finished_at: Utc::now(),
            outcome,
            results: progress.results,
            remediation,
            error,
            aborted_stage,
        }
    }

    async fn execute(&self, progress: &mut RunProgress) -> Result<RunOutcome> {
        let connectivity = self.check_connectivity().await;
        let connected = connectivity.success;
        progress.record(connectivity);

        if !connected {
            progress.state = progress.state.advance(false);
            for step in &self.remediation {
                tracing::warn!("💡 {}", step);
            }
        } else {
            let structural = self
                .run_collaborator(&self.structural, DiagnosticStage::StructuralCheck)
                .await?;
            progress.record(structural);

            let relationship = self
                .run_collaborator(&self.relationship, DiagnosticStage::RelationshipCheck)
                .await?;
            progress.record(relationship);

            progress.state = progress.state.advance(progress.all_passed());
        }

        match progress.state {
            RunState::Done(outcome) => Ok(outcome),
            state => Err(DiagError::unexpected(
                "runner",
                format!("run ended in non-terminal state {:?}", state),
            )),
        }
    }

    async fn check_connectivity(&self) -> DiagnosticResult {
        let stage = DiagnosticStage::Connectivity;
        let start = Instant::now();
        tracing::debug!("Querying table '{}'", self.probe.target());

        let result = match self.probe.check().await {
            Ok(ProbeOutcome::Reachable { count }) => {
                let message = match count {
                    Some(n) => format!("Connected; '{}' holds {} rows", self.probe.target(), n),
                    None => format!("Connected; '{}' is readable", self.probe.target()),
                };
                DiagnosticResult::success(stage, message)
            }
            Ok(ProbeOutcome::Rejected(detail)) => DiagnosticResult::failure(
                stage,
                format!("Connection error: {}", detail.message),
                Some(detail),
            ),
            // 回應無法解析不代表連不上後端
            Err(e) if e.category() == ErrorCategory::Network => {
                let err = DiagError::ConnectivityError {
                    message: e.to_string(),
                };
                DiagnosticResult::failure(
                    stage,
                    err.user_friendly_message(),
                    Some(ErrorDetail::new("transport", e.to_string())),
                )
            }
            Err(e) => DiagnosticResult::failure(
                stage,
                format!("Backend answered with an unreadable response: {}", e),
                Some(ErrorDetail::new("invalid_response", e.to_string())),
            ),
        };

        result.with_duration(start.elapsed())
    }

    async fn run_collaborator<C: DiagnosticCheck>(
        &self,
        check: &C,
        stage: DiagnosticStage,
    ) -> Result<DiagnosticResult> {
        let start = Instant::now();
        tracing::debug!("Running {} diagnostics", check.name());

        let mut result = check
            .run()
            .await
            .map_err(|e| DiagError::unexpected(format!("{} diagnostics", check.name()), e))?;

        if result.stage != stage {
            tracing::warn!(
                "{} reported stage {:?}, expected {:?}",
                check.name(),
                result.stage,
                stage
            );
            result.stage = stage;
        }

        Ok(result.with_duration(start.elapsed()))
    }
}

fn log_result(result: &DiagnosticResult) {
    let position = format!("[{}/{}]", result.stage.ordinal(), DiagnosticStage::ALL.len());
    if result.success {
        tracing::info!("✅ {} {}: {}", position, result.stage, result.message);
    } else {
        tracing::error!("❌ {} {}: {}", position, result.stage, result.message);
        if let Some(hint) = result.detail.as_ref().and_then(|d| d.hint.as_deref()) {
            tracing::error!("   hint: {}", hint);
        }
    }
    for finding in result.findings.iter().filter(|f| !f.ok) {
        tracing::error!("   - {}: {}", finding.subject, finding.message);
    }
}

fn log_summary(progress: &RunProgress, outcome: RunOutcome) {
    let passed = progress.results.iter().filter(|r| r.success).count();
    tracing::info!(
        "==== Diagnostics finished: {}/{} stages passed ({:?}) ====",
        passed,
        DiagnosticStage::ALL.len(),
        outcome
    );
}
