use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 診斷階段，依照執行順序排列
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticStage {
    Connectivity,
    StructuralCheck,
    RelationshipCheck,
}

impl DiagnosticStage {
    pub const ALL: [DiagnosticStage; 3] = [
        DiagnosticStage::Connectivity,
        DiagnosticStage::StructuralCheck,
        DiagnosticStage::RelationshipCheck,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DiagnosticStage::Connectivity => "Connectivity",
            DiagnosticStage::StructuralCheck => "Structural diagnostics",
            DiagnosticStage::RelationshipCheck => "Relationship diagnostics",
        }
    }

    /// 1-based position in the run
    pub fn ordinal(&self) -> usize {
        match self {
            DiagnosticStage::Connectivity => 1,
            DiagnosticStage::StructuralCheck => 2,
            DiagnosticStage::RelationshipCheck => 3,
        }
    }
}

impl fmt::Display for DiagnosticStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 後端回傳的錯誤資訊
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub kind: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorDetail {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            code: None,
            hint: None,
        }
    }
}

/// 單一檢查項目（一張表或一個關聯）的結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub subject: String,
    pub ok: bool,
    pub message: String,
}

impl Finding {
    pub fn pass(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            ok: true,
            message: message.into(),
        }
    }

    pub fn fail(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            ok: false,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticResult {
    pub stage: DiagnosticStage,
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<ErrorDetail>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub findings: Vec<Finding>,
    pub duration_ms: u64,
}

impl DiagnosticResult {
    pub fn success(stage: DiagnosticStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            success: true,
            message: message.into(),
            detail: None,
            findings: Vec::new(),
            duration_ms: 0,
        }
    }

    pub fn failure(stage: DiagnosticStage, message: impl Into<String>, detail: Option<ErrorDetail>) -> Self {
        Self {
            stage,
            success: false,
            message: message.into(),
            detail,
            findings: Vec::new(),
            duration_ms: 0,
        }
    }

    /// 由多個項目彙整出階段結果：全部通過才算成功
    pub fn from_findings(stage: DiagnosticStage, findings: Vec<Finding>) -> Self {
        let failed = findings.iter().filter(|f| !f.ok).count();
        let total = findings.len();
        let (success, message) = if failed == 0 {
            (true, format!("{} of {} checks passed", total, total))
        } else {
            (false, format!("{} of {} checks failed", failed, total))
        };

        Self {
            stage,
            success,
            message,
            detail: None,
            findings,
            duration_ms: 0,
        }
    }

    pub fn with_duration(mut self, duration: std::time::Duration) -> Self {
        self.duration_ms = duration.as_millis() as u64;
        self
    }
}

/// 一次執行的最終結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Passed,
    ChecksFailed,
    ConnectivityFailed,
    Aborted,
}

impl RunOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::Passed => 0,
            RunOutcome::ConnectivityFailed => 1,
            RunOutcome::Aborted => 2,
            RunOutcome::ChecksFailed => 3,
        }
    }
}

/// 執行狀態機：線性推進，連線失敗直接跳到 Done
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    ConnectivityChecked,
    StructuralChecked,
    RelationshipChecked,
    Done(RunOutcome),
}

impl RunState {
    /// Advance after a stage finished. `passed` picks the branch after
    /// connectivity (short-circuit) and after relationships (overall outcome).
    pub fn advance(self, passed: bool) -> RunState {
        match self {
            RunState::NotStarted => RunState::ConnectivityChecked,
            RunState::ConnectivityChecked if !passed => {
                RunState::Done(RunOutcome::ConnectivityFailed)
            }
            RunState::ConnectivityChecked => RunState::StructuralChecked,
            RunState::StructuralChecked => RunState::RelationshipChecked,
            RunState::RelationshipChecked if passed => RunState::Done(RunOutcome::Passed),
            RunState::RelationshipChecked => RunState::Done(RunOutcome::ChecksFailed),
            done @ RunState::Done(_) => done,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, RunState::Done(_))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticsReport {
    pub endpoint: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcome: RunOutcome,
    pub results: Vec<DiagnosticResult>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remediation: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// 回傳錯誤而中止執行的階段
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aborted_stage: Option<DiagnosticStage>,
}

impl DiagnosticsReport {
    pub fn succeeded(&self) -> bool {
        self.outcome == RunOutcome::Passed
    }

    pub fn exit_code(&self) -> i32 {
        self.outcome.exit_code()
    }

    pub fn result_for(&self, stage: DiagnosticStage) -> Option<&DiagnosticResult> {
        self.results.iter().find(|r| r.stage == stage)
    }

    /// 只比較階段與成敗，用於判斷兩次執行是否等價
    pub fn stage_outcomes(&self) -> Vec<(DiagnosticStage, bool)> {
        self.results.iter().map(|r| (r.stage, r.success)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order() {
        let ordinals: Vec<usize> = DiagnosticStage::ALL.iter().map(|s| s.ordinal()).collect();
        assert_eq!(ordinals, vec![1, 2, 3]);
        assert_eq!(
            serde_json::to_value(DiagnosticStage::StructuralCheck).unwrap(),
            serde_json::json!("structural_check")
        );
    }

    #[test]
    fn test_run_state_happy_path() {
        let mut state = RunState::NotStarted;
        for _ in 0..4 {
            state = state.advance(true);
        }
        assert_eq!(state, RunState::Done(RunOutcome::Passed));
    }

    #[test]
    fn test_run_state_failed_checks() {
        let state = RunState::RelationshipChecked.advance(false);
        assert_eq!(state, RunState::Done(RunOutcome::ChecksFailed));
    }

    #[test]
    fn test_run_state_connectivity_failure_short_circuits() {
        let state = RunState::NotStarted.advance(true).advance(false);
        assert_eq!(state, RunState::Done(RunOutcome::ConnectivityFailed));
        assert!(state.is_done());
        assert_eq!(state.advance(true), state);
    }

    #[test]
    fn test_result_from_findings() {
        let result = DiagnosticResult::from_findings(
            DiagnosticStage::StructuralCheck,
            vec![
                Finding::pass("profiles", "ok"),
                Finding::fail("doctors", "relation does not exist"),
            ],
        );
        assert!(!result.success);
        assert_eq!(result.message, "1 of 2 checks failed");

        let empty = DiagnosticResult::from_findings(DiagnosticStage::RelationshipCheck, vec![]);
        assert!(empty.success);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(RunOutcome::Passed.exit_code(), 0);
        assert_eq!(RunOutcome::ConnectivityFailed.exit_code(), 1);
        assert_eq!(RunOutcome::Aborted.exit_code(), 2);
        assert_eq!(RunOutcome::ChecksFailed.exit_code(), 3);
    }
}
