use crate::domain::model::{DiagnosticStage, DiagnosticsReport, RunOutcome};
use crate::utils::error::Result;
use std::fmt::Write;

/// 人類可讀的報告
pub fn render_text(report: &DiagnosticsReport) -> String {
    let mut out = String::new();
    let total = DiagnosticStage::ALL.len();

    let _ = writeln!(out, "Diagnostics for {}", report.endpoint);
    let _ = writeln!(out);

    for result in &report.results {
        let marker = if result.success { "✅" } else { "❌" };
        let _ = writeln!(
            out,
            "{} [{}/{}] {}: {} ({} ms)",
            marker,
            result.stage.ordinal(),
            total,
            result.stage,
            result.message,
            result.duration_ms
        );
        if let Some(detail) = &result.detail {
            if let Some(code) = &detail.code {
                let _ = writeln!(out, "     code: {}", code);
            }
            if let Some(hint) = &detail.hint {
                let _ = writeln!(out, "     hint: {}", hint);
            }
        }
        for finding in &result.findings {
            let mark = if finding.ok { "ok" } else { "FAILED" };
            let _ = writeln!(out, "     - {:<28} {} {}", finding.subject, mark, finding.message);
        }
    }

    // 中止的階段與未執行的階段
    for stage in DiagnosticStage::ALL {
        if report.result_for(stage).is_some() {
            continue;
        }
        if report.aborted_stage == Some(stage) {
            let _ = writeln!(out, "❌ [{}/{}] {}: aborted", stage.ordinal(), total, stage);
        } else {
            let _ = writeln!(out, "⏭️ [{}/{}] {}: skipped", stage.ordinal(), total, stage);
        }
    }

    if !report.remediation.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "💡 To fix:");
        for (i, step) in report.remediation.iter().enumerate() {
            let _ = writeln!(out, "   {}. {}", i + 1, step);
        }
    }

    if let Some(error) = &report.error {
        let _ = writeln!(out);
        let _ = writeln!(out, "❌ Unexpected error: {}", error);
    }

    let passed = report.results.iter().filter(|r| r.success).count();
    let verdict = match report.outcome {
        RunOutcome::Passed => "all checks passed",
        RunOutcome::ChecksFailed => "some checks failed",
        RunOutcome::ConnectivityFailed => "backend unreachable",
        RunOutcome::Aborted => "run aborted",
    };
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "==== Diagnostics complete: {}/{} stages passed, {} ====",
        passed, total, verdict
    );

    out
}

pub fn render_json(report: &DiagnosticsReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
