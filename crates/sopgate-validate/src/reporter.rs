//! Compliance Report Generation
//!
//! Generates reports in multiple formats:
//! - JSON for CI integration
//! - Human-readable for terminal output
//! - CI summary for GitHub Actions annotations

use crate::correction::CorrectionLoopResult;
use crate::engine::{Diagnostic, ValidationResult, ValidationRun};
use crate::gating::GateDecision;
use serde::{Deserialize, Serialize};

/// Compliance report for one invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceReport {
    /// Timestamp of the run (RFC 3339)
    pub timestamp: String,
    /// Summary statistics
    pub summary: ReportSummary,
    /// One entry per evaluated category, in canonical order
    pub results: Vec<ValidationResult>,
    /// Gate verdict
    pub gate: GateDecision,
    /// Load failures and rule faults
    pub diagnostics: Vec<Diagnostic>,
    /// Correction loops, present only for `fix`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub corrections: Vec<CorrectionLoopResult>,
}

/// Summary of a compliance run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    pub files_analyzed: usize,
    pub categories: usize,
    /// Blocking findings
    pub total_violations: usize,
    /// Advisory findings
    pub total_warnings: usize,
    pub diagnostics: usize,
    pub aggregate_score: f64,
    /// Whether the gate passed
    pub passed: bool,
    pub fixes_applied: usize,
}

impl ComplianceReport {
    pub fn new(run: ValidationRun, gate: GateDecision) -> Self {
        let summary = ReportSummary {
            files_analyzed: run.files_analyzed,
            categories: run.results.len(),
            total_violations: run.violation_count(),
            total_warnings: run.warning_count(),
            diagnostics: run.diagnostics.len(),
            aggregate_score: gate.aggregate_score,
            passed: gate.passed,
            fixes_applied: 0,
        };
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            summary,
            results: run.results,
            gate,
            diagnostics: run.diagnostics,
            corrections: Vec::new(),
        }
    }

    pub fn with_corrections(mut self, corrections: Vec<CorrectionLoopResult>) -> Self {
        self.summary.fixes_applied = corrections.iter().map(CorrectionLoopResult::fix_count).sum();
        self.corrections = corrections;
        self
    }
}

/// Report generator
pub struct Reporter;

impl Reporter {
    /// Generate JSON report
    pub fn to_json(report: &ComplianceReport) -> String {
        serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
    }

    /// Generate human-readable report
    pub fn to_human_readable(report: &ComplianceReport) -> String {
        let mut output = String::new();

        output.push_str("=== Compliance Report ===\n\n");
        output.push_str(&format!("Timestamp: {}\n", report.timestamp));
        output.push_str(&format!(
            "Files analyzed: {}\n\n",
            report.summary.files_analyzed
        ));

        output.push_str("--- Categories ---\n");
        for result in &report.results {
            output.push_str(&format!(
                "  {:<18} {:.2}  {:<4}  {} violation(s), {} warning(s)\n",
                result.category.as_str(),
                result.score,
                result.status,
                result.violations.len(),
                result.warnings.len()
            ));
        }
        output.push('\n');

        output.push_str("--- Summary ---\n");
        output.push_str(&format!(
            "Violations:      {}\n",
            report.summary.total_violations
        ));
        output.push_str(&format!(
            "Warnings:        {}\n",
            report.summary.total_warnings
        ));
        output.push_str(&format!("Diagnostics:     {}\n", report.summary.diagnostics));
        output.push_str(&format!(
            "Aggregate score: {:.3}\n",
            report.summary.aggregate_score
        ));
        if !report.corrections.is_empty() {
            output.push_str(&format!(
                "Fixes applied:   {}\n",
                report.summary.fixes_applied
            ));
        }
        output.push('\n');

        let status = if report.summary.passed {
            "PASSED"
        } else {
            "FAILED"
        };
        output.push_str(&format!("Status: {status}\n"));
        if let Some(reason) = report.gate.reason() {
            output.push_str(&format!("Reason: {reason}\n"));
        }
        output.push('\n');

        let violations: Vec<_> = report.results.iter().flat_map(|r| &r.violations).collect();
        if !violations.is_empty() {
            output.push_str("--- Violations ---\n");
            for v in violations {
                output.push_str(&format!("  {v}\n"));
                if let Some(fix) = &v.fix {
                    output.push_str(&format!("      fix: {fix}\n"));
                }
            }
            output.push('\n');
        }

        let warnings: Vec<_> = report.results.iter().flat_map(|r| &r.warnings).collect();
        if !warnings.is_empty() {
            output.push_str("--- Warnings ---\n");
            for w in warnings {
                output.push_str(&format!(
                    "  {}:{} [{}] {}\n",
                    w.file, w.line, w.rule_id, w.message
                ));
            }
            output.push('\n');
        }

        if !report.diagnostics.is_empty() {
            output.push_str("--- Diagnostics ---\n");
            for d in &report.diagnostics {
                output.push_str(&format!("  {d}\n"));
            }
            output.push('\n');
        }

        if !report.corrections.is_empty() {
            output.push_str("--- Corrections ---\n");
            for c in &report.corrections {
                output.push_str(&format!(
                    "  {}: {} ({} fix(es), {} remaining)\n",
                    c.file,
                    c.outcome,
                    c.fix_count(),
                    c.remaining_violations.len()
                ));
            }
            output.push('\n');
        }

        output
    }

    /// Generate CI summary (GitHub Actions format)
    pub fn to_ci_summary(report: &ComplianceReport) -> String {
        let mut output = String::new();

        output.push_str("## Compliance Gate\n\n");

        if report.summary.passed {
            output.push_str("**Status:** :white_check_mark: PASSED\n\n");
        } else {
            output.push_str("**Status:** :x: FAILED\n\n");
            if let Some(reason) = report.gate.reason() {
                output.push_str(&format!("**Reason:** {reason}\n\n"));
            }
        }

        output.push_str("| Category | Score | Status | Violations | Warnings |\n");
        output.push_str("|----------|-------|--------|------------|----------|\n");
        for result in &report.results {
            output.push_str(&format!(
                "| {} | {:.2} | {} | {} | {} |\n",
                result.category.as_str(),
                result.score,
                result.status,
                result.violations.len(),
                result.warnings.len()
            ));
        }
        output.push_str(&format!(
            "| **Aggregate** | **{:.3}** | | **{}** | **{}** |\n",
            report.summary.aggregate_score,
            report.summary.total_violations,
            report.summary.total_warnings
        ));

        let mut annotations = Vec::new();
        for v in report.results.iter().flat_map(|r| &r.violations) {
            annotations.push(format!(
                "::error file={},line={}::{} {}",
                v.file, v.line, v.rule_id, v.message
            ));
        }
        for w in report.results.iter().flat_map(|r| &r.warnings) {
            annotations.push(format!(
                "::warning file={},line={}::{} {}",
                w.file, w.line, w.rule_id, w.message
            ));
        }
        for d in &report.diagnostics {
            annotations.push(format!("::notice ::{d}"));
        }

        if !annotations.is_empty() {
            output.push_str("\n### Findings\n\n");
            for a in annotations {
                output.push_str(&format!("{a}\n"));
            }
        }

        output
    }
}
