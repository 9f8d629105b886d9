//! Source-Code Compliance Engine
//!
//! This crate scans source files against a catalog of pattern-based rules and
//! turns the findings into a verdict:
//! - Line context heuristics (inside function / class / exception handler)
//! - Rule catalog grouped by compliance category
//! - Rule engine producing one `ValidationResult` per category
//! - Weighted scoring and a first-failure-wins gating policy
//! - Self-correction loop applying deterministic fix patterns
//!
//! Nothing in here parses source code. Structure is inferred from bounded
//! windows of raw text lines and brace counting, so results are best-effort.
//!
//! # Example
//!
//! ```ignore
//! use sopgate_validate::{RuleCatalog, RuleEngine, Selection, SourceFile};
//!
//! let catalog = RuleCatalog::standard();
//! let engine = RuleEngine::new(&catalog);
//! let files = vec![SourceFile::new("orders.service.ts", source)];
//! let run = engine.run(&Selection::all(), &files)?;
//! ```

// === Line context heuristics ===
pub mod context;

// === Rule catalog ===
pub mod rules;

// === Rule engine ===
pub mod engine;

// === Scoring and gating ===
pub mod gating;
pub mod metrics;

// === Self-correction ===
pub mod correction;

// === Exact-expectation harness ===
pub mod harness;

// === Adapters (loading, configuration, reporting) ===
pub mod config;
pub mod reporter;
pub mod scan;

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

pub use config::{
    ConfigLoader, CorrectionSettings, FileConfig, GatingSettings, GeneralConfig, LoggingConfig,
    MetricOverride,
};
pub use context::{ContextWindow, LineContext};
pub use correction::{
    AppliedFix, CorrectionEngine, CorrectionLoopResult, CorrectionOptions, CorrectionOutcome,
    CorrectionResult, FixPattern, FixRegistry, ImportEdit, Prerequisite, Replacement,
};
pub use engine::{
    Bucket, Diagnostic, DiagnosticKind, RuleEngine, Selection, SeverityPolicy, ValidationResult,
    ValidationRun, Violation, Warning,
};
pub use gating::{CategoryScore, GateDecision, GateFailure, GatingConfig, aggregate_score};
pub use harness::{CaseOutcome, ComplianceCase, assert_case};
pub use metrics::{
    DeductionSchedule, MetricDefinition, MetricStatus, MetricThresholds, ScoringModel,
};
pub use reporter::{ComplianceReport, ReportSummary, Reporter};
pub use rules::{Finding, Rule, RuleCatalog};
pub use scan::{LoadedSources, SourceFile, SourceLoader};

/// Result type for validation operations
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Validation error types
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Unknown rule: {0}")]
    UnknownRule(String),

    #[error("Unknown SOP: {0}")]
    UnknownSop(String),

    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Configuration source error: {0}")]
    Figment(#[from] Box<figment::Error>),
}

/// Severity level of a rule
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Critical => write!(f, "CRITICAL"),
            Self::High => write!(f, "HIGH"),
            Self::Medium => write!(f, "MEDIUM"),
        }
    }
}

/// Compliance category a rule belongs to
///
/// Membership is fixed at catalog construction; the declaration order here is
/// the canonical evaluation and reporting order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Security,
    ErrorHandling,
    Performance,
    Reliability,
    Maintainability,
    Transactions,
    TenantIsolation,
}

impl Category {
    /// All categories in canonical order
    pub const ALL: [Category; 7] = [
        Category::Security,
        Category::ErrorHandling,
        Category::Performance,
        Category::Reliability,
        Category::Maintainability,
        Category::Transactions,
        Category::TenantIsolation,
    ];

    /// Stable identifier used on the command line and in configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Security => "security",
            Self::ErrorHandling => "error-handling",
            Self::Performance => "performance",
            Self::Reliability => "reliability",
            Self::Maintainability => "maintainability",
            Self::Transactions => "transactions",
            Self::TenantIsolation => "tenant-isolation",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| ValidationError::UnknownCategory(s.to_string()))
    }
}
