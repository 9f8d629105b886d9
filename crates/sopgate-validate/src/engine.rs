//! Rule Engine
//!
//! Runs the rules of each selected category against every loaded file and
//! folds findings into one `ValidationResult` per category.
//!
//! Ordering is part of the contract: findings are appended by file, then
//! line, then rule registration order. Categories are evaluated on rayon
//! workers and merged back in selection order, so parallel and sequential
//! runs produce identical output.

use crate::context::{ContextWindow, LineContext};
use crate::metrics::{MetricStatus, ScoringModel};
use crate::rules::{Rule, RuleCatalog};
use crate::scan::SourceFile;
use crate::{Category, Result, Severity, ValidationError};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::str::FromStr;
use tracing::{debug, warn};

/// Where a finding ends up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Violations,
    Warnings,
}

/// Severity-to-bucket mapping plus per-rule escalations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityPolicy {
    pub buckets: BTreeMap<Severity, Bucket>,
    /// Rule ids always routed to `violations`
    pub escalations: BTreeSet<String>,
}

impl Default for SeverityPolicy {
    fn default() -> Self {
        Self {
            buckets: BTreeMap::from([
                (Severity::Critical, Bucket::Violations),
                (Severity::High, Bucket::Violations),
                (Severity::Medium, Bucket::Warnings),
            ]),
            escalations: BTreeSet::new(),
        }
    }
}

impl SeverityPolicy {
    pub fn with_bucket(mut self, severity: Severity, bucket: Bucket) -> Self {
        self.buckets.insert(severity, bucket);
        self
    }

    pub fn escalate(mut self, rule_id: impl Into<String>) -> Self {
        self.escalations.insert(rule_id.into().to_ascii_uppercase());
        self
    }

    pub fn bucket_for(&self, rule: &Rule) -> Bucket {
        if self.escalations.contains(&rule.id.to_ascii_uppercase()) {
            return Bucket::Violations;
        }
        self.buckets
            .get(&rule.severity)
            .copied()
            .unwrap_or(Bucket::Violations)
    }
}

/// Blocking finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub file: String,
    pub line: usize,
    pub rule_id: String,
    pub message: String,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<String>,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {}:{} - {} ({})",
            self.rule_id, self.file, self.line, self.message, self.severity
        )
    }
}

/// Advisory finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub file: String,
    pub line: usize,
    pub rule_id: String,
    pub message: String,
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}:{} - {}", self.rule_id, self.file, self.line, self.message)
    }
}

/// Kind of internal diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// File could not be read or decoded; it was skipped
    LoadFailure,
    /// A rule check panicked; treated as no finding
    RuleFault,
}

/// Environment problem, never a compliance finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub file: Option<String>,
    pub line: Option<usize>,
    pub rule_id: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn load_failure(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::LoadFailure,
            file: Some(file.into()),
            line: None,
            rule_id: None,
            message: message.into(),
        }
    }

    pub fn rule_fault(file: &str, line: usize, rule_id: &str, message: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::RuleFault,
            file: Some(file.to_string()),
            line: Some(line),
            rule_id: Some(rule_id.to_string()),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.kind {
            DiagnosticKind::LoadFailure => "load failure",
            DiagnosticKind::RuleFault => "rule fault",
        };
        write!(f, "{kind}")?;
        if let Some(file) = &self.file {
            write!(f, " {file}")?;
            if let Some(line) = self.line {
                write!(f, ":{line}")?;
            }
        }
        if let Some(rule) = &self.rule_id {
            write!(f, " [{rule}]")?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Result of one category over all files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub category: Category,
    pub metric_name: String,
    pub score: f64,
    /// True when no violation was recorded
    pub passed: bool,
    pub status: MetricStatus,
    pub violations: Vec<Violation>,
    pub warnings: Vec<Warning>,
    /// Remediation text of every rule that fired, in rule order
    pub suggestions: Vec<String>,
}

/// Everything produced by one engine invocation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationRun {
    pub results: Vec<ValidationResult>,
    pub diagnostics: Vec<Diagnostic>,
    pub files_analyzed: usize,
}

impl ValidationRun {
    pub fn violations(&self) -> impl Iterator<Item = &Violation> {
        self.results.iter().flat_map(|r| r.violations.iter())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Warning> {
        self.results.iter().flat_map(|r| r.warnings.iter())
    }

    pub fn violation_count(&self) -> usize {
        self.results.iter().map(|r| r.violations.len()).sum()
    }

    pub fn warning_count(&self) -> usize {
        self.results.iter().map(|r| r.warnings.len()).sum()
    }

    pub fn result(&self, category: Category) -> Option<&ValidationResult> {
        self.results.iter().find(|r| r.category == category)
    }

    /// Append diagnostics produced before evaluation (loader failures)
    pub fn with_diagnostics(mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) -> Self {
        let mut merged: Vec<Diagnostic> = diagnostics.into_iter().collect();
        merged.append(&mut self.diagnostics);
        self.diagnostics = merged;
        self
    }
}

/// Which categories/rules to evaluate
///
/// Empty selection means every category of the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selection {
    pub categories: Vec<String>,
    pub rules: Vec<String>,
    pub sops: Vec<String>,
}

impl Selection {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn categories<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            categories: categories.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn category(category: Category) -> Self {
        Self::categories([category.as_str()])
    }

    pub fn rules<I, S>(rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rules: rules.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_sops<I, S>(mut self, sops: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sops.extend(sops.into_iter().map(Into::into));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.rules.is_empty() && self.sops.is_empty()
    }

    /// Resolve to the rules of each touched category, in catalog order
    ///
    /// Any unknown id fails the whole selection before anything runs.
    pub fn resolve<'c>(
        &self,
        catalog: &'c RuleCatalog,
        sops: &BTreeMap<String, Vec<Category>>,
    ) -> Result<Vec<(Category, Vec<&'c Rule>)>> {
        if self.is_empty() {
            return Ok(catalog
                .categories()
                .into_iter()
                .map(|c| (c, catalog.rules_by_category(c)))
                .collect());
        }

        let mut whole: BTreeSet<Category> = BTreeSet::new();
        for id in &self.categories {
            whole.insert(Category::from_str(id)?);
        }
        for sop in &self.sops {
            let mapped = sops
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(sop))
                .map(|(_, categories)| categories)
                .ok_or_else(|| ValidationError::UnknownSop(sop.clone()))?;
            whole.extend(mapped.iter().copied());
        }

        let mut explicit: BTreeSet<&str> = BTreeSet::new();
        for id in &self.rules {
            let rule = catalog
                .get(id)
                .ok_or_else(|| ValidationError::UnknownRule(id.clone()))?;
            explicit.insert(rule.id);
        }

        let mut plan = Vec::new();
        for category in Category::ALL {
            let rules: Vec<&Rule> = catalog
                .rules_by_category(category)
                .into_iter()
                .filter(|r| whole.contains(&category) || explicit.contains(r.id))
                .collect();
            if whole.contains(&category) || !rules.is_empty() {
                plan.push((category, rules));
            }
        }
        Ok(plan)
    }
}

/// Rule engine bound to a catalog
#[derive(Debug, Clone)]
pub struct RuleEngine<'c> {
    catalog: &'c RuleCatalog,
    policy: SeverityPolicy,
    scoring: ScoringModel,
    window: ContextWindow,
    sops: BTreeMap<String, Vec<Category>>,
}

impl<'c> RuleEngine<'c> {
    pub fn new(catalog: &'c RuleCatalog) -> Self {
        Self {
            catalog,
            policy: SeverityPolicy::default(),
            scoring: ScoringModel::default(),
            window: ContextWindow::default(),
            sops: BTreeMap::new(),
        }
    }

    pub fn with_policy(mut self, policy: SeverityPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_scoring(mut self, scoring: ScoringModel) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn with_window(mut self, window: ContextWindow) -> Self {
        self.window = window;
        self
    }

    pub fn with_sops(mut self, sops: BTreeMap<String, Vec<Category>>) -> Self {
        self.sops = sops;
        self
    }

    pub fn catalog(&self) -> &'c RuleCatalog {
        self.catalog
    }

    pub fn scoring(&self) -> &ScoringModel {
        &self.scoring
    }

    /// Evaluate a selection against in-memory files
    pub fn run(&self, selection: &Selection, files: &[SourceFile]) -> Result<ValidationRun> {
        let plan = selection.resolve(self.catalog, &self.sops)?;

        let evaluated: Vec<(ValidationResult, Vec<Diagnostic>)> = plan
            .par_iter()
            .map(|(category, rules)| self.evaluate(*category, rules, files))
            .collect();

        let mut run = ValidationRun {
            files_analyzed: files.len(),
            ..ValidationRun::default()
        };
        for (result, diagnostics) in evaluated {
            run.results.push(result);
            run.diagnostics.extend(diagnostics);
        }
        Ok(run)
    }

    /// Evaluate every rule of one category
    pub fn run_category(&self, category: Category, files: &[SourceFile]) -> ValidationRun {
        let rules = self.catalog.rules_by_category(category);
        let (result, diagnostics) = self.evaluate(category, &rules, files);
        ValidationRun {
            results: vec![result],
            diagnostics,
            files_analyzed: files.len(),
        }
    }

    fn evaluate(
        &self,
        category: Category,
        rules: &[&Rule],
        files: &[SourceFile],
    ) -> (ValidationResult, Vec<Diagnostic>) {
        let mut violations = Vec::new();
        let mut warnings = Vec::new();
        let mut diagnostics = Vec::new();
        let mut fired: BTreeSet<usize> = BTreeSet::new();

        for file in files {
            let lines: Vec<&str> = file.content.lines().collect();
            for (index, line) in lines.iter().enumerate() {
                let line_number = index + 1;
                let ctx = LineContext::build(&lines, index, &file.content, &file.name, &self.window);

                for (position, rule) in rules.iter().enumerate() {
                    let finding = match catch_unwind(AssertUnwindSafe(|| {
                        (rule.check)(line, line_number, &ctx)
                    })) {
                        Ok(finding) => finding,
                        Err(payload) => {
                            let message = panic_message(payload.as_ref());
                            warn!(rule = rule.id, file = %file.name, line = line_number, %message, "rule check panicked");
                            diagnostics.push(Diagnostic::rule_fault(
                                &file.name,
                                line_number,
                                rule.id,
                                message,
                            ));
                            None
                        }
                    };

                    let Some(finding) = finding else { continue };
                    fired.insert(position);
                    match self.policy.bucket_for(rule) {
                        Bucket::Violations => violations.push(Violation {
                            file: file.name.clone(),
                            line: line_number,
                            rule_id: rule.id.to_string(),
                            message: finding.message,
                            severity: rule.severity,
                            fix: finding.suggested_fix,
                        }),
                        Bucket::Warnings => warnings.push(Warning {
                            file: file.name.clone(),
                            line: line_number,
                            rule_id: rule.id.to_string(),
                            message: finding.message,
                        }),
                    }
                }
            }
        }

        let metric = self.scoring.metric(category);
        let score = self
            .scoring
            .deductions(category)
            .score(violations.iter().map(|v: &Violation| v.severity), warnings.len());
        let suggestions = fired
            .into_iter()
            .map(|position| rules[position].remediation.to_string())
            .collect();

        debug!(
            category = %category,
            rules = rules.len(),
            violations = violations.len(),
            warnings = warnings.len(),
            score,
            "category evaluated"
        );

        let result = ValidationResult {
            category,
            metric_name: metric.name.clone(),
            score,
            passed: violations.is_empty(),
            status: metric.status(score),
            violations,
            warnings,
            suggestions,
        };
        (result, diagnostics)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "rule check panicked".to_string())
}
