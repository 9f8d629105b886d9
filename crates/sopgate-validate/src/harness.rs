//! Exact-expectation harness
//!
//! A case names one category, a set of in-memory files, and the exact number
//! of violations and warnings plus the pass flag that category must produce.
//! Every expectation is compared with `==`; there are no tolerances.

use crate::engine::{RuleEngine, Selection};
use crate::scan::SourceFile;
use crate::{Category, Result, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One expectation fixture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceCase {
    pub name: String,
    pub category: Category,
    pub files: BTreeMap<String, String>,
    pub expected_violations: usize,
    pub expected_warnings: usize,
    pub expected_passed: bool,
}

/// Observed values and every mismatch against the expectation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseOutcome {
    pub name: String,
    pub violations: usize,
    pub warnings: usize,
    pub passed: bool,
    pub mismatches: Vec<String>,
}

impl CaseOutcome {
    pub fn is_success(&self) -> bool {
        self.mismatches.is_empty()
    }
}

#[derive(Deserialize)]
struct CaseFile {
    #[serde(rename = "case", default)]
    cases: Vec<ComplianceCase>,
}

impl ComplianceCase {
    pub fn new(name: impl Into<String>, category: Category) -> Self {
        Self {
            name: name.into(),
            category,
            files: BTreeMap::new(),
            expected_violations: 0,
            expected_warnings: 0,
            expected_passed: true,
        }
    }

    pub fn with_file(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.files.insert(name.into(), content.into());
        self
    }

    pub fn expect(mut self, violations: usize, warnings: usize, passed: bool) -> Self {
        self.expected_violations = violations;
        self.expected_warnings = warnings;
        self.expected_passed = passed;
        self
    }

    /// Parse `[[case]]` tables from TOML text
    pub fn from_toml(text: &str) -> Result<Vec<Self>> {
        let parsed: CaseFile =
            toml::from_str(text).map_err(|e| ValidationError::Config(e.to_string()))?;
        Ok(parsed.cases)
    }

    /// Run only this case's category and compare
    pub fn run(&self, engine: &RuleEngine<'_>) -> Result<CaseOutcome> {
        let files: Vec<SourceFile> = self
            .files
            .iter()
            .map(|(name, content)| SourceFile::new(name, content))
            .collect();
        let run = engine.run(&Selection::category(self.category), &files)?;
        let result = run.result(self.category);

        let violations = result.map_or(0, |r| r.violations.len());
        let warnings = result.map_or(0, |r| r.warnings.len());
        let passed = result.is_none_or(|r| r.passed);

        let mut mismatches = Vec::new();
        if violations != self.expected_violations {
            mismatches.push(format!(
                "violations: expected {}, got {violations}",
                self.expected_violations
            ));
        }
        if warnings != self.expected_warnings {
            mismatches.push(format!(
                "warnings: expected {}, got {warnings}",
                self.expected_warnings
            ));
        }
        if passed != self.expected_passed {
            mismatches.push(format!(
                "passed: expected {}, got {passed}",
                self.expected_passed
            ));
        }

        Ok(CaseOutcome {
            name: self.name.clone(),
            violations,
            warnings,
            passed,
            mismatches,
        })
    }
}

/// Run a case and panic listing every mismatch
pub fn assert_case(engine: &RuleEngine<'_>, case: &ComplianceCase) {
    let outcome = match case.run(engine) {
        Ok(outcome) => outcome,
        Err(e) => panic!("case '{}' could not run: {e}", case.name),
    };
    assert!(
        outcome.is_success(),
        "case '{}' failed:\n  {}",
        case.name,
        outcome.mismatches.join("\n  ")
    );
}
