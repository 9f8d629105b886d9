//! Shared test utilities for sopgate-validate tests

#![allow(dead_code)] // Test utilities may not all be used in every test file

use sopgate_validate::{Category, RuleCatalog, RuleEngine, SourceFile, ValidationResult};

/// Build in-memory sources from `(name, content)` pairs
pub fn sources(files: &[(&str, &str)]) -> Vec<SourceFile> {
    files
        .iter()
        .map(|(name, content)| SourceFile::new(*name, *content))
        .collect()
}

/// Run one category of the standard catalog with default policy
pub fn run_category(category: Category, files: &[(&str, &str)]) -> ValidationResult {
    let catalog = RuleCatalog::standard();
    let engine = RuleEngine::new(&catalog);
    let run = engine.run_category(category, &sources(files));
    run.results
        .into_iter()
        .next()
        .expect("category produced a result")
}

/// Rule ids of the violations, in report order
pub fn violation_rules(result: &ValidationResult) -> Vec<&str> {
    result.violations.iter().map(|v| v.rule_id.as_str()).collect()
}

/// Rule ids of the warnings, in report order
pub fn warning_rules(result: &ValidationResult) -> Vec<&str> {
    result.warnings.iter().map(|w| w.rule_id.as_str()).collect()
}

/// Assert that violations list is empty with descriptive message
pub fn assert_no_violations<V: std::fmt::Debug>(violations: &[V], context: &str) {
    assert!(
        violations.is_empty(),
        "{}: expected no violations, got {} - {:?}",
        context,
        violations.len(),
        violations
    );
}

/// Assert that violations list has expected count
pub fn assert_violation_count<V: std::fmt::Debug>(violations: &[V], expected: usize, context: &str) {
    assert_eq!(
        violations.len(),
        expected,
        "{}: expected {} violations, got {} - {:?}",
        context,
        expected,
        violations.len(),
        violations
    );
}

/// Float comparison for scores
pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
