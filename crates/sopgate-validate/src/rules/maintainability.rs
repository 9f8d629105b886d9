//! Maintainability Rules

use super::heuristics::{is_comment, is_test_file};
use super::{Finding, Rule};
use crate::context::LineContext;
use crate::{Category, Severity};
use once_cell::sync::Lazy;
use regex::Regex;

static PENDING_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?://|/\*|^\s*\*).*\b(TODO|FIXME|HACK|XXX)\b").expect("valid regex")
});

static CONSOLE_LOG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bconsole\.log\s*\(").expect("valid regex"));

static EXPLICIT_ANY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":\s*any\b|\bas\s+any\b|<any>|\bany\[\]").expect("valid regex"));

/// Whole-line `debugger` statement
pub static DEBUGGER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*debugger\s*;?\s*$").expect("valid regex"));

fn check_pending_marker(line: &str, _: usize, _: &LineContext<'_>) -> Option<Finding> {
    let cap = PENDING_MARKER.captures(line)?;
    let marker = cap.get(1).map_or("marker", |m| m.as_str());
    Some(Finding::new(format!("{marker} comment left in code")))
}

fn check_console_log(line: &str, _: usize, ctx: &LineContext<'_>) -> Option<Finding> {
    if is_comment(line) || is_test_file(ctx.filename) {
        return None;
    }
    CONSOLE_LOG
        .is_match(line)
        .then(|| Finding::new("console.log in service code").with_fix("Use the injected Logger"))
}

fn check_explicit_any(line: &str, _: usize, _: &LineContext<'_>) -> Option<Finding> {
    if is_comment(line) {
        return None;
    }
    EXPLICIT_ANY
        .is_match(line)
        .then(|| Finding::new("Explicit any disables type checking"))
}

fn check_debugger(line: &str, _: usize, _: &LineContext<'_>) -> Option<Finding> {
    DEBUGGER
        .is_match(line)
        .then(|| Finding::new("debugger statement left in code").with_fix("Remove the statement"))
}

pub fn rules() -> Vec<Rule> {
    vec![
        Rule {
            id: "MAINT001",
            name: "no-pending-markers",
            category: Category::Maintainability,
            severity: Severity::Medium,
            description: "Pending-work comments should be tracked as issues",
            remediation: "Resolve pending-work comments or move them to the issue tracker",
            check: check_pending_marker,
        },
        Rule {
            id: "MAINT002",
            name: "no-console-log",
            category: Category::Maintainability,
            severity: Severity::Medium,
            description: "Service code logs through the framework logger",
            remediation: "Replace console.log with Logger",
            check: check_console_log,
        },
        Rule {
            id: "MAINT003",
            name: "no-explicit-any",
            category: Category::Maintainability,
            severity: Severity::Medium,
            description: "Types should be explicit",
            remediation: "Replace any with a concrete type or unknown",
            check: check_explicit_any,
        },
        Rule {
            id: "MAINT004",
            name: "no-debugger",
            category: Category::Maintainability,
            severity: Severity::High,
            description: "debugger statements must not ship",
            remediation: "Remove debugger statements",
            check: check_debugger,
        },
    ]
}
