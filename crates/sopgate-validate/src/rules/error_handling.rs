//! Error Handling Rules
//!
//! - ERR001: generic `Error` thrown where a typed exception belongs
//! - ERR002: empty catch block
//! - ERR003: catch block that only logs
//! - ERR004: promise chain without a rejection handler
//! - ERR005: string literal thrown instead of an error object

use super::heuristics::{block_body, is_comment};
use super::{Finding, Rule};
use crate::context::LineContext;
use crate::{Category, Severity};
use once_cell::sync::Lazy;
use regex::Regex;

/// Lines scanned after `.then(` for a `.catch(`
const REJECTION_HANDLER_WINDOW: usize = 5;

static THROW_GENERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bthrow\s+new\s+Error\s*\(").expect("valid regex"));

static CATCH_EMPTY_INLINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^.\w$])catch\s*(?:\([^)]*\))?\s*\{\s*\}").expect("valid regex")
});

static CATCH_OPEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^.\w$])catch\s*(?:\([^)]*\))?\s*\{\s*$").expect("valid regex")
});

static LOG_ONLY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:(?:this\.)?(?:logger|log)|console)\.\w+\s*\(").expect("valid regex")
});

static THEN_CALL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.then\s*\(").expect("valid regex"));

static CATCH_CALL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.catch\s*\(").expect("valid regex"));

static THROW_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\bthrow\s+['"`]"#).expect("valid regex"));

fn check_generic_error(line: &str, _: usize, _: &LineContext<'_>) -> Option<Finding> {
    if is_comment(line) {
        return None;
    }
    THROW_GENERIC.is_match(line).then(|| {
        Finding::new("Generic Error thrown; use a typed exception")
            .with_fix("throw new NotFoundException(...) / BadRequestException(...)")
    })
}

fn check_empty_catch(line: &str, _: usize, ctx: &LineContext<'_>) -> Option<Finding> {
    if is_comment(line) {
        return None;
    }
    let empty = CATCH_EMPTY_INLINE.is_match(line)
        || (CATCH_OPEN.is_match(line)
            && ctx
                .following_lines
                .iter()
                .map(|l| l.trim())
                .find(|l| !l.is_empty())
                .is_some_and(|l| l.starts_with('}')));
    empty.then(|| {
        Finding::new("Empty catch block swallows the error").with_fix("Rethrow or handle the error")
    })
}

fn check_log_only_catch(line: &str, _: usize, ctx: &LineContext<'_>) -> Option<Finding> {
    let open = CATCH_OPEN.find(line)?;
    // Measure from the catch itself so a leading `}` does not cancel the `{`
    let body: Vec<&str> = block_body(&line[open.start()..], ctx.following_lines)
        .into_iter()
        .filter(|l| !l.trim().is_empty())
        .collect();
    let only_logs = !body.is_empty() && body.iter().all(|l| LOG_ONLY.is_match(l));
    only_logs.then(|| {
        Finding::new("Catch block only logs the error").with_fix("Rethrow, translate, or recover")
    })
}

fn check_unhandled_promise(line: &str, _: usize, ctx: &LineContext<'_>) -> Option<Finding> {
    if is_comment(line) || !THEN_CALL.is_match(line) {
        return None;
    }
    let trimmed = line.trim_start();
    if trimmed.starts_with("return") || line.contains("await") {
        return None;
    }
    let handled = CATCH_CALL.is_match(line)
        || ctx
            .following_lines
            .iter()
            .take(REJECTION_HANDLER_WINDOW)
            .any(|l| CATCH_CALL.is_match(l));
    (!handled).then(|| Finding::new("Promise chain without .catch() handler"))
}

fn check_throw_literal(line: &str, _: usize, _: &LineContext<'_>) -> Option<Finding> {
    if is_comment(line) {
        return None;
    }
    THROW_LITERAL.is_match(line).then(|| {
        Finding::new("String literal thrown; stack trace is lost").with_fix("throw new Error(...)")
    })
}

pub fn rules() -> Vec<Rule> {
    vec![
        Rule {
            id: "ERR001",
            name: "typed-exceptions",
            category: Category::ErrorHandling,
            severity: Severity::High,
            description: "Services throw framework exceptions carrying a status",
            remediation: "Replace generic Error with NotFoundException, BadRequestException, etc.",
            check: check_generic_error,
        },
        Rule {
            id: "ERR002",
            name: "no-empty-catch",
            category: Category::ErrorHandling,
            severity: Severity::High,
            description: "Errors must not be silently swallowed",
            remediation: "Handle or rethrow every caught error",
            check: check_empty_catch,
        },
        Rule {
            id: "ERR003",
            name: "no-log-and-forget",
            category: Category::ErrorHandling,
            severity: Severity::Medium,
            description: "Logging alone does not handle an error",
            remediation: "After logging, rethrow or return an explicit failure",
            check: check_log_only_catch,
        },
        Rule {
            id: "ERR004",
            name: "handle-promise-rejection",
            category: Category::ErrorHandling,
            severity: Severity::Medium,
            description: "Promise chains need a rejection handler",
            remediation: "Add .catch() or switch to async/await inside try/catch",
            check: check_unhandled_promise,
        },
        Rule {
            id: "ERR005",
            name: "throw-error-objects",
            category: Category::ErrorHandling,
            severity: Severity::High,
            description: "Only Error instances may be thrown",
            remediation: "Wrap thrown messages in Error objects",
            check: check_throw_literal,
        },
    ]
}
