//! Reliability Rules
//!
//! - REL001: `JSON.parse` outside any try/catch
//! - REL002: outbound HTTP call without timeout or abort signal
//! - REL003: `process.exit` inside library/service functions
//! - REL004: `setInterval` handle discarded

use super::heuristics::{basename, call_text, is_comment};
use super::performance::JSON_DEEP_CLONE;
use super::{Finding, Rule};
use crate::context::LineContext;
use crate::{Category, Severity};
use once_cell::sync::Lazy;
use regex::Regex;

static JSON_PARSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bJSON\.parse\s*\(").expect("valid regex"));

static HTTP_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^.\w$])fetch\s*\(|\baxios(?:\.(?:get|post|put|patch|delete|request))?\s*\(")
        .expect("valid regex")
});

static TIMEOUT_OPTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\btimeout\b|\bsignal\b").expect("valid regex"));

static PROCESS_EXIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bprocess\.exit\s*\(").expect("valid regex"));

static SET_INTERVAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bsetInterval\s*\(").expect("valid regex"));

fn check_unguarded_json_parse(line: &str, _: usize, ctx: &LineContext<'_>) -> Option<Finding> {
    if is_comment(line) || ctx.inside_exception_handler || JSON_DEEP_CLONE.is_match(line) {
        return None;
    }
    JSON_PARSE.is_match(line).then(|| {
        Finding::new("JSON.parse outside try/catch throws on malformed input")
            .with_fix("Wrap the parse in try/catch and report a validation error")
    })
}

fn check_http_timeout(line: &str, _: usize, ctx: &LineContext<'_>) -> Option<Finding> {
    if is_comment(line) || !HTTP_CALL.is_match(line) {
        return None;
    }
    let call = call_text(line, ctx.following_lines);
    (!TIMEOUT_OPTION.is_match(&call)).then(|| {
        Finding::new("Outbound HTTP call without timeout")
            .with_fix("Pass a timeout or AbortSignal.timeout(...)")
    })
}

fn check_process_exit(line: &str, _: usize, ctx: &LineContext<'_>) -> Option<Finding> {
    if is_comment(line) || !ctx.inside_function || basename(ctx.filename).starts_with("main.") {
        return None;
    }
    PROCESS_EXIT.is_match(line).then(|| {
        Finding::new("process.exit inside a function kills in-flight requests")
            .with_fix("Throw an error and let the entry point decide")
    })
}

fn check_discarded_interval(line: &str, _: usize, _: &LineContext<'_>) -> Option<Finding> {
    if is_comment(line) {
        return None;
    }
    let call = SET_INTERVAL.find(line)?;
    let prefix = line[..call.start()].trim();
    (prefix.is_empty() || prefix.ends_with(';')).then(|| {
        Finding::new("setInterval handle discarded; timer can never be cleared")
            .with_fix("Keep the handle and clearInterval on shutdown")
    })
}

pub fn rules() -> Vec<Rule> {
    vec![
        Rule {
            id: "REL001",
            name: "guard-json-parse",
            category: Category::Reliability,
            severity: Severity::High,
            description: "Parsing untrusted JSON can throw",
            remediation: "Guard JSON.parse with try/catch",
            check: check_unguarded_json_parse,
        },
        Rule {
            id: "REL002",
            name: "http-timeouts",
            category: Category::Reliability,
            severity: Severity::Medium,
            description: "Outbound calls need an upper bound on latency",
            remediation: "Configure timeouts on every HTTP client call",
            check: check_http_timeout,
        },
        Rule {
            id: "REL003",
            name: "no-process-exit",
            category: Category::Reliability,
            severity: Severity::High,
            description: "Only the entry point may terminate the process",
            remediation: "Propagate fatal errors to main instead of exiting",
            check: check_process_exit,
        },
        Rule {
            id: "REL004",
            name: "retain-interval-handle",
            category: Category::Reliability,
            severity: Severity::Medium,
            description: "Intervals must be clearable on shutdown",
            remediation: "Store interval handles and clear them in onModuleDestroy",
            check: check_discarded_interval,
        },
    ]
}
