//! Performance Rules
//!
//! - PERF001: sequential `await` inside a loop body
//! - PERF002: blocking filesystem call inside a function
//! - PERF003: unbounded `findMany`
//! - PERF004: JSON round-trip deep clone

use super::heuristics::{block_body, call_text, is_comment};
use super::{Finding, Rule};
use crate::context::LineContext;
use crate::{Category, Severity};
use once_cell::sync::Lazy;
use regex::Regex;

static LOOP_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bfor\s*\(|\bwhile\s*\(|\bdo\s*\{|\.forEach\s*\(").expect("valid regex")
});

static AWAIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bawait\b").expect("valid regex"));

static PARALLEL_COMBINATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bPromise\.(?:all|allSettled)\s*\(").expect("valid regex"));

static SYNC_FS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:readFileSync|writeFileSync|appendFileSync|existsSync|readdirSync|statSync|mkdirSync|unlinkSync)\s*\(",
    )
    .expect("valid regex")
});

static FIND_MANY: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.findMany\s*\(").expect("valid regex"));

static TAKE_OPTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\btake\s*:").expect("valid regex"));

/// `JSON.parse(JSON.stringify(...))`
pub static JSON_DEEP_CLONE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"JSON\.parse\s*\(\s*JSON\.stringify\s*\(").expect("valid regex")
});

fn check_await_in_loop(line: &str, _: usize, ctx: &LineContext<'_>) -> Option<Finding> {
    if is_comment(line) || line.trim_start().starts_with('}') {
        return None;
    }
    let header = LOOP_START.find(line)?;

    // Rest of the opening line plus the block body in the forward window
    let mut body = vec![&line[header.end()..]];
    body.extend(block_body(line, ctx.following_lines));

    let awaits = body.iter().any(|l| AWAIT.is_match(l));
    let parallel = body.iter().any(|l| PARALLEL_COMBINATOR.is_match(l));
    (awaits && !parallel).then(|| {
        Finding::new("await inside loop body runs sequentially")
            .with_fix("Collect the promises and await Promise.all(...)")
    })
}

fn check_sync_fs(line: &str, _: usize, ctx: &LineContext<'_>) -> Option<Finding> {
    if is_comment(line) || !ctx.inside_function {
        return None;
    }
    SYNC_FS.is_match(line).then(|| {
        Finding::new("Synchronous filesystem call blocks the event loop")
            .with_fix("Use the fs/promises equivalent")
    })
}

fn check_unbounded_find_many(line: &str, _: usize, ctx: &LineContext<'_>) -> Option<Finding> {
    if is_comment(line) || !FIND_MANY.is_match(line) {
        return None;
    }
    let call = call_text(line, ctx.following_lines);
    (!TAKE_OPTION.is_match(&call)).then(|| {
        Finding::new("findMany without pagination").with_fix("Add take/skip or cursor pagination")
    })
}

fn check_json_clone(line: &str, _: usize, _: &LineContext<'_>) -> Option<Finding> {
    if is_comment(line) {
        return None;
    }
    JSON_DEEP_CLONE.is_match(line).then(|| {
        Finding::new("JSON round-trip used as deep clone").with_fix("Use structuredClone(...)")
    })
}

pub fn rules() -> Vec<Rule> {
    vec![
        Rule {
            id: "PERF001",
            name: "no-await-in-loop",
            category: Category::Performance,
            severity: Severity::High,
            description: "Independent async work inside loops should run concurrently",
            remediation: "Batch loop awaits with Promise.all",
            check: check_await_in_loop,
        },
        Rule {
            id: "PERF002",
            name: "no-sync-fs",
            category: Category::Performance,
            severity: Severity::Medium,
            description: "Blocking fs calls stall request handling",
            remediation: "Prefer fs/promises inside request paths",
            check: check_sync_fs,
        },
        Rule {
            id: "PERF003",
            name: "paginate-find-many",
            category: Category::Performance,
            severity: Severity::Medium,
            description: "Collection queries must be bounded",
            remediation: "Paginate list queries with take/skip",
            check: check_unbounded_find_many,
        },
        Rule {
            id: "PERF004",
            name: "no-json-deep-clone",
            category: Category::Performance,
            severity: Severity::Medium,
            description: "JSON round-trips are slow and lossy",
            remediation: "Use structuredClone for deep copies",
            check: check_json_clone,
        },
    ]
}
