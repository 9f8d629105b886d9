//! Security Rules
//!
//! - SEC001: hard-coded secrets
//! - SEC002: dynamic code evaluation
//! - SEC003: raw SQL assembled from interpolation or concatenation
//! - SEC004: plain-HTTP URLs to remote hosts
//! - SEC005: credentials written to the console

use super::heuristics::{is_comment, is_test_file};
use super::{Finding, Rule};
use crate::context::LineContext;
use crate::{Category, Severity};
use once_cell::sync::Lazy;
use regex::Regex;

static HARDCODED_SECRET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)\b(?:password|passwd|secret|token|api[_-]?key|private[_-]?key|client[_-]?secret)\w*["']?\s*[:=]\s*['"`][^'"`\s]{4,}['"`]"#,
    )
    .expect("valid regex")
});

static DYNAMIC_EVAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|[^.\w$])eval\s*\(|\bnew\s+Function\s*\(").expect("valid regex"));

static SQL_TEMPLATE_INTERPOLATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^\w$])`\s*(?i:select|insert|update|delete)\b[^`]*\$\{").expect("valid regex")
});

static SQL_CONCATENATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"['"]\s*(?i:select|insert|update|delete)\b[^'"]*['"]\s*\+"#).expect("valid regex")
});

static UNSAFE_RAW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$(?:queryRawUnsafe|executeRawUnsafe)\s*\(\s*[^'`\s)]").expect("valid regex"));

/// `http://` followed by its host
pub static HTTP_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"http://([^/\s'`:\x22]+)").expect("valid regex"));

static CONSOLE_CREDENTIAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bconsole\.\w+\s*\(.*(?i:password|token|secret|credential)").expect("valid regex")
});

/// Hosts that may legitimately be reached over plain HTTP
pub fn is_local_host(host: &str) -> bool {
    matches!(host, "localhost" | "127.0.0.1" | "0.0.0.0" | "www.w3.org")
        || host.starts_with("localhost")
        || host.ends_with(".local")
}

fn check_hardcoded_secret(line: &str, _: usize, ctx: &LineContext<'_>) -> Option<Finding> {
    if is_comment(line) || is_test_file(ctx.filename) || line.contains("process.env") {
        return None;
    }
    HARDCODED_SECRET.is_match(line).then(|| {
        Finding::new("Hard-coded secret literal").with_fix("Load the value from configuration or a secret store")
    })
}

fn check_dynamic_eval(line: &str, _: usize, _: &LineContext<'_>) -> Option<Finding> {
    if is_comment(line) {
        return None;
    }
    DYNAMIC_EVAL
        .is_match(line)
        .then(|| Finding::new("Dynamic code evaluation via eval/new Function"))
}

fn check_raw_sql(line: &str, _: usize, _: &LineContext<'_>) -> Option<Finding> {
    if is_comment(line) {
        return None;
    }
    let unsafe_sql = SQL_TEMPLATE_INTERPOLATION.is_match(line)
        || SQL_CONCATENATION.is_match(line)
        || UNSAFE_RAW.is_match(line);
    unsafe_sql.then(|| {
        Finding::new("Raw SQL built from interpolated or concatenated input")
            .with_fix("Use a parameterised query (Prisma.sql or tagged $queryRaw)")
    })
}

fn check_plain_http(line: &str, _: usize, _: &LineContext<'_>) -> Option<Finding> {
    if is_comment(line) {
        return None;
    }
    let remote = HTTP_URL
        .captures_iter(line)
        .filter_map(|cap| cap.get(1))
        .find(|host| !is_local_host(host.as_str()))?;
    Some(
        Finding::new(format!("Plain HTTP URL to remote host {}", remote.as_str()))
            .with_fix("Use https://"),
    )
}

fn check_console_credentials(line: &str, _: usize, _: &LineContext<'_>) -> Option<Finding> {
    if is_comment(line) {
        return None;
    }
    CONSOLE_CREDENTIAL
        .is_match(line)
        .then(|| Finding::new("Credential value written to console output"))
}

pub fn rules() -> Vec<Rule> {
    vec![
        Rule {
            id: "SEC001",
            name: "no-hardcoded-secrets",
            category: Category::Security,
            severity: Severity::Critical,
            description: "Secrets must not be committed as string literals",
            remediation: "Move secrets to environment configuration or a secret manager",
            check: check_hardcoded_secret,
        },
        Rule {
            id: "SEC002",
            name: "no-dynamic-eval",
            category: Category::Security,
            severity: Severity::Critical,
            description: "eval and new Function execute arbitrary code",
            remediation: "Replace dynamic evaluation with explicit dispatch",
            check: check_dynamic_eval,
        },
        Rule {
            id: "SEC003",
            name: "no-raw-sql-interpolation",
            category: Category::Security,
            severity: Severity::Critical,
            description: "SQL text must not be assembled from untrusted input",
            remediation: "Use parameterised queries for every raw SQL statement",
            check: check_raw_sql,
        },
        Rule {
            id: "SEC004",
            name: "https-only",
            category: Category::Security,
            severity: Severity::High,
            description: "Remote endpoints must be reached over TLS",
            remediation: "Switch remote URLs to https://",
            check: check_plain_http,
        },
        Rule {
            id: "SEC005",
            name: "no-credential-logging",
            category: Category::Security,
            severity: Severity::High,
            description: "Credentials must never reach log output",
            remediation: "Redact credentials before logging",
            check: check_console_credentials,
        },
    ]
}
