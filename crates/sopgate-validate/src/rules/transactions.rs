//! Transaction Integrity Rules
//!
//! - TXN001: several writes to different tables in one function without a
//!   transaction wrapper, reported once at the first write
//! - TXN002: write through the outer client inside a `$transaction` callback
//!
//! Function scope is searched up to the structural scan limit, so only
//! functions longer than that are partially visible.

use super::heuristics::{FunctionScope, function_scope, is_comment};
use super::{Finding, Rule};
use crate::context::LineContext;
use crate::{Category, Severity};
use once_cell::sync::Lazy;
use regex::Regex;

/// `<client>.<table>.<write>(`
pub static WRITE_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:\b([\w$]+)\.)?([\w$]+)\.(create|createMany|update|updateMany|upsert|delete|deleteMany)\s*\(",
    )
    .expect("valid regex")
});

static DB_CLIENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:prisma\w*|tx|trx|db|database|client|manager|em)$").expect("valid regex")
});

static OUTER_CLIENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^prisma\w*$").expect("valid regex"));

static TRANSACTION_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$transaction\b|\.transaction\s*\(").expect("valid regex"));

/// Database write on a line: `(client, table)`
pub fn write_target(line: &str) -> Option<(&str, &str)> {
    if is_comment(line) {
        return None;
    }
    WRITE_CALL.captures_iter(line).find_map(|cap| {
        let client = cap.get(1)?.as_str();
        let table = cap.get(2)?.as_str();
        DB_CLIENT.is_match(client).then_some((client, table))
    })
}

fn scope_is_transactional(scope: &FunctionScope<'_>) -> bool {
    scope.lines.iter().any(|l| TRANSACTION_MARKER.is_match(l))
}

fn check_multi_table_write(line: &str, _: usize, ctx: &LineContext<'_>) -> Option<Finding> {
    let (_, table) = write_target(line)?;
    let scope = function_scope(ctx)?;
    if scope_is_transactional(&scope) {
        return None;
    }

    let writes: Vec<(usize, &str)> = scope
        .lines
        .iter()
        .enumerate()
        .filter_map(|(i, l)| write_target(l).map(|(_, t)| (i, t)))
        .collect();

    // Report only at the first write so one function yields one violation
    if writes.first().map(|(i, _)| *i) != Some(scope.target) {
        return None;
    }
    let other = writes.iter().map(|(_, t)| *t).find(|t| *t != table)?;
    Some(
        Finding::new(format!(
            "Writes to {table} and {other} are not wrapped in a transaction"
        ))
        .with_fix("Wrap related writes in prisma.$transaction(async (tx) => { ... })"),
    )
}

fn check_outer_client_in_transaction(
    line: &str,
    _: usize,
    ctx: &LineContext<'_>,
) -> Option<Finding> {
    let (client, _) = write_target(line)?;
    if !OUTER_CLIENT.is_match(client) {
        return None;
    }
    let scope = function_scope(ctx)?;
    TRANSACTION_MARKER.is_match(scope.start_line()).then(|| {
        Finding::new(format!(
            "{client} used inside a transaction callback; the write escapes the transaction"
        ))
        .with_fix("Use the callback's tx client")
    })
}

pub fn rules() -> Vec<Rule> {
    vec![
        Rule {
            id: "TXN001",
            name: "wrap-multi-table-writes",
            category: Category::Transactions,
            severity: Severity::High,
            description: "Related writes to several tables must be atomic",
            remediation: "Group multi-table writes in a single $transaction",
            check: check_multi_table_write,
        },
        Rule {
            id: "TXN002",
            name: "use-transaction-client",
            category: Category::Transactions,
            severity: Severity::High,
            description: "Writes inside a transaction callback must use its client",
            remediation: "Route every write inside $transaction through tx",
            check: check_outer_client_in_transaction,
        },
    ]
}
