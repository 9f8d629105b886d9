//! Tenant Isolation Rules
//!
//! - TEN001: model query without a tenant filter
//! - TEN002: raw SQL without a tenant predicate
//! - TEN003: tenant id read from the request body

use super::heuristics::{call_text, is_comment, is_test_file};
use super::{Finding, Rule};
use crate::context::LineContext;
use crate::{Category, Severity};
use once_cell::sync::Lazy;
use regex::Regex;

/// Models shared by every tenant
const GLOBAL_MODELS: [&str; 4] = ["tenant", "plan", "featureFlag", "systemSetting"];

static MODEL_QUERY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:prisma\w*|tx|trx|db)\.([\w$]+)\.(?:findMany|findFirst|findFirstOrThrow|findUnique|findUniqueOrThrow|updateMany|deleteMany|count|aggregate|groupBy)\s*\(",
    )
    .expect("valid regex")
});

static TENANT_FILTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\btenantId\b|\btenant_id\b").expect("valid regex"));

static RAW_QUERY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$(?:queryRaw|executeRaw)(?:Unsafe)?\b").expect("valid regex")
});

static TENANT_FROM_BODY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:req\.|request\.)?body\.tenant(?:Id|_id)\b|\{[^}]*\btenantId\b[^}]*\}\s*=\s*(?:req|request)\.body\b")
        .expect("valid regex")
});

fn check_model_query_tenant(line: &str, _: usize, ctx: &LineContext<'_>) -> Option<Finding> {
    if is_comment(line) || is_test_file(ctx.filename) {
        return None;
    }
    let model = MODEL_QUERY.captures(line)?.get(1)?.as_str();
    if GLOBAL_MODELS.contains(&model) {
        return None;
    }
    let call = call_text(line, ctx.following_lines);
    (!TENANT_FILTER.is_match(&call)).then(|| {
        Finding::new(format!("Query on {model} has no tenantId filter"))
            .with_fix("Add tenantId to the where clause")
    })
}

fn check_raw_query_tenant(line: &str, _: usize, ctx: &LineContext<'_>) -> Option<Finding> {
    if is_comment(line) || !RAW_QUERY.is_match(line) {
        return None;
    }
    let call = call_text(line, ctx.following_lines);
    (!TENANT_FILTER.is_match(&call)).then(|| {
        Finding::new("Raw query without tenant_id predicate")
            .with_fix("Add WHERE tenant_id = ${tenantId}")
    })
}

fn check_tenant_from_body(line: &str, _: usize, _: &LineContext<'_>) -> Option<Finding> {
    if is_comment(line) {
        return None;
    }
    TENANT_FROM_BODY.is_match(line).then(|| {
        Finding::new("Tenant id taken from request body can be spoofed")
            .with_fix("Read the tenant from the authenticated context")
    })
}

pub fn rules() -> Vec<Rule> {
    vec![
        Rule {
            id: "TEN001",
            name: "scope-queries-by-tenant",
            category: Category::TenantIsolation,
            severity: Severity::Critical,
            description: "Every tenant-owned model query filters by tenantId",
            remediation: "Add tenantId to every query on tenant-owned models",
            check: check_model_query_tenant,
        },
        Rule {
            id: "TEN002",
            name: "scope-raw-sql-by-tenant",
            category: Category::TenantIsolation,
            severity: Severity::High,
            description: "Raw SQL must constrain tenant_id",
            remediation: "Include a tenant_id predicate in raw SQL",
            check: check_raw_query_tenant,
        },
        Rule {
            id: "TEN003",
            name: "trusted-tenant-source",
            category: Category::TenantIsolation,
            severity: Severity::High,
            description: "Tenant identity comes from the auth context, never from input",
            remediation: "Resolve the tenant from the authenticated request context",
            check: check_tenant_from_body,
        },
    ]
}
