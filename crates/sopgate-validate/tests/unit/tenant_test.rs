//! Tests for Tenant Isolation Rules

use crate::test_utils::{assert_close, run_category, violation_rules};
use sopgate_validate::{Category, Severity};

#[test]
fn test_model_query_without_tenant_filter() {
    let source = "\
const orders = await prisma.order.findMany({ where: { status } });
const mine = await prisma.order.findMany({ where: { tenantId, status } });
const plans = await prisma.plan.findMany();
const spanning = await prisma.invoice.findFirst({
  where: { tenantId: ctx.tenantId, id },
});
";
    let result = run_category(Category::TenantIsolation, &[("orders.repo.ts", source)]);
    assert_eq!(violation_rules(&result), ["TEN001"]);
    assert_eq!(result.violations[0].severity, Severity::Critical);
    assert_close(result.score, 0.60);
}

#[test]
fn test_raw_query_and_body_tenant() {
    let source = "\
await prisma.$queryRaw`SELECT * FROM orders`;
await prisma.$queryRaw`SELECT * FROM orders WHERE tenant_id = ${tenantId}`;
const { tenantId } = req.body;
";
    let result = run_category(Category::TenantIsolation, &[("raw.ts", source)]);
    assert_eq!(violation_rules(&result), ["TEN002", "TEN003"]);
    let lines: Vec<usize> = result.violations.iter().map(|v| v.line).collect();
    assert_eq!(lines, [1, 3]);
}
