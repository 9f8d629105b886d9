//! Tests for Performance Rules

use crate::test_utils::{assert_close, run_category, violation_rules, warning_rules};
use sopgate_validate::Category;

const SYNC_JOB: &str = "\
async function sync(items) {
  for (const item of items) {
    await save(item);
  }
  await Promise.all(items.map((item) => save(item)));
  const raw = fs.readFileSync(path, 'utf8');
  const users = await prisma.user.findMany({ where: { active: true } });
  const page = await prisma.user.findMany({ take: 20 });
  const copy = JSON.parse(JSON.stringify(order));
}
";

#[test]
fn test_performance_findings() {
    let result = run_category(Category::Performance, &[("sync.job.ts", SYNC_JOB)]);
    assert_eq!(violation_rules(&result), ["PERF001"]);
    assert_eq!(result.violations[0].line, 2);
    assert_eq!(warning_rules(&result), ["PERF002", "PERF003", "PERF004"]);
    let warning_lines: Vec<usize> = result.warnings.iter().map(|w| w.line).collect();
    assert_eq!(warning_lines, [6, 7, 9]);
    assert_close(result.score, 1.0 - 0.10 - 3.0 * 0.02);
    assert!(!result.passed);
}

#[test]
fn test_parallel_loop_body_is_fine() {
    let source = "\
async function sync(batches) {
  for (const batch of batches) {
    await Promise.all(batch.map(save));
  }
}
";
    let result = run_category(Category::Performance, &[("sync.ts", source)]);
    assert!(result.violations.is_empty());
    assert!(result.passed);
}

#[test]
fn test_sync_fs_at_module_level_is_fine() {
    let result = run_category(
        Category::Performance,
        &[("boot.ts", "const cert = fs.readFileSync('cert.pem');\n")],
    );
    assert!(result.warnings.is_empty());
}
