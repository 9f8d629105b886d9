//! End-to-end scenarios through engine, gate and correction loop

use crate::test_utils::{assert_close, assert_no_violations, assert_violation_count};
use sopgate_validate::{
    Category, CategoryScore, CorrectionEngine, CorrectionOutcome, DiagnosticKind, FixRegistry,
    GateFailure, GatingConfig, RuleCatalog, RuleEngine, Selection, SourceFile, SourceLoader,
};
use std::fs;
use tempfile::TempDir;

const UNWRAPPED_CHECKOUT: &str = "\
async function createOrder(data) {
  const order = await prisma.order.create({ data });
  await prisma.payment.create({ data: { orderId: order.id } });
  return order;
}
";

const WRAPPED_CHECKOUT: &str = "\
async function createOrder(data) {
  return prisma.$transaction(async (tx) => {
    const order = await tx.order.create({ data });
    await tx.payment.create({ data: { orderId: order.id } });
    return order;
  });
}
";

#[test]
fn test_unwrapped_multi_table_write_blocks_gate() {
    let catalog = RuleCatalog::standard();
    let engine = RuleEngine::new(&catalog);
    let run = engine
        .run(
            &Selection::category(Category::Transactions),
            &[SourceFile::new("order.service.ts", UNWRAPPED_CHECKOUT)],
        )
        .unwrap();

    let result = run.result(Category::Transactions).unwrap();
    assert_violation_count(&result.violations, 1, "unwrapped checkout");
    assert_eq!(result.violations[0].rule_id, "TXN001");
    assert_eq!(result.violations[0].line, 2);
    assert!(!result.passed);

    let gate = GatingConfig::default().evaluate(&run, engine.scoring());
    assert!(!gate.passed);
    assert_eq!(
        gate.failure,
        Some(GateFailure::TooManyBlockers { count: 1, max: 0 })
    );
}

#[test]
fn test_transaction_wrapper_passes() {
    let catalog = RuleCatalog::standard();
    let engine = RuleEngine::new(&catalog);
    let run = engine
        .run(
            &Selection::category(Category::Transactions),
            &[SourceFile::new("order.service.ts", WRAPPED_CHECKOUT)],
        )
        .unwrap();

    let result = run.result(Category::Transactions).unwrap();
    assert_no_violations(&result.violations, "wrapped checkout");
    assert!(result.passed);
    assert_close(result.score, 1.0);
    assert!(GatingConfig::default().evaluate(&run, engine.scoring()).passed);
}

#[test]
fn test_not_found_rewrite_adds_import() {
    let source = "\
export class UserService {
  async find(id) {
    const user = await this.repo.findOne(id);
    if (!user) throw new Error('User not found');
    return user;
  }
}
";
    let catalog = RuleCatalog::standard();
    let engine = RuleEngine::new(&catalog);
    let registry = FixRegistry::standard();
    let corrector = CorrectionEngine::new(&engine, &registry)
        .with_selection(Selection::category(Category::ErrorHandling));

    let first = corrector
        .correct(&SourceFile::new("user.service.ts", source))
        .unwrap();
    assert_eq!(first.outcome, CorrectionOutcome::Resolved);
    assert_eq!(first.fix_count(), 2);
    assert!(
        first
            .final_content
            .starts_with("import { NotFoundException } from '@nestjs/common';\nexport class UserService {")
    );
    assert!(
        first
            .final_content
            .contains("if (!user) throw new NotFoundException('User not found');")
    );
    let prerequisite = first
        .applied_fixes()
        .find(|f| f.rule_id == "PREREQ")
        .unwrap();
    assert_eq!(prerequisite.line, 1);

    // A second pass over the corrected text has nothing left to do
    let second = corrector
        .correct(&SourceFile::new("user.service.ts", first.final_content.as_str()))
        .unwrap();
    assert_eq!(second.outcome, CorrectionOutcome::Clean);
    assert_eq!(second.fix_count(), 0);
    assert_eq!(second.final_content, first.final_content);
}

#[test]
fn test_low_aggregate_fails_without_blockers() {
    let gating = GatingConfig {
        minimum_score: 0.85,
        ..GatingConfig::default()
    };
    let scores = [
        CategoryScore {
            category: Category::Performance,
            metric_name: "performance_score".to_string(),
            score: 0.80,
            weight: 1.0,
            block_on_fail: false,
            fail_threshold: 0.5,
        },
        CategoryScore {
            category: Category::Maintainability,
            metric_name: "maintainability_score".to_string(),
            score: 0.80,
            weight: 1.0,
            block_on_fail: false,
            fail_threshold: 0.5,
        },
    ];

    let decision = gating.decide(0, 3, &scores);
    assert!(!decision.passed);
    assert_close(decision.aggregate_score, 0.80);
    assert!(matches!(
        decision.failure,
        Some(GateFailure::AggregateBelowMinimum { .. })
    ));
    assert!(decision.reason().unwrap().contains("aggregate score"));
}

#[test]
fn test_undecodable_file_skipped_with_diagnostic() {
    let dir = TempDir::new().unwrap();
    for i in 0..9 {
        fs::write(
            dir.path().join(format!("module{i}.ts")),
            format!("export const value{i} = {i};\n"),
        )
        .unwrap();
    }
    fs::write(dir.path().join("broken.ts"), [0xff, 0xfe, 0xfd]).unwrap();

    let loaded = SourceLoader::new().unwrap().load_paths(&[dir.path()]);
    assert_eq!(loaded.files.len(), 9);

    let catalog = RuleCatalog::standard();
    let engine = RuleEngine::new(&catalog);
    let run = engine
        .run(&Selection::all(), &loaded.files)
        .unwrap()
        .with_diagnostics(loaded.diagnostics);

    assert_eq!(run.files_analyzed, 9);
    assert_eq!(run.diagnostics.len(), 1);
    assert_eq!(run.diagnostics[0].kind, DiagnosticKind::LoadFailure);
    assert!(
        run.diagnostics[0]
            .file
            .as_deref()
            .is_some_and(|f| f.ends_with("broken.ts"))
    );
    assert_eq!(run.violation_count(), 0);
}
