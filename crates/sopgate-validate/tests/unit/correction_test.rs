//! Tests for the Self-Correction Engine

use sopgate_validate::{
    Category, CorrectionEngine, CorrectionOptions, CorrectionOutcome, FixRegistry, RuleCatalog,
    RuleEngine, Selection, SourceFile,
};

fn correct(selection: Selection, options: CorrectionOptions, source: &str) -> sopgate_validate::CorrectionLoopResult {
    let catalog = RuleCatalog::standard();
    let engine = RuleEngine::new(&catalog);
    let registry = FixRegistry::standard();
    CorrectionEngine::new(&engine, &registry)
        .with_selection(selection)
        .with_options(options)
        .correct(&SourceFile::new("service.ts", source))
        .unwrap()
}

#[test]
fn test_plain_http_upgraded_local_kept() {
    let source = "const api = 'http://billing.example.com/v1';\nconst dev = 'http://localhost:4000';\n";
    let result = correct(
        Selection::category(Category::Security),
        CorrectionOptions::default(),
        source,
    );
    assert_eq!(result.outcome, CorrectionOutcome::Resolved);
    assert_eq!(
        result.final_content,
        "const api = 'https://billing.example.com/v1';\nconst dev = 'http://localhost:4000';\n"
    );
}

#[test]
fn test_inline_empty_catch_rethrows() {
    let source = "try {\n  run();\n} catch (e) {}\n";
    let result = correct(
        Selection::category(Category::ErrorHandling),
        CorrectionOptions::default(),
        source,
    );
    assert_eq!(result.outcome, CorrectionOutcome::Resolved);
    assert!(result.final_content.contains("} catch (e) { throw e; }"));
    let fix = result.applied_fixes().next().unwrap();
    assert_eq!((fix.rule_id.as_str(), fix.line), ("ERR002", 3));
}

#[test]
fn test_bad_request_import_merged() {
    let source = "\
import { Injectable } from '@nestjs/common';

@Injectable()
export class SignupService {
  check(email) {
    if (!email) throw new Error('Email is required');
  }
}
";
    let result = correct(Selection::all(), CorrectionOptions::default(), source);
    assert_eq!(result.outcome, CorrectionOutcome::Resolved);
    assert!(
        result
            .final_content
            .starts_with("import { Injectable, BadRequestException } from '@nestjs/common';\n")
    );
    assert!(
        result
            .final_content
            .contains("throw new BadRequestException('Email is required');")
    );
    let rules: Vec<&str> = result.applied_fixes().map(|f| f.rule_id.as_str()).collect();
    assert_eq!(rules, ["ERR001", "PREREQ"]);
}

#[test]
fn test_bad_request_import_merged_into_multiline_block() {
    let source = "\
import {
  Injectable,
  Logger,
} from '@nestjs/common';

@Injectable()
export class SignupService {
  check(email) {
    if (!email) throw new Error('Email is required');
  }
}
";
    let result = correct(Selection::all(), CorrectionOptions::default(), source);
    assert_eq!(result.outcome, CorrectionOutcome::Resolved);
    assert!(result.final_content.starts_with(
        "import {\n  Injectable,\n  Logger,\n  BadRequestException,\n} from '@nestjs/common';\n"
    ));
    assert_eq!(result.final_content.matches("from '@nestjs/common'").count(), 1);
    let rules: Vec<&str> = result.applied_fixes().map(|f| f.rule_id.as_str()).collect();
    assert_eq!(rules, ["ERR001", "PREREQ"]);
}

#[test]
fn test_typed_and_bare_empty_catch_rethrow() {
    let source = "try {\n  run();\n} catch (e: unknown) {}\ntry {\n  stop();\n} catch {}\n";
    let result = correct(
        Selection::category(Category::ErrorHandling),
        CorrectionOptions::default(),
        source,
    );
    assert_eq!(result.outcome, CorrectionOutcome::Resolved);
    assert!(result.final_content.contains("} catch (e: unknown) { throw e; }"));
    assert!(result.final_content.contains("} catch (error) { throw error; }"));
}

#[test]
fn test_partial_fix_stalls_with_residue() {
    // The string throw becomes a generic Error, which has no automatic fix
    let source = "function f() {\n  throw 'bad state';\n}\n";
    let result = correct(
        Selection::category(Category::ErrorHandling),
        CorrectionOptions::default(),
        source,
    );
    assert_eq!(result.outcome, CorrectionOutcome::Stalled);
    assert_eq!(result.iterations.len(), 1);
    assert!(result.final_content.contains("throw new Error('bad state');"));
    let remaining: Vec<&str> = result
        .remaining_violations
        .iter()
        .map(|v| v.rule_id.as_str())
        .collect();
    assert_eq!(remaining, ["ERR001"]);
}

#[test]
fn test_outer_client_rewritten_to_tx() {
    let source = "\
async function checkout(data) {
  return prisma.$transaction(async (tx) => {
    const order = await tx.order.create({ data });
    await prisma.payment.create({ data: { orderId: order.id } });
    return order;
  });
}
";
    let result = correct(
        Selection::category(Category::Transactions),
        CorrectionOptions::default(),
        source,
    );
    assert_eq!(result.outcome, CorrectionOutcome::Resolved);
    assert!(result.final_content.contains("await tx.payment.create("));
}

#[test]
fn test_skipped_rule_stalls_immediately() {
    let mut options = CorrectionOptions::default();
    options.skip_rules.insert("MAINT004".to_string());
    let result = correct(
        Selection::category(Category::Maintainability),
        options,
        "debugger;\n",
    );
    assert_eq!(result.outcome, CorrectionOutcome::Stalled);
    assert!(result.iterations.is_empty());
    assert!(!result.changed());
}

#[test]
fn test_unfixable_violation_left_for_manual_resolution() {
    let result = correct(
        Selection::category(Category::Security),
        CorrectionOptions::default(),
        "eval(code);\n",
    );
    assert_eq!(result.outcome, CorrectionOutcome::Stalled);
    assert_eq!(result.remaining_violations.len(), 1);
    assert_eq!(result.final_content, "eval(code);\n");
}
