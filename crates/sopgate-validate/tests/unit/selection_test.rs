//! Tests for category, rule and SOP selection

use crate::test_utils::sources;
use sopgate_validate::config::default_sops;
use sopgate_validate::{Category, RuleCatalog, RuleEngine, Selection, ValidationError};

const MIXED: &str = "\
eval(input);
debugger;
console.log('done');
";

#[test]
fn test_empty_selection_runs_every_category_in_order() {
    let catalog = RuleCatalog::standard();
    let engine = RuleEngine::new(&catalog);
    let run = engine.run(&Selection::all(), &sources(&[("a.ts", MIXED)])).unwrap();

    let categories: Vec<Category> = run.results.iter().map(|r| r.category).collect();
    assert_eq!(categories, Category::ALL);
    assert_eq!(run.files_analyzed, 1);
    assert_eq!(run.violation_count(), 2);
    assert_eq!(run.warning_count(), 1);
}

#[test]
fn test_explicit_rules_grouped_by_category() {
    let catalog = RuleCatalog::standard();
    let engine = RuleEngine::new(&catalog);
    let selection = Selection::rules(["maint004", "SEC002"]);
    let run = engine.run(&selection, &sources(&[("a.ts", MIXED)])).unwrap();

    let categories: Vec<Category> = run.results.iter().map(|r| r.category).collect();
    assert_eq!(categories, [Category::Security, Category::Maintainability]);
    // MAINT002 was not selected
    assert_eq!(run.warning_count(), 0);
    assert_eq!(run.violation_count(), 2);
}

#[test]
fn test_sop_expands_to_categories() {
    let catalog = RuleCatalog::standard();
    let engine = RuleEngine::new(&catalog).with_sops(default_sops());
    let selection = Selection::default().with_sops(["api-security"]);
    let run = engine.run(&selection, &sources(&[("a.ts", MIXED)])).unwrap();

    let categories: Vec<Category> = run.results.iter().map(|r| r.category).collect();
    assert_eq!(categories, [Category::Security, Category::TenantIsolation]);
}

#[test]
fn test_unknown_ids_abort_before_evaluation() {
    let catalog = RuleCatalog::standard();
    let engine = RuleEngine::new(&catalog);
    let files = sources(&[("a.ts", MIXED)]);

    let err = engine.run(&Selection::categories(["astrology"]), &files);
    assert!(matches!(err, Err(ValidationError::UnknownCategory(_))));

    let err = engine.run(&Selection::rules(["SEC999"]), &files);
    assert!(matches!(err, Err(ValidationError::UnknownRule(_))));

    let err = engine.run(&Selection::default().with_sops(["nope"]), &files);
    assert!(matches!(err, Err(ValidationError::UnknownSop(_))));
}

#[test]
fn test_escalated_medium_rule_becomes_violation() {
    use sopgate_validate::SeverityPolicy;

    let catalog = RuleCatalog::standard();
    let engine =
        RuleEngine::new(&catalog).with_policy(SeverityPolicy::default().escalate("maint002"));
    let run = engine
        .run(
            &Selection::category(Category::Maintainability),
            &sources(&[("a.ts", "console.log('done');\n")]),
        )
        .unwrap();
    assert_eq!(run.violation_count(), 1);
    assert_eq!(run.warning_count(), 0);
    assert!(!run.results[0].passed);
}

#[test]
fn test_findings_ordered_by_file_then_line_then_rule() {
    let catalog = RuleCatalog::standard();
    let engine = RuleEngine::new(&catalog);
    let files = sources(&[
        ("b.ts", "debugger;\n"),
        ("a.ts", "const x: any = 1; // HACK\ndebugger;\n"),
    ]);
    let run = engine
        .run(&Selection::category(Category::Maintainability), &files)
        .unwrap();
    let result = &run.results[0];

    let warnings: Vec<(&str, usize, &str)> = result
        .warnings
        .iter()
        .map(|w| (w.file.as_str(), w.line, w.rule_id.as_str()))
        .collect();
    assert_eq!(warnings, [("a.ts", 1, "MAINT001"), ("a.ts", 1, "MAINT003")]);

    let violations: Vec<&str> = result.violations.iter().map(|v| v.file.as_str()).collect();
    // files keep input order
    assert_eq!(violations, ["b.ts", "a.ts"]);
}
