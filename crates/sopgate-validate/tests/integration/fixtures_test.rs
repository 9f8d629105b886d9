//! Fixture-driven expectation cases

use sopgate_validate::{Category, ComplianceCase, RuleCatalog, RuleEngine, assert_case};

const CASES: &str = include_str!("../fixtures/cases.toml");

#[test]
fn test_fixture_cases() {
    let cases = ComplianceCase::from_toml(CASES).unwrap();
    assert_eq!(cases.len(), 7);

    let catalog = RuleCatalog::standard();
    let engine = RuleEngine::new(&catalog);
    for case in &cases {
        assert_case(&engine, case);
    }
}

#[test]
fn test_mismatch_lists_every_difference() {
    let catalog = RuleCatalog::standard();
    let engine = RuleEngine::new(&catalog);
    let case = ComplianceCase::new("wrong on purpose", Category::Maintainability)
        .with_file("debug.ts", "debugger;\n")
        .expect(0, 1, true);

    let outcome = case.run(&engine).unwrap();
    assert_eq!((outcome.violations, outcome.warnings, outcome.passed), (1, 0, false));
    assert_eq!(outcome.mismatches.len(), 3);
    assert!(!outcome.is_success());
}

#[test]
#[should_panic(expected = "case 'wrong on purpose' failed")]
fn test_assert_case_panics_on_mismatch() {
    let catalog = RuleCatalog::standard();
    let engine = RuleEngine::new(&catalog);
    let case = ComplianceCase::new("wrong on purpose", Category::Security)
        .with_file("eval.ts", "eval(code);\n")
        .expect(0, 0, true);
    assert_case(&engine, &case);
}
