//! Property-based tests over scoring, gating and correction

use proptest::prelude::*;
use sopgate_validate::{
    Category, CategoryScore, CorrectionEngine, CorrectionOutcome, DeductionSchedule, FixRegistry,
    GatingConfig, RuleCatalog, RuleEngine, Selection, Severity, SourceFile, aggregate_score,
};

/// Lines the standard fixes know how to rewrite, mixed with clean code
const SNIPPETS: [&str; 6] = [
    "debugger;",
    "const api = 'http://billing.example.com/v1';",
    "throw 'User not found';",
    "} catch (err) {}",
    "const total = items.length;",
    "export const ready = true;",
];

fn severity() -> impl Strategy<Value = Severity> {
    prop_oneof![
        Just(Severity::Critical),
        Just(Severity::High),
        Just(Severity::Medium)
    ]
}

fn category_score() -> impl Strategy<Value = CategoryScore> {
    (0..Category::ALL.len(), 0.0..=1.0f64, 0.0..5.0f64).prop_map(|(i, score, weight)| {
        let category = Category::ALL[i];
        CategoryScore {
            category,
            metric_name: category.as_str().to_string(),
            score,
            weight,
            block_on_fail: false,
            fail_threshold: 0.0,
        }
    })
}

fn source() -> impl Strategy<Value = String> {
    prop::collection::vec(0..SNIPPETS.len(), 1..12).prop_map(|picks| {
        let mut text = picks
            .into_iter()
            .map(|i| SNIPPETS[i])
            .collect::<Vec<_>>()
            .join("\n");
        text.push('\n');
        text
    })
}

// Property: category scores stay in [0, 1] whatever the findings
proptest! {
    #[test]
    fn test_score_is_bounded(
        index in 0..Category::ALL.len(),
        severities in prop::collection::vec(severity(), 0..40),
        warnings in 0usize..200,
    ) {
        let schedule = DeductionSchedule::for_category(Category::ALL[index]);
        let score = schedule.score(severities, warnings);
        prop_assert!((0.0..=1.0).contains(&score));
    }
}

// Property: arbitrary text never breaks the engine and scores stay bounded
proptest! {
    #[test]
    fn test_any_text_evaluates(content in "\\PC*") {
        let catalog = RuleCatalog::standard();
        let engine = RuleEngine::new(&catalog);
        let line_count = content.lines().count();
        let run = engine
            .run(&Selection::all(), &[SourceFile::new("input.ts", content)])
            .unwrap();

        prop_assert_eq!(run.results.len(), Category::ALL.len());
        for result in &run.results {
            prop_assert!((0.0..=1.0).contains(&result.score));
            prop_assert_eq!(result.passed, result.violations.is_empty());
        }
        for violation in run.violations() {
            prop_assert!(violation.line >= 1 && violation.line <= line_count);
        }
    }
}

// Property: the aggregate does not depend on category order
proptest! {
    #[test]
    fn test_aggregate_order_invariant(scores in prop::collection::vec(category_score(), 0..10)) {
        let forward = aggregate_score(&scores);
        let mut reversed = scores.clone();
        reversed.reverse();
        prop_assert!((forward - aggregate_score(&reversed)).abs() < 1e-9);
        prop_assert!((0.0..=1.0).contains(&forward));
    }
}

// Property: the same inputs always produce the same verdict
proptest! {
    #[test]
    fn test_gate_is_deterministic(
        blockers in 0usize..5,
        warnings in 0usize..100,
        scores in prop::collection::vec(category_score(), 0..10),
    ) {
        let gating = GatingConfig::default();
        let first = gating.decide(blockers, warnings, &scores);
        let second = gating.decide(blockers, warnings, &scores);
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.passed, first.failure.is_none());
    }
}

// Property: correction never adds violations and a second pass has nothing to fix
proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_correction_converges(content in source()) {
        let catalog = RuleCatalog::standard();
        let engine = RuleEngine::new(&catalog);
        let registry = FixRegistry::standard();
        let corrector = CorrectionEngine::new(&engine, &registry);
        let file = SourceFile::new("generated.ts", content);

        let before = engine.run(&Selection::all(), std::slice::from_ref(&file)).unwrap();
        let first = corrector.correct(&file).unwrap();
        prop_assert_ne!(first.outcome, CorrectionOutcome::IterationLimit);
        prop_assert!(first.remaining_violations.len() <= before.violation_count());

        let second = corrector
            .correct(&SourceFile::new("generated.ts", first.final_content.clone()))
            .unwrap();
        prop_assert_eq!(second.fix_count(), 0);
        prop_assert_eq!(second.final_content, first.final_content);
    }
}
