//! Configuration file driving the full pipeline

use sopgate_validate::{
    Category, ConfigLoader, FileConfig, GateFailure, RuleCatalog, RuleEngine, Selection,
    SourceFile, ValidationError,
};
use std::io::Write;
use tempfile::NamedTempFile;

const PROJECT_CONFIG: &str = r#"
[general]
escalate = ["maint002"]

[gating]
profile = "default"
max_blockers = 1

[metrics.maintainability]
weight = 3.0
block_on_fail = true
pass = 0.99
warn = 0.95
fail = 0.9

[metrics.maintainability.deductions]
critical = 0.5
high = 0.5
medium = 0.5
warning = 0.1

[sops]
review = ["maintainability", "error_handling"]
"#;

fn load(text: &str) -> sopgate_validate::Result<FileConfig> {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    ConfigLoader::new()
        .with_env_prefix("SOPGATE_CONFIG_IT")
        .with_config_path(file.path())
        .load()
}

fn engine<'c>(config: &FileConfig, catalog: &'c RuleCatalog) -> RuleEngine<'c> {
    RuleEngine::new(catalog)
        .with_policy(config.severity_policy(catalog).unwrap())
        .with_scoring(config.scoring_model().unwrap())
        .with_window(config.general.window)
        .with_sops(config.sop_map().unwrap())
}

#[test]
fn test_configured_pipeline() {
    let config = load(PROJECT_CONFIG).unwrap();
    let catalog = RuleCatalog::standard();
    config.validate(&catalog).unwrap();
    let engine = engine(&config, &catalog);

    let files = [SourceFile::new(
        "report.service.ts",
        "export function report(total) {\n  console.log(total);\n  return total;\n}\n",
    )];
    let run = engine
        .run(&Selection::all().with_sops(["review"]), &files)
        .unwrap();

    let categories: Vec<Category> = run.results.iter().map(|r| r.category).collect();
    assert_eq!(
        categories,
        [Category::ErrorHandling, Category::Maintainability]
    );

    // Escalated to a violation despite its medium severity
    let maintainability = run.result(Category::Maintainability).unwrap();
    assert_eq!(maintainability.violations.len(), 1);
    assert_eq!(maintainability.violations[0].rule_id, "MAINT002");
    assert!(maintainability.warnings.is_empty());

    // One blocker is tolerated, the raised fail threshold is not
    let gate = config.gating_config().unwrap().evaluate(&run, engine.scoring());
    assert!(!gate.passed);
    assert!(matches!(
        gate.failure,
        Some(GateFailure::CategoryBelowThreshold {
            category: Category::Maintainability,
            ..
        })
    ));
}

#[test]
fn test_builtin_sops_survive_custom_ones() {
    let config = load(PROJECT_CONFIG).unwrap();
    let sops = config.sop_map().unwrap();
    assert!(sops.contains_key("api-security"));
    assert_eq!(
        sops["review"],
        [Category::Maintainability, Category::ErrorHandling]
    );
}

#[test]
fn test_unknown_profile_fails_validation() {
    let config = load("[gating]\nprofile = \"lenient\"\n").unwrap();
    let err = config.validate(&RuleCatalog::standard()).unwrap_err();
    assert!(matches!(err, ValidationError::Config(_)));
}

#[test]
fn test_malformed_toml_is_config_error() {
    let err = load("[gating\nprofile = ").unwrap_err();
    assert!(matches!(err, ValidationError::Figment(_)));
}

#[test]
fn test_missing_explicit_file_rejected() {
    let err = ConfigLoader::new()
        .with_config_path("/no/such/sopgate.toml")
        .load()
        .unwrap_err();
    assert!(err.to_string().contains("not found"));
}
