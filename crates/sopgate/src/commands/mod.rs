//! Subcommand implementations
//!
//! Each command returns whether the gate passed; errors are reported by `main`.

pub mod check;
pub mod fix;
pub mod rules;

use crate::cli::{CheckArgs, OutputFormat, SelectionArgs};
use anyhow::{Context, Result};
use sopgate_validate::{
    ComplianceReport, Diagnostic, FileConfig, Reporter, RuleCatalog, RuleEngine, Selection,
    SourceFile,
};
use std::path::Path;
use tracing::info;

/// Configuration and catalog shared by `check` and `fix`
pub struct Session {
    pub config: FileConfig,
    pub catalog: RuleCatalog,
}

impl Session {
    /// Apply command-line overrides and validate every section up front
    pub fn new(mut config: FileConfig, args: &CheckArgs) -> Result<Self> {
        if let Some(profile) = &args.profile {
            config.gating.profile.clone_from(profile);
        }
        let catalog = RuleCatalog::standard();
        config
            .validate(&catalog)
            .context("invalid configuration")?;
        Ok(Self { config, catalog })
    }

    pub fn engine(&self) -> Result<RuleEngine<'_>> {
        Ok(RuleEngine::new(&self.catalog)
            .with_policy(self.config.severity_policy(&self.catalog)?)
            .with_scoring(self.config.scoring_model()?)
            .with_window(self.config.general.window)
            .with_sops(self.config.sop_map()?))
    }

    /// Command-line selection, or the configured default categories
    pub fn selection(&self, args: &SelectionArgs) -> Selection {
        let selection = Selection {
            categories: args.categories.clone(),
            rules: args.rules.clone(),
            sops: args.sops.clone(),
        };
        if selection.is_empty() {
            Selection::categories(self.config.general.categories.iter().cloned())
        } else {
            selection
        }
    }

    /// Load sources, run the engine, and evaluate the gate
    pub fn validate(
        &self,
        engine: &RuleEngine<'_>,
        selection: &Selection,
        files: &[SourceFile],
        load_diagnostics: Vec<Diagnostic>,
    ) -> Result<ComplianceReport> {
        let run = engine
            .run(selection, files)?
            .with_diagnostics(load_diagnostics);
        let gate = self.config.gating_config()?.evaluate(&run, engine.scoring());
        info!(
            files = run.files_analyzed,
            violations = run.violation_count(),
            warnings = run.warning_count(),
            aggregate = gate.aggregate_score,
            passed = gate.passed,
            "validation complete"
        );
        Ok(ComplianceReport::new(run, gate))
    }
}

/// Render and write a report
pub fn emit(report: &ComplianceReport, format: OutputFormat, output: Option<&Path>) -> Result<()> {
    let rendered = match format {
        OutputFormat::Human => Reporter::to_human_readable(report),
        OutputFormat::Json => Reporter::to_json(report),
        OutputFormat::Ci => Reporter::to_ci_summary(report),
    };
    match output {
        Some(path) => std::fs::write(path, rendered)
            .with_context(|| format!("failed to write report to {}", path.display())),
        None => {
            println!("{rendered}");
            Ok(())
        }
    }
}
