//! `sopgate fix`
//!
//! Runs the correction loop on every loaded file, optionally writes the
//! corrected content back, and reports the gate over the corrected sources.

use super::{Session, emit};
use crate::cli::FixArgs;
use anyhow::{Context, Result};
use sopgate_validate::{CorrectionEngine, FileConfig, FixRegistry, SourceFile};
use tracing::info;

pub fn run(mut config: FileConfig, args: &FixArgs) -> Result<bool> {
    if let Some(max) = args.max_iterations {
        config.correction.max_iterations = max;
    }
    config.correction.skip_rules.extend(args.skip_rules.iter().cloned());
    config.correction.only_rules.extend(args.only_rules.iter().cloned());

    let session = Session::new(config, &args.check)?;
    let engine = session.engine()?;
    let selection = session.selection(&args.check.selection);
    let registry = FixRegistry::standard();

    let loaded = session.config.source_loader()?.load_paths(&args.check.paths);
    let corrections = CorrectionEngine::new(&engine, &registry)
        .with_selection(selection.clone())
        .with_options(session.config.correction_options())
        .correct_all(&loaded.files)?;

    if args.write {
        for correction in corrections.iter().filter(|c| c.changed()) {
            std::fs::write(&correction.file, &correction.final_content)
                .with_context(|| format!("failed to write {}", correction.file))?;
            info!(file = %correction.file, fixes = correction.fix_count(), "file rewritten");
        }
    }

    let corrected: Vec<SourceFile> = corrections
        .iter()
        .map(|c| SourceFile::new(&c.file, &c.final_content))
        .collect();
    let report = session
        .validate(&engine, &selection, &corrected, loaded.diagnostics)?
        .with_corrections(corrections);

    emit(&report, args.check.format, args.check.output.as_deref())?;
    Ok(report.summary.passed)
}
