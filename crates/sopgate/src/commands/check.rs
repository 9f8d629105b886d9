//! `sopgate check`

use super::{Session, emit};
use crate::cli::CheckArgs;
use anyhow::Result;
use sopgate_validate::FileConfig;

pub fn run(config: FileConfig, args: &CheckArgs) -> Result<bool> {
    let session = Session::new(config, args)?;
    let engine = session.engine()?;
    let selection = session.selection(&args.selection);

    let loaded = session.config.source_loader()?.load_paths(&args.paths);
    let report = session.validate(&engine, &selection, &loaded.files, loaded.diagnostics)?;

    emit(&report, args.format, args.output.as_deref())?;
    Ok(report.summary.passed)
}
