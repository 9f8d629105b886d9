//! Source loading
//!
//! Turns paths (or raw byte buffers) into in-memory `SourceFile`s. The rule
//! engine never touches the filesystem itself. Unreadable or non-UTF-8 files
//! are skipped with a `LoadFailure` diagnostic and loading continues.

use crate::engine::Diagnostic;
use crate::{Result, ValidationError};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Default include globs (TypeScript/JavaScript sources)
pub const DEFAULT_INCLUDE: [&str; 1] = ["**/*.{ts,tsx,js,jsx,mjs,cjs}"];

/// Default exclude globs
pub const DEFAULT_EXCLUDE: [&str; 4] = [
    "**/node_modules/**",
    "**/dist/**",
    "**/build/**",
    "**/*.d.ts",
];

/// A file's name and full text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub name: String,
    pub content: String,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Files that decoded, plus a diagnostic for each that did not
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedSources {
    pub files: Vec<SourceFile>,
    pub diagnostics: Vec<Diagnostic>,
}

impl LoadedSources {
    fn push_bytes(&mut self, name: String, bytes: Vec<u8>) {
        match String::from_utf8(bytes) {
            Ok(content) => self.files.push(SourceFile { name, content }),
            Err(e) => self.fail(name, format!("not valid UTF-8: {e}")),
        }
    }

    fn fail(&mut self, name: String, message: String) {
        warn!(file = %name, %message, "skipping file");
        self.diagnostics.push(Diagnostic::load_failure(name, message));
    }
}

/// Walks paths and filters them through include/exclude globs
#[derive(Debug, Clone)]
pub struct SourceLoader {
    include: GlobSet,
    exclude: GlobSet,
}

impl SourceLoader {
    /// Loader with the default globs
    pub fn new() -> Result<Self> {
        Self::with_globs(&DEFAULT_INCLUDE, &DEFAULT_EXCLUDE)
    }

    pub fn with_globs<S: AsRef<str>>(include: &[S], exclude: &[S]) -> Result<Self> {
        Ok(Self {
            include: build_globset(include)?,
            exclude: build_globset(exclude)?,
        })
    }

    /// Decode in-memory buffers
    pub fn load_bytes<I>(&self, buffers: I) -> LoadedSources
    where
        I: IntoIterator<Item = (String, Vec<u8>)>,
    {
        let mut loaded = LoadedSources::default();
        for (name, bytes) in buffers {
            loaded.push_bytes(name, bytes);
        }
        loaded
    }

    /// Load files and walk directories
    ///
    /// Explicit file paths bypass the globs; directory entries are filtered.
    pub fn load_paths<P: AsRef<Path>>(&self, paths: &[P]) -> LoadedSources {
        let mut loaded = LoadedSources::default();

        for path in paths {
            let path = path.as_ref();
            if path.is_dir() {
                for file in self.walk(path, &mut loaded) {
                    read_into(&file, &mut loaded);
                }
            } else {
                read_into(path, &mut loaded);
            }
        }

        debug!(
            files = loaded.files.len(),
            failures = loaded.diagnostics.len(),
            "sources loaded"
        );
        loaded
    }

    fn walk(&self, root: &Path, loaded: &mut LoadedSources) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let name = e
                        .path()
                        .map_or_else(|| root.display().to_string(), |p| p.display().to_string());
                    loaded.fail(name, e.to_string());
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
            if self.include.is_match(relative) && !self.exclude.is_match(relative) {
                files.push(entry.into_path());
            }
        }
        files
    }
}

fn read_into(path: &Path, loaded: &mut LoadedSources) {
    let name = path.display().to_string();
    match std::fs::read(path) {
        Ok(bytes) => loaded.push_bytes(name, bytes),
        Err(e) => loaded.fail(name, e.to_string()),
    }
}

fn build_globset<S: AsRef<str>>(patterns: &[S]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let pattern = pattern.as_ref();
        let glob = Glob::new(pattern).map_err(|e| ValidationError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| ValidationError::InvalidPattern {
        pattern: "<globset>".to_string(),
        message: e.to_string(),
    })
}
