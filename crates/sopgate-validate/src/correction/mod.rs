//! Self-Correction Engine
//!
//! Validate, apply fix patterns to the reported lines, re-check, and repeat.
//! The loop halts when an iteration applies nothing, when no violation is
//! left, or when the iteration cap is reached. Iterations of one file are
//! strictly sequential; independent files run on rayon workers.

mod patterns;
mod prerequisite;

pub use patterns::{FixPattern, FixRegistry, Replacement};
pub use prerequisite::{ImportEdit, Prerequisite};

use crate::engine::{RuleEngine, Selection, Violation};
use crate::scan::SourceFile;
use crate::Result;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Rule id recorded for synthesised imports
pub const PREREQUISITE_RULE_ID: &str = "PREREQ";

/// Default iteration cap
pub const DEFAULT_MAX_ITERATIONS: usize = 3;

/// Loop configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrectionOptions {
    pub max_iterations: usize,
    /// Rules never fixed
    pub skip_rules: BTreeSet<String>,
    /// When non-empty, only these rules are fixed
    pub only_rules: BTreeSet<String>,
}

impl Default for CorrectionOptions {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            skip_rules: BTreeSet::new(),
            only_rules: BTreeSet::new(),
        }
    }
}

impl CorrectionOptions {
    pub fn allows(&self, rule_id: &str) -> bool {
        let listed = |set: &BTreeSet<String>| set.iter().any(|r| r.eq_ignore_ascii_case(rule_id));
        !listed(&self.skip_rules) && (self.only_rules.is_empty() || listed(&self.only_rules))
    }
}

/// One textual change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedFix {
    pub rule_id: String,
    pub line: usize,
    pub before: String,
    pub after: String,
    pub description: String,
}

/// Outcome of one Apply + Re-check iteration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionResult {
    pub original_content: String,
    pub corrected_content: String,
    pub applied_fixes: Vec<AppliedFix>,
    pub remaining_violations: Vec<Violation>,
}

/// Why the loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CorrectionOutcome {
    /// Nothing to fix to begin with
    Clean,
    /// Every violation was fixed
    Resolved,
    /// An iteration applied no fix; the rest needs manual work
    Stalled,
    /// Iteration cap reached with violations left
    IterationLimit,
}

impl std::fmt::Display for CorrectionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Clean => write!(f, "clean"),
            Self::Resolved => write!(f, "resolved"),
            Self::Stalled => write!(f, "stalled"),
            Self::IterationLimit => write!(f, "iteration limit"),
        }
    }
}

/// Final state of one file's correction loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionLoopResult {
    pub file: String,
    pub original_content: String,
    pub final_content: String,
    /// One entry per iteration that applied at least one fix
    pub iterations: Vec<CorrectionResult>,
    pub remaining_violations: Vec<Violation>,
    pub outcome: CorrectionOutcome,
}

impl CorrectionLoopResult {
    pub fn applied_fixes(&self) -> impl Iterator<Item = &AppliedFix> {
        self.iterations.iter().flat_map(|i| i.applied_fixes.iter())
    }

    pub fn fix_count(&self) -> usize {
        self.iterations.iter().map(|i| i.applied_fixes.len()).sum()
    }

    pub fn changed(&self) -> bool {
        self.original_content != self.final_content
    }
}

/// Drives the correction loop with a rule engine and a fix registry
#[derive(Debug, Clone)]
pub struct CorrectionEngine<'e> {
    engine: &'e RuleEngine<'e>,
    registry: &'e FixRegistry,
    selection: Selection,
    options: CorrectionOptions,
}

impl<'e> CorrectionEngine<'e> {
    pub fn new(engine: &'e RuleEngine<'e>, registry: &'e FixRegistry) -> Self {
        Self {
            engine,
            registry,
            selection: Selection::all(),
            options: CorrectionOptions::default(),
        }
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_options(mut self, options: CorrectionOptions) -> Self {
        self.options = options;
        self
    }

    /// Correct independent files concurrently
    pub fn correct_all(&self, files: &[SourceFile]) -> Result<Vec<CorrectionLoopResult>> {
        files.par_iter().map(|file| self.correct(file)).collect()
    }

    /// Run the loop for one file
    pub fn correct(&self, file: &SourceFile) -> Result<CorrectionLoopResult> {
        let mut content = file.content.clone();
        let mut violations = self.violations(&file.name, &content)?;
        let mut iterations = Vec::new();

        let outcome = if violations.is_empty() {
            CorrectionOutcome::Clean
        } else {
            loop {
                if iterations.len() >= self.options.max_iterations {
                    break CorrectionOutcome::IterationLimit;
                }

                let (corrected, applied_fixes) = self.apply(&content, &violations);
                if applied_fixes.is_empty() {
                    break CorrectionOutcome::Stalled;
                }

                let remaining = self.violations(&file.name, &corrected)?;
                debug!(
                    file = %file.name,
                    iteration = iterations.len() + 1,
                    fixes = applied_fixes.len(),
                    remaining = remaining.len(),
                    "correction iteration"
                );
                iterations.push(CorrectionResult {
                    original_content: std::mem::take(&mut content),
                    corrected_content: corrected.clone(),
                    applied_fixes,
                    remaining_violations: remaining.clone(),
                });
                content = corrected;
                violations = remaining;

                if violations.is_empty() {
                    break CorrectionOutcome::Resolved;
                }
            }
        };

        info!(
            file = %file.name,
            %outcome,
            iterations = iterations.len(),
            remaining = violations.len(),
            "correction finished"
        );

        Ok(CorrectionLoopResult {
            file: file.name.clone(),
            original_content: file.content.clone(),
            final_content: content,
            iterations,
            remaining_violations: violations,
            outcome,
        })
    }

    fn violations(&self, name: &str, content: &str) -> Result<Vec<Violation>> {
        let files = [SourceFile::new(name, content)];
        let run = self.engine.run(&self.selection, &files)?;
        Ok(run.violations().cloned().collect())
    }

    /// One Apply step: patterns on the reported lines, then prerequisites
    pub fn apply(&self, content: &str, violations: &[Violation]) -> (String, Vec<AppliedFix>) {
        let mut lines: Vec<String> = content.split('\n').map(str::to_string).collect();
        let mut applied = Vec::new();
        let mut needed: BTreeSet<&Prerequisite> = BTreeSet::new();

        for pattern in self.registry.patterns() {
            if !self.options.allows(&pattern.rule_id) {
                continue;
            }
            let targets: BTreeSet<usize> = violations
                .iter()
                .filter(|v| v.rule_id.eq_ignore_ascii_case(&pattern.rule_id))
                .map(|v| v.line)
                .collect();

            for line_number in targets {
                let Some(line) = line_number.checked_sub(1).and_then(|i| lines.get_mut(i)) else {
                    continue;
                };
                let Some(rewritten) = pattern.apply_line(line) else {
                    continue;
                };
                applied.push(AppliedFix {
                    rule_id: pattern.rule_id.clone(),
                    line: line_number,
                    before: std::mem::replace(line, rewritten.clone()),
                    after: rewritten,
                    description: pattern.description.clone(),
                });
                if let Some(prerequisite) = &pattern.prerequisite {
                    needed.insert(prerequisite);
                }
            }
        }

        let mut corrected = lines.join("\n");
        for prerequisite in needed {
            if let Some(edit) = prerequisite.ensure(&corrected) {
                applied.push(AppliedFix {
                    rule_id: PREREQUISITE_RULE_ID.to_string(),
                    line: edit.line,
                    before: edit.before,
                    after: edit.after,
                    description: format!(
                        "Add missing import of {} from {}",
                        prerequisite.symbol, prerequisite.module
                    ),
                });
                corrected = edit.content;
            }
        }

        (corrected, applied)
    }
}
