//! Missing-import synthesis
//!
//! When a fix introduces a symbol, the declaration it needs is injected once:
//! merged into an existing `import { .. } from '<module>'` statement when there
//! is one (single-line or spread over several lines), otherwise inserted after
//! the last import.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Named import required by a rewritten line
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Prerequisite {
    pub symbol: String,
    pub module: String,
}

/// Edit made by `Prerequisite::ensure`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEdit {
    pub content: String,
    /// 1-based line that was inserted or merged
    pub line: usize,
    pub before: String,
    pub after: String,
}

impl Prerequisite {
    pub fn new(symbol: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            module: module.into(),
        }
    }

    fn import_statement(&self) -> String {
        format!("import {{ {} }} from '{}';", self.symbol, self.module)
    }

    /// Add the import to `content` if the symbol is used and not yet imported
    pub fn ensure(&self, content: &str) -> Option<ImportEdit> {
        let symbol = regex::escape(&self.symbol);
        let used = Regex::new(&format!(r"\b{symbol}\b")).ok()?;
        if !used.is_match(content) {
            return None;
        }
        let imported =
            Regex::new(&format!(r"\bimport\s+(?:type\s+)?\{{[^}}]*\b{symbol}\b[^}}]*\}}")).ok()?;
        if imported.is_match(content) {
            return None;
        }

        let mut lines: Vec<String> = content.split('\n').map(str::to_string).collect();
        let module = regex::escape(&self.module);
        let same_module = Regex::new(&format!(
            r#"^(?P<head>\s*import\s*)\{{(?P<names>[^}}]*)\}}(?P<tail>\s*from\s*['"]{module}['"].*)$"#
        ))
        .ok()?;

        if let Some(index) = lines.iter().position(|l| same_module.is_match(l)) {
            let before = lines[index].clone();
            let caps = same_module.captures(&before)?;
            let names = caps.name("names").map_or("", |m| m.as_str()).trim();
            let merged = match names {
                "" => self.symbol.clone(),
                n if n.ends_with(',') => format!("{n} {}", self.symbol),
                n => format!("{n}, {}", self.symbol),
            };
            let after = format!(
                "{}{{ {merged} }}{}",
                caps.name("head").map_or("", |m| m.as_str()),
                caps.name("tail").map_or("", |m| m.as_str())
            );
            lines[index] = after.clone();
            return Some(ImportEdit {
                content: lines.join("\n"),
                line: index + 1,
                before,
                after,
            });
        }

        if let Some(edit) = self.merge_multiline(&mut lines, &module) {
            return Some(edit);
        }

        let index = last_import_end(&lines).map_or(0, |i| i + 1);
        let after = self.import_statement();
        lines.insert(index, after.clone());
        Some(ImportEdit {
            content: lines.join("\n"),
            line: index + 1,
            before: String::new(),
            after,
        })
    }

    /// Add the symbol to an `import {` .. `} from '<module>'` block spanning lines
    fn merge_multiline(&self, lines: &mut Vec<String>, module: &str) -> Option<ImportEdit> {
        let closing = Regex::new(&format!(
            r#"^(?P<names>[^}}]*)\}}(?P<tail>\s*from\s*['"]{module}['"].*)$"#
        ))
        .ok()?;

        let mut open: Option<usize> = None;
        let mut found = None;
        for (i, line) in lines.iter().enumerate() {
            if let Some(start) = open {
                if line.contains('}') {
                    open = None;
                    if closing.is_match(line) {
                        found = Some((start, i));
                        break;
                    }
                }
            } else if OPEN_BLOCK.is_match(line) {
                open = Some(i);
            }
        }
        let (start, close) = found?;

        let caps = closing.captures(&lines[close])?;
        let names = caps.name("names").map_or("", |m| m.as_str());
        if !names.trim().is_empty() {
            // `  Logger } from '..'`: extend the names on the closing line
            let tail = caps.name("tail").map_or("", |m| m.as_str());
            let trimmed = names.trim_end().trim_end_matches(',');
            let before = lines[close].clone();
            let after = format!("{trimmed}, {} }}{tail}", self.symbol);
            lines[close] = after.clone();
            return Some(ImportEdit {
                content: lines.join("\n"),
                line: close + 1,
                before,
                after,
            });
        }

        let previous = close - 1;
        let indent = if previous > start {
            let entry = lines[previous].trim_end().to_string();
            if !entry.ends_with(',') && !entry.trim().is_empty() {
                lines[previous] = format!("{entry},");
            }
            entry.chars().take_while(|c| c.is_whitespace()).collect::<String>()
        } else {
            "  ".to_string()
        };
        let after = format!("{indent}{},", self.symbol);
        lines.insert(close, after.clone());
        Some(ImportEdit {
            content: lines.join("\n"),
            line: close + 1,
            before: String::new(),
            after,
        })
    }
}

/// `import {` (or `import type {`) left open at the end of the line
static OPEN_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*import\s+(?:type\s+)?\{[^}]*$").expect("valid regex"));

/// Index of the line ending the last import statement
fn last_import_end(lines: &[String]) -> Option<usize> {
    let mut last = None;
    let mut open = false;
    for (i, line) in lines.iter().enumerate() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("import ") || trimmed.starts_with("import{") {
            open = !(trimmed.contains(" from ") || trimmed.ends_with(';') || trimmed.starts_with("import '"));
            if !open {
                last = Some(i);
            }
        } else if open && trimmed.contains("from ") {
            open = false;
            last = Some(i);
        }
    }
    last
}
