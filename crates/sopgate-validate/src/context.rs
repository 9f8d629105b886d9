//! Line Context Builder
//!
//! Derives a bounded heuristic context for a single line of a file:
//! - Preceding/following line windows
//! - Whether the line sits inside a function, class or exception handler
//!
//! Structural flags come from backward scans with a running brace balance
//! (`}` increments, `{` decrements). Braces inside strings, several statements
//! on one line, and one-line bodies can all produce wrong answers. That is the
//! accepted cost of not parsing.

use crate::{Result, ValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Default number of lines kept before the target line
pub const DEFAULT_PRECEDING_WINDOW: usize = 15;

/// Default number of lines kept after the target line
pub const DEFAULT_FOLLOWING_WINDOW: usize = 15;

/// Default depth of the backward structural scans
pub const DEFAULT_SCAN_LIMIT: usize = 300;

/// Largest accepted value for any window size
pub const MAX_WINDOW: usize = 10_000;

static FUNCTION_KEYWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bfunction\b\s*\*?\s*[\w$]*\s*\(").expect("valid regex"));

static ARROW_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"=>\s*\{").expect("valid regex"));

static METHOD_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?:(?:public|private|protected|static|async|override|readonly|get|set)\s+)*([A-Za-z_$][\w$]*)\s*(?:<[^>]*>)?\s*\([^;]*\)\s*(?::\s*[^={;]+)?\{\s*$",
    )
    .expect("valid regex")
});

static CLASS_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:export\s+)?(?:default\s+)?(?:abstract\s+)?class\s+[\w$]+")
        .expect("valid regex")
});

static TRY_OR_CATCH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^.\w$])(?:try\s*(?:\{|$)|catch\s*(?:\([^)]*\))?\s*\{)")
        .expect("valid regex")
});

/// Keywords that look like a method declaration to `METHOD_DECL`
const CONTROL_KEYWORDS: [&str; 8] = [
    "if", "for", "while", "switch", "catch", "with", "return", "function",
];

/// Window sizes used when building a `LineContext`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextWindow {
    /// Lines kept before the target line
    pub preceding: usize,
    /// Lines kept after the target line
    pub following: usize,
    /// How far the structural scans look back
    pub scan_limit: usize,
}

impl Default for ContextWindow {
    fn default() -> Self {
        Self {
            preceding: DEFAULT_PRECEDING_WINDOW,
            following: DEFAULT_FOLLOWING_WINDOW,
            scan_limit: DEFAULT_SCAN_LIMIT,
        }
    }
}

impl ContextWindow {
    pub fn validate(&self) -> Result<()> {
        let sizes = [
            ("preceding", self.preceding),
            ("following", self.following),
            ("scan_limit", self.scan_limit),
        ];
        for (name, size) in sizes {
            if size > MAX_WINDOW {
                return Err(ValidationError::Config(format!(
                    "window.{name} {size} exceeds {MAX_WINDOW}"
                )));
            }
        }
        Ok(())
    }
}

/// Heuristic context of one line, borrowed from the engine's line buffer
#[derive(Debug, Clone, Copy)]
pub struct LineContext<'a> {
    /// Every line of the file
    pub lines: &'a [&'a str],
    /// Position of the target line in `lines`
    pub index: usize,
    /// Depth of backward structural scans
    pub scan_limit: usize,
    /// Up to `preceding` lines before the target, oldest first
    pub preceding_lines: &'a [&'a str],
    /// Up to `following` lines after the target
    pub following_lines: &'a [&'a str],
    /// Whole file text
    pub full_content: &'a str,
    /// File name as supplied by the loader
    pub filename: &'a str,
    pub inside_function: bool,
    pub inside_class: bool,
    pub inside_exception_handler: bool,
}

impl<'a> LineContext<'a> {
    /// Build the context for `lines[index]`
    ///
    /// Only `lines` is inspected; no other file is consulted.
    pub fn build(
        lines: &'a [&'a str],
        index: usize,
        full_content: &'a str,
        filename: &'a str,
        window: &ContextWindow,
    ) -> Self {
        let start = index.saturating_sub(window.preceding);
        let end = index
            .saturating_add(1)
            .saturating_add(window.following)
            .min(lines.len());
        let following_lines = if index + 1 < lines.len() {
            &lines[index + 1..end]
        } else {
            &[]
        };

        Self {
            lines,
            index,
            scan_limit: window.scan_limit,
            preceding_lines: &lines[start..index],
            following_lines,
            full_content,
            filename,
            inside_function: enclosing_start(lines, index, window.scan_limit, is_function_start)
                .is_some(),
            inside_class: preceding_match(lines, index, window.scan_limit, is_class_start),
            inside_exception_handler: enclosing_start(
                lines,
                index,
                window.scan_limit,
                is_exception_start,
            )
            .is_some(),
        }
    }
}

/// Net closing braces on a line (`}` counts +1, `{` counts -1)
pub fn brace_delta(line: &str) -> i32 {
    line.chars().fold(0, |acc, c| match c {
        '}' => acc + 1,
        '{' => acc - 1,
        _ => acc,
    })
}

/// Scan backward from `index` (inclusive) for the start of the enclosing block
///
/// The running balance accumulates the lines already passed. A line is a
/// candidate only while that balance is <= 0, which skips blocks that were
/// closed before the target line.
pub fn enclosing_start<F>(lines: &[&str], index: usize, limit: usize, is_start: F) -> Option<usize>
where
    F: Fn(&str) -> bool,
{
    if lines.is_empty() {
        return None;
    }
    let index = index.min(lines.len() - 1);
    let floor = index.saturating_sub(limit);
    let mut balance = 0;

    for i in (floor..=index).rev() {
        let line = lines[i];
        if balance <= 0 && is_start(line) {
            return Some(i);
        }
        balance += brace_delta(line);
    }

    None
}

/// True if any line at or before `index` (within `limit`) satisfies `pred`
fn preceding_match<F>(lines: &[&str], index: usize, limit: usize, pred: F) -> bool
where
    F: Fn(&str) -> bool,
{
    if lines.is_empty() {
        return false;
    }
    let index = index.min(lines.len() - 1);
    let floor = index.saturating_sub(limit);
    (floor..=index).rev().any(|i| pred(lines[i]))
}

/// Function, method, or block-bodied arrow function start
pub fn is_function_start(line: &str) -> bool {
    if FUNCTION_KEYWORD.is_match(line) || ARROW_BLOCK.is_match(line) {
        return true;
    }
    METHOD_DECL
        .captures(line)
        .and_then(|cap| cap.get(1))
        .is_some_and(|name| !CONTROL_KEYWORDS.contains(&name.as_str()))
}

/// Class declaration
pub fn is_class_start(line: &str) -> bool {
    CLASS_DECL.is_match(line)
}

/// `try` or `catch` block opener (promise `.catch(` excluded)
pub fn is_exception_start(line: &str) -> bool {
    TRY_OR_CATCH.is_match(line)
}
