//! Shared text heuristics for rule checks
//!
//! Helpers work on the bounded windows carried by `LineContext`, except
//! `function_scope`, which follows the structural scan limit.

use crate::context::{LineContext, brace_delta, enclosing_start, is_function_start};

/// Comment line (`//`, `/*`, or a `*` continuation)
pub fn is_comment(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("//") || trimmed.starts_with("/*") || trimmed.starts_with('*')
}

/// Spec/test file by naming convention
pub fn is_test_file(filename: &str) -> bool {
    filename.contains(".spec.")
        || filename.contains(".test.")
        || filename.contains("__tests__")
        || filename.contains("/test/")
}

/// Final path component of a file name
pub fn basename(filename: &str) -> &str {
    filename.rsplit(['/', '\\']).next().unwrap_or(filename)
}

/// Net opening parentheses on a line
pub fn paren_delta(line: &str) -> i32 {
    line.chars().fold(0, |acc, c| match c {
        '(' => acc + 1,
        ')' => acc - 1,
        _ => acc,
    })
}

/// Text of a call starting on `line`, extended over the following window
/// until the parentheses balance
pub fn call_text(line: &str, following: &[&str]) -> String {
    let mut text = String::from(line);
    let mut depth = paren_delta(line);
    for next in following {
        if depth <= 0 {
            break;
        }
        text.push('\n');
        text.push_str(next);
        depth += paren_delta(next);
    }
    text
}

/// Lines of the block opened on `line`, without the closing line
///
/// Empty when `line` does not leave a block open.
pub fn block_body<'a>(line: &str, following: &[&'a str]) -> Vec<&'a str> {
    let mut depth = -brace_delta(line);
    let mut body = Vec::new();
    if depth <= 0 {
        return body;
    }
    for next in following {
        depth -= brace_delta(next);
        if depth <= 0 {
            break;
        }
        body.push(*next);
    }
    body
}

/// Enclosing function body as visible through the context windows
#[derive(Debug, Clone)]
pub struct FunctionScope<'a> {
    /// Lines from the function start up to its closing brace (or window end)
    pub lines: Vec<&'a str>,
    /// Position of the inspected line inside `lines`
    pub target: usize,
}

impl FunctionScope<'_> {
    /// The line that opened the function
    pub fn start_line(&self) -> &str {
        self.lines.first().copied().unwrap_or_default()
    }
}

/// Locate the function enclosing the context's line
///
/// The start is searched back to the scan limit; the end forward until the
/// braces balance or the same limit is reached.
pub fn function_scope<'a>(ctx: &LineContext<'a>) -> Option<FunctionScope<'a>> {
    let lines = ctx.lines;
    let start = enclosing_start(lines, ctx.index, ctx.scan_limit, is_function_start)?;

    let last = ctx
        .index
        .saturating_add(ctx.scan_limit)
        .min(lines.len().saturating_sub(1));
    let mut depth = 0;
    let mut end = last;
    for (i, text) in lines.iter().enumerate().take(last + 1).skip(start) {
        depth -= brace_delta(text);
        if depth <= 0 && i >= ctx.index {
            end = i;
            break;
        }
    }

    Some(FunctionScope {
        lines: lines[start..=end].to_vec(),
        target: ctx.index - start,
    })
}
