//! Fix Patterns
//!
//! A fix pattern pairs a rule id with a line matcher and a pure replacement.
//! Patterns never inspect anything but the line they are handed.

use super::prerequisite::Prerequisite;
use crate::rules::maintainability::DEBUGGER;
use crate::rules::security::{HTTP_URL, is_local_host};
use crate::{Result, ValidationError};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Replacement applied to each match
#[derive(Clone)]
pub enum Replacement {
    /// Template with `$1` / `${name}` group references
    Template(String),
    /// Pure function of the captures
    Function(fn(&Captures<'_>) -> String),
}

impl std::fmt::Debug for Replacement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Template(t) => f.debug_tuple("Template").field(t).finish(),
            Self::Function(_) => f.write_str("Function(..)"),
        }
    }
}

/// Deterministic textual fix for one rule
#[derive(Debug, Clone)]
pub struct FixPattern {
    pub rule_id: String,
    pub matcher: Regex,
    pub replacement: Replacement,
    pub description: String,
    /// Declaration the rewritten line depends on
    pub prerequisite: Option<Prerequisite>,
}

impl FixPattern {
    /// Compile a pattern from source text
    pub fn new(
        rule_id: impl Into<String>,
        pattern: &str,
        replacement: Replacement,
        description: impl Into<String>,
    ) -> Result<Self> {
        let matcher = Regex::new(pattern).map_err(|e| ValidationError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self::from_regex(rule_id, matcher, replacement, description))
    }

    pub fn from_regex(
        rule_id: impl Into<String>,
        matcher: Regex,
        replacement: Replacement,
        description: impl Into<String>,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            matcher,
            replacement,
            description: description.into(),
            prerequisite: None,
        }
    }

    pub fn requires(mut self, prerequisite: Prerequisite) -> Self {
        self.prerequisite = Some(prerequisite);
        self
    }

    /// Rewrite one line; `None` when nothing changed
    pub fn apply_line(&self, line: &str) -> Option<String> {
        if !self.matcher.is_match(line) {
            return None;
        }
        let rewritten = match &self.replacement {
            Replacement::Template(template) => self.matcher.replace_all(line, template.as_str()),
            Replacement::Function(f) => self.matcher.replace_all(line, |caps: &Captures<'_>| f(caps)),
        };
        (rewritten != line).then(|| rewritten.into_owned())
    }
}

static NOT_FOUND_ERROR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\bthrow\s+new\s+Error\s*\(\s*(['"`][^'"`]*(?i:not\s+found|does\s+not\s+exist)[^'"`]*['"`])\s*\)"#)
        .expect("valid regex")
});

static UNAUTHORIZED_ERROR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\bthrow\s+new\s+Error\s*\(\s*(['"`][^'"`]*(?i:unauthori[sz]ed|not\s+authenticated|invalid\s+credentials)[^'"`]*['"`])\s*\)"#)
        .expect("valid regex")
});

static FORBIDDEN_ERROR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\bthrow\s+new\s+Error\s*\(\s*(['"`][^'"`]*(?i:forbidden|access\s+denied|not\s+allowed|permission)[^'"`]*['"`])\s*\)"#)
        .expect("valid regex")
});

static BAD_REQUEST_ERROR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\bthrow\s+new\s+Error\s*\(\s*(['"`][^'"`]*(?i:invalid|required|must\s+be|bad\s+request)[^'"`]*['"`])\s*\)"#)
        .expect("valid regex")
});

/// Empty one-line catch, with or without a (typed) binding
static EMPTY_CATCH_INLINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bcatch\s*(\(\s*([\w$]+)\s*(?::[^)]*)?\))?\s*\{\s*\}").expect("valid regex")
});

static THROWN_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\bthrow\s+(['"`][^'"`]*['"`])"#).expect("valid regex"));

static OUTER_CLIENT_WRITE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:\bthis\.)?\bprisma\.([\w$]+)\.(create|createMany|update|updateMany|upsert|delete|deleteMany)\b",
    )
    .expect("valid regex")
});

fn rethrow_from_catch(caps: &Captures<'_>) -> String {
    match (caps.get(1), caps.get(2)) {
        (Some(binding), Some(name)) => {
            format!("catch {} {{ throw {}; }}", binding.as_str().trim(), name.as_str())
        }
        _ => "catch (error) { throw error; }".to_string(),
    }
}

fn upgrade_http(caps: &Captures<'_>) -> String {
    let host = caps.get(1).map_or("", |m| m.as_str());
    if is_local_host(host) {
        caps[0].to_string()
    } else {
        format!("https://{host}")
    }
}

/// Ordered set of fix patterns
#[derive(Debug, Clone, Default)]
pub struct FixRegistry {
    patterns: Vec<FixPattern>,
}

impl FixRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, pattern: FixPattern) {
        self.patterns.push(pattern);
    }

    pub fn with(mut self, pattern: FixPattern) -> Self {
        self.register(pattern);
        self
    }

    pub fn patterns(&self) -> &[FixPattern] {
        &self.patterns
    }

    pub fn for_rule<'a>(&'a self, rule_id: &'a str) -> impl Iterator<Item = &'a FixPattern> + 'a {
        self.patterns
            .iter()
            .filter(move |p| p.rule_id.eq_ignore_ascii_case(rule_id))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Built-in fixes
    ///
    /// ERR001 is partial: only not-found, unauthorized, forbidden and
    /// bad-request messages have a mapping. TXN002 assumes the callback's
    /// client parameter is named `tx`.
    pub fn standard() -> Self {
        let mut registry = Self::new();

        // Framework exception per message class, most specific first
        let nest_exceptions: [(&str, &Regex); 4] = [
            ("NotFoundException", &*NOT_FOUND_ERROR),
            ("UnauthorizedException", &*UNAUTHORIZED_ERROR),
            ("ForbiddenException", &*FORBIDDEN_ERROR),
            ("BadRequestException", &*BAD_REQUEST_ERROR),
        ];
        for (exception, matcher) in nest_exceptions {
            registry.register(
                FixPattern::from_regex(
                    "ERR001",
                    matcher.clone(),
                    Replacement::Template(format!("throw new {exception}(${{1}})")),
                    format!("Replace generic Error with {exception}"),
                )
                .requires(Prerequisite::new(exception, "@nestjs/common")),
            );
        }

        registry
            .with(FixPattern::from_regex(
                "ERR002",
                EMPTY_CATCH_INLINE.clone(),
                Replacement::Function(rethrow_from_catch),
                "Rethrow from empty catch block",
            ))
            .with(FixPattern::from_regex(
                "ERR005",
                THROWN_LITERAL.clone(),
                Replacement::Template("throw new Error(${1})".to_string()),
                "Wrap thrown literal in Error",
            ))
            .with(FixPattern::from_regex(
                "SEC004",
                HTTP_URL.clone(),
                Replacement::Function(upgrade_http),
                "Upgrade remote URL to https",
            ))
            .with(FixPattern::from_regex(
                "MAINT004",
                DEBUGGER.clone(),
                Replacement::Template(String::new()),
                "Remove debugger statement",
            ))
            .with(FixPattern::from_regex(
                "TXN002",
                OUTER_CLIENT_WRITE.clone(),
                Replacement::Template("tx.${1}.${2}".to_string()),
                "Route write through transaction client",
            ))
    }
}
