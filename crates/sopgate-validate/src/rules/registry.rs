//! Declarative Rule Catalog
//!
//! Rules are plain data plus a pure check function. The catalog is built once
//! and passed by reference into the engine; nothing mutates it afterwards.

use crate::context::LineContext;
use crate::{Category, Result, Severity, ValidationError};
use std::collections::HashSet;

/// Signature shared by every rule check
///
/// `line_number` is 1-based. A check never mutates shared state; everything it
/// reports travels back through the returned `Finding`.
pub type CheckFn = fn(line: &str, line_number: usize, context: &LineContext<'_>) -> Option<Finding>;

/// Transient result of a single rule check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub message: String,
    pub suggested_fix: Option<String>,
}

impl Finding {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggested_fix: None,
        }
    }

    pub fn with_fix(mut self, fix: impl Into<String>) -> Self {
        self.suggested_fix = Some(fix.into());
        self
    }
}

/// Declarative rule definition
#[derive(Clone)]
pub struct Rule {
    /// Unique rule identifier (e.g., "SEC001")
    pub id: &'static str,
    /// Human-readable rule name
    pub name: &'static str,
    /// Category for grouping in results
    pub category: Category,
    /// Severity of every finding this rule produces
    pub severity: Severity,
    /// Description of what the rule checks
    pub description: &'static str,
    /// Improvement suggestion surfaced once per category run
    pub remediation: &'static str,
    /// The check itself
    pub check: CheckFn,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("category", &self.category)
            .field("severity", &self.severity)
            .finish_non_exhaustive()
    }
}

/// Catalog holding every rule, in registration order
#[derive(Debug, Default, Clone)]
pub struct RuleCatalog {
    rules: Vec<Rule>,
}

impl RuleCatalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Build a catalog from a fixed rule list (fixture subsets in tests)
    pub fn from_rules(rules: impl IntoIterator<Item = Rule>) -> Result<Self> {
        let mut catalog = Self::new();
        for rule in rules {
            catalog.register(rule)?;
        }
        Ok(catalog)
    }

    /// Add a rule; ids must be unique
    pub fn register(&mut self, rule: Rule) -> Result<()> {
        if self.get(rule.id).is_some() {
            return Err(ValidationError::Config(format!(
                "duplicate rule id {}",
                rule.id
            )));
        }
        self.rules.push(rule);
        Ok(())
    }

    /// Get all rules
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Get rules of one category, in registration order
    pub fn rules_by_category(&self, category: Category) -> Vec<&Rule> {
        self.rules
            .iter()
            .filter(|r| r.category == category)
            .collect()
    }

    /// Get a rule by ID
    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id.eq_ignore_ascii_case(id))
    }

    /// Categories that have at least one rule, in canonical order
    pub fn categories(&self) -> Vec<Category> {
        let present: HashSet<Category> = self.rules.iter().map(|r| r.category).collect();
        Category::ALL
            .into_iter()
            .filter(|c| present.contains(c))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Create catalog with all standard rules
    pub fn standard() -> Self {
        let rules = super::security::rules()
            .into_iter()
            .chain(super::error_handling::rules())
            .chain(super::performance::rules())
            .chain(super::reliability::rules())
            .chain(super::maintainability::rules())
            .chain(super::transactions::rules())
            .chain(super::tenant::rules());

        // Ids are literals in this crate; a clash is caught by the catalog tests.
        let mut catalog = Self::new();
        for rule in rules {
            if let Err(e) = catalog.register(rule) {
                tracing::error!(error = %e, "standard catalog rule skipped");
            }
        }
        catalog
    }
}
