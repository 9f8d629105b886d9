//! Scoring Model
//!
//! Turns the findings of one category into a score in `[0, 1]`:
//!
//! - **Deduction schedule**: per-category penalty for each violation severity
//!   and for each warning. Categories are tuned independently so cosmetic
//!   findings never swamp security findings.
//! - **Metric definition**: name, weight, blocking flag and thresholds used by
//!   the aggregate score and the gate.

mod thresholds;

pub use thresholds::{MetricStatus, MetricThresholds};

use crate::{Category, Result, Severity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-category penalty constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeductionSchedule {
    pub critical: f64,
    pub high: f64,
    pub medium: f64,
    /// Penalty per warning
    pub warning: f64,
}

impl DeductionSchedule {
    pub const fn new(critical: f64, high: f64, medium: f64, warning: f64) -> Self {
        Self {
            critical,
            high,
            medium,
            warning,
        }
    }

    /// Built-in schedule of a category
    pub fn for_category(category: Category) -> Self {
        match category {
            Category::Security => Self::new(0.30, 0.20, 0.10, 0.05),
            Category::ErrorHandling => Self::new(0.25, 0.15, 0.10, 0.03),
            Category::Performance => Self::new(0.20, 0.10, 0.05, 0.02),
            Category::Reliability => Self::new(0.25, 0.15, 0.08, 0.03),
            Category::Maintainability => Self::new(0.10, 0.05, 0.02, 0.01),
            Category::Transactions => Self::new(0.20, 0.20, 0.20, 0.05),
            Category::TenantIsolation => Self::new(0.40, 0.30, 0.15, 0.05),
        }
    }

    /// Penalty of one violation of the given severity
    pub fn penalty(&self, severity: Severity) -> f64 {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
        }
    }

    /// Score from 1.0 minus every penalty, clamped to `[0, 1]`
    pub fn score<I>(&self, violation_severities: I, warnings: usize) -> f64
    where
        I: IntoIterator<Item = Severity>,
    {
        let deducted: f64 = violation_severities
            .into_iter()
            .map(|s| self.penalty(s))
            .sum::<f64>()
            + self.warning * warnings as f64;
        (1.0 - deducted).clamp(0.0, 1.0)
    }

    /// Every penalty must be a number in `[0, 1]`
    pub fn validate(&self, category: Category) -> Result<()> {
        let penalties = [
            ("critical", self.critical),
            ("high", self.high),
            ("medium", self.medium),
            ("warning", self.warning),
        ];
        for (name, value) in penalties {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(crate::ValidationError::Config(format!(
                    "deductions for {category}: {name} must be within [0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Static definition of a category metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDefinition {
    pub name: String,
    pub category: Category,
    /// Relative weight in the aggregate; need not sum to 1 across metrics
    pub weight: f64,
    /// A score under `thresholds.fail` fails the gate
    pub block_on_fail: bool,
    pub thresholds: MetricThresholds,
}

impl MetricDefinition {
    pub fn new(name: impl Into<String>, category: Category, weight: f64) -> Self {
        Self {
            name: name.into(),
            category,
            weight,
            block_on_fail: false,
            thresholds: MetricThresholds::default(),
        }
    }

    pub fn blocking(mut self, block_on_fail: bool) -> Self {
        self.block_on_fail = block_on_fail;
        self
    }

    pub fn with_thresholds(mut self, thresholds: MetricThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Built-in definition of a category
    pub fn for_category(category: Category) -> Self {
        let (name, weight, block, pass, warn, fail) = match category {
            Category::Security => ("security-compliance", 3.0, true, 0.90, 0.75, 0.60),
            Category::TenantIsolation => ("tenant-isolation", 3.0, true, 0.95, 0.80, 0.70),
            Category::Transactions => ("transaction-integrity", 2.0, true, 0.90, 0.75, 0.60),
            Category::ErrorHandling => ("error-handling-quality", 2.0, false, 0.85, 0.70, 0.50),
            Category::Reliability => ("reliability", 1.5, false, 0.85, 0.70, 0.50),
            Category::Performance => ("performance", 1.0, false, 0.80, 0.60, 0.40),
            Category::Maintainability => ("maintainability", 0.5, false, 0.70, 0.50, 0.30),
        };
        Self::new(name, category, weight)
            .blocking(block)
            .with_thresholds(MetricThresholds::new(pass, warn, fail))
    }

    pub fn status(&self, score: f64) -> MetricStatus {
        self.thresholds.status(score)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.weight.is_finite() || self.weight < 0.0 {
            return Err(crate::ValidationError::Config(format!(
                "metric {}: weight must be a non-negative number",
                self.name
            )));
        }
        self.thresholds.validate(&self.name)
    }
}

/// Metric definitions and deduction schedules keyed by category
///
/// Categories without an explicit entry fall back to the built-in values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoringModel {
    metrics: BTreeMap<Category, MetricDefinition>,
    deductions: BTreeMap<Category, DeductionSchedule>,
}

impl ScoringModel {
    /// Model with only built-in values
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the metric of `definition.category`
    pub fn with_metric(mut self, definition: MetricDefinition) -> Self {
        self.metrics.insert(definition.category, definition);
        self
    }

    /// Add or replace a deduction schedule
    pub fn with_deductions(mut self, category: Category, schedule: DeductionSchedule) -> Self {
        self.deductions.insert(category, schedule);
        self
    }

    pub fn metric(&self, category: Category) -> MetricDefinition {
        self.metrics
            .get(&category)
            .cloned()
            .unwrap_or_else(|| MetricDefinition::for_category(category))
    }

    pub fn deductions(&self, category: Category) -> DeductionSchedule {
        self.deductions
            .get(&category)
            .copied()
            .unwrap_or_else(|| DeductionSchedule::for_category(category))
    }

    pub fn validate(&self) -> Result<()> {
        self.metrics.values().try_for_each(MetricDefinition::validate)?;
        self.deductions
            .iter()
            .try_for_each(|(category, schedule)| schedule.validate(*category))
    }
}
