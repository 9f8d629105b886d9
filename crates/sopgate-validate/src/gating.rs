//! Scoring & Gating
//!
//! Reduces per-category results to a weighted aggregate score and a verdict.
//! Checks run in a fixed order and the first failing one wins:
//!
//! 1. blocker count over `max_blockers` (when `block_on_blockers`)
//! 2. warning count over `max_warnings` (when `fail_on_warnings`)
//! 3. a blocking category under its `fail` threshold
//! 4. aggregate score under `minimum_score`

use crate::engine::ValidationRun;
use crate::metrics::ScoringModel;
use crate::{Category, Result, ValidationError};
use serde::{Deserialize, Serialize};

/// Gate policy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatingConfig {
    pub minimum_score: f64,
    pub block_on_blockers: bool,
    pub max_blockers: usize,
    pub fail_on_warnings: bool,
    pub max_warnings: usize,
}

impl Default for GatingConfig {
    fn default() -> Self {
        Self {
            minimum_score: 0.80,
            block_on_blockers: true,
            max_blockers: 0,
            fail_on_warnings: false,
            max_warnings: 50,
        }
    }
}

impl GatingConfig {
    /// Profile used for release branches
    pub fn strict() -> Self {
        Self {
            minimum_score: 0.90,
            block_on_blockers: true,
            max_blockers: 0,
            fail_on_warnings: true,
            max_warnings: 10,
        }
    }

    /// Named preset (`default` or `strict`)
    pub fn preset(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(Self::default()),
            "strict" => Ok(Self::strict()),
            other => Err(ValidationError::Config(format!(
                "unknown gating profile '{other}' (expected default or strict)"
            ))),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.minimum_score) {
            return Err(ValidationError::Config(format!(
                "minimum_score {} is outside [0, 1]",
                self.minimum_score
            )));
        }
        Ok(())
    }

    /// Verdict for a scored run
    pub fn evaluate(&self, run: &ValidationRun, scoring: &ScoringModel) -> GateDecision {
        let scores: Vec<CategoryScore> = run
            .results
            .iter()
            .map(|r| {
                let metric = scoring.metric(r.category);
                CategoryScore {
                    category: r.category,
                    metric_name: metric.name,
                    score: r.score,
                    weight: metric.weight,
                    block_on_fail: metric.block_on_fail,
                    fail_threshold: metric.thresholds.fail,
                }
            })
            .collect();
        self.decide(run.violation_count(), run.warning_count(), &scores)
    }

    /// Verdict from raw counts and category scores
    pub fn decide(&self, blockers: usize, warnings: usize, scores: &[CategoryScore]) -> GateDecision {
        let aggregate = aggregate_score(scores);
        let failure = self.first_failure(blockers, warnings, scores, aggregate);
        GateDecision {
            passed: failure.is_none(),
            aggregate_score: aggregate,
            blockers,
            warnings,
            failure,
        }
    }

    fn first_failure(
        &self,
        blockers: usize,
        warnings: usize,
        scores: &[CategoryScore],
        aggregate: f64,
    ) -> Option<GateFailure> {
        if self.block_on_blockers && blockers > self.max_blockers {
            return Some(GateFailure::TooManyBlockers {
                count: blockers,
                max: self.max_blockers,
            });
        }
        if self.fail_on_warnings && warnings > self.max_warnings {
            return Some(GateFailure::TooManyWarnings {
                count: warnings,
                max: self.max_warnings,
            });
        }

        let mut ordered: Vec<&CategoryScore> = scores.iter().collect();
        ordered.sort_by_key(|s| s.category);
        if let Some(low) = ordered
            .into_iter()
            .find(|s| s.block_on_fail && s.score < s.fail_threshold)
        {
            return Some(GateFailure::CategoryBelowThreshold {
                category: low.category,
                metric: low.metric_name.clone(),
                score: low.score,
                threshold: low.fail_threshold,
            });
        }

        (aggregate < self.minimum_score).then_some(GateFailure::AggregateBelowMinimum {
            score: aggregate,
            minimum: self.minimum_score,
        })
    }
}

/// One category's contribution to the gate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: Category,
    pub metric_name: String,
    pub score: f64,
    pub weight: f64,
    pub block_on_fail: bool,
    pub fail_threshold: f64,
}

/// `Σ(score × weight) / Σ(weight)` over the evaluated categories
///
/// Contributions are summed in category order so the result does not depend
/// on evaluation order. No weighted category means nothing failed: 1.0.
pub fn aggregate_score(scores: &[CategoryScore]) -> f64 {
    let mut ordered: Vec<&CategoryScore> = scores.iter().collect();
    ordered.sort_by(|a, b| {
        a.category
            .cmp(&b.category)
            .then(a.score.total_cmp(&b.score))
            .then(a.weight.total_cmp(&b.weight))
    });

    let (weighted, total) = ordered
        .iter()
        .filter(|s| s.weight > 0.0)
        .fold((0.0, 0.0), |(weighted, total), s| {
            (weighted + s.score * s.weight, total + s.weight)
        });

    if total > 0.0 {
        (weighted / total).clamp(0.0, 1.0)
    } else {
        1.0
    }
}

/// Why the gate failed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum GateFailure {
    TooManyBlockers {
        count: usize,
        max: usize,
    },
    TooManyWarnings {
        count: usize,
        max: usize,
    },
    CategoryBelowThreshold {
        category: Category,
        metric: String,
        score: f64,
        threshold: f64,
    },
    AggregateBelowMinimum {
        score: f64,
        minimum: f64,
    },
}

impl std::fmt::Display for GateFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooManyBlockers { count, max } => {
                write!(f, "{count} blocking violation(s) (max {max})")
            }
            Self::TooManyWarnings { count, max } => {
                write!(f, "{count} warning(s) (max {max})")
            }
            Self::CategoryBelowThreshold {
                category,
                metric,
                score,
                threshold,
            } => write!(
                f,
                "category {category} ({metric}) scored {score:.2}, below fail threshold {threshold:.2}"
            ),
            Self::AggregateBelowMinimum { score, minimum } => {
                write!(f, "aggregate score {score:.2} is below minimum {minimum:.2}")
            }
        }
    }
}

/// Gate verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateDecision {
    pub passed: bool,
    pub aggregate_score: f64,
    pub blockers: usize,
    pub warnings: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<GateFailure>,
}

impl GateDecision {
    /// Human-readable reason, `None` on pass
    pub fn reason(&self) -> Option<String> {
        self.failure.as_ref().map(ToString::to_string)
    }
}
