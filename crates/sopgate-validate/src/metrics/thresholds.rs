//! Metric thresholds configuration
//!
//! Maps a category score onto a pass/warn/fail status.

use crate::{Result, ValidationError};
use serde::{Deserialize, Serialize};

/// Status of a metric after scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricStatus {
    Pass,
    Warn,
    Fail,
}

impl std::fmt::Display for MetricStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pass => write!(f, "PASS"),
            Self::Warn => write!(f, "WARN"),
            Self::Fail => write!(f, "FAIL"),
        }
    }
}

/// Score thresholds of one metric
///
/// `pass >= warn >= fail`. `status` reports `Fail` below `warn`; gating uses
/// the stricter `fail` bound through `is_below_fail`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricThresholds {
    pub pass: f64,
    pub warn: f64,
    pub fail: f64,
}

impl Default for MetricThresholds {
    fn default() -> Self {
        Self::new(0.80, 0.60, 0.40)
    }
}

impl MetricThresholds {
    pub const fn new(pass: f64, warn: f64, fail: f64) -> Self {
        Self { pass, warn, fail }
    }

    /// Replace the pass threshold
    pub fn with_pass(mut self, pass: f64) -> Self {
        self.pass = pass;
        self
    }

    /// Replace the warn threshold
    pub fn with_warn(mut self, warn: f64) -> Self {
        self.warn = warn;
        self
    }

    /// Replace the fail threshold
    pub fn with_fail(mut self, fail: f64) -> Self {
        self.fail = fail;
        self
    }

    /// Status for a score
    pub fn status(&self, score: f64) -> MetricStatus {
        if score >= self.pass {
            MetricStatus::Pass
        } else if score >= self.warn {
            MetricStatus::Warn
        } else {
            MetricStatus::Fail
        }
    }

    /// True when the score is under the blocking bound
    pub fn is_below_fail(&self, score: f64) -> bool {
        score < self.fail
    }

    /// Check ordering and range
    pub fn validate(&self, metric: &str) -> Result<()> {
        let in_range = [self.pass, self.warn, self.fail]
            .iter()
            .all(|v| (0.0..=1.0).contains(v));
        if !in_range || self.pass < self.warn || self.warn < self.fail {
            return Err(ValidationError::Config(format!(
                "metric {metric}: thresholds must satisfy 1 >= pass ({}) >= warn ({}) >= fail ({}) >= 0",
                self.pass, self.warn, self.fail
            )));
        }
        Ok(())
    }
}
