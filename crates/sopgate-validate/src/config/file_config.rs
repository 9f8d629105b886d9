//! File-based configuration
//!
//! Shape of `sopgate.toml`. Every section is optional; missing values fall
//! back to the built-in defaults.
//!
//! ```toml
//! [general]
//! include = ["src/**/*.ts"]
//! escalate = ["PERF003"]
//!
//! [gating]
//! profile = "strict"
//! max_warnings = 25
//!
//! [metrics.performance]
//! weight = 2.0
//! fail = 0.5
//!
//! [sops]
//! payments = ["transactions", "tenant-isolation"]
//! ```

use crate::context::ContextWindow;
use crate::correction::CorrectionOptions;
use crate::engine::SeverityPolicy;
use crate::gating::GatingConfig;
use crate::metrics::{DeductionSchedule, MetricDefinition, ScoringModel};
use crate::rules::RuleCatalog;
use crate::scan::{DEFAULT_EXCLUDE, DEFAULT_INCLUDE, SourceLoader};
use crate::{Category, Result, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub general: GeneralConfig,
    pub gating: GatingSettings,
    /// Overrides keyed by category id
    pub metrics: BTreeMap<String, MetricOverride>,
    pub correction: CorrectionSettings,
    /// SOP name to category ids
    pub sops: BTreeMap<String, Vec<String>>,
    pub logging: LoggingConfig,
}

/// Sources, default selection and severity routing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    /// Categories evaluated when the command line selects none
    pub categories: Vec<String>,
    /// Medium-severity rules reported as violations
    pub escalate: Vec<String>,
    pub window: ContextWindow,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            include: DEFAULT_INCLUDE.iter().map(ToString::to_string).collect(),
            exclude: DEFAULT_EXCLUDE.iter().map(ToString::to_string).collect(),
            categories: Vec::new(),
            escalate: Vec::new(),
            window: ContextWindow::default(),
        }
    }
}

/// Gate profile plus field overrides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatingSettings {
    /// `default` or `strict`
    pub profile: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_on_blockers: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_blockers: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fail_on_warnings: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_warnings: Option<usize>,
}

impl Default for GatingSettings {
    fn default() -> Self {
        Self {
            profile: "default".to_string(),
            minimum_score: None,
            block_on_blockers: None,
            max_blockers: None,
            fail_on_warnings: None,
            max_warnings: None,
        }
    }
}

/// Partial replacement of a category's metric
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_on_fail: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pass: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warn: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fail: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deductions: Option<DeductionSchedule>,
}

/// Correction loop settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrectionSettings {
    pub max_iterations: usize,
    pub skip_rules: Vec<String>,
    pub only_rules: Vec<String>,
}

impl Default for CorrectionSettings {
    fn default() -> Self {
        Self {
            max_iterations: crate::correction::DEFAULT_MAX_ITERATIONS,
            skip_rules: Vec::new(),
            only_rules: Vec::new(),
        }
    }
}

/// Logging settings consumed by the binary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json_format: false,
        }
    }
}

/// Built-in SOP groupings
pub fn default_sops() -> BTreeMap<String, Vec<Category>> {
    BTreeMap::from([
        (
            "api-security".to_string(),
            vec![Category::Security, Category::TenantIsolation],
        ),
        (
            "data-integrity".to_string(),
            vec![Category::Transactions, Category::ErrorHandling],
        ),
        (
            "operability".to_string(),
            vec![Category::Reliability, Category::Performance],
        ),
        ("code-hygiene".to_string(), vec![Category::Maintainability]),
    ])
}

impl FileConfig {
    /// Preset named by `gating.profile` with explicit fields applied on top
    pub fn gating_config(&self) -> Result<GatingConfig> {
        let settings = &self.gating;
        let mut config = GatingConfig::preset(&settings.profile)?;
        if let Some(v) = settings.minimum_score {
            config.minimum_score = v;
        }
        if let Some(v) = settings.block_on_blockers {
            config.block_on_blockers = v;
        }
        if let Some(v) = settings.max_blockers {
            config.max_blockers = v;
        }
        if let Some(v) = settings.fail_on_warnings {
            config.fail_on_warnings = v;
        }
        if let Some(v) = settings.max_warnings {
            config.max_warnings = v;
        }
        config.validate()?;
        Ok(config)
    }

    /// Built-in metrics with per-category overrides
    pub fn scoring_model(&self) -> Result<ScoringModel> {
        let mut model = ScoringModel::new();
        for (id, over) in &self.metrics {
            let category = Category::from_str(id)?;
            let mut metric = MetricDefinition::for_category(category);
            if let Some(name) = &over.name {
                metric.name.clone_from(name);
            }
            if let Some(weight) = over.weight {
                metric.weight = weight;
            }
            if let Some(block) = over.block_on_fail {
                metric.block_on_fail = block;
            }
            if let Some(pass) = over.pass {
                metric.thresholds = metric.thresholds.with_pass(pass);
            }
            if let Some(warn) = over.warn {
                metric.thresholds = metric.thresholds.with_warn(warn);
            }
            if let Some(fail) = over.fail {
                metric.thresholds = metric.thresholds.with_fail(fail);
            }
            model = model.with_metric(metric);
            if let Some(schedule) = over.deductions {
                model = model.with_deductions(category, schedule);
            }
        }
        model.validate()?;
        Ok(model)
    }

    /// Default bucket table with configured escalations
    pub fn severity_policy(&self, catalog: &RuleCatalog) -> Result<SeverityPolicy> {
        let mut policy = SeverityPolicy::default();
        for id in &self.general.escalate {
            let rule = catalog
                .get(id)
                .ok_or_else(|| ValidationError::UnknownRule(id.clone()))?;
            policy = policy.escalate(rule.id);
        }
        Ok(policy)
    }

    /// Built-in SOPs merged with configured ones (configured wins)
    pub fn sop_map(&self) -> Result<BTreeMap<String, Vec<Category>>> {
        let mut sops = default_sops();
        for (name, ids) in &self.sops {
            let categories = ids
                .iter()
                .map(|id| Category::from_str(id))
                .collect::<Result<Vec<_>>>()?;
            sops.insert(name.to_ascii_lowercase(), categories);
        }
        Ok(sops)
    }

    pub fn correction_options(&self) -> CorrectionOptions {
        let upper = |ids: &[String]| -> BTreeSet<String> {
            ids.iter().map(|id| id.to_ascii_uppercase()).collect()
        };
        CorrectionOptions {
            max_iterations: self.correction.max_iterations,
            skip_rules: upper(&self.correction.skip_rules),
            only_rules: upper(&self.correction.only_rules),
        }
    }

    pub fn source_loader(&self) -> Result<SourceLoader> {
        SourceLoader::with_globs(&self.general.include, &self.general.exclude)
    }

    /// Check every section without running anything
    pub fn validate(&self, catalog: &RuleCatalog) -> Result<()> {
        self.general.window.validate()?;
        self.gating_config()?;
        self.scoring_model()?;
        self.severity_policy(catalog)?;
        self.sop_map()?;
        for id in &self.general.categories {
            Category::from_str(id)?;
        }
        Ok(())
    }
}
