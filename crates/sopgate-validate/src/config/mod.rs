//! Configuration Module
//!
//! File-based configuration for sopgate, layered with figment from defaults,
//! `sopgate.toml`, and `SOPGATE_*` environment variables.

mod file_config;
mod loader;

pub use file_config::{
    CorrectionSettings, FileConfig, GatingSettings, GeneralConfig, LoggingConfig, MetricOverride,
    default_sops,
};
pub use loader::{CONFIG_ENV_PREFIX, ConfigLoader, DEFAULT_CONFIG_FILENAME};
