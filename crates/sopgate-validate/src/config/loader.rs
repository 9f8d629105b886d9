//! Configuration loader
//!
//! Sources are merged in this order (later overrides earlier):
//! 1. `FileConfig::default()`
//! 2. TOML file: the explicit path, or `sopgate.toml` in the working directory
//! 3. Environment variables with prefix, nested keys split on `__`
//!    (e.g. `SOPGATE_GATING__PROFILE=strict`)

use super::FileConfig;
use crate::{Result, ValidationError};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "sopgate.toml";

/// Default environment prefix
pub const CONFIG_ENV_PREFIX: &str = "SOPGATE";

/// Configuration loader service
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
    env_prefix: String,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            config_path: None,
            env_prefix: CONFIG_ENV_PREFIX.to_string(),
        }
    }

    /// Set the configuration file path; it must exist
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Load configuration from all sources
    pub fn load(&self) -> Result<FileConfig> {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        match &self.config_path {
            Some(path) if path.exists() => {
                debug!(path = %path.display(), "loading configuration file");
                figment = figment.merge(Toml::file(path));
            }
            Some(path) => {
                return Err(ValidationError::Config(format!(
                    "configuration file not found: {}",
                    path.display()
                )));
            }
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILENAME);
                if default_path.exists() {
                    debug!(path = %default_path.display(), "loading default configuration file");
                    figment = figment.merge(Toml::file(default_path));
                }
            }
        }

        figment = figment.merge(Env::prefixed(&format!("{}_", self.env_prefix)).split("__"));

        figment
            .extract()
            .map_err(|e| ValidationError::Figment(Box::new(e)))
    }
}
