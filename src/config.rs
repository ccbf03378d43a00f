use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::wizard::DEFAULT_FREE_FEATURE_CAP;

/// Main configuration structure for Launchpad
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LaunchpadConfig {
    /// Durable wizard-state storage settings
    pub storage: StorageConfig,
    /// Wizard behavior knobs
    pub wizard: WizardSettings,
    /// Catalog source settings
    pub catalog: CatalogConfig,
    /// Observability settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding one record per user's in-progress wizard
    pub root_dir: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WizardSettings {
    /// Enabled-feature count included in the free tier; exceeding it is
    /// an advisory, not a gate
    pub free_feature_cap: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Optional TOML catalog file overriding the built-in data set
    pub file: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level filter (tracing EnvFilter syntax)
    pub log_level: String,
    /// Emit JSON log lines instead of the human-readable format
    pub json_logs: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { root_dir: ".launchpad/wizard-state".to_string() }
    }
}

impl Default for WizardSettings {
    fn default() -> Self {
        Self { free_feature_cap: DEFAULT_FREE_FEATURE_CAP }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self { file: None }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self { log_level: "info".to_string(), json_logs: false }
    }
}

impl Default for LaunchpadConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            wizard: WizardSettings::default(),
            catalog: CatalogConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl LaunchpadConfig {
    /// Load configuration by layering `launchpad.toml` (if present) and
    /// `LAUNCHPAD_*` environment variables over the defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("launchpad.toml"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let builder = Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(Environment::with_prefix("LAUNCHPAD").separator("__"));
        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }
}
