//! # Incidra Configuration System
//!
//! Hierarchical configuration for the correlation engine.
//!
//! ## Features
//! - **Unified Configuration**: single source of truth across all crates
//! - **Validation**: every loaded value checked before use
//! - **Environment Awareness**: per-environment overlay files plus
//!   `INCIDRA_*` environment variables

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

mod correlation;
mod detection;
mod error;
mod retention;
mod telemetry;
mod validation;

pub use correlation::CorrelationConfig;
pub use detection::{DetectionConfig, RuleConfig};
pub use error::ConfigError;
pub use retention::RetentionConfig;
pub use telemetry::TelemetryConfig;

/// Top-level configuration container for all Incidra components.
#[derive(Debug, Serialize, Deserialize, Validate, Default, Clone)]
pub struct IncidraConfig {
    /// Incident correlation window and exclusions.
    #[validate(nested)]
    pub correlation: CorrelationConfig,

    /// Retention sweeper schedule and horizon.
    #[validate(nested)]
    pub retention: RetentionConfig,

    /// Signature blocking and admin rules.
    #[validate(nested)]
    pub detection: DetectionConfig,

    /// Telemetry and observability configuration.
    #[validate(nested)]
    pub telemetry: TelemetryConfig,
}

impl IncidraConfig {
    /// Load configuration from default files and environment.
    ///
    /// Hierarchy:
    /// 1. Default values
    /// 2. `config/incidra.yaml` - base settings. If missing, defaults are used.
    /// 3. `config/<environment>.yaml` - environment-specific overrides.
    /// 4. `INCIDRA_*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(IncidraConfig::default()));

        if Path::new("config/incidra.yaml").exists() {
            figment = figment.merge(Yaml::file("config/incidra.yaml"));
        }

        let env = std::env::var("INCIDRA_ENV").unwrap_or_else(|_| "production".into());
        let env_file = format!("config/{}.yaml", env);
        if Path::new(&env_file).exists() {
            figment = figment.merge(Yaml::file(env_file));
        }

        figment
            .merge(Env::prefixed("INCIDRA_").split("__"))
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }

    /// Load configuration from a specific path for testing/validation.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(PathBuf::from(
                path.to_string_lossy().to_string(),
            )));
        }

        Figment::from(Serialized::defaults(IncidraConfig::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed("INCIDRA_").split("__"))
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }
}
