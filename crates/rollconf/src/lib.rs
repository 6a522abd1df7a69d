//! Layered configuration for rollcodec.
//!
//! # Config File Locations
//!
//! Files are loaded in order (later wins):
//! 1. `/etc/rollcodec/config.toml` (system)
//! 2. `~/.config/rollcodec/config.toml` (user)
//! 3. `./rollcodec.toml` (local override), or the path given on the command line
//! 4. Environment variables (`ROLLCODEC_*`, `RUST_LOG`)
//!
//! # Example Config
//!
//! ```toml
//! [codec]
//! scheme = "grid"
//! steps_per_bar = 16
//!
//! [paths]
//! output_dir = "~/datasets/tokens"
//! token_extension = "tokens.json"
//!
//! [telemetry]
//! log_level = "debug"
//! ```

pub mod loader;
pub mod sections;

pub use loader::{discover_config_files_with_override, ConfigSources};
pub use sections::{CodecConfig, PathsConfig, Scheme, TelemetryConfig};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete rollcodec configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RollConfig {
    #[serde(default)]
    pub codec: CodecConfig,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl RollConfig {
    /// Load configuration from all standard sources.
    pub fn load() -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(None)?;
        Ok(config)
    }

    /// Load configuration, letting `config_path` replace the local override.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(config_path)?;
        Ok(config)
    }

    /// Load configuration and report where values came from.
    ///
    /// Load order (later wins):
    /// 1. Compiled defaults
    /// 2. Discovered config files
    /// 3. Environment variables
    pub fn load_with_sources_from(
        config_path: Option<&Path>,
    ) -> Result<(Self, ConfigSources), ConfigError> {
        let mut sources = ConfigSources::default();
        let mut config = RollConfig::default();

        if let Some(path) = config_path.filter(|p| !p.exists()) {
            sources.missing_override = Some(path.to_path_buf());
        }

        for path in loader::discover_config_files_with_override(config_path) {
            loader::apply_file(&mut config, &path)?;
            sources.files.push(path);
        }

        loader::apply_env_overrides(&mut config, &mut sources);
        config.validate()?;

        Ok((config, sources))
    }

    /// Reject values no codec can run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.codec.steps_per_bar == 0 {
            return Err(ConfigError::Invalid(
                "codec.steps_per_bar must be at least 1".to_string(),
            ));
        }
        if self.paths.token_extension.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "paths.token_extension must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Serialize config to a TOML string.
    pub fn to_toml(&self) -> String {
        let mut output = String::new();

        output.push_str("# rollcodec configuration\n\n");

        output.push_str("[codec]\n");
        output.push_str(&format!("scheme = \"{}\"\n", self.codec.scheme));
        output.push_str(&format!("steps_per_bar = {}\n", self.codec.steps_per_bar));

        output.push_str("\n[paths]\n");
        output.push_str(&format!(
            "output_dir = \"{}\"\n",
            self.paths.output_dir.display()
        ));
        output.push_str(&format!(
            "token_extension = \"{}\"\n",
            self.paths.token_extension
        ));

        output.push_str("\n[telemetry]\n");
        output.push_str(&format!("log_level = \"{}\"\n", self.telemetry.log_level));

        output
    }
}
