//! Configuration sections.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Which token scheme to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    /// Typed delta-event tokens (note, length, time-shift, velocity).
    #[default]
    Delta,
    /// One token per note on a fixed grid.
    Grid,
}

impl FromStr for Scheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "delta" => Ok(Scheme::Delta),
            "grid" => Ok(Scheme::Grid),
            other => Err(format!("unknown scheme '{}' (expected delta or grid)", other)),
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheme::Delta => write!(f, "delta"),
            Scheme::Grid => write!(f, "grid"),
        }
    }
}

/// Codec selection and grid resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Token scheme.
    /// Default: delta
    #[serde(default)]
    pub scheme: Scheme,

    /// Grid resolution. Streams must be decoded with the value they were
    /// encoded with; it is not recorded in the stream.
    /// Default: 8
    #[serde(default = "CodecConfig::default_steps_per_bar")]
    pub steps_per_bar: u32,
}

impl CodecConfig {
    fn default_steps_per_bar() -> u32 {
        8
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            scheme: Scheme::default(),
            steps_per_bar: Self::default_steps_per_bar(),
        }
    }
}

/// Where batch output goes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Default output directory for `preprocess`.
    /// Default: .
    #[serde(default = "PathsConfig::default_output_dir")]
    pub output_dir: PathBuf,

    /// Suffix appended to each tokenized file name.
    /// Default: tokens.json
    #[serde(default = "PathsConfig::default_token_extension")]
    pub token_extension: String,
}

impl PathsConfig {
    fn default_output_dir() -> PathBuf {
        PathBuf::from(".")
    }

    fn default_token_extension() -> String {
        "tokens.json".to_string()
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            output_dir: Self::default_output_dir(),
            token_extension: Self::default_token_extension(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Log level or `EnvFilter` directive string.
    /// Default: info
    #[serde(default = "TelemetryConfig::default_log_level")]
    pub log_level: String,
}

impl TelemetryConfig {
    fn default_log_level() -> String {
        "info".to_string()
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
        }
    }
}
