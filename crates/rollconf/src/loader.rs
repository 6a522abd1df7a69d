//! Config file discovery, loading, and environment variable overlay.

use crate::{ConfigError, RollConfig, Scheme};
use std::env;
use std::path::{Path, PathBuf};

/// Information about where config values came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Config files that were loaded (in order)
    pub files: Vec<PathBuf>,
    /// Environment variables that overrode config values
    pub env_overrides: Vec<String>,
    /// Explicit config path that did not exist and was skipped
    pub missing_override: Option<PathBuf>,
}

/// Discover config files in standard locations.
pub fn discover_config_files() -> Vec<PathBuf> {
    discover_config_files_with_override(None)
}

/// Discover config files, optionally with a CLI override path.
///
/// If `cli_path` is provided and exists, it replaces the local override.
/// Returns paths in load order (system, user, local/cli). Only existing
/// files are returned.
pub fn discover_config_files_with_override(cli_path: Option<&Path>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let system = PathBuf::from("/etc/rollcodec/config.toml");
    if system.exists() {
        files.push(system);
    }

    if let Some(config_dir) = directories::BaseDirs::new().map(|d| d.config_dir().to_path_buf()) {
        let user = config_dir.join("rollcodec/config.toml");
        if user.exists() {
            files.push(user);
        }
    }

    if let Some(path) = cli_path {
        if path.exists() {
            files.push(path.to_path_buf());
            return files;
        }
    }

    let local = PathBuf::from("rollcodec.toml");
    if local.exists() {
        files.push(local);
    }

    files
}

/// Overlay the values set in a TOML file onto `config`.
pub fn apply_file(config: &mut RollConfig, path: &Path) -> Result<(), ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    apply_toml(config, &contents, path)
}

fn parse_error(path: &Path, message: impl Into<String>) -> ConfigError {
    ConfigError::Parse {
        path: path.to_path_buf(),
        message: message.into(),
    }
}

/// Overlay only the keys present in `contents`; absent keys keep their value.
fn apply_toml(config: &mut RollConfig, contents: &str, path: &Path) -> Result<(), ConfigError> {
    let table: toml::Table = contents
        .parse()
        .map_err(|e: toml::de::Error| parse_error(path, e.to_string()))?;

    if let Some(codec) = table.get("codec").and_then(|v| v.as_table()) {
        if let Some(v) = codec.get("scheme").and_then(|v| v.as_str()) {
            config.codec.scheme = v.parse::<Scheme>().map_err(|e| parse_error(path, e))?;
        }
        if let Some(v) = codec.get("steps_per_bar").and_then(|v| v.as_integer()) {
            config.codec.steps_per_bar = u32::try_from(v)
                .map_err(|_| parse_error(path, format!("steps_per_bar out of range: {}", v)))?;
        }
    }

    if let Some(paths) = table.get("paths").and_then(|v| v.as_table()) {
        if let Some(v) = paths.get("output_dir").and_then(|v| v.as_str()) {
            config.paths.output_dir = expand_path(v);
        }
        if let Some(v) = paths.get("token_extension").and_then(|v| v.as_str()) {
            config.paths.token_extension = v.to_string();
        }
    }

    if let Some(telemetry) = table.get("telemetry").and_then(|v| v.as_table()) {
        if let Some(v) = telemetry.get("log_level").and_then(|v| v.as_str()) {
            config.telemetry.log_level = v.to_string();
        }
    }

    Ok(())
}

/// Apply environment variable overrides to config.
///
/// Unparseable values are ignored rather than failing the load.
pub fn apply_env_overrides(config: &mut RollConfig, sources: &mut ConfigSources) {
    apply_env_from(config, sources, |key| env::var(key).ok());
}

fn apply_env_from(
    config: &mut RollConfig,
    sources: &mut ConfigSources,
    lookup: impl Fn(&str) -> Option<String>,
) {
    if let Some(v) = lookup("ROLLCODEC_SCHEME") {
        if let Ok(scheme) = v.parse() {
            config.codec.scheme = scheme;
            sources.env_overrides.push("ROLLCODEC_SCHEME".to_string());
        }
    }
    if let Some(v) = lookup("ROLLCODEC_STEPS_PER_BAR") {
        if let Ok(steps) = v.parse() {
            config.codec.steps_per_bar = steps;
            sources.env_overrides.push("ROLLCODEC_STEPS_PER_BAR".to_string());
        }
    }
    if let Some(v) = lookup("ROLLCODEC_OUTPUT_DIR") {
        config.paths.output_dir = expand_path(&v);
        sources.env_overrides.push("ROLLCODEC_OUTPUT_DIR".to_string());
    }
    if let Some(v) = lookup("ROLLCODEC_LOG_LEVEL") {
        config.telemetry.log_level = v;
        sources.env_overrides.push("ROLLCODEC_LOG_LEVEL".to_string());
    }
    // Also support RUST_LOG
    if let Some(v) = lookup("RUST_LOG") {
        config.telemetry.log_level = v;
        sources.env_overrides.push("RUST_LOG".to_string());
    }
}

/// Expand a leading `~/` or `$VAR/` in a path.
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            return home.join(stripped);
        }
    } else if let Some(stripped) = path.strip_prefix('$') {
        let (var_name, rest) = match stripped.find('/') {
            Some(slash_pos) => (&stripped[..slash_pos], Some(&stripped[slash_pos + 1..])),
            None => (stripped, None),
        };
        if let Ok(var_value) = env::var(var_name) {
            let base = PathBuf::from(var_value);
            return match rest {
                Some(rest) => base.join(rest),
                None => base,
            };
        }
    }
    PathBuf::from(path)
}
