//! `broadsheet-config`: runtime configuration.
//!
//! Provides:
//! - Typed config schema with defaults for every field
//! - YAML read/write and config file discovery
//! - `${ENV_VAR}` substitution and well-known env overrides
//! - Redaction for safe display
//! - Validation reports

pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod validation;

pub use env::{apply_env_overrides, resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{load_raw, resolve_config_path, write_config};
pub use redact::redact;
pub use schema::{BroadsheetConfig, GeminiConfig, LocalizerConfig, LoggingConfig, OcrConfig};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::path::Path;

/// Load a config file, substitute env vars, apply env overrides and validate.
///
/// Warnings are logged; any validation error fails the load.
pub async fn load_and_prepare(path: &Path) -> Result<BroadsheetConfig> {
    let env: HashMap<String, String> = std::env::vars().collect();
    load_and_prepare_with(path, &env).await
}

/// Like [`load_and_prepare`] with an explicit environment.
pub async fn load_and_prepare_with(
    path: &Path,
    env: &HashMap<String, String>,
) -> Result<BroadsheetConfig> {
    let config = load_with(path, env).await?;
    check(&config)?;
    Ok(config)
}

/// Load and resolve a config without validating it.
///
/// Lets a caller install logging from the config before [`check`] reports.
pub async fn load_with(path: &Path, env: &HashMap<String, String>) -> Result<BroadsheetConfig> {
    let raw = load_raw(path).await?;
    let value = resolve_env_vars_with(&raw, env).context("Failed to resolve env vars in config")?;
    let config: BroadsheetConfig = serde_json::from_value(value)
        .with_context(|| format!("Invalid config at {}", path.display()))?;
    Ok(apply_env_overrides(config, env))
}

/// Validate, log every finding, and fail if there are errors.
pub fn check(config: &BroadsheetConfig) -> Result<()> {
    let report = validate(config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    if let Some(first) = report.errors.first() {
        for error in &report.errors {
            tracing::error!(path = %error.path, message = %error.message, "Config error");
        }
        bail!("{} config error(s), first: {first}", report.errors.len());
    }
    Ok(())
}
