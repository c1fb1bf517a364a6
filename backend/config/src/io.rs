//! Config file discovery, reading and writing.

use crate::schema::BroadsheetConfig;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "broadsheet.yaml";

/// Env var naming an explicit config file.
pub const CONFIG_ENV: &str = "BROADSHEET_CONFIG";

/// Resolve which config file to read.
/// Priority: explicit path > `BROADSHEET_CONFIG` > `./broadsheet.yaml` >
/// `<user config dir>/broadsheet/config.yaml`.
pub fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.exists() {
        return local;
    }
    dirs::config_dir()
        .map(|dir| dir.join("broadsheet").join("config.yaml"))
        .unwrap_or(local)
}

/// Read a config file as a JSON value tree, before env substitution.
///
/// Returns an empty object if the file doesn't exist (first run).
pub async fn load_raw(path: &Path) -> Result<Value> {
    if !path.exists() {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(Value::Object(Default::default()));
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let value: Value = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded config");
    // An empty YAML file parses as null.
    Ok(if value.is_null() {
        Value::Object(Default::default())
    } else {
        value
    })
}

/// Write config to disk atomically (write to temp file, rename).
pub async fn write_config(config: &BroadsheetConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.with_context(|| {
            format!("Failed to create config directory: {}", parent.display())
        })?;
    }

    let yaml = serde_yaml::to_string(config).context("Failed to serialize config to YAML")?;

    let tmp_path = path.with_extension("yaml.tmp");
    fs::write(&tmp_path, yaml.as_bytes())
        .await
        .with_context(|| format!("Failed to write temp config: {}", tmp_path.display()))?;

    fs::rename(&tmp_path, path)
        .await
        .with_context(|| format!("Failed to rename temp config to: {}", path.display()))?;

    info!(path = %path.display(), "Wrote config");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_is_empty_object() {
        let value = load_raw(Path::new("/definitely/missing/broadsheet.yaml")).await.unwrap();
        assert_eq!(value, Value::Object(Default::default()));
    }

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("broadsheet.yaml");
        let mut config = BroadsheetConfig::default();
        config.localizer.vertical_gap = 64;

        write_config(&config, &path).await.unwrap();
        let value = load_raw(&path).await.unwrap();
        let reread: BroadsheetConfig = serde_json::from_value(value).unwrap();
        assert_eq!(reread, config);
    }

    #[tokio::test]
    async fn invalid_yaml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broadsheet.yaml");
        std::fs::write(&path, "localizer: [unclosed").unwrap();
        assert!(load_raw(&path).await.is_err());
    }

    #[test]
    fn explicit_path_wins() {
        let path = resolve_config_path(Some(Path::new("/etc/broadsheet.yaml")));
        assert_eq!(path, PathBuf::from("/etc/broadsheet.yaml"));
    }
}
