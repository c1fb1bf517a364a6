//! Environment handling for config values.
//!
//! `${VAR_NAME}` in any string value is replaced at load time; only uppercase
//! `[A-Z_][A-Z0-9_]*` names are matched and `$${VAR}` escapes to a literal
//! `${VAR}`. A handful of well-known variables also override file values.

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::schema::BroadsheetConfig;

/// `${VAR}` with an optional leading `$` marking an escape.
static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$?\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const GEMINI_MODEL: &str = "BROADSHEET_MODEL";
pub const OCR_URL: &str = "BROADSHEET_OCR_URL";
pub const OCR_FIXTURE: &str = "BROADSHEET_OCR_FIXTURE";
pub const LOG_LEVEL: &str = "RUST_LOG";

/// Error returned for missing env vars.
#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Substitute `${VAR}` references using the process environment.
pub fn resolve_env_vars(value: &Value) -> Result<Value> {
    resolve_env_vars_with(value, &std::env::vars().collect())
}

/// Substitute env vars using a provided map (useful for testing).
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    substitute_value(value, env, "")
}

fn substitute_value(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(substitute_string(s, env, path)?)),
        Value::Array(arr) => arr
            .iter()
            .enumerate()
            .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                let child_path = if path.is_empty() {
                    k.clone()
                } else {
                    format!("{path}.{k}")
                };
                result.insert(k.clone(), substitute_value(v, env, &child_path)?);
            }
            Ok(Value::Object(result))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_string(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String> {
    if !s.contains('$') {
        return Ok(s.to_string());
    }

    let mut missing: Option<MissingEnvVarError> = None;
    let substituted = ENV_VAR_PATTERN.replace_all(s, |caps: &Captures| {
        let var_name = &caps[1];
        if caps[0].starts_with("$$") {
            return format!("${{{var_name}}}");
        }
        match env.get(var_name) {
            Some(val) if !val.is_empty() => val.clone(),
            _ => {
                missing.get_or_insert_with(|| MissingEnvVarError {
                    var_name: var_name.to_string(),
                    config_path: path.to_string(),
                });
                String::new()
            }
        }
    });

    if let Some(err) = missing {
        bail!(err);
    }
    Ok(substituted.into_owned())
}

/// Apply well-known environment variables on top of file values.
pub fn apply_env_overrides(mut config: BroadsheetConfig, env: &HashMap<String, String>) -> BroadsheetConfig {
    let get = |key: &str| env.get(key).filter(|v| !v.trim().is_empty()).cloned();

    if let Some(key) = get(GEMINI_API_KEY) {
        config.gemini.api_key = Some(key);
    }
    if let Some(model) = get(GEMINI_MODEL) {
        config.gemini.model = model;
    }
    if let Some(url) = get(OCR_URL) {
        config.ocr.endpoint = Some(url);
    }
    if let Some(fixture) = get(OCR_FIXTURE) {
        config.ocr.fixture = Some(PathBuf::from(fixture));
    }
    if let Some(level) = get(LOG_LEVEL) {
        config.logging.level = level;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn substitutes_nested_vars() {
        let v = json!({"gemini": {"apiKey": "${MY_GEMINI_KEY}"}, "ocr": {"endpoint": "http://${HOST}:8866/ocr"}});
        let env = env(&[("MY_GEMINI_KEY", "abc123"), ("HOST", "ocr.local")]);
        let result = resolve_env_vars_with(&v, &env).unwrap();
        assert_eq!(result["gemini"]["apiKey"], "abc123");
        assert_eq!(result["ocr"]["endpoint"], "http://ocr.local:8866/ocr");
    }

    #[test]
    fn error_on_missing_var_names_path() {
        let v = json!({"gemini": {"apiKey": "${MISSING_VAR}"}});
        let err = resolve_env_vars_with(&v, &HashMap::new()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("MISSING_VAR"));
        assert!(message.contains("gemini.apiKey"));
    }

    #[test]
    fn escaped_reference_stays_literal() {
        let v = json!({"note": "use $${LITERAL} here"});
        let result = resolve_env_vars_with(&v, &HashMap::new()).unwrap();
        assert_eq!(result["note"], "use ${LITERAL} here");
    }

    #[test]
    fn passthrough_non_var_strings() {
        let v = json!({"key": "plain-string", "n": 3});
        let result = resolve_env_vars_with(&v, &HashMap::new()).unwrap();
        assert_eq!(result, v);
    }

    #[test]
    fn overrides_replace_file_values() {
        let config = apply_env_overrides(
            BroadsheetConfig::default(),
            &env(&[
                (GEMINI_API_KEY, "k-1"),
                (OCR_URL, "http://localhost:8866/ocr"),
                (GEMINI_MODEL, "  "),
            ]),
        );
        assert_eq!(config.gemini.api_key.as_deref(), Some("k-1"));
        assert_eq!(config.ocr.endpoint.as_deref(), Some("http://localhost:8866/ocr"));
        // Blank values are ignored.
        assert_eq!(config.gemini.model, "gemini-2.5-flash");
    }
}
