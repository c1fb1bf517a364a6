//! Config validation with user-friendly error messages.

use crate::schema::BroadsheetConfig;
use thiserror::Error;

/// A config validation problem with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// All errors and warnings found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

pub fn validate(config: &BroadsheetConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_gemini(config, &mut report);
    validate_ocr(config, &mut report);
    validate_localizer(config, &mut report);
    validate_retry(config, &mut report);
    report
}

fn validate_gemini(config: &BroadsheetConfig, report: &mut ValidationReport) {
    let gemini = &config.gemini;
    if gemini.api_key.as_deref().map(str::is_empty).unwrap_or(true) {
        report.warn("gemini.apiKey", "No API key configured; field extraction will fail");
    }
    if gemini.model.trim().is_empty() {
        report.error("gemini.model", "Model name cannot be empty");
    }
    if !gemini.base_url.starts_with("http://") && !gemini.base_url.starts_with("https://") {
        report.error("gemini.baseUrl", format!("'{}' is not an http(s) URL", gemini.base_url));
    }
    if gemini.timeout_secs == 0 {
        report.error("gemini.timeoutSecs", "timeoutSecs must be > 0");
    }
}

fn validate_ocr(config: &BroadsheetConfig, report: &mut ValidationReport) {
    let ocr = &config.ocr;
    match (&ocr.endpoint, &ocr.fixture) {
        (None, None) => report.warn(
            "ocr",
            "Neither endpoint nor fixture is set; headline localization will fail",
        ),
        (Some(_), Some(_)) => report.warn("ocr", "Both endpoint and fixture are set; fixture wins"),
        _ => {}
    }
    if let Some(endpoint) = &ocr.endpoint {
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            report.error("ocr.endpoint", format!("'{endpoint}' is not an http(s) URL"));
        }
    }
    if ocr.timeout_secs == 0 {
        report.error("ocr.timeoutSecs", "timeoutSecs must be > 0");
    }
}

fn validate_localizer(config: &BroadsheetConfig, report: &mut ValidationReport) {
    let loc = &config.localizer;
    if loc.match_threshold > 100 {
        report.error(
            "localizer.matchThreshold",
            format!("{} is outside the 0-100 score range", loc.match_threshold),
        );
    } else if loc.match_threshold == 100 {
        report.warn("localizer.matchThreshold", "A threshold of 100 rejects every fragment");
    }
    if loc.min_tokens == 0 {
        report.warn("localizer.minTokens", "minTokens 0 disables the single-word filter");
    }
    if loc.horizontal_gap < 0 || loc.vertical_gap < 0 {
        report.error("localizer", "Gap tolerances must be >= 0");
    }
    if loc.line_thickness == 0 {
        report.error("localizer.lineThickness", "lineThickness must be >= 1");
    }
    if loc.output_suffix.is_empty() {
        report.error("localizer.outputSuffix", "An empty suffix would overwrite the source image");
    }
}

fn validate_retry(config: &BroadsheetConfig, report: &mut ValidationReport) {
    let retry = &config.retry;
    if retry.max_attempts == 0 {
        report.error("retry.maxAttempts", "maxAttempts must be >= 1");
    }
    if retry.backoff_factor < 1.0 {
        report.warn("retry.backoffFactor", "A factor below 1 shrinks delays between attempts");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> BroadsheetConfig {
        let mut config = BroadsheetConfig::default();
        config.gemini.api_key = Some("key".into());
        config.ocr.endpoint = Some("http://localhost:8866/ocr".into());
        config
    }

    #[test]
    fn configured_defaults_are_clean() {
        let report = validate(&configured());
        assert!(report.is_valid());
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    }

    #[test]
    fn missing_services_only_warn() {
        let report = validate(&BroadsheetConfig::default());
        assert!(report.is_valid());
        let paths: Vec<_> = report.warnings.iter().map(|w| w.path.as_str()).collect();
        assert!(paths.contains(&"gemini.apiKey"));
        assert!(paths.contains(&"ocr"));
    }

    #[test]
    fn rejects_bad_localizer_values() {
        let mut config = configured();
        config.localizer.match_threshold = 140;
        config.localizer.line_thickness = 0;
        config.localizer.output_suffix.clear();
        let report = validate(&config);
        assert_eq!(report.errors.len(), 3);
    }

    #[test]
    fn rejects_zero_timeouts_and_attempts() {
        let mut config = configured();
        config.gemini.timeout_secs = 0;
        config.ocr.timeout_secs = 0;
        config.retry.max_attempts = 0;
        let report = validate(&config);
        assert!(!report.is_valid());
        assert_eq!(report.errors.len(), 3);
    }
}
