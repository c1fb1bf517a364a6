//! Broadsheet configuration schema.
//!
//! Every section and field has a default, so an empty or partial YAML file is
//! a valid configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use broadsheet_core::RetryPolicy;
use broadsheet_localizer::{GapTolerance, MatchSettings, MergeStrategy};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BroadsheetConfig {
    /// Generative field extraction
    pub gemini: GeminiConfig,
    /// OCR backend
    pub ocr: OcrConfig,
    /// Headline matching, merging and drawing
    pub localizer: LocalizerConfig,
    /// Retry policy shared by both external services
    pub retry: RetryPolicy,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// Gemini
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeminiConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout_secs: 120,
        }
    }
}

// ---------------------------------------------------------------------------
// OCR
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OcrConfig {
    /// HTTP OCR server URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Bearer token for the OCR server, if it needs one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub language: String,
    pub timeout_secs: u64,
    /// Recorded detections to replay instead of calling a server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixture: Option<PathBuf>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            language: "en".to_string(),
            timeout_secs: 60,
            fixture: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Localizer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocalizerConfig {
    pub match_threshold: u8,
    pub min_tokens: usize,
    pub horizontal_gap: i32,
    pub vertical_gap: i32,
    pub merge_strategy: MergeStrategy,
    pub line_thickness: u32,
    /// Inserted before the extension of the annotated output file.
    pub output_suffix: String,
}

impl Default for LocalizerConfig {
    fn default() -> Self {
        let settings = MatchSettings::default();
        Self {
            match_threshold: settings.match_threshold,
            min_tokens: settings.min_tokens,
            horizontal_gap: settings.gap.horizontal,
            vertical_gap: settings.gap.vertical,
            merge_strategy: settings.strategy,
            line_thickness: 2,
            output_suffix: "_result".to_string(),
        }
    }
}

impl LocalizerConfig {
    pub fn match_settings(&self) -> MatchSettings {
        MatchSettings {
            match_threshold: self.match_threshold,
            min_tokens: self.min_tokens,
            gap: GapTolerance {
                horizontal: self.horizontal_gap,
                vertical: self.vertical_gap,
            },
            strategy: self.merge_strategy,
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingConfig {
    pub level: String,
    /// Directory for rolling JSON log files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: None,
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let yaml = "localizer:\n  verticalGap: 80\n  mergeStrategy: first_match\n";
        let config: BroadsheetConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.localizer.vertical_gap, 80);
        assert_eq!(config.localizer.horizontal_gap, 20);
        assert_eq!(config.localizer.merge_strategy, MergeStrategy::FirstMatch);
        assert_eq!(config.gemini.model, "gemini-2.5-flash");
        assert_eq!(config.retry.max_attempts, 3);
    }

    #[test]
    fn localizer_defaults_match_the_algorithm_defaults() {
        let settings = LocalizerConfig::default().match_settings();
        assert_eq!(settings, MatchSettings::default());
    }

    #[test]
    fn empty_document_is_default() {
        let config: BroadsheetConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, BroadsheetConfig::default());
    }
}
