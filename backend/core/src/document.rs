//! Structured newspaper fields returned by the extraction model.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{BroadsheetError, Result};

/// The six fields the extractor is asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NewsField {
    Headline,
    SubHeadline,
    Byline,
    Body,
    Quotes,
    Factboxes,
}

impl NewsField {
    pub const ALL: [NewsField; 6] = [
        NewsField::Headline,
        NewsField::SubHeadline,
        NewsField::Byline,
        NewsField::Body,
        NewsField::Quotes,
        NewsField::Factboxes,
    ];

    /// JSON key used in the schema and in the model's response.
    pub fn key(self) -> &'static str {
        match self {
            NewsField::Headline => "headline",
            NewsField::SubHeadline => "subHeadline",
            NewsField::Byline => "byline",
            NewsField::Body => "body",
            NewsField::Quotes => "quotes",
            NewsField::Factboxes => "factboxes",
        }
    }

    /// Outline colour (RGB) used when the field is drawn onto the page.
    pub fn color(self) -> [u8; 3] {
        match self {
            NewsField::Headline => [0, 200, 0],
            NewsField::SubHeadline => [0, 120, 255],
            NewsField::Byline => [255, 140, 0],
            NewsField::Body => [160, 160, 160],
            NewsField::Quotes => [200, 0, 200],
            NewsField::Factboxes => [220, 30, 30],
        }
    }
}

impl std::fmt::Display for NewsField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Parsed extraction result. Absent fields are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedDocument {
    #[serde(default, deserialize_with = "string_or_seq")]
    pub headline: Vec<String>,
    #[serde(default, deserialize_with = "string_or_seq")]
    pub sub_headline: Vec<String>,
    #[serde(default, deserialize_with = "string_or_seq")]
    pub byline: Vec<String>,
    #[serde(default, deserialize_with = "string_or_seq")]
    pub body: Vec<String>,
    #[serde(default, deserialize_with = "string_or_seq")]
    pub quotes: Vec<String>,
    #[serde(default, deserialize_with = "string_or_seq")]
    pub factboxes: Vec<String>,
}

impl ExtractedDocument {
    /// Parse the model's raw text. Anything other than a JSON object is rejected.
    pub fn from_json(service: &str, raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw.trim())
            .map_err(|e| BroadsheetError::malformed(service, format!("invalid JSON: {e}")))?;
        if !value.is_object() {
            return Err(BroadsheetError::malformed(
                service,
                format!("expected a JSON object, got {}", json_kind(&value)),
            ));
        }
        serde_json::from_value(value)
            .map_err(|e| BroadsheetError::malformed(service, format!("unexpected field shape: {e}")))
    }

    pub fn field(&self, field: NewsField) -> &[String] {
        match field {
            NewsField::Headline => &self.headline,
            NewsField::SubHeadline => &self.sub_headline,
            NewsField::Byline => &self.byline,
            NewsField::Body => &self.body,
            NewsField::Quotes => &self.quotes,
            NewsField::Factboxes => &self.factboxes,
        }
    }

    /// Headline lines joined with single spaces, in extraction order.
    pub fn headline_text(&self) -> String {
        self.headline.join(" ")
    }

    pub fn is_empty(&self) -> bool {
        NewsField::ALL.iter().all(|f| self.field(*f).is_empty())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<Option<String>>),
}

/// Accept `"text"`, `["a", "b"]` or `null` for any field.
fn string_or_seq<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(s)) if s.trim().is_empty() => Vec::new(),
        Some(OneOrMany::One(s)) => vec![s],
        Some(OneOrMany::Many(items)) => items.into_iter().flatten().collect(),
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
