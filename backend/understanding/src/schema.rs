//! The extraction schema and the prompt that embeds it.

use broadsheet_core::NewsField;
use serde_json::{json, Map, Value};

pub const SYSTEM_INSTRUCTION: &str =
    "You are a helpful assistant that extracts newspaper fields from images.";

/// JSON Schema for the six-field object; every field is an array of strings.
pub fn extraction_schema() -> Value {
    let mut properties = Map::new();
    for field in NewsField::ALL {
        properties.insert(
            field.key().to_string(),
            json!({ "type": "array", "items": { "type": "string" } }),
        );
    }
    json!({
        "type": "object",
        "properties": properties,
    })
}

/// User prompt sent alongside the image.
pub fn extraction_prompt() -> String {
    let names: Vec<&str> = NewsField::ALL.iter().map(|f| f.key()).collect();
    let schema = serde_json::to_string_pretty(&extraction_schema())
        .unwrap_or_else(|_| extraction_schema().to_string());
    format!(
        "This is a newspaper image. \
         Extract any of the following fields if available: {}. \
         Return the result strictly matching this JSON schema:\n\n{}",
        names.join(", "),
        schema
    )
}
