//! Field extraction: asks a generative model to read a newspaper page into the
//! six structured news fields.

pub mod gemini;
pub mod mime_detect;
pub mod mock;
pub mod schema;

pub use gemini::{GeminiExtractor, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};
pub use mime_detect::{detect_image_mime, mime_from_path, sniff_image_mime};
pub use mock::MockExtractor;
pub use schema::{extraction_prompt, extraction_schema, SYSTEM_INSTRUCTION};
