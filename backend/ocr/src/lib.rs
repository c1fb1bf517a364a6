//! OCR backends.
//!
//! Every backend yields [`TextFragment`]s in engine order. The wire format is
//! the EasyOCR `readtext` shape: a list of `[quad, text, confidence]` triples,
//! optionally wrapped as `{"results": [...]}`.
//!
//! [`TextFragment`]: broadsheet_core::TextFragment

pub mod fixture;
pub mod http;
pub mod wire;

pub use fixture::{FixtureOcrEngine, StaticOcrEngine};
pub use http::HttpOcrEngine;
pub use wire::parse_detections;
