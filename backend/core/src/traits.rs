use async_trait::async_trait;
use image::DynamicImage;

use crate::document::ExtractedDocument;
use crate::error::Result;
use crate::types::TextFragment;

/// A generative model that reads a newspaper page into structured fields.
#[async_trait]
pub trait FieldExtractor: Send + Sync {
    /// Backend name (e.g., "gemini", "mock").
    fn name(&self) -> &str;

    /// Extract the six news fields from raw image bytes.
    async fn extract(&self, image_bytes: &[u8]) -> Result<ExtractedDocument>;
}

/// An OCR backend returning text fragments in engine order.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    fn name(&self) -> &str;

    async fn detect(&self, image: &DynamicImage) -> Result<Vec<TextFragment>>;
}
