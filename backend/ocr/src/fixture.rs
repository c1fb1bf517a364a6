//! Offline OCR engines: replay detections from a JSON file or from memory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use image::DynamicImage;
use tracing::debug;

use broadsheet_core::{BroadsheetError, OcrEngine, Result, TextFragment};

use crate::wire::parse_detections;

/// Reads detections recorded in the OCR wire format from disk on every call.
pub struct FixtureOcrEngine {
    path: PathBuf,
}

impl FixtureOcrEngine {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl OcrEngine for FixtureOcrEngine {
    fn name(&self) -> &str {
        "fixture"
    }

    async fn detect(&self, _image: &DynamicImage) -> Result<Vec<TextFragment>> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| BroadsheetError::file_access(&self.path, e))?;
        let fragments = parse_detections("fixture", &raw)?;
        debug!(path = %self.path.display(), count = fragments.len(), "Loaded OCR fixture");
        Ok(fragments)
    }
}

/// Returns the same in-memory fragments for every image.
#[derive(Debug, Clone, Default)]
pub struct StaticOcrEngine {
    fragments: Vec<TextFragment>,
}

impl StaticOcrEngine {
    pub fn new(fragments: Vec<TextFragment>) -> Self {
        Self { fragments }
    }
}

#[async_trait]
impl OcrEngine for StaticOcrEngine {
    fn name(&self) -> &str {
        "static"
    }

    async fn detect(&self, _image: &DynamicImage) -> Result<Vec<TextFragment>> {
        Ok(self.fragments.clone())
    }
}
