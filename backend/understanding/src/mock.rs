use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use broadsheet_core::{BroadsheetError, ExtractedDocument, FieldExtractor, Result};

enum Canned {
    Document(ExtractedDocument),
    Raw(String),
    Failure(String),
}

/// A field extractor that returns canned results.
pub struct MockExtractor {
    canned: Canned,
    calls: AtomicUsize,
}

impl MockExtractor {
    pub fn with_document(document: ExtractedDocument) -> Self {
        Self::from_canned(Canned::Document(document))
    }

    /// Parse `raw` as if it were the model's text on every call.
    pub fn with_raw_response(raw: impl Into<String>) -> Self {
        Self::from_canned(Canned::Raw(raw.into()))
    }

    /// Fail every call with an `ExternalService` error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::from_canned(Canned::Failure(message.into()))
    }

    fn from_canned(canned: Canned) -> Self {
        Self {
            canned,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FieldExtractor for MockExtractor {
    fn name(&self) -> &str {
        "mock"
    }

    async fn extract(&self, _image_bytes: &[u8]) -> Result<ExtractedDocument> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.canned {
            Canned::Document(doc) => Ok(doc.clone()),
            Canned::Raw(raw) => ExtractedDocument::from_json("mock", raw),
            Canned::Failure(message) => Err(BroadsheetError::external("mock", message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn raw_responses_go_through_the_parser() {
        let mock = MockExtractor::with_raw_response(r#"{"headline": ["A B"]}"#);
        let doc = mock.extract(b"").await.unwrap();
        assert_eq!(doc.headline_text(), "A B");
        assert_eq!(mock.calls(), 1);

        let bad = MockExtractor::with_raw_response("not json");
        assert!(matches!(
            bad.extract(b"").await,
            Err(BroadsheetError::MalformedResponse { .. })
        ));
    }

    #[tokio::test]
    async fn failing_mock_is_transient() {
        let err = MockExtractor::failing("quota").extract(b"").await.unwrap_err();
        assert!(err.is_transient());
    }
}
