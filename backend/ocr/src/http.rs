//! OCR over HTTP.
//!
//! Posts the page as a base64 PNG to an OCR server (EasyOCR/PaddleOCR style
//! wrappers) and parses the detections it returns.

use std::io::Cursor;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use image::{DynamicImage, ImageFormat};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info};

use broadsheet_core::{
    retry_external, with_timeout, BroadsheetError, OcrEngine, Result, RetryPolicy, TextFragment,
};
use broadsheet_logging::redact_sensitive_data;

use crate::wire::parse_detections;

const SERVICE: &str = "ocr";

pub struct HttpOcrEngine {
    client: Client,
    endpoint: String,
    language: String,
    api_key: Option<String>,
    timeout: Duration,
    retry: RetryPolicy,
}

#[derive(Debug, Serialize)]
struct OcrRequest<'a> {
    image: String,
    language: &'a str,
}

impl HttpOcrEngine {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            language: "en".to_string(),
            api_key: None,
            timeout: Duration::from_secs(60),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn post(&self, body: &OcrRequest<'_>) -> Result<String> {
        let mut request = self.client.post(&self.endpoint).json(body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let response = request.send().await.map_err(|e| {
            BroadsheetError::external(SERVICE, redact_sensitive_data(&e.to_string()))
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| BroadsheetError::external(SERVICE, e))?;
        if !status.is_success() {
            return Err(BroadsheetError::external(
                SERVICE,
                format!("HTTP {}: {}", status, redact_sensitive_data(&text)),
            ));
        }
        Ok(text)
    }
}

fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(|e| BroadsheetError::Other(anyhow::anyhow!("failed to encode page as PNG: {e}")))?;
    Ok(buf)
}

#[async_trait]
impl OcrEngine for HttpOcrEngine {
    fn name(&self) -> &str {
        SERVICE
    }

    async fn detect(&self, image: &DynamicImage) -> Result<Vec<TextFragment>> {
        let png = encode_png(image)?;
        let body = OcrRequest {
            image: STANDARD.encode(&png),
            language: &self.language,
        };

        info!(
            endpoint = %redact_sensitive_data(&self.endpoint),
            width = image.width(),
            height = image.height(),
            "Running OCR"
        );
        let start = Instant::now();

        let raw = retry_external(&self.retry, SERVICE, || {
            with_timeout(self.timeout, SERVICE, self.post(&body))
        })
        .await?;
        let fragments = parse_detections(SERVICE, &raw)?;

        debug!(
            count = fragments.len(),
            latency_ms = start.elapsed().as_millis() as u64,
            "OCR finished"
        );
        Ok(fragments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_png_signature() {
        let png = encode_png(&DynamicImage::new_rgb8(4, 3)).unwrap();
        assert_eq!(&png[..4], b"\x89PNG");
    }

    #[tokio::test]
    async fn unreachable_server_is_an_external_error() {
        let engine = HttpOcrEngine::new("http://127.0.0.1:9/ocr")
            .with_timeout(Duration::from_secs(5))
            .with_retry(RetryPolicy::none());
        let err = engine.detect(&DynamicImage::new_rgb8(2, 2)).await.unwrap_err();
        assert!(matches!(err, BroadsheetError::ExternalService { .. }), "{err}");
    }
}
