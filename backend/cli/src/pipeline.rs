//! End-to-end page processing: extract fields, localize the headline, render.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use image::DynamicImage;
use serde::Serialize;
use tracing::info;

use broadsheet_config::BroadsheetConfig;
use broadsheet_core::{BroadsheetError, ExtractedDocument, FieldExtractor, OcrEngine, Result};
use broadsheet_localizer::{
    annotated_path, render_annotated, save_annotated, HeadlineLocalizer, Localization,
    RenderOptions,
};
use broadsheet_ocr::{FixtureOcrEngine, HttpOcrEngine};
use broadsheet_understanding::GeminiExtractor;

/// Build the Gemini extractor. Fails if no API key is configured.
pub fn build_extractor(config: &BroadsheetConfig) -> Result<Arc<dyn FieldExtractor>> {
    let gemini = &config.gemini;
    let api_key = gemini
        .api_key
        .as_deref()
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| {
            BroadsheetError::ConfigError(
                "no Gemini API key; set GEMINI_API_KEY or gemini.apiKey".to_string(),
            )
        })?;

    Ok(Arc::new(
        GeminiExtractor::new(api_key)
            .with_model(gemini.model.clone())
            .with_base_url(gemini.base_url.clone())
            .with_timeout(Duration::from_secs(gemini.timeout_secs))
            .with_retry(config.retry.clone()),
    ))
}

/// Build the OCR engine. A fixture file takes precedence over an endpoint.
pub fn build_ocr(config: &BroadsheetConfig) -> Result<Arc<dyn OcrEngine>> {
    let ocr = &config.ocr;
    if let Some(fixture) = &ocr.fixture {
        return Ok(Arc::new(FixtureOcrEngine::new(fixture.clone())));
    }
    let endpoint = ocr.endpoint.as_deref().ok_or_else(|| {
        BroadsheetError::ConfigError(
            "no OCR source; set BROADSHEET_OCR_URL, ocr.endpoint or ocr.fixture".to_string(),
        )
    })?;

    let mut engine = HttpOcrEngine::new(endpoint)
        .with_language(ocr.language.clone())
        .with_timeout(Duration::from_secs(ocr.timeout_secs))
        .with_retry(config.retry.clone());
    if let Some(key) = &ocr.api_key {
        engine = engine.with_api_key(key.clone());
    }
    Ok(Arc::new(engine))
}

pub async fn read_image(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .map_err(|e| BroadsheetError::file_access(path, e))
}

/// Read fields previously printed by `broadsheet extract`.
pub async fn read_fields(path: &Path) -> Result<ExtractedDocument> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| BroadsheetError::file_access(path, e))?;
    ExtractedDocument::from_json(&path.display().to_string(), &raw)
}

fn decode(path: &Path, bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(bytes).map_err(|e| BroadsheetError::file_access(path, e))
}

/// Where the headline was found and where the annotated copy went.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub output: PathBuf,
    pub localization: Localization,
}

/// Localizes a headline on a page and writes the annotated copy.
pub struct Annotator {
    localizer: HeadlineLocalizer,
    render: RenderOptions,
    output_suffix: String,
}

impl Annotator {
    pub fn new(ocr: Arc<dyn OcrEngine>) -> Self {
        Self {
            localizer: HeadlineLocalizer::new(ocr),
            render: RenderOptions::default(),
            output_suffix: "_result".to_string(),
        }
    }

    pub fn from_config(config: &BroadsheetConfig) -> Result<Self> {
        let localizer = &config.localizer;
        let mut annotator = Self::new(build_ocr(config)?);
        annotator.localizer = annotator
            .localizer
            .with_settings(localizer.match_settings());
        annotator.render.thickness = localizer.line_thickness;
        annotator.output_suffix = localizer.output_suffix.clone();
        Ok(annotator)
    }

    pub fn with_output_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.output_suffix = suffix.into();
        self
    }

    pub async fn annotate(&self, path: &Path, bytes: &[u8], headline: &[String]) -> Result<Annotation> {
        let image = decode(path, bytes)?;
        let localization = self.localizer.localize_detailed(headline, &image).await?;

        let output = annotated_path(path, &self.output_suffix);
        let annotated = render_annotated(&image, &localization.regions, &self.render);
        save_annotated(&annotated, &output)?;

        Ok(Annotation {
            output,
            localization,
        })
    }

    pub async fn annotate_file(&self, path: &Path, headline: &[String]) -> Result<Annotation> {
        let bytes = read_image(path).await?;
        self.annotate(path, &bytes, headline).await
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub document: ExtractedDocument,
    pub annotation: Annotation,
}

/// Full run over one page: fields first, then the headline drawing.
pub struct Pipeline {
    extractor: Arc<dyn FieldExtractor>,
    annotator: Annotator,
}

impl Pipeline {
    pub fn new(extractor: Arc<dyn FieldExtractor>, annotator: Annotator) -> Self {
        Self {
            extractor,
            annotator,
        }
    }

    pub fn from_config(config: &BroadsheetConfig) -> Result<Self> {
        Ok(Self::new(build_extractor(config)?, Annotator::from_config(config)?))
    }

    pub async fn run(&self, path: &Path) -> Result<RunReport> {
        let bytes = read_image(path).await?;

        info!(image = %path.display(), extractor = self.extractor.name(), "Extracting fields");
        let document = self.extractor.extract(&bytes).await?;
        if document.headline.is_empty() {
            info!("No headline extracted");
        }

        let annotation = self
            .annotator
            .annotate(path, &bytes, &document.headline)
            .await?;
        info!(
            output = %annotation.output.display(),
            regions = annotation.localization.regions.len(),
            "Page processed"
        );

        Ok(RunReport {
            document,
            annotation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use broadsheet_core::{NewsField, Region, TextFragment};
    use broadsheet_ocr::StaticOcrEngine;
    use broadsheet_understanding::MockExtractor;
    use image::{Rgb, RgbImage};

    fn write_page(dir: &Path) -> PathBuf {
        let path = dir.join("page.png");
        RgbImage::from_fn(300, 120, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 40]))
            .save(&path)
            .unwrap();
        path
    }

    fn storm_ocr() -> Arc<dyn OcrEngine> {
        Arc::new(StaticOcrEngine::new(vec![
            TextFragment::from_rect(10.0, 20.0, 100.0, 60.0, "Storm Hits"),
            TextFragment::from_rect(110.0, 20.0, 200.0, 60.0, "Region Hard"),
            TextFragment::from_rect(250.0, 100.0, 280.0, 115.0, "the"),
        ]))
    }

    fn storm_document() -> ExtractedDocument {
        ExtractedDocument {
            headline: vec!["Storm Hits Region Hard".to_string()],
            byline: vec!["By A. Reporter".to_string()],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn run_extracts_localizes_and_writes_sibling_image() {
        let dir = tempfile::tempdir().unwrap();
        let page = write_page(dir.path());
        let extractor = Arc::new(MockExtractor::with_document(storm_document()));
        let pipeline = Pipeline::new(extractor.clone(), Annotator::new(storm_ocr()));

        let report = pipeline.run(&page).await.unwrap();

        assert_eq!(extractor.calls(), 1);
        assert_eq!(report.document, storm_document());
        assert_eq!(report.annotation.output, dir.path().join("page_result.png"));
        assert_eq!(
            report.annotation.localization.regions,
            vec![Region::new(10, 20, 200, 60)]
        );

        let written = image::open(&report.annotation.output).unwrap().to_rgb8();
        assert_eq!(*written.get_pixel(10, 20), Rgb(NewsField::Headline.color()));
        assert_eq!(*written.get_pixel(150, 100), Rgb([150, 100, 40]));
    }

    #[tokio::test]
    async fn extraction_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let page = write_page(dir.path());
        let pipeline = Pipeline::new(
            Arc::new(MockExtractor::failing("quota exceeded")),
            Annotator::new(storm_ocr()),
        );

        let err = pipeline.run(&page).await.unwrap_err();
        assert!(matches!(err, BroadsheetError::ExternalService { .. }));
        assert!(!dir.path().join("page_result.png").exists());
    }

    #[tokio::test]
    async fn malformed_model_output_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let page = write_page(dir.path());
        let pipeline = Pipeline::new(
            Arc::new(MockExtractor::with_raw_response("not json")),
            Annotator::new(storm_ocr()),
        );

        let err = pipeline.run(&page).await.unwrap_err();
        assert!(matches!(err, BroadsheetError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn missing_headline_leaves_image_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let page = write_page(dir.path());
        let pipeline = Pipeline::new(
            Arc::new(MockExtractor::with_raw_response(r#"{"body": ["text"]}"#)),
            Annotator::new(storm_ocr()),
        );

        let report = pipeline.run(&page).await.unwrap();
        assert!(report.annotation.localization.regions.is_empty());
        let original = image::open(&page).unwrap().to_rgb8();
        let written = image::open(&report.annotation.output).unwrap().to_rgb8();
        assert_eq!(written, original);
    }

    #[tokio::test]
    async fn missing_image_is_a_file_access_error() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(
            Arc::new(MockExtractor::with_document(storm_document())),
            Annotator::new(storm_ocr()),
        );
        let err = pipeline.run(&dir.path().join("absent.png")).await.unwrap_err();
        assert!(matches!(err, BroadsheetError::FileAccess { .. }));
    }

    #[tokio::test]
    async fn annotator_uses_custom_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let page = write_page(dir.path());
        let annotator = Annotator::new(storm_ocr()).with_output_suffix("_headline");

        let annotation = annotator
            .annotate_file(&page, &["Storm Hits Region Hard".to_string()])
            .await
            .unwrap();
        assert_eq!(annotation.output, dir.path().join("page_headline.png"));
        assert!(annotation.output.exists());
    }

    #[tokio::test]
    async fn reads_fields_printed_by_extract() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fields.json");
        std::fs::write(&path, serde_json::to_string_pretty(&storm_document()).unwrap()).unwrap();
        assert_eq!(read_fields(&path).await.unwrap(), storm_document());
    }

    #[test]
    fn builders_require_a_configured_source() {
        let config = BroadsheetConfig::default();
        assert!(matches!(
            build_extractor(&config),
            Err(BroadsheetError::ConfigError(_))
        ));
        assert!(matches!(build_ocr(&config), Err(BroadsheetError::ConfigError(_))));

        let mut config = BroadsheetConfig::default();
        config.gemini.api_key = Some("key".to_string());
        config.ocr.fixture = Some(PathBuf::from("detections.json"));
        assert_eq!(build_extractor(&config).unwrap().name(), "gemini");
        assert_eq!(build_ocr(&config).unwrap().name(), "fixture");
    }
}
