//! Matching OCR fragments against the headline and consolidating their boxes.

use std::sync::Arc;

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use broadsheet_core::{OcrEngine, Region, Result, TextFragment};

use crate::fuzzy::partial_ratio;
use crate::geometry::{GapTolerance, MergeStrategy, RegionSet};
use crate::remaining::RemainingHeadline;

/// Gates and merge parameters for headline matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MatchSettings {
    /// A fragment is accepted only when its score is strictly above this.
    pub match_threshold: u8,
    /// Minimum whitespace-separated tokens in a fragment. Single common words
    /// ("the", "a") fuzzy-match almost any headline.
    pub min_tokens: usize,
    pub gap: GapTolerance,
    pub strategy: MergeStrategy,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            match_threshold: 80,
            min_tokens: 2,
            gap: GapTolerance::default(),
            strategy: MergeStrategy::default(),
        }
    }
}

impl MatchSettings {
    pub fn accepts(&self, score: u8, token_count: usize) -> bool {
        score > self.match_threshold && token_count >= self.min_tokens
    }
}

/// One accepted fragment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FragmentMatch {
    /// Position of the fragment in OCR order.
    pub index: usize,
    pub text: String,
    pub score: u8,
    pub region: Region,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Localization {
    pub regions: Vec<Region>,
    pub matches: Vec<FragmentMatch>,
}

/// Select the fragments that belong to the headline and merge their boxes.
pub fn match_headline<S: AsRef<str>>(
    headline: &[S],
    fragments: &[TextFragment],
    settings: &MatchSettings,
) -> Localization {
    let mut remaining = RemainingHeadline::new(headline);
    let mut regions = RegionSet::new(settings.gap, settings.strategy);
    let mut matches = Vec::new();

    for (index, fragment) in fragments.iter().enumerate() {
        let score = partial_ratio(&remaining.text(), &fragment.text);
        let tokens = fragment.token_count();
        if !settings.accepts(score, tokens) {
            debug!(index, text = %fragment.text, score, tokens, "Fragment rejected");
            continue;
        }

        remaining.consume(&fragment.text);
        let region = fragment.bounding_region();
        debug!(index, text = %fragment.text, score, ?region, "Fragment accepted");
        regions.insert(region);
        matches.push(FragmentMatch {
            index,
            text: fragment.text.clone(),
            score,
            region,
        });
    }

    Localization {
        regions: regions.into_regions(),
        matches,
    }
}

/// Runs OCR over a page and locates the headline on it.
pub struct HeadlineLocalizer {
    ocr: Arc<dyn OcrEngine>,
    settings: MatchSettings,
}

impl HeadlineLocalizer {
    pub fn new(ocr: Arc<dyn OcrEngine>) -> Self {
        Self {
            ocr,
            settings: MatchSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: MatchSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &MatchSettings {
        &self.settings
    }

    pub async fn localize(&self, headline: &[String], image: &DynamicImage) -> Result<Vec<Region>> {
        Ok(self.localize_detailed(headline, image).await?.regions)
    }

    /// Like [`localize`](Self::localize), also reporting which fragments matched.
    pub async fn localize_detailed(
        &self,
        headline: &[String],
        image: &DynamicImage,
    ) -> Result<Localization> {
        let fragments = self.ocr.detect(image).await?;
        if fragments.is_empty() {
            info!(engine = self.ocr.name(), "OCR found no text; nothing to localize");
            return Ok(Localization::default());
        }
        if headline.iter().all(|line| line.trim().is_empty()) {
            info!("Headline is empty; nothing to localize");
        }

        let localization = match_headline(headline, &fragments, &self.settings);
        info!(
            fragments = fragments.len(),
            accepted = localization.matches.len(),
            regions = localization.regions.len(),
            "Headline localized"
        );
        Ok(localization)
    }
}
