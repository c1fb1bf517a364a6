//! Headline localization.
//!
//! Matches OCR fragments against the extracted headline with a partial-ratio
//! score, merges the accepted fragment boxes into consolidated regions, and
//! draws those regions onto a copy of the page.

pub mod fuzzy;
pub mod geometry;
pub mod localizer;
pub mod remaining;
pub mod render;

pub use fuzzy::{partial_ratio, ratio};
pub use geometry::{should_merge, GapTolerance, MergeStrategy, RegionSet};
pub use localizer::{match_headline, FragmentMatch, HeadlineLocalizer, Localization, MatchSettings};
pub use remaining::RemainingHeadline;
pub use render::{annotated_path, draw_regions, render_annotated, save_annotated, RenderOptions};
