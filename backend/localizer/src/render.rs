//! Drawing regions onto the page and writing the annotated copy.

use std::path::{Path, PathBuf};

use image::{DynamicImage, Rgba};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use tracing::info;

use broadsheet_core::{BroadsheetError, NewsField, Region, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub color: [u8; 3],
    /// Outline width in pixels, drawn inward from the region edge.
    pub thickness: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::for_field(NewsField::Headline)
    }
}

impl RenderOptions {
    pub fn for_field(field: NewsField) -> Self {
        Self {
            color: field.color(),
            thickness: 2,
        }
    }
}

/// `dir/page.jpg` -> `dir/page<suffix>.jpg`.
pub fn annotated_path(source: &Path, suffix: &str) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match source.extension() {
        Some(ext) => format!("{stem}{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}{suffix}"),
    };
    source.with_file_name(name)
}

/// Draw each region's outline. Pixels outside the regions are never touched,
/// and the image keeps its pixel format.
pub fn draw_regions(image: &mut DynamicImage, regions: &[Region], options: &RenderOptions) {
    let [r, g, b] = options.color;
    let color = Rgba([r, g, b, 255]);
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return;
    }
    let thickness = options.thickness.clamp(1, width.max(height));

    for region in regions {
        let Some((left, top, right, bottom)) = visible_bounds(region, width, height, thickness) else {
            continue;
        };
        for t in 0..i64::from(thickness) {
            // Region corners are inclusive.
            let inner_w = right - left + 1 - 2 * t;
            let inner_h = bottom - top + 1 - 2 * t;
            if inner_w <= 0 || inner_h <= 0 {
                break;
            }
            let rect = Rect::at((left + t) as i32, (top + t) as i32).of_size(inner_w as u32, inner_h as u32);
            draw_hollow_rect_mut(image, rect, color);
        }
    }
}

/// Clamp a region to just past the image edges so edges that lie outside the
/// image stay outside, and the arithmetic stays small.
fn visible_bounds(region: &Region, width: u32, height: u32, thickness: u32) -> Option<(i64, i64, i64, i64)> {
    let margin = i64::from(thickness) + 1;
    let left = i64::from(region.left).max(-margin);
    let top = i64::from(region.top).max(-margin);
    let right = i64::from(region.right).min(i64::from(width) + margin);
    let bottom = i64::from(region.bottom).min(i64::from(height) + margin);
    (left <= right && top <= bottom).then_some((left, top, right, bottom))
}

/// Copy of `source` with the regions drawn on it, in the source's pixel format.
pub fn render_annotated(source: &DynamicImage, regions: &[Region], options: &RenderOptions) -> DynamicImage {
    let mut canvas = source.clone();
    draw_regions(&mut canvas, regions, options);
    canvas
}

/// Write the annotated image; the format follows the path's extension.
pub fn save_annotated(image: &DynamicImage, path: &Path) -> Result<()> {
    image
        .save(path)
        .map_err(|e| BroadsheetError::file_access(path, e))?;
    info!(path = %path.display(), "Wrote annotated image");
    Ok(())
}
