use serde::{Deserialize, Serialize};

/// A point in image pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One OCR detection: quad corners in top-left, top-right, bottom-right,
/// bottom-left order, the transcribed text, and the engine's confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    pub quad: [Point; 4],
    pub text: String,
    pub confidence: f32,
}

impl TextFragment {
    pub fn new(quad: [Point; 4], text: impl Into<String>, confidence: f32) -> Self {
        Self {
            quad,
            text: text.into(),
            confidence,
        }
    }

    /// Build a fragment from an axis-aligned rectangle.
    pub fn from_rect(left: f32, top: f32, right: f32, bottom: f32, text: impl Into<String>) -> Self {
        Self::new(
            [
                Point::new(left, top),
                Point::new(right, top),
                Point::new(right, bottom),
                Point::new(left, bottom),
            ],
            text,
            1.0,
        )
    }

    pub fn top_left(&self) -> Point {
        self.quad[0]
    }

    pub fn bottom_right(&self) -> Point {
        self.quad[2]
    }

    /// Number of whitespace-separated tokens in the transcription.
    pub fn token_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// Axis-aligned box from the top-left and bottom-right corners, rounded to pixels.
    pub fn bounding_region(&self) -> Region {
        let tl = self.top_left();
        let br = self.bottom_right();
        Region::new(
            tl.x.round() as i32,
            tl.y.round() as i32,
            br.x.round() as i32,
            br.y.round() as i32,
        )
    }
}

/// Axis-aligned integer rectangle, inclusive of both corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Region {
    pub top: i32,
    pub left: i32,
    pub bottom: i32,
    pub right: i32,
}

impl Region {
    /// Corners may be given in any order; they are normalised so `left <= right`
    /// and `top <= bottom`.
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self {
            left: x1.min(x2),
            top: y1.min(y2),
            right: x1.max(x2),
            bottom: y1.max(y2),
        }
    }

    pub fn width(&self) -> u32 {
        span(self.left, self.right)
    }

    pub fn height(&self) -> u32 {
        span(self.top, self.bottom)
    }

    /// Smallest region covering both inputs.
    pub fn union(&self, other: &Region) -> Region {
        Region {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }

    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }
}

/// `high - low` without overflow; zero for an inverted span.
fn span(low: i32, high: i32) -> u32 {
    u32::try_from(i64::from(high) - i64::from(low)).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_normalizes_corners() {
        let r = Region::new(50, 40, 10, 5);
        assert_eq!((r.left, r.top, r.right, r.bottom), (10, 5, 50, 40));
        assert_eq!(r.width(), 40);
        assert_eq!(r.height(), 35);
    }

    #[test]
    fn full_range_region_has_exact_size() {
        let r = Region::new(i32::MIN, i32::MIN, i32::MAX, i32::MAX);
        assert_eq!(r.width(), u32::MAX);
        assert_eq!(r.height(), u32::MAX);
    }

    #[test]
    fn union_takes_min_top_left_and_max_bottom_right() {
        let a = Region::new(10, 20, 100, 60);
        let b = Region::new(90, 5, 180, 50);
        assert_eq!(a.union(&b), Region::new(10, 5, 180, 60));
        assert_eq!(a.union(&b), b.union(&a));
    }

    #[test]
    fn fragment_box_rounds_corners() {
        let frag = TextFragment::new(
            [
                Point::new(10.4, 20.6),
                Point::new(99.0, 21.0),
                Point::new(100.5, 59.49),
                Point::new(11.0, 58.0),
            ],
            "Storm Hits",
            0.9,
        );
        assert_eq!(frag.bounding_region(), Region::new(10, 21, 101, 59));
        assert_eq!(frag.token_count(), 2);
    }

    #[test]
    fn token_count_ignores_extra_whitespace() {
        let frag = TextFragment::from_rect(0.0, 0.0, 1.0, 1.0, "  the  ");
        assert_eq!(frag.token_count(), 1);
    }
}
