use serde::Deserialize;

use broadsheet_core::{BroadsheetError, Point, Result, TextFragment};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Envelope {
    List(Vec<Detection>),
    Wrapped { results: Vec<Detection> },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Detection {
    Triple(Vec<[f32; 2]>, String, f32),
    Pair(Vec<[f32; 2]>, String),
    Object {
        #[serde(alias = "bbox", alias = "points")]
        r#box: Vec<[f32; 2]>,
        text: String,
        #[serde(default, alias = "score")]
        confidence: f32,
    },
}

/// Parse an OCR backend's JSON answer into fragments, preserving order.
pub fn parse_detections(service: &str, raw: &str) -> Result<Vec<TextFragment>> {
    let envelope: Envelope = serde_json::from_str(raw)
        .map_err(|e| BroadsheetError::malformed(service, format!("unrecognised OCR payload: {e}")))?;
    let detections = match envelope {
        Envelope::List(list) => list,
        Envelope::Wrapped { results } => results,
    };

    detections
        .into_iter()
        .enumerate()
        .map(|(i, detection)| {
            let (points, text, confidence) = match detection {
                Detection::Triple(points, text, confidence) => (points, text, confidence),
                Detection::Pair(points, text) => (points, text, 1.0),
                Detection::Object { r#box, text, confidence } => (r#box, text, confidence),
            };
            let quad = to_quad(&points).ok_or_else(|| {
                BroadsheetError::malformed(service, format!("detection {i} has no points"))
            })?;
            Ok(TextFragment::new(quad, text, confidence))
        })
        .collect()
}

/// Four points are kept in engine order; any other polygon is reduced to its
/// bounding rectangle.
fn to_quad(points: &[[f32; 2]]) -> Option<[Point; 4]> {
    if let [a, b, c, d] = points {
        return Some([
            Point::new(a[0], a[1]),
            Point::new(b[0], b[1]),
            Point::new(c[0], c[1]),
            Point::new(d[0], d[1]),
        ]);
    }
    let first = points.first()?;
    let (mut left, mut top, mut right, mut bottom) = (first[0], first[1], first[0], first[1]);
    for p in points {
        left = left.min(p[0]);
        top = top.min(p[1]);
        right = right.max(p[0]);
        bottom = bottom.max(p[1]);
    }
    Some([
        Point::new(left, top),
        Point::new(right, top),
        Point::new(right, bottom),
        Point::new(left, bottom),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use broadsheet_core::Region;

    #[test]
    fn parses_easyocr_triples() {
        let raw = r#"[
            [[[10, 20], [100, 20], [100, 60], [10, 60]], "Storm Hits", 0.91],
            [[[110.4, 21], [200, 21], [200.6, 59], [110, 59]], "Region Hard", 0.88]
        ]"#;
        let fragments = parse_detections("ocr", raw).unwrap();
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].text, "Storm Hits");
        assert!((fragments[0].confidence - 0.91).abs() < 1e-6);
        assert_eq!(fragments[1].bounding_region(), Region::new(110, 21, 201, 59));
    }

    #[test]
    fn parses_wrapped_objects() {
        let raw = r#"{"results": [
            {"bbox": [[0, 0], [5, 0], [5, 5], [0, 5]], "text": "a b", "score": 0.5},
            {"box": [[1, 1], [2, 1], [2, 2], [1, 2]], "text": "c"}
        ]}"#;
        let fragments = parse_detections("ocr", raw).unwrap();
        assert_eq!(fragments[0].text, "a b");
        assert_eq!(fragments[1].confidence, 0.0);
    }

    #[test]
    fn polygons_reduce_to_bounding_rect() {
        let raw = r#"[[[[5, 9], [30, 2], [40, 20], [20, 30], [1, 15]], "ragged", 0.7]]"#;
        let fragments = parse_detections("ocr", raw).unwrap();
        assert_eq!(fragments[0].bounding_region(), Region::new(1, 2, 40, 30));
    }

    #[test]
    fn empty_list_is_valid() {
        assert!(parse_detections("ocr", "[]").unwrap().is_empty());
    }

    #[test]
    fn rejects_points_free_detections_and_garbage() {
        assert!(parse_detections("ocr", r#"[[[], "x", 0.9]]"#).is_err());
        let err = parse_detections("ocr", r#"{"error": "boom"}"#).unwrap_err();
        assert!(matches!(err, BroadsheetError::MalformedResponse { .. }));
    }
}
