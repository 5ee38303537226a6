//! Line records and segmentation results.
//!
//! Points are serialized as `[x, y]` pairs so that the JSON form of a
//! [`SegmentationResult`] reads:
//!
//! ```text
//! { "text_direction": "horizontal-lr", "type": "baselines",
//!   "lines": [ { "script": "default", "baseline": [[x, y], ...], "boundary": [[x, y], ...] } ] }
//! ```

use super::text_direction::TextDirection;
use crate::core::OcrResult;
use crate::processors::{BoundingBox, Point};
use serde::{Deserialize, Serialize};

/// Script tag assigned to every line by the baseline segmenter.
pub const DEFAULT_SCRIPT: &str = "default";

mod point_pairs {
    use crate::processors::Point;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(points: &[Point], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(points.iter().map(|p| [p.x, p.y]))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Point>, D::Error> {
        let pairs: Vec<[f32; 2]> = Vec::deserialize(deserializer)?;
        Ok(pairs.into_iter().map(|[x, y]| Point::new(x, y)).collect())
    }
}

/// A single text line: its baseline and the polygon enclosing its glyphs.
///
/// The boundary is implicitly closed; its last point connects back to the
/// first and is not repeated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineRecord {
    /// Script tag of the line.
    pub script: String,
    /// Baseline polyline in writing direction, at least two points.
    #[serde(with = "point_pairs")]
    pub baseline: Vec<Point>,
    /// Boundary polygon.
    #[serde(with = "point_pairs")]
    pub boundary: Vec<Point>,
}

impl LineRecord {
    /// Creates a line with the default script tag.
    pub fn new(baseline: Vec<Point>, boundary: Vec<Point>) -> Self {
        Self {
            script: DEFAULT_SCRIPT.to_string(),
            baseline,
            boundary,
        }
    }

    /// Axis-aligned bounds of the baseline as `(x_min, y_min, x_max, y_max)`.
    pub fn baseline_bounds(&self) -> (f32, f32, f32, f32) {
        let bbox = BoundingBox::new(self.baseline.clone());
        (bbox.x_min(), bbox.y_min(), bbox.x_max(), bbox.y_max())
    }

    /// Axis-aligned bounds of the boundary polygon.
    pub fn boundary_bbox(&self) -> BoundingBox {
        BoundingBox::new(self.boundary.clone())
    }
}

/// Kind tag of a segmentation result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentationType {
    /// Lines described by baselines and boundary polygons.
    #[default]
    Baselines,
}

/// Reading-ordered lines of one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentationResult {
    /// Text direction the page was segmented with.
    pub text_direction: TextDirection,
    /// Kind tag, always `baselines`.
    #[serde(rename = "type")]
    pub kind: SegmentationType,
    /// Lines in reading order.
    pub lines: Vec<LineRecord>,
}

impl SegmentationResult {
    /// Creates a baseline result.
    pub fn new(text_direction: TextDirection, lines: Vec<LineRecord>) -> Self {
        Self {
            text_direction,
            kind: SegmentationType::Baselines,
            lines,
        }
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// True when no lines were found.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Serializes the result to compact JSON.
    pub fn to_json(&self) -> OcrResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serializes the result to indented JSON.
    pub fn to_json_pretty(&self) -> OcrResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_line() -> LineRecord {
        LineRecord::new(
            vec![Point::new(10.0, 50.0), Point::new(90.0, 52.0)],
            vec![
                Point::new(10.0, 30.0),
                Point::new(90.0, 32.0),
                Point::new(90.0, 57.0),
                Point::new(10.0, 55.0),
            ],
        )
    }

    #[test]
    fn test_json_layout() {
        let result = SegmentationResult::new(TextDirection::HorizontalLr, vec![sample_line()]);
        let value: serde_json::Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();

        assert_eq!(value["text_direction"], "horizontal-lr");
        assert_eq!(value["type"], "baselines");
        assert_eq!(value["lines"][0]["script"], "default");
        assert_eq!(value["lines"][0]["baseline"][1][0], 90.0);
        assert_eq!(value["lines"][0]["boundary"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_json_parses_back() {
        let result = SegmentationResult::new(TextDirection::HorizontalRl, vec![sample_line()]);
        let json = result.to_json_pretty().unwrap();
        let back: SegmentationResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn test_empty_result() {
        let result = SegmentationResult::new(TextDirection::default(), Vec::new());
        assert!(result.is_empty());
        assert_eq!(result.to_json().unwrap(), r#"{"text_direction":"horizontal-lr","type":"baselines","lines":[]}"#);
    }

    #[test]
    fn test_baseline_bounds() {
        let (x0, y0, x1, y1) = sample_line().baseline_bounds();
        assert_eq!((x0, y0, x1, y1), (10.0, 50.0, 90.0, 52.0));
    }
}
