//! Boundary polygon estimation around baselines.
//!
//! Each baseline is resampled at a fixed step. From every sample the
//! estimator marches along the upward normal until it meets another baseline;
//! a fraction of that distance is the line's height at the sample. Samples
//! that see no neighbour fall back to the page's median height. The lower
//! edge sits a fixed fraction of the height below the baseline.

use crate::core::OCRError;
use crate::impl_config_validator;
use crate::processors::geometry::{Point, resample_polyline};
use ndarray::Array2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration for [`BoundaryEstimator`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryConfig {
    /// Distance between baseline samples in raster pixels.
    pub sample_step: f32,
    /// Fraction of the distance to the next baseline above used as line height.
    pub neighbour_ratio: f32,
    /// Upper bound for the line height in raster pixels.
    pub max_height: f32,
    /// Height used when no sample on the page sees a neighbour.
    pub fallback_height: f32,
    /// Lower extent as a fraction of the upper extent.
    pub descender_ratio: f32,
    /// Moving average window over per-sample heights, 1 disables smoothing.
    pub smoothing_window: usize,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            sample_step: 4.0,
            neighbour_ratio: 0.8,
            max_height: 128.0,
            fallback_height: 16.0,
            descender_ratio: 0.25,
            smoothing_window: 3,
        }
    }
}

impl_config_validator!(BoundaryConfig {
    sample_step: range(0.5, 1000.0),
    neighbour_ratio: range(0.0, 1.0),
    max_height: range(1.0, 100000.0),
    fallback_height: range(1.0, 100000.0),
    descender_ratio: range(0.0, 10.0),
    smoothing_window: min(1),
});

/// Builds one boundary polygon per baseline.
#[derive(Debug, Clone, Default)]
pub struct BoundaryEstimator {
    config: BoundaryConfig,
}

struct Sampled {
    points: Vec<Point>,
    normals: Vec<(f32, f32)>,
    extents: Vec<Option<f32>>,
}

impl BoundaryEstimator {
    /// Creates an estimator with the given settings.
    pub fn new(config: BoundaryConfig) -> Self {
        Self { config }
    }

    /// Estimates boundaries for `baselines` on a raster of `raster_dims`
    /// `(width, height)`.
    ///
    /// The result has the same length and order as `baselines`.
    pub fn estimate(
        &self,
        baselines: &[Vec<Point>],
        raster_dims: (usize, usize),
    ) -> Result<Vec<Vec<Point>>, OCRError> {
        let (width, height) = raster_dims;
        if baselines.is_empty() {
            return Ok(Vec::new());
        }
        if width == 0 || height == 0 {
            return Err(OCRError::invalid_input(format!(
                "cannot estimate boundaries on an empty {}x{} raster",
                width, height
            )));
        }

        let occupancy = rasterize_baselines(baselines, width, height);
        let sampled: Vec<Sampled> = baselines
            .par_iter()
            .enumerate()
            .map(|(idx, baseline)| self.measure(idx, baseline, &occupancy))
            .collect();

        let mut measured: Vec<f32> = sampled
            .iter()
            .flat_map(|s| s.extents.iter().flatten().copied())
            .collect();
        let fallback = median(&mut measured).unwrap_or(self.config.fallback_height);
        debug!(
            "{} of {} boundary samples hit a neighbouring line, fallback height {:.1}",
            measured.len(),
            sampled.iter().map(|s| s.extents.len()).sum::<usize>(),
            fallback
        );

        // Raster edges rather than the last pixel centre, so that rescaled
        // polygons can reach the image border.
        let max_x = width as f32;
        let max_y = height as f32;
        Ok(sampled
            .into_iter()
            .map(|s| {
                let upper: Vec<f32> = s.extents.iter().map(|e| e.unwrap_or(fallback)).collect();
                let upper = moving_average(&upper, self.config.smoothing_window);
                let clamp = |p: Point| Point::new(p.x.clamp(0.0, max_x), p.y.clamp(0.0, max_y));

                let top = s
                    .points
                    .iter()
                    .zip(&s.normals)
                    .zip(&upper)
                    .map(|((p, n), u)| clamp(Point::new(p.x + n.0 * u, p.y + n.1 * u)));
                let bottom: Vec<Point> = s
                    .points
                    .iter()
                    .zip(&s.normals)
                    .zip(&upper)
                    .map(|((p, n), u)| {
                        let l = u * self.config.descender_ratio;
                        clamp(Point::new(p.x - n.0 * l, p.y - n.1 * l))
                    })
                    .collect();
                top.chain(bottom.into_iter().rev()).collect()
            })
            .collect())
    }

    /// Samples one baseline and measures the free space above each sample.
    fn measure(&self, idx: usize, baseline: &[Point], occupancy: &Array2<u32>) -> Sampled {
        let mut samples = resample_polyline(baseline, self.config.sample_step);
        if samples.is_empty() {
            samples = baseline.iter().map(|p| (*p, (1.0, 0.0))).collect();
        }

        let own = idx as u32 + 1;
        let (height, width) = occupancy.dim();
        let reach = self.config.max_height / self.config.neighbour_ratio.max(f32::EPSILON);
        let steps = reach.ceil().min((width + height) as f32) as usize;

        let mut points = Vec::with_capacity(samples.len());
        let mut normals = Vec::with_capacity(samples.len());
        let mut extents = Vec::with_capacity(samples.len());
        for (p, dir) in samples {
            let n = upward_normal(dir);
            let mut hit = None;
            for step in 1..=steps {
                let d = step as f32;
                let x = (p.x + n.0 * d).round();
                let y = (p.y + n.1 * d).round();
                if x < 0.0 || y < 0.0 || x >= width as f32 || y >= height as f32 {
                    break;
                }
                let label = occupancy[[y as usize, x as usize]];
                if label != 0 && label != own {
                    hit = Some((d * self.config.neighbour_ratio).min(self.config.max_height));
                    break;
                }
            }
            points.push(p);
            normals.push(n);
            extents.push(hit);
        }
        Sampled {
            points,
            normals,
            extents,
        }
    }
}

/// Unit normal of `dir` pointing up the page, or left for a vertical tangent.
fn upward_normal(dir: (f32, f32)) -> (f32, f32) {
    let n = (dir.1, -dir.0);
    if n.1 < 0.0 || (n.1 == 0.0 && n.0 < 0.0) {
        n
    } else {
        (-n.0, -n.1)
    }
}

/// Labels raster pixels with `index + 1` of the baseline crossing them.
///
/// Lines are drawn two pixels thick so that diagonal marches cannot slip
/// through them.
fn rasterize_baselines(baselines: &[Vec<Point>], width: usize, height: usize) -> Array2<u32> {
    let mut occupancy = Array2::<u32>::zeros((height, width));
    for (idx, baseline) in baselines.iter().enumerate() {
        let label = idx as u32 + 1;
        for (p, _) in resample_polyline(baseline, 0.5) {
            let (x, y) = (p.x.round(), p.y.round());
            if x < 0.0 || y < 0.0 {
                continue;
            }
            let (x, y) = (x as usize, y as usize);
            for (px, py) in [(x, y), (x + 1, y), (x, y + 1), (x + 1, y + 1)] {
                if px < width && py < height && occupancy[[py, px]] == 0 {
                    occupancy[[py, px]] = label;
                }
            }
        }
    }
    occupancy
}

fn median(values: &mut [f32]) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f32::total_cmp);
    let mid = values.len() / 2;
    Some(if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    })
}

fn moving_average(values: &[f32], window: usize) -> Vec<f32> {
    if window <= 1 || values.len() < 2 {
        return values.to_vec();
    }
    let half = window / 2;
    (0..values.len())
        .map(|i| {
            let lo = i.saturating_sub(half);
            let hi = (i + half + 1).min(values.len());
            values[lo..hi].iter().sum::<f32>() / (hi - lo) as f32
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ConfigValidator;
    use crate::processors::geometry::BoundingBox;

    fn horizontal(y: f32, x0: f32, x1: f32) -> Vec<Point> {
        vec![Point::new(x0, y), Point::new(x1, y)]
    }

    #[test]
    fn test_cardinality_and_order() {
        let baselines = vec![horizontal(20.0, 5.0, 90.0), horizontal(60.0, 5.0, 90.0)];
        let boundaries = BoundaryEstimator::default()
            .estimate(&baselines, (100, 100))
            .unwrap();
        assert_eq!(boundaries.len(), 2);
        for (baseline, boundary) in baselines.iter().zip(&boundaries) {
            let bbox = BoundingBox::new(boundary.clone());
            assert!(bbox.y_min() < baseline[0].y);
            assert!(bbox.y_max() > baseline[0].y);
        }
    }

    #[test]
    fn test_neighbour_bounds_height() {
        let baselines = vec![horizontal(20.0, 5.0, 90.0), horizontal(60.0, 5.0, 90.0)];
        let boundaries = BoundaryEstimator::default()
            .estimate(&baselines, (100, 100))
            .unwrap();
        let lower = BoundingBox::new(boundaries[1].clone());
        // 40 px gap, 0.8 ratio
        assert!((lower.y_min() - 28.0).abs() <= 1.5, "got {}", lower.y_min());
        assert!((lower.y_max() - 68.0).abs() <= 1.5, "got {}", lower.y_max());

        // nothing above the first line, page median applies
        let upper = BoundingBox::new(boundaries[0].clone());
        assert_eq!(upper.y_min(), 0.0);
    }

    #[test]
    fn test_single_line_uses_fallback_height() {
        let config = BoundaryConfig {
            smoothing_window: 1,
            ..Default::default()
        };
        let boundaries = BoundaryEstimator::new(config)
            .estimate(&[horizontal(50.0, 10.0, 30.0)], (100, 100))
            .unwrap();
        let bbox = BoundingBox::new(boundaries[0].clone());
        assert_eq!(bbox.y_min(), 34.0);
        assert_eq!(bbox.y_max(), 54.0);
        assert_eq!(bbox.x_min(), 10.0);
        assert_eq!(bbox.x_max(), 30.0);
    }

    #[test]
    fn test_polygon_is_clamped_to_raster() {
        let boundaries = BoundaryEstimator::default()
            .estimate(&[horizontal(3.0, 0.0, 40.0)], (50, 20))
            .unwrap();
        assert!(
            boundaries[0]
                .iter()
                .all(|p| (0.0..=50.0).contains(&p.x) && (0.0..=20.0).contains(&p.y))
        );
    }

    #[test]
    fn test_polygon_reaches_raster_edge() {
        let config = BoundaryConfig {
            smoothing_window: 1,
            ..Default::default()
        };
        // 16 px up, 4 px down from the bottom pixel row
        let boundaries = BoundaryEstimator::new(config)
            .estimate(&[horizontal(18.0, 5.0, 45.0)], (50, 20))
            .unwrap();
        let bbox = BoundingBox::new(boundaries[0].clone());
        assert_eq!(bbox.y_min(), 2.0);
        assert_eq!(bbox.y_max(), 20.0);
    }

    #[test]
    fn test_sloped_baseline_offsets_along_normal() {
        let baselines = vec![
            vec![Point::new(10.0, 40.0), Point::new(90.0, 60.0)],
            vec![Point::new(10.0, 70.0), Point::new(90.0, 90.0)],
        ];
        let boundaries = BoundaryEstimator::default()
            .estimate(&baselines, (100, 100))
            .unwrap();
        let normal = upward_normal((4.0 / 17f32.sqrt(), 1.0 / 17f32.sqrt()));
        assert!(normal.0 > 0.0 && normal.1 < 0.0);

        for polygon in &boundaries {
            let n = polygon.len() / 2;
            assert_eq!(polygon.len(), 2 * n);
            for i in 0..n {
                let (top, bottom) = (polygon[i], polygon[2 * n - 1 - i]);
                let (dx, dy) = (top.x - bottom.x, top.y - bottom.y);
                let span = (dx * dx + dy * dy).sqrt();
                assert!((dx / span - normal.0).abs() < 1e-3, "sample {i} leaves the normal");
                assert!((dy / span - normal.1).abs() < 1e-3, "sample {i} leaves the normal");
                // lines 30 px apart vertically, about 29 px along the normal
                let upper = span / 1.25;
                assert!((21.5..=24.0).contains(&upper), "sample {i} extent {upper}");
            }
        }
    }

    #[test]
    fn test_vertical_baseline_extends_to_the_left() {
        let vertical = |x: f32| vec![Point::new(x, 10.0), Point::new(x, 80.0)];
        let baselines = vec![vertical(60.0), vertical(30.0)];
        let boundaries = BoundaryEstimator::default()
            .estimate(&baselines, (100, 100))
            .unwrap();

        // 29 px march to the neighbour's occupancy, 0.8 ratio
        let right = BoundingBox::new(boundaries[0].clone());
        assert!((right.x_min() - 36.8).abs() < 0.01, "got {}", right.x_min());
        assert!((right.x_max() - 65.8).abs() < 0.01, "got {}", right.x_max());
        assert_eq!(right.y_min(), 10.0);
        assert_eq!(right.y_max(), 80.0);

        // nothing further left, median of the measured extents
        let left = BoundingBox::new(boundaries[1].clone());
        assert!((left.x_min() - 6.8).abs() < 0.01, "got {}", left.x_min());
        assert!((left.x_max() - 35.8).abs() < 0.01, "got {}", left.x_max());
    }

    #[test]
    fn test_upward_normal() {
        assert_eq!(upward_normal((1.0, 0.0)), (0.0, -1.0));
        assert_eq!(upward_normal((-1.0, 0.0)), (0.0, -1.0));
        assert_eq!(upward_normal((0.0, 1.0)), (-1.0, 0.0));
    }

    #[test]
    fn test_empty_input() {
        assert!(
            BoundaryEstimator::default()
                .estimate(&[], (0, 0))
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn test_config_validation() {
        assert!(BoundaryConfig::default().validate().is_ok());
        let bad = BoundaryConfig {
            smoothing_window: 0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
