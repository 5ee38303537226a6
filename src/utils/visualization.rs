//! Drawing of segmentation results.
//!
//! Boundaries are drawn as closed outlines, baselines as polylines with a dot
//! marking the first point so that line orientation is visible.

use crate::domain::SegmentationResult;
use crate::processors::Point;
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};
use tracing::debug;

const BOUNDARY_COLOR: Rgb<u8> = Rgb([0, 160, 255]);

const BASELINE_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

const START_RADIUS: i32 = 3;

/// Renders `result` over a copy of `image`.
pub fn draw_segmentation(image: &DynamicImage, result: &SegmentationResult) -> RgbImage {
    let mut canvas = image.to_rgb8();
    for line in &result.lines {
        draw_polyline(&mut canvas, &line.boundary, true, BOUNDARY_COLOR);
        draw_polyline(&mut canvas, &line.baseline, false, BASELINE_COLOR);
        if let Some(start) = line.baseline.first() {
            let p = start.to_imageproc_point();
            draw_filled_circle_mut(&mut canvas, (p.x, p.y), START_RADIUS, BASELINE_COLOR);
        }
    }
    debug!("drew {} lines", result.lines.len());
    canvas
}

fn draw_polyline(canvas: &mut RgbImage, points: &[Point], closed: bool, color: Rgb<u8>) {
    for pair in points.windows(2) {
        draw_line_segment_mut(canvas, (pair[0].x, pair[0].y), (pair[1].x, pair[1].y), color);
    }
    if closed
        && points.len() > 2
        && let (Some(first), Some(last)) = (points.first(), points.last())
    {
        draw_line_segment_mut(canvas, (last.x, last.y), (first.x, first.y), color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LineRecord, TextDirection};

    #[test]
    fn test_draws_over_page() {
        let page = DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 30, Rgb([255, 255, 255])));
        let line = LineRecord::new(
            vec![Point::new(5.0, 20.0), Point::new(35.0, 20.0)],
            vec![
                Point::new(5.0, 10.0),
                Point::new(35.0, 10.0),
                Point::new(35.0, 22.0),
                Point::new(5.0, 22.0),
            ],
        );
        let result = SegmentationResult::new(TextDirection::HorizontalLr, vec![line]);
        let canvas = draw_segmentation(&page, &result);
        assert_eq!(canvas.dimensions(), (40, 30));
        assert_eq!(*canvas.get_pixel(20, 20), BASELINE_COLOR);
        assert_eq!(*canvas.get_pixel(20, 10), BOUNDARY_COLOR);
        assert_eq!(*canvas.get_pixel(0, 0), Rgb([255, 255, 255]));
    }
}
