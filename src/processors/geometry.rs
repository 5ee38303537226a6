//! Geometric utilities for baseline segmentation.
//!
//! This module provides the point and bounding box primitives shared by the
//! vectorizer, the boundary estimator and the reading order policies, together
//! with polyline helpers: Douglas-Peucker simplification, arc length and
//! fixed-step resampling.

use imageproc::point::Point as ImageProcPoint;
use serde::{Deserialize, Serialize};

/// A 2D point with floating-point coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// X-coordinate of the point.
    pub x: f32,
    /// Y-coordinate of the point.
    pub y: f32,
}

impl Point {
    /// Creates a new point with the given coordinates.
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[inline]
    pub fn distance(&self, other: &Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Returns the point with both coordinates multiplied by the given factors.
    #[inline]
    pub fn scaled(&self, sx: f32, sy: f32) -> Self {
        Self::new(self.x * sx, self.y * sy)
    }

    /// Converts this point to an imageproc point with integer coordinates.
    ///
    /// Coordinates are rounded to the nearest integer.
    pub fn to_imageproc_point(&self) -> ImageProcPoint<i32> {
        ImageProcPoint::new(self.x.round() as i32, self.y.round() as i32)
    }
}

/// A bounding box represented by a collection of points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// The points that define the bounding box.
    pub points: Vec<Point>,
}

impl BoundingBox {
    /// Creates a new bounding box from a vector of points.
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Gets the minimum x-coordinate, or 0.0 if there are no points.
    pub fn x_min(&self) -> f32 {
        self.fold_coord(|p| p.x, f32::INFINITY, f32::min)
    }

    /// Gets the minimum y-coordinate, or 0.0 if there are no points.
    pub fn y_min(&self) -> f32 {
        self.fold_coord(|p| p.y, f32::INFINITY, f32::min)
    }

    /// Gets the maximum x-coordinate, or 0.0 if there are no points.
    pub fn x_max(&self) -> f32 {
        self.fold_coord(|p| p.x, f32::NEG_INFINITY, f32::max)
    }

    /// Gets the maximum y-coordinate, or 0.0 if there are no points.
    pub fn y_max(&self) -> f32 {
        self.fold_coord(|p| p.y, f32::NEG_INFINITY, f32::max)
    }

    fn fold_coord(&self, coord: impl Fn(&Point) -> f32, init: f32, f: fn(f32, f32) -> f32) -> f32 {
        if self.points.is_empty() {
            return 0.0;
        }
        self.points.iter().map(coord).fold(init, f)
    }
}

/// Simplifies an open polyline with the Douglas-Peucker algorithm.
///
/// Both endpoints are always kept. Polylines with two or fewer points are
/// returned unchanged.
pub fn simplify_polyline(points: &[Point], epsilon: f32) -> Vec<Point> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    // Iterative to bound stack depth on long traces
    let mut stack = vec![(0, points.len() - 1)];
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[points.len() - 1] = true;

    while let Some((start, end)) = stack.pop() {
        if end - start <= 1 {
            continue;
        }

        let mut max_dist = 0.0;
        let mut max_index = start;
        for i in (start + 1)..end {
            let dist = point_to_line_distance(&points[i], &points[start], &points[end]);
            if dist > max_dist {
                max_dist = dist;
                max_index = i;
            }
        }

        if max_dist > epsilon {
            keep[max_index] = true;
            if max_index - start > 1 {
                stack.push((start, max_index));
            }
            if end - max_index > 1 {
                stack.push((max_index, end));
            }
        }
    }

    points
        .iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(*p))
        .collect()
}

/// Perpendicular distance from `point` to the line through `line_start` and
/// `line_end`. Falls back to the point distance when the line is degenerate.
pub fn point_to_line_distance(point: &Point, line_start: &Point, line_end: &Point) -> f32 {
    let a = line_end.y - line_start.y;
    let b = line_start.x - line_end.x;
    let c = line_end.x * line_start.y - line_start.x * line_end.y;

    let denominator = (a * a + b * b).sqrt();
    if denominator == 0.0 {
        return point.distance(line_start);
    }

    (a * point.x + b * point.y + c).abs() / denominator
}

/// Total arc length of a polyline.
pub fn polyline_length(points: &[Point]) -> f32 {
    points.windows(2).map(|w| w[0].distance(&w[1])).sum()
}

/// Resamples a polyline at a fixed arc-length step.
///
/// The first and last points are always part of the output. Each sample is
/// paired with the unit direction of the segment it falls on.
pub fn resample_polyline(points: &[Point], step: f32) -> Vec<(Point, (f32, f32))> {
    let mut samples = Vec::new();
    if points.len() < 2 || step <= 0.0 {
        return samples;
    }

    let mut carry = 0.0f32;
    let mut last_dir = (1.0, 0.0);
    for w in points.windows(2) {
        let (a, b) = (w[0], w[1]);
        let len = a.distance(&b);
        if len <= f32::EPSILON {
            continue;
        }
        let dir = ((b.x - a.x) / len, (b.y - a.y) / len);
        last_dir = dir;
        let mut t = carry;
        while t < len {
            samples.push((Point::new(a.x + dir.0 * t, a.y + dir.1 * t), dir));
            t += step;
        }
        carry = t - len;
    }

    if let Some(&last) = points.last() {
        let already = samples
            .last()
            .is_some_and(|(p, _)| p.distance(&last) <= f32::EPSILON);
        if !already {
            samples.push((last, last_dir));
        }
    }
    samples
}
