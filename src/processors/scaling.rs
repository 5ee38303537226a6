//! Raster to image coordinate rescaling.

use crate::core::OCRError;
use crate::domain::LineRecord;
use crate::processors::geometry::Point;

/// Per-axis scale factors from raster space to image space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale2D {
    /// Horizontal factor.
    pub sx: f32,
    /// Vertical factor.
    pub sy: f32,
}

impl Default for Scale2D {
    fn default() -> Self {
        Self::identity()
    }
}

impl Scale2D {
    /// Creates a scale from explicit factors.
    pub fn new(sx: f32, sy: f32) -> Self {
        Self { sx, sy }
    }

    /// The scale that leaves coordinates unchanged.
    pub fn identity() -> Self {
        Self { sx: 1.0, sy: 1.0 }
    }

    /// Scale mapping a raster of `raster_size` onto an image of `image_size`,
    /// both given as `(width, height)`.
    pub fn between(image_size: (u32, u32), raster_size: (usize, usize)) -> Result<Self, OCRError> {
        if raster_size.0 == 0 || raster_size.1 == 0 {
            return Err(OCRError::invalid_input(format!(
                "cannot rescale from an empty {}x{} raster",
                raster_size.0, raster_size.1
            )));
        }
        Ok(Self {
            sx: image_size.0 as f32 / raster_size.0 as f32,
            sy: image_size.1 as f32 / raster_size.1 as f32,
        })
    }

    /// True when both factors are one.
    pub fn is_identity(&self) -> bool {
        self.sx == 1.0 && self.sy == 1.0
    }

    /// Scales a single point.
    #[inline]
    pub fn apply(&self, p: Point) -> Point {
        p.scaled(self.sx, self.sy)
    }
}

/// Multiplies every baseline and boundary coordinate by `scale`.
///
/// No clipping is applied; order and count of lines and points are kept.
pub fn scale_lines(lines: Vec<LineRecord>, scale: Scale2D) -> Vec<LineRecord> {
    if scale.is_identity() {
        return lines;
    }
    lines
        .into_iter()
        .map(|mut line| {
            line.baseline.iter_mut().for_each(|p| *p = scale.apply(*p));
            line.boundary.iter_mut().for_each(|p| *p = scale.apply(*p));
            line
        })
        .collect()
}
