//! Types used in image processing operations
//!
//! This module defines how a page is resized into a network input tensor.

/// Specifies how a page is resized to the network input.
///
/// Derived from the model's declared `(batch, channels, height, width)` shape,
/// where a zero (or dynamic) dimension is free.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizePolicy {
    /// Both dimensions free, the page is used as is
    Keep,
    /// Resize to exactly `(height, width)`
    Exact {
        /// Target height
        height: u32,
        /// Target width
        width: u32,
    },
    /// Scale so that the height matches, keeping the aspect ratio
    FixedHeight(u32),
    /// Scale so that the width matches, keeping the aspect ratio
    FixedWidth(u32),
}

impl ResizePolicy {
    /// Builds the policy from the fixed height and width of an input shape.
    pub fn from_dims(height: u32, width: u32) -> Self {
        match (height, width) {
            (0, 0) => ResizePolicy::Keep,
            (h, 0) => ResizePolicy::FixedHeight(h),
            (0, w) => ResizePolicy::FixedWidth(w),
            (h, w) => ResizePolicy::Exact { height: h, width: w },
        }
    }

    /// Target `(width, height)` for a page of the given size.
    ///
    /// Aspect-preserving targets are rounded and never collapse below one pixel.
    pub fn target_size(&self, width: u32, height: u32) -> (u32, u32) {
        match *self {
            ResizePolicy::Keep => (width, height),
            ResizePolicy::Exact { height: h, width: w } => (w, h),
            ResizePolicy::FixedHeight(h) => {
                let ratio = h as f64 / height.max(1) as f64;
                (((width as f64 * ratio).round() as u32).max(1), h)
            }
            ResizePolicy::FixedWidth(w) => {
                let ratio = w as f64 / width.max(1) as f64;
                (w, ((height as f64 * ratio).round() as u32).max(1))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_from_dims() {
        assert_eq!(ResizePolicy::from_dims(0, 0), ResizePolicy::Keep);
        assert_eq!(ResizePolicy::from_dims(1800, 0), ResizePolicy::FixedHeight(1800));
        assert_eq!(ResizePolicy::from_dims(0, 640), ResizePolicy::FixedWidth(640));
        assert_eq!(
            ResizePolicy::from_dims(512, 256),
            ResizePolicy::Exact {
                height: 512,
                width: 256
            }
        );
    }

    #[test]
    fn test_fixed_height_keeps_aspect_ratio() {
        assert_eq!(ResizePolicy::FixedHeight(300).target_size(800, 600), (400, 300));
        assert_eq!(ResizePolicy::FixedWidth(400).target_size(800, 600), (400, 300));
        assert_eq!(ResizePolicy::Keep.target_size(800, 600), (800, 600));
    }
}
