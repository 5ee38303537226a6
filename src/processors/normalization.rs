//! Image normalization utilities.
//!
//! Converts a page image into a `1 × C × H × W` float tensor. Segmentation
//! networks take either a single luma channel or RGB, with pixel values
//! scaled to `[0, 1]`.

use crate::core::{OCRError, Tensor4D};
use image::DynamicImage;

const UNIT_SCALE: f32 = 1.0 / 255.0;

/// Normalizes images for network input.
#[derive(Debug, Clone)]
pub struct NormalizeImage {
    channels: usize,
}

impl NormalizeImage {
    /// Plain `[0, 1]` scaling in CHW order, the input convention of baseline
    /// segmentation networks.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `channels` is neither 1 (luma) nor
    /// 3 (RGB).
    pub fn unit_range(channels: usize) -> Result<Self, OCRError> {
        if channels != 1 && channels != 3 {
            return Err(OCRError::ConfigError {
                message: format!("Normalization supports 1 or 3 channels, got {channels}"),
            });
        }
        Ok(Self { channels })
    }

    /// Number of channels produced.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Normalizes a single image and returns it as a `1 × C × H × W` tensor.
    pub fn normalize_to(&self, img: &DynamicImage) -> Result<Tensor4D, OCRError> {
        let channels = self.channels;
        let (width, height) = (img.width() as usize, img.height() as usize);

        let raw = if channels == 1 {
            img.to_luma8().into_raw()
        } else {
            img.to_rgb8().into_raw()
        };

        let mut tensor = Tensor4D::zeros((1, channels, height, width));
        for y in 0..height {
            for x in 0..width {
                let base = (y * width + x) * channels;
                for c in 0..channels {
                    tensor[[0, c, y, x]] = raw[base + c] as f32 * UNIT_SCALE;
                }
            }
        }

        Ok(tensor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    #[test]
    fn test_rejects_unsupported_channels() {
        assert!(NormalizeImage::unit_range(0).is_err());
        assert!(NormalizeImage::unit_range(2).is_err());
        assert!(NormalizeImage::unit_range(4).is_err());
        assert_eq!(NormalizeImage::unit_range(3).unwrap().channels(), 3);
    }

    #[test]
    fn test_unit_range_luma() {
        let mut img = GrayImage::new(3, 2);
        img.put_pixel(2, 1, Luma([255]));
        let tensor = NormalizeImage::unit_range(1)
            .unwrap()
            .normalize_to(&DynamicImage::ImageLuma8(img))
            .unwrap();
        assert_eq!(tensor.shape(), &[1, 1, 2, 3]);
        assert_eq!(tensor[[0, 0, 1, 2]], 1.0);
        assert_eq!(tensor[[0, 0, 0, 0]], 0.0);
    }

    #[test]
    fn test_rgb_chw_layout() {
        let mut img = RgbImage::new(2, 2);
        img.put_pixel(1, 0, Rgb([255, 0, 51]));
        let tensor = NormalizeImage::unit_range(3)
            .unwrap()
            .normalize_to(&DynamicImage::ImageRgb8(img))
            .unwrap();
        assert_eq!(tensor.shape(), &[1, 3, 2, 2]);
        assert_eq!(tensor[[0, 0, 0, 1]], 1.0);
        assert_eq!(tensor[[0, 1, 0, 1]], 0.0);
        assert!((tensor[[0, 2, 0, 1]] - 0.2).abs() < 1e-6);
        assert!(tensor.iter().all(|v| (0.0..=1.0).contains(v)));
    }
}
