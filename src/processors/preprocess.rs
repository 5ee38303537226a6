//! Page preprocessing for segmentation networks.
//!
//! Validates the optional exclusion mask, resizes the page to the model's
//! declared input shape and converts it into a `1 × C × H × W` tensor with
//! values in `[0, 1]`.

use crate::core::validation::validate_image_dimensions;
use crate::core::{OCRError, Tensor4D};
use crate::processors::normalization::NormalizeImage;
use crate::processors::types::ResizePolicy;
use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, Luma};
use tracing::debug;

/// Input handed to the inference stage.
#[derive(Debug, Clone)]
pub struct PreparedInput {
    /// Normalized network input, `1 × C × H × W`.
    pub tensor: Tensor4D,
    /// Binary mask at page resolution, 255 where lines may appear and 0 where
    /// they are excluded.
    pub mask: Option<GrayImage>,
    /// Page size as `(width, height)`.
    pub image_size: (u32, u32),
}

impl PreparedInput {
    /// Zeroes every raster channel where the mask excludes the page.
    ///
    /// The mask is resampled with nearest-neighbour interpolation to the
    /// raster resolution. Does nothing when no mask was given.
    pub fn apply_mask(&self, raster: &mut Tensor4D) {
        let Some(mask) = &self.mask else {
            return;
        };
        let (_, channels, height, width) = raster.dim();
        if height == 0 || width == 0 {
            return;
        }
        let resized = if mask.dimensions() == (width as u32, height as u32) {
            mask.clone()
        } else {
            image::imageops::resize(mask, width as u32, height as u32, FilterType::Nearest)
        };

        let mut excluded = 0usize;
        for (x, y, pixel) in resized.enumerate_pixels() {
            if pixel[0] == 0 {
                excluded += 1;
                for c in 0..channels {
                    raster[[0, c, y as usize, x as usize]] = 0.0;
                }
            }
        }
        debug!("mask excluded {} of {} raster pixels", excluded, width * height);
    }
}

/// Turns pages into network input tensors.
#[derive(Debug, Clone)]
pub struct SegmentationPreprocessor {
    resize: ResizePolicy,
    normalizer: NormalizeImage,
}

impl SegmentationPreprocessor {
    /// Creates a preprocessor producing `channels` channels with the given resize policy.
    pub fn new(channels: usize, resize: ResizePolicy) -> Result<Self, OCRError> {
        Ok(Self {
            resize,
            normalizer: NormalizeImage::unit_range(channels)?,
        })
    }

    /// Creates a preprocessor from a model input shape `(batch, channels, height, width)`.
    ///
    /// Non-positive height or width entries are treated as free dimensions.
    pub fn from_input_shape(shape: &[i64]) -> Result<Self, OCRError> {
        if shape.len() != 4 {
            return Err(OCRError::config_error(format!(
                "expected a 4D input shape (batch, channels, height, width), got {:?}",
                shape
            )));
        }
        let dim = |v: i64| if v > 0 { v as u32 } else { 0 };
        if shape[1] <= 0 {
            return Err(OCRError::config_error(format!(
                "input shape {:?} does not declare a channel count",
                shape
            )));
        }
        Self::new(
            shape[1] as usize,
            ResizePolicy::from_dims(dim(shape[2]), dim(shape[3])),
        )
    }

    /// Number of input channels.
    pub fn channels(&self) -> usize {
        self.normalizer.channels()
    }

    /// Resize policy in use.
    pub fn resize_policy(&self) -> ResizePolicy {
        self.resize
    }

    /// Validates the inputs and builds the network tensor.
    ///
    /// # Errors
    ///
    /// * `OCRError::InvalidInput` for an empty page, a mask whose size
    ///   differs from the page, or a mask with more than two distinct values.
    pub fn prepare(
        &self,
        image: &DynamicImage,
        mask: Option<&DynamicImage>,
    ) -> Result<PreparedInput, OCRError> {
        let image_size = (image.width(), image.height());
        validate_image_dimensions(image_size.0, image_size.1, "segmentation input")?;

        let mask = mask
            .map(|m| validate_mask(m, image_size))
            .transpose()?;

        let (target_w, target_h) = self.resize.target_size(image_size.0, image_size.1);
        let tensor = if (target_w, target_h) == image_size {
            self.normalizer.normalize_to(image)?
        } else {
            let resized = image.resize_exact(target_w, target_h, FilterType::Lanczos3);
            self.normalizer.normalize_to(&resized)?
        };
        debug!(
            "prepared {}x{} page as input tensor {:?}",
            image_size.0,
            image_size.1,
            tensor.shape()
        );

        Ok(PreparedInput {
            tensor,
            mask,
            image_size,
        })
    }
}

/// Checks that `mask` matches the page size and is bitonal, returning it as a
/// binary 0/255 image.
pub fn validate_mask(mask: &DynamicImage, image_size: (u32, u32)) -> Result<GrayImage, OCRError> {
    let mask_size = (mask.width(), mask.height());
    if mask_size != image_size {
        return Err(OCRError::mask_size_mismatch(mask_size, image_size));
    }

    let luma = mask.to_luma8();
    let mut seen: Vec<u8> = Vec::with_capacity(2);
    for pixel in luma.pixels() {
        if !seen.contains(&pixel[0]) {
            if seen.len() == 2 {
                return Err(OCRError::invalid_input(
                    "mask is not bitonal: found more than two distinct values",
                ));
            }
            seen.push(pixel[0]);
        }
    }

    Ok(GrayImage::from_fn(luma.width(), luma.height(), |x, y| {
        if luma.get_pixel(x, y)[0] == 0 {
            Luma([0])
        } else {
            Luma([255])
        }
    }))
}
