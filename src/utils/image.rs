//! Image loading helpers.
//!
//! Pages are kept as [`DynamicImage`] so that the preprocessor can decide
//! between grayscale and RGB input from the model's channel count.

use crate::core::OCRError;
use image::DynamicImage;
use rayon::prelude::*;
use std::path::Path;

/// Batches at least this large are decoded in parallel.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 4;

/// Loads a page image from a file path.
///
/// # Arguments
///
/// * `path` - Path of the image file; any format supported by the image crate
///
/// # Errors
///
/// Returns `OCRError::ImageLoad` if the file cannot be opened or decoded.
pub fn load_image(path: &Path) -> Result<DynamicImage, OCRError> {
    image::open(path).map_err(OCRError::ImageLoad)
}

/// Loads an exclusion mask from a file path as an 8-bit grayscale image.
///
/// The mask is only decoded here; its size and bitonality are checked when
/// the page is segmented.
pub fn load_mask(path: &Path) -> Result<DynamicImage, OCRError> {
    let mask = load_image(path)?;
    Ok(DynamicImage::ImageLuma8(mask.to_luma8()))
}

/// Loads a batch of page images.
///
/// Decoding runs on the rayon pool once the batch reaches
/// `parallel_threshold` images (default [`DEFAULT_PARALLEL_THRESHOLD`]).
///
/// # Errors
///
/// Fails with the first image that cannot be loaded.
pub fn load_images<P: AsRef<Path> + Send + Sync>(
    paths: &[P],
    parallel_threshold: Option<usize>,
) -> Result<Vec<DynamicImage>, OCRError> {
    let threshold = parallel_threshold.unwrap_or(DEFAULT_PARALLEL_THRESHOLD);
    if paths.len() >= threshold {
        paths.par_iter().map(|p| load_image(p.as_ref())).collect()
    } else {
        paths.iter().map(|p| load_image(p.as_ref())).collect()
    }
}
