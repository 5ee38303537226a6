//! Segmentation models.
//!
//! A [`SegmentationModel`] is loaded once and shared by reference between
//! segmentation calls. It pairs an inference engine with the preprocessing
//! its input shape calls for and the raster channel layout it produces.

pub mod blla;

pub use blla::{METADATA_FORMAT_VERSION, ModelMetadata, SegmentationModel};
