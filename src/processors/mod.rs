//! Image processing stages of the baseline segmenter.
//!
//! This module provides the processing steps that surround the network:
//! preparing the page tensor, turning raster output into baselines, building
//! boundary polygons, rescaling to image coordinates and ordering lines.
//!
//! # Modules
//!
//! * `geometry` - Points, bounding boxes and polyline helpers
//! * `normalization` - Pixel value normalization into network tensors
//! * `preprocess` - Mask validation, resizing and tensor preparation
//! * `skeleton` - Guo-Hall thinning of binary maps
//! * `vectorize` - Raster output to baseline polylines
//! * `boundary` - Boundary polygons around baselines
//! * `scaling` - Raster to image coordinate rescaling
//! * `sorting` - Reading order policies
//! * `types` - Type definitions used across the processors module

pub mod boundary;
mod geometry;
mod normalization;
pub mod preprocess;
pub mod scaling;
pub mod skeleton;
pub mod sorting;
pub mod types;
pub mod vectorize;

pub use boundary::{BoundaryConfig, BoundaryEstimator};
pub use geometry::*;
pub use normalization::*;
pub use preprocess::{PreparedInput, SegmentationPreprocessor, validate_mask};
pub use scaling::{Scale2D, scale_lines};
pub use sorting::{
    PolygonalReadingOrder, ReadingOrderKind, TopToBottomReadingOrder, XyCutReadingOrder,
};
pub use types::*;
pub use vectorize::{BaselineVectorizer, RasterChannels, VectorizerConfig};
