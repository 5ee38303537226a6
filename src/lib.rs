//! # OAR BLLA
//!
//! Baseline layout analysis for document images using ONNX models.
//!
//! A segmentation network predicts per-pixel baseline and line separator
//! probabilities. This crate turns those rasters into text lines: each line
//! is a baseline polyline plus a boundary polygon around its glyphs, in image
//! coordinates and in reading order.
//!
//! ## Features
//!
//! - Mask-aware preprocessing driven by the model's declared input shape
//! - Skeleton based baseline vectorization with separator-aware orientation
//! - Boundary polygons from the free space between neighbouring baselines
//! - Pluggable reading order policies
//! - Parallel batch segmentation with cooperative cancellation
//!
//! ## Modules
//!
//! * [`core`] - Errors, configuration, inference engine and core traits
//! * [`domain`] - Text direction tags, line records and results
//! * [`models`] - Loaded segmentation models
//! * [`pipeline`] - The page segmentation pipeline
//! * [`processors`] - Pre- and post-processing stages
//! * [`utils`] - Image loading, drawing and logging setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use oar_blla::prelude::*;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let model = SegmentationModel::load("models/blla.onnx", &ModelInferenceConfig::default())?;
//! let page = load_image(Path::new("page.png"))?;
//!
//! let result = segment(&page, "horizontal-lr", None, &PolygonalReadingOrder, &model)?;
//! for line in &result.lines {
//!     println!("{} baseline points", line.baseline.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Reusable segmenter
//!
//! ```rust,no_run
//! use oar_blla::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SegmenterConfig::from_json_str(r#"{ "reading_order": "xy-cut" }"#)?;
//! let segmenter = BaselineSegmenter::load("models/blla.onnx", config)?;
//!
//! let pages = load_images(&["a.png", "b.png"], None)?;
//! for result in segmenter.segment_batch(&pages, TextDirection::HorizontalLr) {
//!     println!("{}", result?.to_json()?);
//! }
//! # Ok(())
//! # }
//! ```

// Core modules
pub mod core;
pub mod domain;
pub mod models;

pub mod pipeline;
pub mod processors;
pub mod utils;

pub use utils::init_tracing;

/// Prelude module for convenient imports.
///
/// Bring the essentials into scope with a single use statement:
///
/// ```rust
/// use oar_blla::prelude::*;
/// ```
///
/// For custom reading order policies or inference engines, import the
/// traits from [`crate::core::traits`].
pub mod prelude {
    // Pipeline (essential)
    pub use crate::pipeline::{BaselineSegmenter, SegmenterConfig, segment};

    // Models and results
    pub use crate::core::config::ModelInferenceConfig;
    pub use crate::domain::{LineRecord, SegmentationResult, TextDirection};
    pub use crate::models::SegmentationModel;
    pub use crate::processors::{
        Point, PolygonalReadingOrder, TopToBottomReadingOrder, XyCutReadingOrder,
    };

    // Error Handling (essential)
    pub use crate::core::{OCRError, OcrResult};

    // Image Utility (minimal)
    pub use crate::utils::{load_image, load_images};
}
