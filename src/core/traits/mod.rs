//! Trait definitions for the segmentation pipeline.
//!
//! The pipeline has two seams where implementations are swapped without
//! touching the other stages:
//!
//! - [`InferenceEngine`]: the network forward pass (ONNX Runtime in production,
//!   a fixed raster in tests).
//! - [`ReadingOrder`]: the policy that orders the finished lines.

pub mod granular;
pub mod reading_order;

pub use granular::InferenceEngine;
pub use reading_order::ReadingOrder;
