//! Domain-level structures shared across the segmentation pipeline.
//!
//! This module groups the text direction tags accepted at the pipeline
//! boundary and the line records / results it returns.

pub mod segmentation;
pub mod text_direction;

pub use segmentation::{LineRecord, SegmentationResult, SegmentationType};
pub use text_direction::{ReadingDirection, TextDirection};
