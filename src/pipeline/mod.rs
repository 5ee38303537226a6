//! The segmentation pipeline.
//!
//! [`segment`] runs one page through a loaded model with default settings.
//! [`BaselineSegmenter`] keeps a model, its configuration and a reading order
//! policy together for repeated and batched use.

mod config;
mod segmenter;

pub use config::SegmenterConfig;
pub use segmenter::{BaselineSegmenter, segment};
