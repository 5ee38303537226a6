//! The core module of the segmentation pipeline.
//!
//! This module contains the fundamental components shared by every stage:
//! - Configuration management and validation
//! - Error handling
//! - ONNX Runtime inference integration
//! - Tensor aliases and input validation helpers
//! - Traits at the pipeline seams (inference engine, reading order)
//! - Cooperative cancellation

pub mod cancellation;
pub mod config;
pub mod errors;
pub mod inference;
pub mod tensor;
pub mod traits;
pub mod validation;

pub use cancellation::CancellationToken;
pub use config::{ConfigError, ConfigValidator, ModelInferenceConfig, OrtSessionConfig};
pub use errors::{OCRError, OcrResult, ProcessingStage};
pub use inference::OrtInfer;
pub use tensor::{Tensor2D, Tensor4D};
pub use traits::{InferenceEngine, ReadingOrder};
