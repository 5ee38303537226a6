//! Component traits for the segmentation pipeline.
//!
//! ```text
//! ┌─────────────┐    ┌─────────────┐    ┌──────────────┐
//! │Preprocessor │───▶│InferenceEng │───▶│Vectorization │
//! │• prepare    │    │• infer      │    │• baselines   │
//! │• mask check │    │• engine_info│    │• boundaries  │
//! └─────────────┘    └─────────────┘    └──────────────┘
//! ```

use crate::core::OCRError;
use std::fmt::Debug;

/// Trait for model inference operations.
///
/// Implementations must be deterministic for fixed weights and must not
/// mutate caller-visible state, so a single engine can be shared across
/// concurrent segmentation calls.
pub trait InferenceEngine: Send + Sync + Debug {
    /// Input type for inference (typically a tensor)
    type Input: Send + Sync + Debug;

    /// Output type from inference (typically a tensor)
    type Output: Send + Sync + Debug;

    /// Perform inference on preprocessed input.
    fn infer(&self, input: &Self::Input) -> Result<Self::Output, OCRError>;

    /// String describing the inference engine (model type, backend, etc.)
    fn engine_info(&self) -> String;

    /// Validate that the input is suitable for inference.
    fn validate_inference_input(&self, _input: &Self::Input) -> Result<(), OCRError> {
        Ok(())
    }
}
