//! Core error types for the segmentation pipeline.
//!
//! This module defines the `OCRError` enum used by every stage, the
//! `ProcessingStage` tag identifying where a failure happened, and a small
//! message-only error used as a `source` when no underlying error exists.

use thiserror::Error;

/// A message-only error used as the `source` of contextual errors.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct SimpleError {
    message: String,
}

impl SimpleError {
    /// Creates a new error carrying only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Stages of the segmentation pipeline.
///
/// Used to identify which stage an error (or a cancellation) occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    /// Input validation and tensor preparation.
    Preprocessing,
    /// Network forward pass.
    Inference,
    /// Raster output to baseline polylines.
    Vectorization,
    /// Polygon estimation around baselines.
    BoundaryEstimation,
    /// Raster to image coordinate mapping.
    Rescaling,
    /// Reading order assignment.
    ReadingOrder,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStage::Preprocessing => write!(f, "preprocessing"),
            ProcessingStage::Inference => write!(f, "inference"),
            ProcessingStage::Vectorization => write!(f, "vectorization"),
            ProcessingStage::BoundaryEstimation => write!(f, "boundary estimation"),
            ProcessingStage::Rescaling => write!(f, "rescaling"),
            ProcessingStage::ReadingOrder => write!(f, "reading order"),
        }
    }
}

/// Errors that can occur while segmenting a page.
///
/// Input validation problems (bad mask, unknown text direction, empty image)
/// surface as [`OCRError::InvalidInput`] before any inference work starts.
/// Model file problems surface as [`OCRError::ModelLoad`].
#[derive(Error, Debug)]
pub enum OCRError {
    /// Error occurred while loading an image.
    #[error("image load")]
    ImageLoad(#[source] image::ImageError),

    /// Error occurred during processing.
    #[error("{kind} failed: {context}")]
    Processing {
        /// The stage of processing where the error occurred.
        kind: ProcessingStage,
        /// Additional context about the error.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error occurred during inference.
    #[error("inference failed in model '{model_name}': {context}")]
    Inference {
        /// The name of the model where inference failed.
        model_name: String,
        /// Additional context about the inference error.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error occurred during model inference with detailed context.
    #[error(
        "model '{model_name}' inference failed: {operation} with input shape {input_shape:?}"
    )]
    ModelInference {
        /// The name of the model where inference failed.
        model_name: String,
        /// The operation that failed (e.g., "forward_pass", "output_extraction").
        operation: String,
        /// The input tensor shape.
        input_shape: Vec<usize>,
        /// Additional context about the error.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error indicating invalid input.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    ConfigError {
        /// A message describing the configuration error.
        message: String,
    },

    /// The run was cancelled through its cancellation token.
    #[error("segmentation cancelled before {stage}")]
    Cancelled {
        /// The stage that was about to start.
        stage: ProcessingStage,
    },

    /// Error from the ONNX Runtime session.
    #[error(transparent)]
    Session(#[from] ort::Error),

    /// Error from tensor operations with detailed context.
    #[error(
        "tensor operation '{operation}' failed: expected shape {expected_shape:?}, got {actual_shape:?} in {context}"
    )]
    TensorOperation {
        /// The tensor operation that failed.
        operation: String,
        /// The expected tensor shape.
        expected_shape: Vec<usize>,
        /// The actual tensor shape.
        actual_shape: Vec<usize>,
        /// Additional context about where the error occurred.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error from basic tensor operations (fallback for ndarray errors).
    #[error("tensor operation")]
    Tensor(#[from] ndarray::ShapeError),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),

    /// Error loading a model file, with context and suggestions.
    #[error("model load failed for '{model_path}': {reason}{suggestion}")]
    ModelLoad {
        /// Path to the model that failed to load
        model_path: String,
        /// Short reason string
        reason: String,
        /// Optional suggestion (prefixed with '; ' when present)
        suggestion: String,
        /// Underlying source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl From<image::ImageError> for OCRError {
    fn from(error: image::ImageError) -> Self {
        Self::ImageLoad(error)
    }
}

impl From<crate::core::config::ConfigError> for OCRError {
    fn from(error: crate::core::config::ConfigError) -> Self {
        Self::ConfigError {
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for OCRError {
    fn from(error: serde_json::Error) -> Self {
        Self::ConfigError {
            message: format!("JSON: {error}"),
        }
    }
}

impl OCRError {
    /// Returns true when the error was caused by invalid caller input.
    pub fn is_input_error(&self) -> bool {
        matches!(self, OCRError::InvalidInput { .. })
    }

    /// Returns true when the error was caused by a model file problem.
    pub fn is_model_load_error(&self) -> bool {
        matches!(self, OCRError::ModelLoad { .. })
    }
}
