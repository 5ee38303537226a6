//! Error types for the segmentation pipeline.
//!
//! This module provides the error enum shared by every stage together with
//! helper constructors that attach stage and model context.
//!
//! # Usage
//!
//! ```rust
//! use oar_blla::core::errors::OCRError;
//!
//! let error = OCRError::mask_size_mismatch((400, 300), (800, 600));
//! assert!(error.is_input_error());
//!
//! let config_error = OCRError::config_error("threshold must be between 0 and 1");
//! assert!(config_error.to_string().contains("threshold"));
//! ```

pub mod constructors;
pub mod types;

pub use types::{OCRError, ProcessingStage, SimpleError};

/// Convenient result alias for segmentation operations.
pub type OcrResult<T> = Result<T, OCRError>;
