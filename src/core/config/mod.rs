//! Configuration management for the segmentation pipeline.
//!
//! This module provides configuration types, validation traits, and utilities
//! for managing inference and post-processing settings.

pub mod derive;
pub mod errors;
pub mod onnx;

pub use errors::{ConfigError, ConfigValidator, ConfigValidatorExt};
pub use onnx::*;
