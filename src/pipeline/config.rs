//! Segmenter configuration and its file loader.

use crate::core::OCRError;
use crate::core::config::{ConfigError, ConfigValidator, ModelInferenceConfig};
use crate::processors::{BoundaryConfig, RasterChannels, ReadingOrderKind, VectorizerConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings for a [`BaselineSegmenter`](super::BaselineSegmenter).
///
/// Every section is optional in a configuration file:
///
/// ```json
/// {
///   "vectorizer": { "threshold": 0.3 },
///   "boundary": { "descender_ratio": 0.3 },
///   "reading_order": "xy-cut",
///   "inference": { "session_pool_size": 2 }
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmenterConfig {
    /// Raster to baseline settings.
    pub vectorizer: VectorizerConfig,
    /// Boundary polygon settings.
    pub boundary: BoundaryConfig,
    /// Raster channel roles, used when the model does not declare its own.
    pub channels: RasterChannels,
    /// Reading order policy.
    pub reading_order: ReadingOrderKind,
    /// Model loading and session settings.
    pub inference: ModelInferenceConfig,
}

impl SegmenterConfig {
    /// Parses a JSON configuration and validates it.
    pub fn from_json_str(content: &str) -> Result<Self, OCRError> {
        let config: SegmenterConfig =
            serde_json::from_str(content).map_err(|e| OCRError::ConfigError {
                message: format!("Failed to parse JSON config: {}", e),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a JSON configuration file.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use oar_blla::pipeline::SegmenterConfig;
    ///
    /// let config = SegmenterConfig::from_file("segmenter.json")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, OCRError> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => {}
            other => {
                return Err(OCRError::ConfigError {
                    message: format!("Unsupported config file extension: {:?}", other),
                });
            }
        }
        let content = std::fs::read_to_string(path).map_err(|e| OCRError::ConfigError {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;
        Self::from_json_str(&content)
    }
}

impl ConfigValidator for SegmenterConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.vectorizer.validate()?;
        self.boundary.validate()?;
        self.inference.validate()?;
        Ok(())
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}
