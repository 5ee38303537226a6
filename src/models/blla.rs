//! Baseline segmentation model.
//!
//! The canonical model format is an ONNX graph with an optional JSON sidecar
//! next to it (`model.onnx` → `model.json`):
//!
//! ```json
//! {
//!   "format_version": 1,
//!   "name": "blla",
//!   "input": [1, 3, 1800, 0],
//!   "channels": { "start_separator": 0, "end_separator": 1, "baseline": 2 }
//! }
//! ```
//!
//! `input` overrides the shape declared by the graph, with zero marking a free
//! dimension. `channels` describes the raster output layout.

use crate::core::config::{ConfigValidator, ModelInferenceConfig};
use crate::core::errors::SimpleError;
use crate::core::{InferenceEngine, OCRError, OcrResult, OrtInfer, Tensor4D};
use crate::processors::{RasterChannels, SegmentationPreprocessor};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Sidecar format version understood by this crate.
pub const METADATA_FORMAT_VERSION: u32 = 1;

/// Contents of a model's JSON sidecar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Sidecar format version, must equal [`METADATA_FORMAT_VERSION`].
    pub format_version: u32,
    /// Free-form model name.
    #[serde(default)]
    pub name: Option<String>,
    /// Input shape `(batch, channels, height, width)` overriding the graph's.
    #[serde(default)]
    pub input: Option<Vec<i64>>,
    /// Raster output layout.
    #[serde(default)]
    pub channels: Option<RasterChannels>,
}

impl ModelMetadata {
    /// Location of the sidecar belonging to `model_path`.
    pub fn sidecar_path(model_path: &Path) -> PathBuf {
        model_path.with_extension("json")
    }

    /// Parses and checks sidecar JSON. Errors are reported against `model_path`.
    pub fn from_json_str(json: &str, model_path: &Path) -> OcrResult<Self> {
        let metadata: ModelMetadata = serde_json::from_str(json).map_err(|e| {
            OCRError::model_load_error(
                model_path,
                "malformed model metadata",
                Some("the sidecar must be a JSON object with a format_version field"),
                Some(e),
            )
        })?;

        if metadata.format_version != METADATA_FORMAT_VERSION {
            return Err(OCRError::model_load_error(
                model_path,
                format!(
                    "unsupported metadata format_version {} (expected {})",
                    metadata.format_version, METADATA_FORMAT_VERSION
                ),
                Some("re-export the model metadata with a supported version"),
                None::<SimpleError>,
            ));
        }
        if let Some(shape) = &metadata.input
            && shape.len() != 4
        {
            return Err(OCRError::model_load_error(
                model_path,
                format!("metadata input shape {:?} is not 4D", shape),
                None,
                None::<SimpleError>,
            ));
        }
        Ok(metadata)
    }

    /// Reads the sidecar next to `model_path`, if there is one.
    pub fn load_for(model_path: &Path) -> OcrResult<Option<Self>> {
        let sidecar = Self::sidecar_path(model_path);
        if !sidecar.is_file() {
            return Ok(None);
        }
        let json = std::fs::read_to_string(&sidecar).map_err(|e| {
            OCRError::model_load_error(model_path, "cannot read model metadata", None, Some(e))
        })?;
        debug!("reading model metadata from {}", sidecar.display());
        Self::from_json_str(&json, model_path).map(Some)
    }
}

type RasterEngine = dyn InferenceEngine<Input = Tensor4D, Output = Tensor4D>;

/// A loaded baseline segmentation network.
///
/// Immutable after construction; share it by reference across threads.
#[derive(Debug)]
pub struct SegmentationModel {
    engine: Box<RasterEngine>,
    preprocessor: SegmentationPreprocessor,
    channels: Option<RasterChannels>,
    input_shape: Vec<i64>,
    name: String,
}

impl SegmentationModel {
    /// Loads an ONNX model and its optional metadata sidecar.
    ///
    /// # Errors
    ///
    /// `OCRError::ModelLoad` when the file cannot be opened as an ONNX model,
    /// the sidecar is malformed or of an unsupported version, or the input
    /// shape does not declare a usable channel count.
    pub fn load(path: impl AsRef<Path>, config: &ModelInferenceConfig) -> OcrResult<Self> {
        let path = path.as_ref();
        config.validate()?;

        let metadata = ModelMetadata::load_for(path)?;
        let engine = OrtInfer::from_config(config, path)?;

        let input_shape = metadata
            .as_ref()
            .and_then(|m| m.input.clone())
            .or_else(|| engine.primary_input_shape())
            .ok_or_else(|| {
                OCRError::model_load_error(
                    path,
                    "model input shape is unknown",
                    Some("declare the input shape in the model metadata sidecar"),
                    None::<SimpleError>,
                )
            })?;

        let name = metadata
            .as_ref()
            .and_then(|m| m.name.clone())
            .unwrap_or_else(|| engine.model_name().to_string());
        let channels = metadata.and_then(|m| m.channels);

        let model = Self::assemble(Box::new(engine), &input_shape, channels, name)
            .map_err(|e| {
                OCRError::model_load_error(
                    path,
                    "unusable model input shape",
                    Some("segmentation models take 1 (grayscale) or 3 (RGB) input channels"),
                    Some(e),
                )
            })?;
        info!(
            "loaded segmentation model '{}' from {} (input {:?})",
            model.name,
            path.display(),
            model.input_shape
        );
        Ok(model)
    }

    /// Wraps an existing inference engine.
    ///
    /// `input_shape` is `(batch, channels, height, width)` with non-positive
    /// entries marking free dimensions.
    pub fn from_engine<E>(
        engine: E,
        input_shape: &[i64],
        channels: Option<RasterChannels>,
    ) -> OcrResult<Self>
    where
        E: InferenceEngine<Input = Tensor4D, Output = Tensor4D> + 'static,
    {
        let name = engine.engine_info();
        Self::assemble(Box::new(engine), input_shape, channels, name)
    }

    fn assemble(
        engine: Box<RasterEngine>,
        input_shape: &[i64],
        channels: Option<RasterChannels>,
        name: String,
    ) -> OcrResult<Self> {
        let preprocessor = SegmentationPreprocessor::from_input_shape(input_shape)?;
        Ok(Self {
            engine,
            preprocessor,
            channels,
            input_shape: input_shape.to_vec(),
            name,
        })
    }

    /// Runs the network on a prepared tensor.
    pub fn infer(&self, input: &Tensor4D) -> OcrResult<Tensor4D> {
        self.engine.validate_inference_input(input)?;
        let raster = self.engine.infer(input)?;
        if raster.shape()[0] != 1 {
            return Err(OCRError::tensor_operation_error(
                "raster_validation",
                &[1],
                &[raster.shape()[0]],
                &format!("model '{}' returned a batch of {} rasters", self.name, raster.shape()[0]),
                SimpleError::new("Unexpected raster batch size"),
            ));
        }
        Ok(raster)
    }

    /// Preprocessor matching the model input.
    pub fn preprocessor(&self) -> &SegmentationPreprocessor {
        &self.preprocessor
    }

    /// Raster channel layout declared by the model, if any.
    pub fn raster_channels(&self) -> Option<RasterChannels> {
        self.channels
    }

    /// Declared input shape.
    pub fn input_shape(&self) -> &[i64] {
        &self.input_shape
    }

    /// Model name used in logs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Backend description.
    pub fn engine_info(&self) -> String {
        self.engine.engine_info()
    }
}
