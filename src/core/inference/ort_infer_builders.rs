use super::*;
use crate::core::config::ModelInferenceConfig;
use ort::logging::LogLevel;
use std::path::Path;

impl OrtInfer {
    /// Creates a new OrtInfer instance with default ONNX Runtime settings and a single session.
    pub fn new(model_path: impl AsRef<Path>) -> Result<Self, OCRError> {
        Self::from_config(&ModelInferenceConfig::default(), model_path)
    }

    /// Creates a new OrtInfer instance from ModelInferenceConfig, applying ORT session
    /// configuration and constructing a session pool for concurrent predictions.
    ///
    /// The input name is taken from the configuration, else from the first
    /// input declared by the graph.
    pub fn from_config(
        common: &ModelInferenceConfig,
        model_path: impl AsRef<Path>,
    ) -> Result<Self, OCRError> {
        let path = model_path.as_ref();
        let pool_size = common.session_pool_size.unwrap_or(1).max(1);
        let mut sessions = Vec::with_capacity(pool_size);
        for _ in 0..pool_size {
            let builder = Session::builder()?;
            let builder = if let Some(cfg) = &common.ort_session {
                Self::apply_ort_config(builder, cfg)?
            } else {
                builder.with_log_level(LogLevel::Error)?
            };
            let session = builder.commit_from_file(path).map_err(|e| {
                OCRError::model_load_error(
                    path,
                    "failed to create ONNX session",
                    Some("verify model path and compatibility with selected execution providers"),
                    Some(e),
                )
            })?;
            sessions.push(Mutex::new(session));
        }

        let input_name = match &common.input_name {
            Some(name) => name.clone(),
            None => sessions
                .first()
                .and_then(|s| s.lock().ok())
                .and_then(|s| s.inputs.first().map(|input| input.name.clone()))
                .ok_or_else(|| {
                    OCRError::model_load_error(
                        path,
                        "model declares no inputs",
                        Some("export the segmentation network with a single image input"),
                        None::<crate::core::errors::SimpleError>,
                    )
                })?,
        };

        let model_name = common
            .model_name
            .clone()
            .or_else(|| {
                path.file_stem()
                    .and_then(|s| s.to_str())
                    .map(|s| s.to_string())
            })
            .unwrap_or_else(|| "unknown_model".to_string());

        Ok(OrtInfer {
            sessions,
            next_idx: std::sync::atomic::AtomicUsize::new(0),
            input_name,
            model_path: path.to_path_buf(),
            model_name,
        })
    }
}
