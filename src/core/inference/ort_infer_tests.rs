use super::*;
use crate::core::config::{ModelInferenceConfig, OrtExecutionProvider, OrtSessionConfig};

#[test]
fn test_missing_model_is_model_load_error() {
    let result = OrtInfer::new("does_not_exist.onnx");
    assert!(matches!(result, Err(OCRError::ModelLoad { .. })));
}

#[test]
fn test_from_config_reports_path() {
    let config = ModelInferenceConfig::new()
        .with_model_name("blla")
        .with_session_pool_size(2);
    let err = OrtInfer::from_config(&config, "dummy_path.onnx").unwrap_err();
    assert!(err.is_model_load_error());
    assert!(err.to_string().contains("dummy_path.onnx"));
}

#[cfg(not(feature = "cuda"))]
#[test]
fn test_cuda_provider_without_feature_is_rejected() {
    let cfg = OrtSessionConfig::new().add_execution_provider(OrtExecutionProvider::CUDA {
        device_id: Some(0),
        gpu_mem_limit: None,
    });
    let eps = cfg.execution_providers.unwrap_or_default();
    assert!(OrtInfer::build_execution_providers(&eps).is_err());
}
