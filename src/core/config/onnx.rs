//! ONNX Runtime configuration types.

use serde::{Deserialize, Serialize};

use super::errors::{ConfigError, ConfigValidator};

/// Graph optimization levels for ONNX Runtime.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub enum OrtGraphOptimizationLevel {
    /// Disable all optimizations.
    DisableAll,
    /// Enable basic optimizations.
    #[default]
    Level1,
    /// Enable extended optimizations.
    Level2,
    /// Enable all optimizations.
    Level3,
    /// Enable all optimizations (alias for Level3).
    All,
}

/// Execution providers for ONNX Runtime.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum OrtExecutionProvider {
    /// CPU execution provider (always available)
    #[default]
    CPU,
    /// NVIDIA CUDA execution provider (requires the `cuda` feature)
    CUDA {
        /// CUDA device ID (default: 0)
        device_id: Option<i32>,
        /// Memory limit in bytes (optional)
        gpu_mem_limit: Option<usize>,
    },
}

/// Configuration for ONNX Runtime sessions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OrtSessionConfig {
    /// Number of threads used to parallelize execution within nodes
    pub intra_threads: Option<usize>,
    /// Number of threads used to parallelize execution across nodes
    pub inter_threads: Option<usize>,
    /// Enable parallel execution mode
    pub parallel_execution: Option<bool>,
    /// Graph optimization level
    pub optimization_level: Option<OrtGraphOptimizationLevel>,
    /// Execution providers in order of preference
    pub execution_providers: Option<Vec<OrtExecutionProvider>>,
    /// Enable memory pattern optimization
    pub enable_mem_pattern: Option<bool>,
    /// Log severity level (0=Verbose, 1=Info, 2=Warning, 3=Error, 4=Fatal)
    pub log_severity_level: Option<i32>,
}

impl OrtSessionConfig {
    /// Creates a new OrtSessionConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of intra-op threads.
    pub fn with_intra_threads(mut self, threads: usize) -> Self {
        self.intra_threads = Some(threads);
        self
    }

    /// Sets the number of inter-op threads.
    pub fn with_inter_threads(mut self, threads: usize) -> Self {
        self.inter_threads = Some(threads);
        self
    }

    /// Sets the graph optimization level.
    pub fn with_optimization_level(mut self, level: OrtGraphOptimizationLevel) -> Self {
        self.optimization_level = Some(level);
        self
    }

    /// Adds a single execution provider.
    pub fn add_execution_provider(mut self, provider: OrtExecutionProvider) -> Self {
        self.execution_providers
            .get_or_insert_with(Vec::new)
            .push(provider);
        self
    }
}

impl ConfigValidator for OrtSessionConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(threads) = self.intra_threads {
            self.validate_thread_count(threads)?;
        }
        if let Some(threads) = self.inter_threads {
            self.validate_thread_count(threads)?;
        }
        if let Some(level) = self.log_severity_level
            && !(0..=4).contains(&level)
        {
            return Err(ConfigError::InvalidConfig {
                message: format!("log_severity_level must be between 0 and 4, got {level}"),
            });
        }
        Ok(())
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

/// Settings that control how a model file is turned into inference sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelInferenceConfig {
    /// Name used in logs and errors; defaults to the model file stem.
    pub model_name: Option<String>,
    /// Number of ONNX sessions kept for concurrent calls (default: 1).
    pub session_pool_size: Option<usize>,
    /// Name of the graph input; defaults to the first declared input.
    pub input_name: Option<String>,
    /// ONNX Runtime session options.
    pub ort_session: Option<OrtSessionConfig>,
}

impl Default for ModelInferenceConfig {
    fn default() -> Self {
        Self {
            model_name: None,
            session_pool_size: Some(1),
            input_name: None,
            ort_session: None,
        }
    }
}

impl ModelInferenceConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the model name.
    pub fn with_model_name(mut self, name: impl Into<String>) -> Self {
        self.model_name = Some(name.into());
        self
    }

    /// Sets the session pool size.
    pub fn with_session_pool_size(mut self, size: usize) -> Self {
        self.session_pool_size = Some(size);
        self
    }

    /// Sets the ONNX Runtime session options.
    pub fn with_ort_session(mut self, config: OrtSessionConfig) -> Self {
        self.ort_session = Some(config);
        self
    }
}

impl ConfigValidator for ModelInferenceConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.session_pool_size == Some(0) {
            return Err(ConfigError::InvalidConfig {
                message: "session_pool_size must be greater than 0".to_string(),
            });
        }
        if let Some(ort) = &self.ort_session {
            ort.validate()?;
        }
        Ok(())
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_execution_provider() {
        let config = OrtSessionConfig::new()
            .add_execution_provider(OrtExecutionProvider::CPU)
            .add_execution_provider(OrtExecutionProvider::CUDA {
                device_id: Some(0),
                gpu_mem_limit: None,
            });
        assert_eq!(config.execution_providers.map(|p| p.len()), Some(2));
    }

    #[test]
    fn test_model_inference_config_validation() {
        assert!(ModelInferenceConfig::default().validate().is_ok());
        assert!(
            ModelInferenceConfig::default()
                .with_session_pool_size(0)
                .validate()
                .is_err()
        );
        let bad_threads = ModelInferenceConfig::default()
            .with_ort_session(OrtSessionConfig::new().with_intra_threads(0));
        assert!(bad_threads.validate().is_err());
    }

    #[test]
    fn test_deserialize_partial_json() {
        let config: ModelInferenceConfig =
            serde_json::from_str(r#"{ "model_name": "blla", "ort_session": { "intra_threads": 2 } }"#)
                .unwrap();
        assert_eq!(config.model_name.as_deref(), Some("blla"));
        assert_eq!(config.session_pool_size, Some(1));
        assert_eq!(config.ort_session.and_then(|o| o.intra_threads), Some(2));
    }
}
