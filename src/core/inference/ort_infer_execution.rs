use super::*;
use ndarray::ArrayView4;
use ort::value::TensorRef;

impl OrtInfer {
    /// Returns the name of the first output declared by the graph.
    fn get_output_name(&self) -> Result<String, OCRError> {
        let session = self.sessions[0]
            .lock()
            .map_err(|_| OCRError::InvalidInput {
                message: "Failed to acquire session lock".to_string(),
            })?;
        session
            .outputs
            .first()
            .map(|output| output.name.clone())
            .ok_or_else(|| OCRError::InvalidInput {
                message: "No outputs available in session - model may be invalid or corrupted"
                    .to_string(),
            })
    }

    /// Returns the model name associated with this inference engine.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    fn run_inference_with_processor<T>(
        &self,
        x: &Tensor4D,
        processor: impl FnOnce(&[i64], &[f32]) -> Result<T, OCRError>,
    ) -> Result<T, OCRError> {
        let input_shape = x.shape().to_vec();

        let output_name = self.get_output_name().map_err(|e| {
            OCRError::inference_error(
                &self.model_name,
                &format!(
                    "Failed to get output name for model at '{}'",
                    self.model_path.display()
                ),
                e,
            )
        })?;

        let input_tensor = TensorRef::from_array_view(x.view()).map_err(|e| {
            OCRError::model_inference_error(
                &self.model_name,
                "tensor_conversion",
                &input_shape,
                &format!("Failed to convert input tensor with shape {:?}", input_shape),
                e,
            )
        })?;

        let inputs = ort::inputs![self.input_name.as_str() => input_tensor];

        let idx = self
            .next_idx
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed)
            % self.sessions.len();
        let mut session_guard = self.sessions[idx].lock().map_err(|_| {
            OCRError::inference_error(
                &self.model_name,
                &format!(
                    "Failed to acquire session lock for session {}/{}",
                    idx,
                    self.sessions.len()
                ),
                crate::core::errors::SimpleError::new("Session lock acquisition failed"),
            )
        })?;

        let outputs = session_guard.run(inputs).map_err(|e| {
            OCRError::model_inference_error(
                &self.model_name,
                "forward_pass",
                &input_shape,
                &format!(
                    "ONNX Runtime inference failed with input '{}' -> output '{}'",
                    self.input_name, output_name
                ),
                e,
            )
        })?;

        let (output_shape, output_data) = outputs[output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|e| {
                OCRError::model_inference_error(
                    &self.model_name,
                    "output_extraction",
                    &input_shape,
                    &format!("Failed to extract output tensor '{}' as f32", output_name),
                    e,
                )
            })?;

        processor(output_shape, output_data)
    }

    /// Runs a forward pass producing a `[batch, channels, height, width]` map.
    pub fn infer_4d(&self, x: &Tensor4D) -> Result<Tensor4D, OCRError> {
        self.run_inference_with_processor(x, |output_shape, output_data| {
            if output_shape.len() != 4 {
                return Err(OCRError::tensor_operation_error(
                    "output_validation",
                    &[4],
                    &[output_shape.len()],
                    &format!(
                        "Model '{}': expected 4D output tensor, got {}D with shape {:?}",
                        self.model_name,
                        output_shape.len(),
                        output_shape
                    ),
                    crate::core::errors::SimpleError::new("Invalid output tensor dimensions"),
                ));
            }

            let dims: Vec<usize> = output_shape.iter().map(|&d| d.max(0) as usize).collect();
            let expected_len: usize = dims.iter().product();

            if output_data.len() != expected_len {
                return Err(OCRError::tensor_operation_error(
                    "output_data_validation",
                    &[expected_len],
                    &[output_data.len()],
                    &format!(
                        "Model '{}': output data size mismatch for output shape {:?}",
                        self.model_name, output_shape
                    ),
                    crate::core::errors::SimpleError::new("Output tensor data size mismatch"),
                ));
            }

            let array_view =
                ArrayView4::from_shape((dims[0], dims[1], dims[2], dims[3]), output_data)
                    .map_err(OCRError::Tensor)?;
            Ok(array_view.to_owned())
        })
    }
}
