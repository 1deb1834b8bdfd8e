//! ONNX Runtime integration for the evaluation harness.
//!
//! This module wraps an `ort` session behind the small surface the model
//! variants need: load weights onto a resolved compute target, then run a
//! no-gradient forward pass and hand back the raw score tensor. All heavy
//! numerics stay on the ONNX Runtime side of this boundary.

use crate::core::config::ComputeTarget;
use crate::core::errors::DensityError;
use crate::core::{Tensor2D, Tensor4D};
use ort::execution_providers::ExecutionProviderDispatch;
use ort::logging::LogLevel;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::Path;
use std::sync::Mutex;

/// The four per-view input tensors fed to the image-based model variant.
///
/// Field order matches the standard screening study: both craniocaudal views
/// first, then both mediolateral-oblique views. The field names double as
/// the ONNX input names of the exported graph.
pub struct ViewFeeds<'a> {
    pub l_cc: &'a Tensor4D,
    pub r_cc: &'a Tensor4D,
    pub l_mlo: &'a Tensor4D,
    pub r_mlo: &'a Tensor4D,
}

/// A struct for performing inference using ONNX Runtime models.
///
/// Holds a single session created once at startup against the resolved
/// compute target. Session creation is version-sensitive: a weights file
/// whose parameter shapes do not match the graph fails here, before any
/// case is read.
pub struct OrtInfer {
    /// The ONNX Runtime session.
    session: Mutex<Session>,
    /// The name of the input tensor for single-input graphs.
    input_name: String,
    /// The name of the output tensor (discovered from the session if unset).
    output_name: Option<String>,
    /// The path to the model file for error context.
    model_path: std::path::PathBuf,
    /// The model name for error context.
    model_name: String,
}

impl std::fmt::Debug for OrtInfer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrtInfer")
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .field("model_path", &self.model_path)
            .field("model_name", &self.model_name)
            .finish()
    }
}

impl OrtInfer {
    /// Loads a session from a weights file onto the given compute target.
    ///
    /// # Arguments
    ///
    /// * `model_path` - The path to the ONNX model file.
    /// * `target` - The compute target resolved at startup.
    /// * `input_name` - The input tensor name for single-input graphs
    ///   (defaults to `"x"`).
    ///
    /// # Errors
    ///
    /// Fails if the weights file is missing or incompatible, or if the
    /// requested execution provider cannot be registered.
    pub fn load(
        model_path: impl AsRef<Path>,
        target: &ComputeTarget,
        input_name: Option<&str>,
    ) -> Result<Self, DensityError> {
        let path = model_path.as_ref();
        let providers = Self::execution_providers(target)?;
        let session = Session::builder()?
            .with_log_level(LogLevel::Error)?
            .with_execution_providers(providers)?
            .commit_from_file(path)
            .map_err(|e| {
                DensityError::model_load(
                    path,
                    "failed to create ONNX session; verify weights file and compute target",
                    e,
                )
            })?;

        let model_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown_model")
            .to_string();

        Ok(OrtInfer {
            session: Mutex::new(session),
            input_name: input_name.unwrap_or("x").to_string(),
            output_name: None,
            model_path: path.to_path_buf(),
            model_name,
        })
    }

    /// Maps the compute target onto ONNX Runtime execution providers.
    ///
    /// The CUDA provider is gated behind the `cuda` cargo feature and set to
    /// error on registration failure so an unavailable accelerator aborts at
    /// startup instead of silently falling back.
    fn execution_providers(
        target: &ComputeTarget,
    ) -> Result<Vec<ExecutionProviderDispatch>, DensityError> {
        match target {
            ComputeTarget::Cpu => Ok(vec![
                ort::execution_providers::CPUExecutionProvider::default().build(),
            ]),
            #[cfg(feature = "cuda")]
            ComputeTarget::Cuda { device_id } => Ok(vec![
                ort::execution_providers::CUDAExecutionProvider::default()
                    .with_device_id(*device_id)
                    .build()
                    .error_on_failure(),
            ]),
            #[cfg(not(feature = "cuda"))]
            ComputeTarget::Cuda { .. } => Err(DensityError::config_error(
                "gpu device requested but the cuda feature is not enabled",
            )),
        }
    }

    /// Returns the model path associated with this inference engine.
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Returns the model name associated with this inference engine.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Returns the configured or discovered output tensor name.
    fn get_output_name(&self) -> Result<String, DensityError> {
        if let Some(ref name) = self.output_name {
            Ok(name.clone())
        } else {
            let session = self.session.lock().map_err(|_| {
                DensityError::invalid_input("failed to acquire session lock")
            })?;
            if let Some(output) = session.outputs.first() {
                Ok(output.name.clone())
            } else {
                Err(DensityError::invalid_input(
                    "no outputs available in session - model may be invalid or corrupted",
                ))
            }
        }
    }

    /// Runs inference on a single 2D input tensor and returns the 2D output.
    ///
    /// Used by the histogram variant, whose input is a `[1, 4 * bins]`
    /// feature vector.
    pub fn infer_2d(&self, x: &Tensor2D) -> Result<Tensor2D, DensityError> {
        let input_shape = x.shape().to_vec();
        let batch_size = input_shape[0];
        let output_name = self.get_output_name()?;

        let input_tensor = TensorRef::from_array_view(x.view()).map_err(|e| {
            DensityError::inference(
                &self.model_name,
                format!("failed to convert input tensor with shape {input_shape:?}"),
                e,
            )
        })?;
        let inputs = ort::inputs![self.input_name.as_str() => input_tensor];

        let mut session = self.session.lock().map_err(|_| {
            DensityError::invalid_input("failed to acquire session lock")
        })?;
        let outputs = session.run(inputs).map_err(|e| {
            DensityError::inference(
                &self.model_name,
                format!(
                    "forward pass failed with input '{}' -> output '{}'",
                    self.input_name, output_name
                ),
                e,
            )
        })?;

        let (output_shape, output_data) = outputs[output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|e| {
                DensityError::inference(
                    &self.model_name,
                    format!("failed to extract output tensor '{output_name}' as f32"),
                    e,
                )
            })?;

        extract_2d(&self.model_name, batch_size, output_shape, output_data)
    }

    /// Runs inference on the four per-view tensors and returns the 2D output.
    ///
    /// Used by the image-based variant, whose exported graph declares one
    /// named input per view.
    pub fn infer_2d_views(&self, feeds: ViewFeeds<'_>) -> Result<Tensor2D, DensityError> {
        let batch_size = feeds.l_cc.shape()[0];
        let output_name = self.get_output_name()?;

        let feed_error = |e: ort::Error| {
            DensityError::inference(&self.model_name, "failed to convert view tensor", e)
        };
        let l_cc = TensorRef::from_array_view(feeds.l_cc.view()).map_err(feed_error)?;
        let r_cc = TensorRef::from_array_view(feeds.r_cc.view()).map_err(feed_error)?;
        let l_mlo = TensorRef::from_array_view(feeds.l_mlo.view()).map_err(feed_error)?;
        let r_mlo = TensorRef::from_array_view(feeds.r_mlo.view()).map_err(feed_error)?;
        let inputs = ort::inputs![
            "l_cc" => l_cc,
            "r_cc" => r_cc,
            "l_mlo" => l_mlo,
            "r_mlo" => r_mlo
        ];

        let mut session = self.session.lock().map_err(|_| {
            DensityError::invalid_input("failed to acquire session lock")
        })?;
        let outputs = session.run(inputs).map_err(|e| {
            DensityError::inference(
                &self.model_name,
                format!("forward pass failed with four view inputs -> output '{output_name}'"),
                e,
            )
        })?;

        let (output_shape, output_data) = outputs[output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|e| {
                DensityError::inference(
                    &self.model_name,
                    format!("failed to extract output tensor '{output_name}' as f32"),
                    e,
                )
            })?;

        extract_2d(&self.model_name, batch_size, output_shape, output_data)
    }
}

/// Validates a raw 2D output and copies it into an owned tensor.
fn extract_2d(
    model_name: &str,
    batch_size: usize,
    output_shape: &[i64],
    output_data: &[f32],
) -> Result<Tensor2D, DensityError> {
    if output_shape.len() != 2 {
        return Err(DensityError::invalid_input(format!(
            "model '{}' expected 2D output tensor, got {}D with shape {:?}",
            model_name,
            output_shape.len(),
            output_shape
        )));
    }

    let num_classes = output_shape[1] as usize;
    let expected_len = batch_size * num_classes;
    if output_data.len() != expected_len {
        return Err(DensityError::invalid_input(format!(
            "model '{}' output data size mismatch: expected {}, got {}",
            model_name,
            expected_len,
            output_data.len()
        )));
    }

    let array_view = ndarray::ArrayView2::from_shape((batch_size, num_classes), output_data)
        .map_err(DensityError::Tensor)?;
    Ok(array_view.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_fails_on_missing_weights() {
        let result = OrtInfer::load("nonexistent_model.onnx", &ComputeTarget::Cpu, None);
        assert!(result.is_err());
    }

    #[test]
    fn test_extract_2d_rejects_wrong_rank() {
        let data = vec![0.0f32; 8];
        let result = extract_2d("test", 1, &[1, 2, 4], &data);
        assert!(result.is_err());
    }

    #[test]
    fn test_extract_2d_rejects_size_mismatch() {
        let data = vec![0.0f32; 3];
        let result = extract_2d("test", 1, &[1, 4], &data);
        assert!(result.is_err());
    }

    #[test]
    fn test_extract_2d_copies_scores() {
        let data = vec![0.1f32, 0.2, 0.3, 0.4];
        let output = extract_2d("test", 1, &[1, 4], &data).unwrap();
        assert_eq!(output.shape(), &[1, 4]);
        assert_eq!(output[[0, 3]], 0.4);
    }
}
