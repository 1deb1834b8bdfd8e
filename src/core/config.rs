//! Configuration types for the evaluation harness.
//!
//! The configuration is constructed once from command-line input and not
//! mutated thereafter: which model variant to run, where its weights live,
//! which compute target to use, and how many histogram bins the histogram
//! variant consumes.

use crate::core::errors::DensityError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default number of bins for the histogram model variant.
pub const DEFAULT_HISTOGRAM_BINS: usize = 50;

/// Default root directory containing one subdirectory per case.
pub const DEFAULT_DATA_ROOT: &str = "/tmp/mgr";

/// The model variant to evaluate.
///
/// Selection is by a string discriminator on the command line; an
/// unrecognized value fails fast, before any weights or images are touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelKind {
    /// Image-based variant: four permuted per-view image tensors.
    Cnn,
    /// Histogram-based variant: one concatenated bin-count feature vector.
    Histogram,
}

impl ModelKind {
    /// Returns the default weights path for this variant.
    pub fn default_model_path(self) -> PathBuf {
        match self {
            ModelKind::Cnn => PathBuf::from("saved_models/density_cnn.onnx"),
            ModelKind::Histogram => PathBuf::from("saved_models/density_histogram.onnx"),
        }
    }
}

impl FromStr for ModelKind {
    type Err = DensityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cnn" => Ok(ModelKind::Cnn),
            "histogram" => Ok(ModelKind::Histogram),
            other => Err(DensityError::config_error(format!(
                "unknown model type '{other}' (expected 'cnn' or 'histogram')"
            ))),
        }
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelKind::Cnn => write!(f, "cnn"),
            ModelKind::Histogram => write!(f, "histogram"),
        }
    }
}

/// The device class requested on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceKind {
    /// General-purpose processor (always available).
    Cpu,
    /// CUDA accelerator.
    Gpu,
}

impl FromStr for DeviceKind {
    type Err = DensityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cpu" => Ok(DeviceKind::Cpu),
            "gpu" => Ok(DeviceKind::Gpu),
            other => Err(DensityError::config_error(format!(
                "unknown device type '{other}' (expected 'cpu' or 'gpu')"
            ))),
        }
    }
}

impl std::fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceKind::Cpu => write!(f, "cpu"),
            DeviceKind::Gpu => write!(f, "gpu"),
        }
    }
}

/// The compute target resolved once at startup and injected into session
/// construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputeTarget {
    /// Run on the CPU execution provider.
    Cpu,
    /// Run on the CUDA execution provider with the given device index.
    Cuda {
        /// CUDA device index.
        device_id: i32,
    },
}

impl ComputeTarget {
    /// Resolves the compute target from the requested device class and GPU
    /// index.
    pub fn resolve(device: DeviceKind, gpu_number: i32) -> Self {
        match device {
            DeviceKind::Cpu => ComputeTarget::Cpu,
            DeviceKind::Gpu => ComputeTarget::Cuda {
                device_id: gpu_number,
            },
        }
    }
}

impl std::fmt::Display for ComputeTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComputeTarget::Cpu => write!(f, "cpu"),
            ComputeTarget::Cuda { device_id } => write!(f, "cuda:{device_id}"),
        }
    }
}

/// The parameter record for one evaluation run.
///
/// Built from the command line in `main`, validated once, then treated as
/// read-only by the rest of the harness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Which model variant to evaluate.
    pub model: ModelKind,
    /// Path to the serialized weights; `None` derives the default path from
    /// the model variant.
    pub model_path: Option<PathBuf>,
    /// Requested device class.
    pub device: DeviceKind,
    /// CUDA device index, used when `device` is `Gpu`.
    pub gpu_number: i32,
    /// Number of histogram bins per view for the histogram variant.
    pub bins_histogram: usize,
    /// Root directory containing one subdirectory per case.
    pub data_root: PathBuf,
}

impl EvalConfig {
    /// Creates a configuration for the given model variant with default
    /// settings: CPU device, 50 histogram bins, the default data root, and
    /// the variant's default weights path.
    pub fn new(model: ModelKind) -> Self {
        Self {
            model,
            model_path: None,
            device: DeviceKind::Cpu,
            gpu_number: 0,
            bins_histogram: DEFAULT_HISTOGRAM_BINS,
            data_root: PathBuf::from(DEFAULT_DATA_ROOT),
        }
    }

    /// Sets the weights path.
    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = Some(path.into());
        self
    }

    /// Sets the device class.
    pub fn with_device(mut self, device: DeviceKind) -> Self {
        self.device = device;
        self
    }

    /// Sets the CUDA device index.
    pub fn with_gpu_number(mut self, gpu_number: i32) -> Self {
        self.gpu_number = gpu_number;
        self
    }

    /// Sets the histogram bin count.
    pub fn with_bins(mut self, bins: usize) -> Self {
        self.bins_histogram = bins;
        self
    }

    /// Sets the data root.
    pub fn with_data_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.data_root = root.into();
        self
    }

    /// Returns the effective weights path: the explicit one if set, the
    /// variant default otherwise.
    pub fn model_path(&self) -> PathBuf {
        self.model_path
            .clone()
            .unwrap_or_else(|| self.model.default_model_path())
    }

    /// Returns the compute target resolved from the device fields.
    pub fn compute_target(&self) -> ComputeTarget {
        ComputeTarget::resolve(self.device, self.gpu_number)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the histogram bin count is zero or
    /// the weights file does not exist.
    pub fn validate(&self) -> Result<(), DensityError> {
        if self.bins_histogram == 0 {
            return Err(DensityError::config_error(
                "bins-histogram must be greater than 0",
            ));
        }

        let model_path = self.model_path();
        if !model_path.exists() {
            return Err(DensityError::config_error(format!(
                "weights file not found: {}",
                model_path.display()
            )));
        }

        Ok(())
    }

    /// Returns the data root as a path.
    pub fn data_root(&self) -> &Path {
        &self.data_root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_kind_from_str() {
        assert_eq!("cnn".parse::<ModelKind>().unwrap(), ModelKind::Cnn);
        assert_eq!(
            "histogram".parse::<ModelKind>().unwrap(),
            ModelKind::Histogram
        );
    }

    #[test]
    fn test_model_kind_rejects_unknown_type() {
        let err = "resnet".parse::<ModelKind>().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("resnet"));
        assert!(message.contains("unknown model type"));
    }

    #[test]
    fn test_device_kind_from_str() {
        assert_eq!("cpu".parse::<DeviceKind>().unwrap(), DeviceKind::Cpu);
        assert_eq!("gpu".parse::<DeviceKind>().unwrap(), DeviceKind::Gpu);
        assert!("tpu".parse::<DeviceKind>().is_err());
    }

    #[test]
    fn test_default_model_paths() {
        assert_eq!(
            ModelKind::Cnn.default_model_path(),
            PathBuf::from("saved_models/density_cnn.onnx")
        );
        assert_eq!(
            ModelKind::Histogram.default_model_path(),
            PathBuf::from("saved_models/density_histogram.onnx")
        );
    }

    #[test]
    fn test_compute_target_resolution() {
        assert_eq!(
            ComputeTarget::resolve(DeviceKind::Cpu, 3),
            ComputeTarget::Cpu
        );
        assert_eq!(
            ComputeTarget::resolve(DeviceKind::Gpu, 3),
            ComputeTarget::Cuda { device_id: 3 }
        );
    }

    #[test]
    fn test_config_defaults() {
        let config = EvalConfig::new(ModelKind::Histogram);
        assert_eq!(config.bins_histogram, DEFAULT_HISTOGRAM_BINS);
        assert_eq!(config.device, DeviceKind::Cpu);
        assert_eq!(config.data_root, PathBuf::from(DEFAULT_DATA_ROOT));
        assert_eq!(
            config.model_path(),
            PathBuf::from("saved_models/density_histogram.onnx")
        );
    }

    #[test]
    fn test_validate_rejects_zero_bins() {
        let config = EvalConfig::new(ModelKind::Histogram).with_bins(0);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("bins-histogram"));
    }
}
