//! Error types for the evaluation harness.
//!
//! This module defines the error types that can occur while evaluating a
//! density model, including image loading errors, preprocessing errors,
//! inference errors, case data errors, and configuration errors. It also
//! provides utility functions for creating these errors with appropriate
//! context.

use std::path::Path;
use thiserror::Error;

/// Enum representing different stages of preprocessing.
///
/// This enum is used to identify which stage of the pipeline an error
/// occurred in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProcessingStage {
    /// Error occurred during view normalization.
    Normalization,
    /// Error occurred during histogram feature extraction.
    HistogramFeatures,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStage::Normalization => write!(f, "normalization"),
            ProcessingStage::HistogramFeatures => write!(f, "histogram features"),
        }
    }
}

/// Enum representing the errors that can occur in the evaluation harness.
#[derive(Error, Debug)]
pub enum DensityError {
    /// Error occurred while loading an image.
    #[error("image load")]
    ImageLoad(#[source] image::ImageError),

    /// Error occurred during preprocessing.
    #[error("{kind} failed: {context}")]
    Processing {
        /// The stage of processing where the error occurred.
        kind: ProcessingStage,
        /// Additional context about the error.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error occurred while loading model weights.
    #[error("model load '{path}': {context}")]
    ModelLoad {
        /// The path to the weights file.
        path: String,
        /// Additional context about the failure.
        context: String,
        /// The underlying ONNX Runtime error.
        #[source]
        source: ort::Error,
    },

    /// Error occurred during inference.
    #[error("inference with model '{model_name}': {context}")]
    Inference {
        /// The name of the model that failed.
        model_name: String,
        /// Additional context about the failure.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error indicating invalid input.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    ConfigError {
        /// A message describing the configuration error.
        message: String,
    },

    /// Error indicating malformed or missing case data (label files, views).
    #[error("case data: {message}")]
    CaseData {
        /// A message describing what is wrong with the case.
        message: String,
        /// The underlying error, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Error from the ONNX Runtime session.
    #[error(transparent)]
    Session(#[from] ort::Error),

    /// Error from tensor operations.
    #[error("tensor operation")]
    Tensor(#[from] ndarray::ShapeError),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

/// Convenient result alias for evaluation operations.
pub type DensityResult<T> = Result<T, DensityError>;

impl DensityError {
    /// Creates a DensityError for a preprocessing operation.
    ///
    /// # Arguments
    ///
    /// * `kind` - The stage of processing where the error occurred.
    /// * `context` - Additional context about the error.
    /// * `error` - The underlying error that caused this error.
    pub fn processing(
        kind: ProcessingStage,
        context: impl Into<String>,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            kind,
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates a DensityError for a failed weights load.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the weights file.
    /// * `context` - Additional context about the failure.
    /// * `error` - The underlying ONNX Runtime error.
    pub fn model_load(path: &Path, context: impl Into<String>, error: ort::Error) -> Self {
        Self::ModelLoad {
            path: path.display().to_string(),
            context: context.into(),
            source: error,
        }
    }

    /// Creates a DensityError for a failed forward pass.
    ///
    /// # Arguments
    ///
    /// * `model_name` - The name of the model that failed.
    /// * `context` - Additional context about the failure.
    /// * `error` - The underlying error that caused this error.
    pub fn inference(
        model_name: impl Into<String>,
        context: impl Into<String>,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Inference {
            model_name: model_name.into(),
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates a DensityError for invalid input.
    ///
    /// # Arguments
    ///
    /// * `message` - A message describing the invalid input.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a DensityError for configuration errors.
    ///
    /// # Arguments
    ///
    /// * `message` - A message describing the configuration error.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Creates a DensityError for malformed or missing case data.
    ///
    /// # Arguments
    ///
    /// * `message` - A message describing what is wrong with the case.
    pub fn case_data(message: impl Into<String>) -> Self {
        Self::CaseData {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a DensityError for case data with an underlying cause.
    ///
    /// # Arguments
    ///
    /// * `message` - A message describing what is wrong with the case.
    /// * `error` - The underlying error that caused this error.
    pub fn case_data_with_source(
        message: impl Into<String>,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::CaseData {
            message: message.into(),
            source: Some(Box::new(error)),
        }
    }
}

impl From<image::ImageError> for DensityError {
    fn from(error: image::ImageError) -> Self {
        Self::ImageLoad(error)
    }
}
