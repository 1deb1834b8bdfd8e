//! The core module of the evaluation harness.
//!
//! This module contains the fundamental components shared by the rest of the
//! crate, including:
//! - Error handling
//! - Configuration management (model selection, compute target, bins)
//! - ONNX Runtime inference integration
//!
//! It also provides re-exports of commonly used types and functions for
//! convenience.

pub mod config;
pub mod errors;
pub mod inference;

pub use config::{ComputeTarget, DeviceKind, EvalConfig, ModelKind};
pub use errors::{DensityError, DensityResult, ProcessingStage};
pub use inference::{OrtInfer, ViewFeeds};

/// A 2-dimensional tensor represented as a 2D array of f32 values.
pub type Tensor2D = ndarray::Array2<f32>;

/// A 4-dimensional tensor represented as a 4D array of f32 values.
pub type Tensor4D = ndarray::Array4<f32>;

/// Initializes the tracing subscriber for logging.
///
/// This function sets up the tracing subscriber with environment filter and
/// formatting layer. It's typically called at the start of an application to
/// enable logging. Diagnostics go to stderr so the per-case report stream on
/// stdout stays clean.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
