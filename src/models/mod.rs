//! The two pretrained model variants behind a single scoring capability.
//!
//! Variant selection is driven by [`ModelKind`](crate::core::ModelKind):
//! the image-based CNN consumes four per-view tensors, the histogram model
//! consumes one concatenated bin-count feature vector. Both produce a
//! 4-element score vector per case.

pub mod cnn;
pub mod histogram;

pub use cnn::{CnnDensityModel, CnnModelConfig};
pub use histogram::{HistogramDensityModel, HistogramModelConfig};

use crate::core::{DensityError, EvalConfig, ModelKind};
use crate::domain::{CaseImages, DensityScores};
use tracing::info;

/// Capability shared by the model variants: given the loaded views of one
/// case, produce a 4-element score vector.
pub trait DensityScorer {
    /// Runs a no-gradient forward pass over one case.
    fn score(&self, images: &CaseImages) -> Result<DensityScores, DensityError>;

    /// Returns the name of the underlying model, for diagnostics.
    fn model_name(&self) -> &str;
}

/// Constructs the scorer selected by the configuration.
///
/// Weights are loaded onto the compute target resolved from the
/// configuration; any configuration or device problem surfaces here, before
/// a single case is read.
pub fn build_scorer(config: &EvalConfig) -> Result<Box<dyn DensityScorer>, DensityError> {
    let target = config.compute_target();
    let model_path = config.model_path();
    info!(
        model = %config.model,
        weights = %model_path.display(),
        target = %target,
        "loading density model"
    );

    match config.model {
        ModelKind::Cnn => {
            let model = CnnDensityModel::new(CnnModelConfig::default(), &model_path, &target)?;
            Ok(Box::new(model))
        }
        ModelKind::Histogram => {
            let model_config = HistogramModelConfig {
                bins: config.bins_histogram,
            };
            let model = HistogramDensityModel::new(model_config, &model_path, &target)?;
            Ok(Box::new(model))
        }
    }
}
