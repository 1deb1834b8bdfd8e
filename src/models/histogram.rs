//! The histogram-based density model variant.
//!
//! The four views are reduced to one concatenated bin-count feature vector
//! of length `4 * bins`; the graph maps it to the four density scores. The
//! bin count is configurable but the output length is always 4.

use crate::core::{ComputeTarget, DensityError, OrtInfer};
use crate::domain::{CaseImages, DensityScores};
use crate::models::DensityScorer;
use crate::processors::HistogramFeatures;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the histogram model variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistogramModelConfig {
    /// Number of histogram bins per view.
    pub bins: usize,
}

impl Default for HistogramModelConfig {
    fn default() -> Self {
        Self {
            bins: crate::core::config::DEFAULT_HISTOGRAM_BINS,
        }
    }
}

/// The histogram-based density model.
#[derive(Debug)]
pub struct HistogramDensityModel {
    /// Bin-count feature generator.
    features: HistogramFeatures,
    /// ONNX Runtime inference engine.
    infer: OrtInfer,
}

impl HistogramDensityModel {
    /// Loads the histogram variant from a weights file.
    ///
    /// # Arguments
    ///
    /// * `config` - Configuration for the variant
    /// * `model_path` - Path to the ONNX weights
    /// * `target` - The compute target resolved at startup
    ///
    /// # Errors
    ///
    /// Fails on a zero bin count or an unreadable/incompatible weights file.
    /// A weights file exported for a different bin count fails at the
    /// session's shape check.
    pub fn new(
        config: HistogramModelConfig,
        model_path: &Path,
        target: &ComputeTarget,
    ) -> Result<Self, DensityError> {
        Ok(Self {
            features: HistogramFeatures::new(config.bins)?,
            infer: OrtInfer::load(model_path, target, None)?,
        })
    }

    /// Returns the configured bin count.
    pub fn bins(&self) -> usize {
        self.features.bins()
    }
}

impl DensityScorer for HistogramDensityModel {
    fn score(&self, images: &CaseImages) -> Result<DensityScores, DensityError> {
        let features = self.features.features(images)?;
        let output = self.infer.infer_2d(&features)?;

        DensityScores::from_row(output.row(0).as_slice().ok_or_else(|| {
            DensityError::invalid_input("model output row is not contiguous")
        })?)
    }

    fn model_name(&self) -> &str {
        self.infer.model_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bin_count() {
        assert_eq!(HistogramModelConfig::default().bins, 50);
    }
}
