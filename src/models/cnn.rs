//! The image-based density model variant.
//!
//! Each of the four views is normalized into a `[1, 1, H, W]` tensor and fed
//! to the exported graph as a separate named input. The graph was exported
//! in inference mode: it carries no dropout and no injected noise, so a
//! forward pass is deterministic.

use crate::core::{ComputeTarget, DensityError, OrtInfer, Tensor4D, ViewFeeds};
use crate::domain::{CaseImages, DensityScores, MammogramView};
use crate::models::DensityScorer;
use crate::processors::NormalizeView;
use image::GrayImage;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The view shape the pretrained weights were exported for (height, width).
pub const DEFAULT_VIEW_SHAPE: (u32, u32) = (2600, 2000);

/// Configuration for the image-based model variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CnnModelConfig {
    /// Expected view shape as (height, width); `None` accepts whatever the
    /// case directory provides and leaves shape checking to the session.
    pub input_shape: Option<(u32, u32)>,
    /// Pixel scaling factor applied during normalization.
    pub scale: Option<f32>,
}

impl Default for CnnModelConfig {
    fn default() -> Self {
        Self {
            input_shape: Some(DEFAULT_VIEW_SHAPE),
            scale: None,
        }
    }
}

/// Validates a view against the expected fixed shape, when one is set.
fn check_view_shape(
    view: MammogramView,
    img: &GrayImage,
    expected: Option<(u32, u32)>,
) -> Result<(), DensityError> {
    if let Some((height, width)) = expected {
        let (actual_w, actual_h) = img.dimensions();
        if (actual_h, actual_w) != (height, width) {
            return Err(DensityError::case_data(format!(
                "view {view} has shape {actual_h}x{actual_w}, expected {height}x{width}"
            )));
        }
    }
    Ok(())
}

/// The image-based density model.
#[derive(Debug)]
pub struct CnnDensityModel {
    /// View normalizer shared by all four inputs.
    normalize: NormalizeView,
    /// ONNX Runtime inference engine.
    infer: OrtInfer,
    /// Expected view shape, if fixed.
    input_shape: Option<(u32, u32)>,
}

impl CnnDensityModel {
    /// Loads the CNN variant from a weights file.
    ///
    /// # Arguments
    ///
    /// * `config` - Configuration for the variant
    /// * `model_path` - Path to the ONNX weights
    /// * `target` - The compute target resolved at startup
    pub fn new(
        config: CnnModelConfig,
        model_path: &Path,
        target: &ComputeTarget,
    ) -> Result<Self, DensityError> {
        Ok(Self {
            normalize: NormalizeView::new(config.scale, None, None)?,
            infer: OrtInfer::load(model_path, target, None)?,
            input_shape: config.input_shape,
        })
    }

    /// Normalizes one view, enforcing the fixed shape when configured.
    fn view_tensor(
        &self,
        view: MammogramView,
        img: &GrayImage,
    ) -> Result<Tensor4D, DensityError> {
        check_view_shape(view, img, self.input_shape)?;
        self.normalize.to_tensor(img)
    }
}

impl DensityScorer for CnnDensityModel {
    fn score(&self, images: &CaseImages) -> Result<DensityScores, DensityError> {
        let l_cc = self.view_tensor(MammogramView::LeftCc, images.view(MammogramView::LeftCc))?;
        let r_cc = self.view_tensor(MammogramView::RightCc, images.view(MammogramView::RightCc))?;
        let l_mlo =
            self.view_tensor(MammogramView::LeftMlo, images.view(MammogramView::LeftMlo))?;
        let r_mlo =
            self.view_tensor(MammogramView::RightMlo, images.view(MammogramView::RightMlo))?;

        let output = self.infer.infer_2d_views(ViewFeeds {
            l_cc: &l_cc,
            r_cc: &r_cc,
            l_mlo: &l_mlo,
            r_mlo: &r_mlo,
        })?;

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
    use image::Luma;

    #[test]
    fn test_default_config_pins_view_shape() {
        let config = CnnModelConfig::default();
        assert_eq!(config.input_shape, Some((2600, 2000)));
    }

    #[test]
    fn test_shape_check_accepts_matching_view() {
        let img = GrayImage::from_pixel(20, 26, Luma([0]));
        assert!(check_view_shape(MammogramView::LeftCc, &img, Some((26, 20))).is_ok());
    }

    #[test]
    fn test_shape_check_rejects_mismatched_view() {
        let img = GrayImage::from_pixel(10, 10, Luma([0]));
        let err = check_view_shape(MammogramView::LeftCc, &img, Some((26, 20))).unwrap_err();
        assert!(err.to_string().contains("L-CC"));
    }

    #[test]
    fn test_shape_check_skipped_without_fixed_shape() {
        let img = GrayImage::from_pixel(10, 10, Luma([0]));
        assert!(check_view_shape(MammogramView::RightMlo, &img, None).is_ok());
    }
}
