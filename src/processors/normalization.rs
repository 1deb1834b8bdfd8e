//! View normalization for the image-based model variant.
//!
//! Converts a grayscale screening view into the `[1, 1, H, W]` tensor layout
//! the exported graph expects, applying the usual affine normalization
//! (scale, mean, standard deviation) in a single pass.

use crate::core::errors::{DensityError, ProcessingStage};
use crate::core::Tensor4D;
use image::GrayImage;

/// Normalizes grayscale views into CHW tensors.
///
/// The affine parameters are folded into a single multiply-add per pixel:
/// `alpha = scale / std` and `beta = -mean / std`.
#[derive(Debug, Clone)]
pub struct NormalizeView {
    /// Scaling factor applied to each pixel (alpha = scale / std).
    alpha: f32,
    /// Offset applied to each pixel (beta = -mean / std).
    beta: f32,
}

impl NormalizeView {
    /// Creates a new NormalizeView with the specified parameters.
    ///
    /// # Arguments
    ///
    /// * `scale` - Optional scaling factor (defaults to 1.0/255.0)
    /// * `mean` - Optional mean value (defaults to 0.0)
    /// * `std` - Optional standard deviation (defaults to 1.0)
    ///
    /// # Errors
    ///
    /// Returns a configuration error if scale or std is not greater than 0.
    pub fn new(scale: Option<f32>, mean: Option<f32>, std: Option<f32>) -> Result<Self, DensityError> {
        let scale = scale.unwrap_or(1.0 / 255.0);
        let mean = mean.unwrap_or(0.0);
        let std = std.unwrap_or(1.0);

        if scale <= 0.0 {
            return Err(DensityError::config_error(
                "scale must be greater than 0",
            ));
        }
        if std <= 0.0 {
            return Err(DensityError::config_error(format!(
                "standard deviation must be greater than 0, got {std}"
            )));
        }

        Ok(Self {
            alpha: scale / std,
            beta: -mean / std,
        })
    }

    /// Normalizes a single view into a `[1, 1, H, W]` tensor.
    ///
    /// With a single channel the HWC-to-CHW permutation is a plain
    /// row-major copy.
    pub fn to_tensor(&self, img: &GrayImage) -> Result<Tensor4D, DensityError> {
        let (width, height) = img.dimensions();
        let mut result = vec![0.0f32; (height * width) as usize];

        for y in 0..height {
            for x in 0..width {
                let pixel = img.get_pixel(x, y)[0] as f32;
                result[(y * width + x) as usize] = pixel * self.alpha + self.beta;
            }
        }

        ndarray::Array4::from_shape_vec((1, 1, height as usize, width as usize), result).map_err(
            |e| {
                DensityError::processing(
                    ProcessingStage::Normalization,
                    format!("failed to create view tensor for {width}x{height} image"),
                    e,
                )
            },
        )
    }
}

impl Default for NormalizeView {
    fn default() -> Self {
        Self {
            alpha: 1.0 / 255.0,
            beta: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_tensor_shape_is_nchw() {
        let img = GrayImage::from_pixel(3, 2, Luma([0]));
        let tensor = NormalizeView::default().to_tensor(&img).unwrap();
        assert_eq!(tensor.shape(), &[1, 1, 2, 3]);
    }

    #[test]
    fn test_default_scaling_maps_255_to_one() {
        let img = GrayImage::from_pixel(2, 2, Luma([255]));
        let tensor = NormalizeView::default().to_tensor(&img).unwrap();
        assert!((tensor[[0, 0, 0, 0]] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_mean_std_are_applied() {
        let img = GrayImage::from_pixel(1, 1, Luma([128]));
        let normalize = NormalizeView::new(Some(1.0), Some(128.0), Some(64.0)).unwrap();
        let tensor = normalize.to_tensor(&img).unwrap();
        assert!(tensor[[0, 0, 0, 0]].abs() < 1e-6);

        let img = GrayImage::from_pixel(1, 1, Luma([192]));
        let tensor = normalize.to_tensor(&img).unwrap();
        assert!((tensor[[0, 0, 0, 0]] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_non_positive_std() {
        assert!(NormalizeView::new(None, None, Some(0.0)).is_err());
        assert!(NormalizeView::new(None, None, Some(-1.0)).is_err());
    }

    #[test]
    fn test_rejects_non_positive_scale() {
        assert!(NormalizeView::new(Some(0.0), None, None).is_err());
    }
}
