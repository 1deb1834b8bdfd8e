//! Histogram feature extraction for the histogram model variant.
//!
//! Each view is reduced to a normalized bin-count histogram of its pixel
//! intensities; the four histograms are concatenated in view order into the
//! single `[1, 4 * bins]` feature vector the model consumes.

use crate::core::errors::{DensityError, ProcessingStage};
use crate::core::Tensor2D;
use crate::domain::{CaseImages, MammogramView};
use image::GrayImage;

/// Bin-count feature generator with a configurable bin count.
#[derive(Debug, Clone)]
pub struct HistogramFeatures {
    bins: usize,
}

impl HistogramFeatures {
    /// Creates a new feature generator.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the bin count is zero.
    pub fn new(bins: usize) -> Result<Self, DensityError> {
        if bins == 0 {
            return Err(DensityError::config_error(
                "histogram bin count must be greater than 0",
            ));
        }
        Ok(Self { bins })
    }

    /// Returns the configured bin count.
    pub fn bins(&self) -> usize {
        self.bins
    }

    /// Returns the total feature vector length: one histogram per view.
    pub fn feature_len(&self) -> usize {
        self.bins * MammogramView::ALL.len()
    }

    /// Computes the normalized intensity histogram of a single view.
    ///
    /// Counts are divided by the pixel total so each view contributes a
    /// distribution summing to 1 regardless of image size.
    fn view_histogram(&self, img: &GrayImage) -> Vec<f32> {
        let mut counts = vec![0.0f32; self.bins];
        let total = (img.width() * img.height()) as f32;
        if total == 0.0 {
            return counts;
        }

        for pixel in img.pixels() {
            let bin = (pixel[0] as usize * self.bins) / 256;
            counts[bin] += 1.0;
        }
        for count in &mut counts {
            *count /= total;
        }
        counts
    }

    /// Generates the concatenated feature vector for a case.
    ///
    /// Views are concatenated in [`MammogramView::ALL`] order, yielding a
    /// `[1, 4 * bins]` tensor.
    pub fn features(&self, images: &CaseImages) -> Result<Tensor2D, DensityError> {
        let mut features = Vec::with_capacity(self.feature_len());
        for (_, img) in images.iter() {
            features.extend(self.view_histogram(img));
        }

        ndarray::Array2::from_shape_vec((1, self.feature_len()), features).map_err(|e| {
            DensityError::processing(
                ProcessingStage::HistogramFeatures,
                format!("failed to create {}-element feature tensor", self.feature_len()),
                e,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn uniform_case(value: u8) -> CaseImages {
        let img = || GrayImage::from_pixel(4, 4, Luma([value]));
        CaseImages::new(img(), img(), img(), img())
    }

    #[test]
    fn test_feature_length_is_four_times_bins() {
        for bins in [1, 10, 50, 256] {
            let features = HistogramFeatures::new(bins).unwrap();
            let tensor = features.features(&uniform_case(0)).unwrap();
            assert_eq!(tensor.shape(), &[1, bins * 4]);
        }
    }

    #[test]
    fn test_each_view_block_sums_to_one() {
        let features = HistogramFeatures::new(50).unwrap();
        let tensor = features.features(&uniform_case(77)).unwrap();
        let row = tensor.row(0);
        for block in 0..4 {
            let sum: f32 = row.iter().skip(block * 50).take(50).sum();
            assert!((sum - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_uniform_image_fills_single_bin() {
        let features = HistogramFeatures::new(4).unwrap();
        // All pixels at 255 land in the last bin of each view block.
        let tensor = features.features(&uniform_case(255)).unwrap();
        let row = tensor.row(0);
        for block in 0..4 {
            assert!((row[block * 4 + 3] - 1.0).abs() < 1e-6);
            assert_eq!(row[block * 4], 0.0);
        }
    }

    #[test]
    fn test_bin_index_never_overflows() {
        // 255 must map to the last bin for any bin count.
        for bins in [1, 3, 50, 255, 256] {
            let features = HistogramFeatures::new(bins).unwrap();
            let tensor = features.features(&uniform_case(255)).unwrap();
            assert_eq!(tensor.shape(), &[1, bins * 4]);
        }
    }

    #[test]
    fn test_rejects_zero_bins() {
        assert!(HistogramFeatures::new(0).is_err());
    }
}
