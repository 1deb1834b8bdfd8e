//! Domain types for mammogram views and density grades.
//!
//! A case is a four-view screening study (left/right craniocaudal and
//! mediolateral-oblique). The model scores each case into the four BI-RADS
//! density categories; a fixed lookup folds those into the 2-class
//! non-dense/dense scheme used for the coarse accuracy figure.

use crate::core::errors::DensityError;
use image::GrayImage;

/// One of the four standard views of a screening study.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MammogramView {
    /// Left craniocaudal.
    LeftCc,
    /// Right craniocaudal.
    RightCc,
    /// Left mediolateral-oblique.
    LeftMlo,
    /// Right mediolateral-oblique.
    RightMlo,
}

impl MammogramView {
    /// The four views in the order the models consume them.
    pub const ALL: [MammogramView; 4] = [
        MammogramView::LeftCc,
        MammogramView::RightCc,
        MammogramView::LeftMlo,
        MammogramView::RightMlo,
    ];

    /// Returns the file stem of this view inside a case directory.
    pub fn stem(self) -> &'static str {
        match self {
            MammogramView::LeftCc => "L-CC",
            MammogramView::RightCc => "R-CC",
            MammogramView::LeftMlo => "L-MLO",
            MammogramView::RightMlo => "R-MLO",
        }
    }
}

impl std::fmt::Display for MammogramView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.stem())
    }
}

/// The four loaded view images of one case.
#[derive(Debug)]
pub struct CaseImages {
    l_cc: GrayImage,
    r_cc: GrayImage,
    l_mlo: GrayImage,
    r_mlo: GrayImage,
}

impl CaseImages {
    /// Bundles four already-loaded view images, in [`MammogramView::ALL`]
    /// order.
    pub fn new(l_cc: GrayImage, r_cc: GrayImage, l_mlo: GrayImage, r_mlo: GrayImage) -> Self {
        Self {
            l_cc,
            r_cc,
            l_mlo,
            r_mlo,
        }
    }

    /// Returns the image for the given view.
    pub fn view(&self, view: MammogramView) -> &GrayImage {
        match view {
            MammogramView::LeftCc => &self.l_cc,
            MammogramView::RightCc => &self.r_cc,
            MammogramView::LeftMlo => &self.l_mlo,
            MammogramView::RightMlo => &self.r_mlo,
        }
    }

    /// Iterates over the four views with their images, in
    /// [`MammogramView::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (MammogramView, &GrayImage)> {
        MammogramView::ALL.into_iter().map(|v| (v, self.view(v)))
    }
}

/// Number of density categories in the fine-grained scheme.
pub const NUM_DENSITY_CLASSES: usize = 4;

/// A BI-RADS breast density grade in {1, 2, 3, 4}.
///
/// Grades are 1-based; model output indices are 0-based, so the predicted
/// grade is always argmax index + 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DensityGrade(u8);

impl DensityGrade {
    /// The four grades in ascending order.
    pub const ALL: [DensityGrade; NUM_DENSITY_CLASSES] = [
        DensityGrade(1),
        DensityGrade(2),
        DensityGrade(3),
        DensityGrade(4),
    ];

    /// Creates a grade from a 1-based value.
    ///
    /// # Errors
    ///
    /// Returns a case data error if the value is outside {1, 2, 3, 4}.
    pub fn new(value: u8) -> Result<Self, DensityError> {
        if (1..=NUM_DENSITY_CLASSES as u8).contains(&value) {
            Ok(Self(value))
        } else {
            Err(DensityError::case_data(format!(
                "density grade must be in 1..=4, got {value}"
            )))
        }
    }

    /// Returns the 1-based grade value.
    pub fn value(self) -> u8 {
        self.0
    }

    /// Returns the BI-RADS category name for this grade.
    pub fn label(self) -> &'static str {
        match self.0 {
            1 => "Almost entirely fatty",
            2 => "Scattered areas of fibroglandular density",
            3 => "Heterogeneously dense",
            _ => "Extremely dense",
        }
    }

    /// Folds this grade into the 2-class scheme: {1, 2} -> non-dense,
    /// {3, 4} -> dense.
    pub fn binary(self) -> BinaryDensity {
        if self.0 <= 2 {
            BinaryDensity::NonDense
        } else {
            BinaryDensity::Dense
        }
    }
}

impl std::fmt::Display for DensityGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The coarse 2-class density scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryDensity {
    /// Grades 1 and 2.
    NonDense,
    /// Grades 3 and 4.
    Dense,
}

impl BinaryDensity {
    /// Returns the numeric value of this class (0 for non-dense, 1 for
    /// dense), as printed in the per-case report.
    pub fn value(self) -> u8 {
        match self {
            BinaryDensity::NonDense => 0,
            BinaryDensity::Dense => 1,
        }
    }
}

impl std::fmt::Display for BinaryDensity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// A length-4 score vector produced per case.
///
/// Consumed immediately to derive the predicted grade; not retained across
/// cases.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DensityScores([f32; NUM_DENSITY_CLASSES]);

impl DensityScores {
    /// Wraps a fixed-size score array.
    pub fn new(scores: [f32; NUM_DENSITY_CLASSES]) -> Self {
        Self(scores)
    }

    /// Creates a score vector from a model output row.
    ///
    /// # Errors
    ///
    /// Returns an invalid input error if the row does not hold exactly four
    /// scores, regardless of how the model was configured.
    pub fn from_row(row: &[f32]) -> Result<Self, DensityError> {
        let scores: [f32; NUM_DENSITY_CLASSES] = row.try_into().map_err(|_| {
            DensityError::invalid_input(format!(
                "model output must hold exactly {} scores, got {}",
                NUM_DENSITY_CLASSES,
                row.len()
            ))
        })?;
        Ok(Self(scores))
    }

    /// Returns the raw scores.
    pub fn as_array(&self) -> &[f32; NUM_DENSITY_CLASSES] {
        &self.0
    }

    /// Returns the predicted grade: the index of the maximum score plus 1.
    ///
    /// Ties resolve to the lowest index, matching argmax semantics.
    pub fn predicted_grade(&self) -> DensityGrade {
        let mut best = 0;
        for (idx, &score) in self.0.iter().enumerate() {
            if score > self.0[best] {
                best = idx;
            }
        }
        DensityGrade(best as u8 + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, BinaryDensity::NonDense)]
    #[case(2, BinaryDensity::NonDense)]
    #[case(3, BinaryDensity::Dense)]
    #[case(4, BinaryDensity::Dense)]
    fn test_binary_mapping_is_total(#[case] grade: u8, #[case] expected: BinaryDensity) {
        let grade = DensityGrade::new(grade).unwrap();
        assert_eq!(grade.binary(), expected);
    }

    #[rstest]
    #[case(0)]
    #[case(5)]
    #[case(200)]
    fn test_grade_rejects_out_of_range(#[case] value: u8) {
        assert!(DensityGrade::new(value).is_err());
    }

    #[test]
    fn test_argmax_picks_last_class() {
        let scores = DensityScores::new([0.1, 0.2, 0.3, 0.4]);
        let grade = scores.predicted_grade();
        assert_eq!(grade.value(), 4);
        assert_eq!(grade.binary(), BinaryDensity::Dense);
    }

    #[test]
    fn test_argmax_picks_first_class() {
        let scores = DensityScores::new([0.9, 0.05, 0.03, 0.02]);
        let grade = scores.predicted_grade();
        assert_eq!(grade.value(), 1);
        assert_eq!(grade.binary(), BinaryDensity::NonDense);
    }

    #[test]
    fn test_argmax_ties_resolve_to_lowest_index() {
        let scores = DensityScores::new([0.25, 0.25, 0.25, 0.25]);
        assert_eq!(scores.predicted_grade().value(), 1);
    }

    #[test]
    fn test_predicted_grade_is_always_valid() {
        for idx in 0..NUM_DENSITY_CLASSES {
            let mut raw = [0.0f32; NUM_DENSITY_CLASSES];
            raw[idx] = 1.0;
            let grade = DensityScores::new(raw).predicted_grade();
            assert!((1..=4).contains(&grade.value()));
            assert_eq!(grade.value() as usize, idx + 1);
        }
    }

    #[test]
    fn test_from_row_rejects_wrong_length() {
        assert!(DensityScores::from_row(&[0.1, 0.2, 0.3]).is_err());
        assert!(DensityScores::from_row(&[0.1; 5]).is_err());
        assert!(DensityScores::from_row(&[0.1, 0.2, 0.3, 0.4]).is_ok());
    }

    #[test]
    fn test_view_stems() {
        assert_eq!(MammogramView::LeftCc.stem(), "L-CC");
        assert_eq!(MammogramView::RightMlo.stem(), "R-MLO");
        assert_eq!(MammogramView::ALL.len(), 4);
    }

    #[test]
    fn test_grade_labels() {
        assert_eq!(DensityGrade::new(1).unwrap().label(), "Almost entirely fatty");
        assert_eq!(DensityGrade::new(4).unwrap().label(), "Extremely dense");
    }
}
