//! Case discovery, label reading, and the batch scoring loop.
//!
//! The loop has two states: accumulating (iterating case directories under
//! the data root) and reporting (the final accuracy summary). Any failing
//! case aborts the run; configuration and device problems never reach this
//! module because the scorer is built first.

pub mod stats;

pub use stats::{CaseOutcome, EvalStats};

use crate::core::errors::DensityError;
use crate::domain::{DensityGrade, DensityScores};
use crate::models::DensityScorer;
use crate::utils::load_case_images;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Name of the sidecar file holding a case's ground-truth grade.
pub const LABEL_FILE: &str = "density.txt";

/// Lists the case directories under the data root, sorted by name.
///
/// Sorting makes per-case output reproducible across filesystems; the
/// accuracy figures are order-independent either way. Plain files under the
/// root are ignored.
///
/// # Errors
///
/// Returns a case data error if the root does not exist or cannot be read.
pub fn discover_cases(root: &Path) -> Result<Vec<PathBuf>, DensityError> {
    let entries = std::fs::read_dir(root).map_err(|e| {
        DensityError::case_data_with_source(
            format!("cannot read data root '{}'", root.display()),
            e,
        )
    })?;

    let mut cases = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            cases.push(path);
        }
    }
    cases.sort();
    Ok(cases)
}

/// Reads the ground-truth grade from a case's `density.txt`.
///
/// # Errors
///
/// Returns a case data error if the file is missing, unreadable, or does not
/// hold a single integer in {1, 2, 3, 4}.
pub fn read_density_label(case_dir: &Path) -> Result<DensityGrade, DensityError> {
    let path = case_dir.join(LABEL_FILE);
    let raw = std::fs::read_to_string(&path).map_err(|e| {
        DensityError::case_data_with_source(
            format!("cannot read label file '{}'", path.display()),
            e,
        )
    })?;

    let value: u8 = raw.trim().parse().map_err(|_| {
        DensityError::case_data(format!(
            "label file '{}' does not hold an integer: '{}'",
            path.display(),
            raw.trim()
        ))
    })?;
    DensityGrade::new(value)
}

/// The batch scoring loop: runs a scorer over every case under a data root
/// and accumulates accuracy at both granularities.
pub struct Evaluator {
    scorer: Box<dyn DensityScorer>,
}

impl Evaluator {
    /// Creates an evaluator around a constructed scorer.
    pub fn new(scorer: Box<dyn DensityScorer>) -> Self {
        Self { scorer }
    }

    /// Scores every case under `root`, writing per-case report lines to
    /// `out`, and returns the accumulated outcomes.
    ///
    /// # Errors
    ///
    /// The first failing case (missing view, unreadable label) aborts the
    /// scan and propagates its error.
    pub fn evaluate(
        &self,
        root: &Path,
        out: &mut impl Write,
    ) -> Result<EvalStats, DensityError> {
        let cases = discover_cases(root)?;
        if cases.is_empty() {
            warn!(root = %root.display(), "no case directories found under data root");
        }
        info!(cases = cases.len(), model = self.scorer.model_name(), "scoring cases");

        let mut results = EvalStats::new();
        for case_dir in &cases {
            let case_name = case_dir
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("?")
                .to_string();
            debug!(case = %case_name, "scoring case");

            let images = load_case_images(case_dir)?;
            let scores = self.scorer.score(&images)?;
            let predicted = scores.predicted_grade();
            let actual = read_density_label(case_dir)?;

            write_score_breakdown(out, &scores)?;
            write_case_report(out, predicted, actual)?;

            results.push(CaseOutcome {
                case: case_name,
                predicted,
                actual,
            });
        }

        Ok(results)
    }
}

/// Writes the human-readable per-class score breakdown for one case.
fn write_score_breakdown(out: &mut impl Write, scores: &DensityScores) -> std::io::Result<()> {
    writeln!(out, "Density prediction:")?;
    for (grade, score) in DensityGrade::ALL.iter().zip(scores.as_array()) {
        writeln!(out, "    {} ({}): {}", grade.label(), grade, score)?;
    }
    Ok(())
}

/// Writes the predicted-vs-actual lines at both granularities.
fn write_case_report(
    out: &mut impl Write,
    predicted: DensityGrade,
    actual: DensityGrade,
) -> std::io::Result<()> {
    writeln!(out, "Predicted density: {predicted}")?;
    writeln!(out, "Real density: {actual}")?;
    writeln!(out)?;
    writeln!(out, "Predicted density (2 cls): {}", predicted.binary())?;
    writeln!(out, "Real density (2 cls): {}", actual.binary())?;
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CaseImages, MammogramView};
    use image::{GrayImage, Luma};
    use tempfile::TempDir;

    struct FixedScorer([f32; 4]);

    impl DensityScorer for FixedScorer {
        fn score(&self, _images: &CaseImages) -> Result<DensityScores, DensityError> {
            Ok(DensityScores::new(self.0))
        }

        fn model_name(&self) -> &str {
            "fixed"
        }
    }

    fn write_case(root: &Path, name: &str, label: &str) {
        let dir = root.join(name);
        std::fs::create_dir(&dir).unwrap();
        for view in MammogramView::ALL {
            let img = GrayImage::from_pixel(2, 2, Luma([50]));
            img.save(dir.join(format!("{}.png", view.stem()))).unwrap();
        }
        std::fs::write(dir.join(LABEL_FILE), label).unwrap();
    }

    #[test]
    fn test_read_density_label_valid() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(LABEL_FILE), "3\n").unwrap();
        assert_eq!(read_density_label(dir.path()).unwrap().value(), 3);
    }

    #[test]
    fn test_read_density_label_out_of_range() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(LABEL_FILE), "7").unwrap();
        assert!(read_density_label(dir.path()).is_err());
    }

    #[test]
    fn test_read_density_label_malformed() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(LABEL_FILE), "dense").unwrap();
        assert!(read_density_label(dir.path()).is_err());
    }

    #[test]
    fn test_read_density_label_missing() {
        let dir = TempDir::new().unwrap();
        assert!(read_density_label(dir.path()).is_err());
    }

    #[test]
    fn test_discover_cases_sorted_dirs_only() {
        let root = TempDir::new().unwrap();
        std::fs::create_dir(root.path().join("case_b")).unwrap();
        std::fs::create_dir(root.path().join("case_a")).unwrap();
        std::fs::write(root.path().join("stray.txt"), "x").unwrap();

        let cases = discover_cases(root.path()).unwrap();
        let names: Vec<_> = cases
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["case_a", "case_b"]);
    }

    #[test]
    fn test_discover_cases_missing_root() {
        let root = TempDir::new().unwrap();
        assert!(discover_cases(&root.path().join("absent")).is_err());
    }

    #[test]
    fn test_evaluate_accumulates_and_reports() {
        let root = TempDir::new().unwrap();
        write_case(root.path(), "case_a", "4");
        write_case(root.path(), "case_b", "1");

        let evaluator = Evaluator::new(Box::new(FixedScorer([0.1, 0.2, 0.3, 0.4])));
        let mut buf = Vec::new();
        let stats = evaluator.evaluate(root.path(), &mut buf).unwrap();

        assert_eq!(stats.len(), 2);
        assert_eq!(stats.accuracy(), 0.5);
        assert_eq!(stats.binary_accuracy(), 0.5);

        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Predicted density: 4"));
        assert!(text.contains("Real density: 1"));
        assert!(text.contains("Predicted density (2 cls): 1"));
        assert!(text.contains("Extremely dense (4):"));
    }

    #[test]
    fn test_evaluate_aborts_on_missing_label() {
        let root = TempDir::new().unwrap();
        write_case(root.path(), "case_a", "2");
        let broken = root.path().join("case_b");
        std::fs::create_dir(&broken).unwrap();
        for view in MammogramView::ALL {
            let img = GrayImage::from_pixel(2, 2, Luma([50]));
            img.save(broken.join(format!("{}.png", view.stem()))).unwrap();
        }
        // no density.txt in case_b

        let evaluator = Evaluator::new(Box::new(FixedScorer([1.0, 0.0, 0.0, 0.0])));
        let mut buf = Vec::new();
        assert!(evaluator.evaluate(root.path(), &mut buf).is_err());
    }

    #[test]
    fn test_evaluate_empty_root_yields_empty_stats() {
        let root = TempDir::new().unwrap();
        let evaluator = Evaluator::new(Box::new(FixedScorer([1.0, 0.0, 0.0, 0.0])));
        let mut buf = Vec::new();
        let stats = evaluator.evaluate(root.path(), &mut buf).unwrap();
        assert!(stats.is_empty());
        assert_eq!(stats.accuracy(), 0.0);
    }
}
