//! # mammo-density
//!
//! An evaluation harness for breast-density classification models. It loads
//! pretrained ONNX weights, runs inference over a directory of mammogram
//! cases, and reports accuracy for the 4-class BI-RADS density scheme and a
//! derived 2-class scheme.
//!
//! ## Components
//!
//! - **Case loading**: each case directory holds the four standard screening
//!   views (`L-CC`, `R-CC`, `L-MLO`, `R-MLO`) plus a `density.txt` label.
//! - **Model variants**: an image-based CNN fed four per-view tensors, and a
//!   histogram-based model fed a concatenated bin-count feature vector. Both
//!   sit behind the [`models::DensityScorer`] trait.
//! - **Scoring loop**: walks the case directories, argmaxes each score
//!   vector into a density grade, and accumulates accuracy at both
//!   granularities.
//!
//! ## Modules
//!
//! * [`core`] - Error handling, configuration, and ONNX Runtime integration
//! * [`domain`] - Mammogram views, density grades, and score vectors
//! * [`models`] - The two model variants behind a single scoring trait
//! * [`processors`] - View normalization and histogram feature extraction
//! * [`eval`] - Case discovery, label reading, and the accuracy loop
//! * [`utils`] - Image loading helpers
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mammo_density::prelude::*;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = EvalConfig::new(ModelKind::Histogram);
//! let scorer = build_scorer(&config)?;
//! let evaluator = Evaluator::new(scorer);
//! let stats = evaluator.evaluate(Path::new("/tmp/mgr"), &mut std::io::stdout())?;
//! println!("Total accuracy: {}", stats.accuracy());
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod domain;
pub mod eval;
pub mod models;
pub mod processors;
pub mod utils;

/// Prelude module for convenient imports.
///
/// Bring the essentials into scope with a single use statement:
///
/// ```rust
/// use mammo_density::prelude::*;
/// ```
pub mod prelude {
    pub use crate::core::{init_tracing, DensityError, DeviceKind, EvalConfig, ModelKind};
    pub use crate::domain::{BinaryDensity, CaseImages, DensityGrade, DensityScores, MammogramView};
    pub use crate::eval::{EvalStats, Evaluator};
    pub use crate::models::{build_scorer, DensityScorer};
}
