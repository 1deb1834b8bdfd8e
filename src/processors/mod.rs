//! Preprocessing for the two model input paths.
//!
//! The image path normalizes each grayscale view into a CHW tensor; the
//! histogram path reduces all four views to one concatenated bin-count
//! feature vector.

pub mod histogram;
pub mod normalization;

pub use histogram::HistogramFeatures;
pub use normalization::NormalizeView;
