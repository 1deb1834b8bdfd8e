//! Utility functions for image loading.
//!
//! A case directory holds one PNG per view, named by the view stem
//! (`L-CC.png`, `R-CC.png`, `L-MLO.png`, `R-MLO.png`). Loading decodes all
//! four in parallel; a missing or undecodable view is an error for the case.

use crate::core::errors::DensityError;
use crate::domain::{CaseImages, MammogramView};
use image::GrayImage;
use rayon::prelude::*;
use std::path::Path;

/// Loads an image from a file path and converts it to grayscale.
///
/// # Arguments
///
/// * `path` - A reference to the path of the image file to load
///
/// # Errors
///
/// Returns a `DensityError::ImageLoad` error if the image cannot be loaded
/// from the specified path.
pub fn load_gray_image(path: &Path) -> Result<GrayImage, DensityError> {
    let img = image::open(path).map_err(DensityError::ImageLoad)?;
    Ok(img.to_luma8())
}

/// Loads the image for one view of a case.
///
/// # Arguments
///
/// * `case_dir` - The case directory
/// * `view` - The view to load
pub fn load_view_image(case_dir: &Path, view: MammogramView) -> Result<GrayImage, DensityError> {
    let path = case_dir.join(format!("{}.png", view.stem()));
    load_gray_image(&path).map_err(|e| {
        DensityError::case_data_with_source(
            format!("failed to load view {} from '{}'", view, path.display()),
            e,
        )
    })
}

/// Loads all four views of a case, decoding in parallel.
///
/// # Arguments
///
/// * `case_dir` - The case directory
///
/// # Errors
///
/// Returns the first view error encountered; a case with any missing or
/// undecodable view cannot be scored.
pub fn load_case_images(case_dir: &Path) -> Result<CaseImages, DensityError> {
    let mut images: Vec<GrayImage> = MammogramView::ALL
        .par_iter()
        .map(|&view| load_view_image(case_dir, view))
        .collect::<Result<_, _>>()?;

    // par_iter preserves order, so the vector matches MammogramView::ALL.
    let r_mlo = images.pop();
    let l_mlo = images.pop();
    let r_cc = images.pop();
    let l_cc = images.pop();
    match (l_cc, r_cc, l_mlo, r_mlo) {
        (Some(l_cc), Some(r_cc), Some(l_mlo), Some(r_mlo)) => {
            Ok(CaseImages::new(l_cc, r_cc, l_mlo, r_mlo))
        }
        _ => Err(DensityError::invalid_input(
            "view loading returned fewer than four images",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use tempfile::TempDir;

    fn write_views(dir: &Path) {
        for view in MammogramView::ALL {
            let img = GrayImage::from_pixel(4, 4, Luma([100]));
            img.save(dir.join(format!("{}.png", view.stem()))).unwrap();
        }
    }

    #[test]
    fn test_load_case_images_reads_all_views() {
        let dir = TempDir::new().unwrap();
        write_views(dir.path());

        let images = load_case_images(dir.path()).unwrap();
        for (_, img) in images.iter() {
            assert_eq!(img.dimensions(), (4, 4));
        }
    }

    #[test]
    fn test_missing_view_is_an_error() {
        let dir = TempDir::new().unwrap();
        write_views(dir.path());
        std::fs::remove_file(dir.path().join("R-MLO.png")).unwrap();

        assert!(load_case_images(dir.path()).is_err());
    }

    #[test]
    fn test_load_gray_image_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(load_gray_image(&dir.path().join("absent.png")).is_err());
    }
}
