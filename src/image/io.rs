//! Convenience helpers for loading samples via the `image` crate.
//!
//! Available when the `image-io` feature is enabled.

use crate::image::integral::IntegralTable;
use crate::image::{ImageView, OwnedImage};
use crate::util::{HaarError, HaarResult};
use std::path::Path;

/// Creates a borrowed view from a grayscale image buffer.
pub fn view_from_gray_image(img: &image::GrayImage) -> HaarResult<ImageView<'_, u8>> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    ImageView::from_slice(img.as_raw(), width, height)
}

/// Creates an owned grayscale image from a dynamic image.
pub fn owned_from_dynamic_image(img: &image::DynamicImage) -> HaarResult<OwnedImage> {
    let gray = img.to_luma8();
    let width = gray.width() as usize;
    let height = gray.height() as usize;
    OwnedImage::new(gray.into_raw(), width, height)
}

/// Loads an image from disk and converts it to a grayscale owned image.
pub fn load_gray_image<P: AsRef<Path>>(path: P) -> HaarResult<OwnedImage> {
    let img = image::open(path).map_err(|err| HaarError::ImageIo {
        reason: err.to_string(),
    })?;
    owned_from_dynamic_image(&img)
}

/// Loads an image and builds its integral tables.
pub fn load_integral_table<P: AsRef<Path>>(path: P) -> HaarResult<IntegralTable> {
    let img = load_gray_image(path)?;
    IntegralTable::from_view(img.view())
}
