use std::path::Path;

use image::{RgbImage, imageops::FilterType};
use log::debug;

use crate::error::{Error, Result};

/// Height every input image is normalized to before region proposal.
pub const DEFAULT_HEIGHT: u32 = 600;

/// Decodes the image at `path` into 8-bit RGB.
pub fn load_image(path: impl AsRef<Path>) -> Result<RgbImage> {
    let path = path.as_ref();
    let image = image::open(path).map_err(|source| Error::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(
        "Decoded {} ({}x{})",
        path.display(),
        image.width(),
        image.height()
    );
    Ok(image.into_rgb8())
}

/// Size of an image scaled to `new_height` with its aspect ratio kept.
///
/// The width is rounded to the nearest pixel and never drops below one.
pub fn normalized_size(width: u32, height: u32, new_height: u32) -> (u32, u32) {
    if height == 0 {
        return (width, new_height);
    }
    let new_width = (f64::from(width) * f64::from(new_height) / f64::from(height)).round() as u32;
    (new_width.max(1), new_height)
}

/// Resizes `image` to `new_height`, keeping its aspect ratio.
pub fn resize_to_height(image: &RgbImage, new_height: u32) -> RgbImage {
    let (width, height) = normalized_size(image.width(), image.height(), new_height);
    if (width, height) == image.dimensions() {
        return image.clone();
    }
    debug!(
        "Resizing {}x{} to {}x{}",
        image.width(),
        image.height(),
        width,
        height
    );
    image::imageops::resize(image, width, height, FilterType::Triangle)
}
