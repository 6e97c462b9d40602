use std::path::Path;

use mosaic_image::{Image, ImageSize};

use crate::error::IoError;

/// Reads an image from the given file path and converts it to RGB8.
///
/// The method accepts any image format supported by the image crate. Grayscale
/// inputs are expanded to three channels and alpha channels are dropped.
///
/// # Arguments
///
/// * `file_path` - The path to a valid image file.
///
/// # Returns
///
/// An RGB image with three channels _(rgb8)_.
pub fn read_image_any_rgb8(file_path: impl AsRef<Path>) -> Result<Image<u8, 3>, IoError> {
    let file_path = file_path.as_ref();

    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    let img = image::open(file_path)?.to_rgb8();

    let size = ImageSize {
        width: img.width() as usize,
        height: img.height() as usize,
    };

    Ok(Image::new(size, img.into_raw())?)
}
