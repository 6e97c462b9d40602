use crate::error::IoError;
use jpeg_encoder::{ColorType, Encoder};
use mosaic_image::Image;
use std::path::Path;

/// Writes the given JPEG _(rgb8)_ data to the given file path.
///
/// # Arguments
///
/// - `file_path` - The path to the JPEG image.
/// - `image` - The image to encode.
/// - `quality` - The quality of the JPEG encoding, range from 0 (lowest) to 100 (highest)
pub fn write_image_jpeg_rgb8(
    file_path: impl AsRef<Path>,
    image: &Image<u8, 3>,
    quality: u8,
) -> Result<(), IoError> {
    let (width, height) = (image.width(), image.height());
    let (Ok(w), Ok(h)) = (u16::try_from(width), u16::try_from(height)) else {
        return Err(IoError::ImageTooLarge(width, height));
    };

    let encoder = Encoder::new_file(file_path, quality)?;
    encoder.encode(image.as_slice(), w, h, ColorType::Rgb)?;
    Ok(())
}
