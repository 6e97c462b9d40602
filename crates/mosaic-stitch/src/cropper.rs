use mosaic_image::{Image, Rect};
use mosaic_imgproc::{color, contours::find_contours, threshold::threshold_binary};

use crate::error::StitchError;

/// Find the tight rectangle around the content of a canvas.
///
/// The canvas is converted to grayscale and every non-zero pixel is treated as
/// foreground. The rectangle bounds the largest region found in the mask.
///
/// # Errors
///
/// Returns [`StitchError::EmptyComposite`] if the canvas has no foreground pixel.
///
/// # Example
///
/// ```
/// use mosaic_image::{Image, ImageSize, Rect};
/// use mosaic_stitch::cropper::bounding_box;
///
/// let mut canvas = Image::<u8, 3>::from_size_val(ImageSize { width: 6, height: 4 }, 0).unwrap();
/// canvas.set_pixel(2, 1, [90, 90, 90]).unwrap();
/// canvas.set_pixel(4, 2, [90, 90, 90]).unwrap();
/// canvas.set_pixel(3, 1, [90, 90, 90]).unwrap();
/// canvas.set_pixel(3, 2, [90, 90, 90]).unwrap();
///
/// assert_eq!(bounding_box(&canvas).unwrap(), Rect::new(2, 1, 3, 2));
/// ```
pub fn bounding_box(image: &Image<u8, 3>) -> Result<Rect, StitchError> {
    let gray = color::to_gray_u8(image)?;
    let mut mask = Image::from_size_val(gray.size(), 0u8)?;
    threshold_binary(&gray, &mut mask, 0, 255)?;

    find_contours(&mask)
        .iter()
        .max_by(|a, b| a.area().total_cmp(&b.area()))
        .and_then(|contour| contour.bounding_rect())
        .ok_or(StitchError::EmptyComposite)
}
