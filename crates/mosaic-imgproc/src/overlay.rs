use mosaic_image::{Image, ImageError};
use num_traits::Zero;
use rayon::prelude::*;

/// Paste the non-empty pixels of `src` onto `dst`.
///
/// A pixel is copied when at least one of its channels is non-zero, so black
/// pixels of `src` act as transparent.
///
/// # Errors
///
/// Returns an error if the two images do not have the same size.
///
/// # Example
///
/// ```
/// use mosaic_image::{Image, ImageSize};
/// use mosaic_imgproc::overlay::overlay_non_zero;
///
/// let size = ImageSize { width: 2, height: 1 };
/// let top = Image::<u8, 3>::new(size, vec![0, 0, 0, 0, 5, 0]).unwrap();
/// let mut base = Image::<u8, 3>::from_size_val(size, 9).unwrap();
///
/// overlay_non_zero(&top, &mut base).unwrap();
/// assert_eq!(base.as_slice(), &[9, 9, 9, 0, 5, 0]);
/// ```
pub fn overlay_non_zero<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
) -> Result<(), ImageError>
where
    T: Copy + Zero + Send + Sync,
{
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.width(),
            src.height(),
            dst.width(),
            dst.height(),
        ));
    }

    if C == 0 {
        return Ok(());
    }

    dst.as_slice_mut()
        .par_chunks_exact_mut(C)
        .zip(src.as_slice().par_chunks_exact(C))
        .filter(|(_, src_pixel)| src_pixel.iter().any(|v| !v.is_zero()))
        .for_each(|(dst_pixel, src_pixel)| dst_pixel.copy_from_slice(src_pixel));

    Ok(())
}
