use mosaic_image::{Image, ImageError, Rect};
use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

/// Crop an image to a specified region.
///
/// The size of the region is given by the size of `dst`.
///
/// # Arguments
///
/// * `src` - The source image to crop.
/// * `dst` - The destination image to store the cropped image.
/// * `x` - The x-coordinate of the top-left corner of the region to crop.
/// * `y` - The y-coordinate of the top-left corner of the region to crop.
///
/// # Errors
///
/// If the region does not fit in `src`, an error is returned.
///
/// # Examples
///
/// ```rust
/// use mosaic_image::{Image, ImageSize};
/// use mosaic_imgproc::crop::crop_image;
///
/// let image = Image::<_, 1>::new(ImageSize { width: 4, height: 4 }, vec![
///     0u8, 1, 2, 3,
///     4u8, 5, 6, 7,
///     8u8, 9, 10, 11,
///     12u8, 13, 14, 15
/// ]).unwrap();
///
/// let mut cropped = Image::<_, 1>::from_size_val(ImageSize { width: 2, height: 2 }, 0u8).unwrap();
///
/// crop_image(&image, &mut cropped, 1, 1).unwrap();
///
/// assert_eq!(cropped.as_slice(), &[5u8, 6, 9, 10]);
/// ```
pub fn crop_image<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    x: usize,
    y: usize,
) -> Result<(), ImageError>
where
    T: Copy + Send + Sync,
{
    let region = Rect::new(x, y, dst.cols(), dst.rows());
    if !region.fits_in(src.size()) {
        return Err(ImageError::RegionOutOfBounds(region, src.size()));
    }

    let dst_cols = dst.cols();
    if dst_cols == 0 {
        return Ok(());
    }
    let src_cols = src.cols();
    let src_data = src.as_slice();

    dst.as_slice_mut()
        .par_chunks_exact_mut(dst_cols * C)
        .enumerate()
        .for_each(|(i, dst_row)| {
            // get the slice at the top left corner
            let offset = (y + i) * src_cols * C + x * C;
            dst_row.copy_from_slice(&src_data[offset..offset + dst_cols * C]);
        });

    Ok(())
}

/// Allocate a new image holding the pixels of `src` inside `region`.
pub fn crop_rect<T, const C: usize>(
    src: &Image<T, C>,
    region: Rect,
) -> Result<Image<T, C>, ImageError>
where
    T: Copy + Default + Send + Sync,
{
    let mut dst = Image::from_size_val(region.size(), T::default())?;
    crop_image(src, &mut dst, region.x, region.y)?;
    Ok(dst)
}

#[cfg(test)]
mod tests {
    use mosaic_image::{Image, ImageError, ImageSize, Rect};

    #[test]
    fn test_crop() -> Result<(), ImageError> {
        let image_size = ImageSize {
            width: 2,
            height: 3,
        };

        #[rustfmt::skip]
        let image = Image::<_, 3>::new(
            image_size,
            vec![
                0u8, 1, 2, 3, 4, 5,
                6u8, 7, 8, 9, 10, 11,
                12u8, 13, 14, 15, 16, 17,
            ],
        )?;

        let cropped = super::crop_rect(&image, Rect::new(1, 1, 1, 2))?;
        assert_eq!(cropped.as_slice(), &[9u8, 10, 11, 15, 16, 17]);

        Ok(())
    }

    #[test]
    fn test_crop_out_of_bounds() -> Result<(), ImageError> {
        let image = Image::<u8, 1>::from_size_val([3, 3].into(), 0)?;
        let res = super::crop_rect(&image, Rect::new(2, 0, 2, 2));
        assert!(matches!(res, Err(ImageError::RegionOutOfBounds(..))));
        Ok(())
    }
}
