use mosaic_image::{Image, ImageError, ImageSize};
use rayon::prelude::*;

/// Represents 2D padding with top, bottom, left, and right values (in pixels).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Padding2D {
    /// Amount of padding to add on the top side.
    pub top: usize,
    /// Amount of padding to add on the bottom side.
    pub bottom: usize,
    /// Amount of padding to add on the left side.
    pub left: usize,
    /// Amount of padding to add on the right side.
    pub right: usize,
}

impl Padding2D {
    /// The same amount of padding on all four sides.
    pub fn uniform(amount: usize) -> Self {
        Self {
            top: amount,
            bottom: amount,
            left: amount,
            right: amount,
        }
    }

    /// The size of an image of size `size` after applying this padding.
    pub fn padded_size(&self, size: ImageSize) -> ImageSize {
        ImageSize {
            width: size.width + self.left + self.right,
            height: size.height + self.top + self.bottom,
        }
    }

    /// Validates that a new image size correctly matches the expected dimensions
    /// after applying this padding to an existing image.
    ///
    /// # Example
    /// ```rust
    /// use mosaic_image::ImageSize;
    /// use mosaic_imgproc::padding::Padding2D;
    /// let padding = Padding2D { top: 1, bottom: 1, left: 2, right: 2 };
    /// let old_size = ImageSize { width: 4, height: 4 };
    /// let new_size = ImageSize { width: 8, height: 6 };
    ///
    /// assert!(padding.validate_size(old_size, new_size));
    /// ```
    pub fn validate_size(&self, old_size: ImageSize, new_size: ImageSize) -> bool {
        self.padded_size(old_size) == new_size
    }
}

/// Pads an image with a constant border, centering the original image.
///
/// # Arguments
///
/// * `src` - The source image to pad.
/// * `dst` - The destination image where the padded output will be stored.
/// * `padding` - The amount of padding (in pixels) for all four sides.
/// * `constant_value` - The pixel value used for the border, one value per channel.
///
/// # Errors
///
/// Returns an error if the size of `dst` does not match the size of `src` after padding.
///
/// # Example
///
/// ```rust
/// use mosaic_image::{ImageSize, Image};
/// use mosaic_imgproc::padding::{Padding2D, spatial_padding};
///
/// let src = Image::<u8, 3>::new(ImageSize { width: 2, height: 2 }, vec![1u8; 2 * 2 * 3]).unwrap();
/// let mut dst = Image::<u8, 3>::from_size_val(ImageSize { width: 4, height: 4 }, 0).unwrap();
///
/// spatial_padding(&src, &mut dst, Padding2D::uniform(1), [0u8; 3]).unwrap();
///
/// assert_eq!(dst.pixel(0, 0).unwrap(), &[0, 0, 0]);
/// assert_eq!(dst.pixel(1, 1).unwrap(), &[1, 1, 1]);
/// ```
pub fn spatial_padding<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    padding: Padding2D,
    constant_value: [T; C],
) -> Result<(), ImageError>
where
    T: Copy + Send + Sync,
{
    if !padding.validate_size(src.size(), dst.size()) {
        let expected = padding.padded_size(src.size());
        return Err(ImageError::InvalidImageSize(
            dst.width(),
            dst.height(),
            expected.width,
            expected.height,
        ));
    }

    let new_stride = dst.width() * C;
    let old_stride = src.width() * C;
    if new_stride == 0 {
        return Ok(());
    }

    let old_data = src.as_slice();
    let (top, left, old_height) = (padding.top, padding.left, src.height());

    dst.as_slice_mut()
        .par_chunks_exact_mut(new_stride)
        .enumerate()
        .for_each(|(y, dst_row)| {
            dst_row
                .chunks_exact_mut(C)
                .for_each(|pixel| pixel.copy_from_slice(&constant_value));

            if y < top || y >= top + old_height || old_stride == 0 {
                return;
            }

            let src_y = y - top;
            let src_row = &old_data[src_y * old_stride..(src_y + 1) * old_stride];
            dst_row[left * C..left * C + old_stride].copy_from_slice(src_row);
        });

    Ok(())
}

/// Allocate a padded copy of `src` with a uniform constant border of `amount` pixels.
pub fn pad_uniform<T, const C: usize>(
    src: &Image<T, C>,
    amount: usize,
    constant_value: [T; C],
) -> Result<Image<T, C>, ImageError>
where
    T: Copy + Default + Send + Sync,
{
    let padding = Padding2D::uniform(amount);
    let mut dst = Image::from_size_val(padding.padded_size(src.size()), T::default())?;
    spatial_padding(src, &mut dst, padding, constant_value)?;
    Ok(dst)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_padding() -> Result<(), ImageError> {
        #[rustfmt::skip]
        let src = Image::<u8, 1>::new(
            ImageSize { width: 2, height: 2 },
            vec![
                1, 2,
                3, 4,
            ],
        )?;

        let padded = pad_uniform(&src, 1, [9])?;

        #[rustfmt::skip]
        let expected = vec![
            9, 9, 9, 9,
            9, 1, 2, 9,
            9, 3, 4, 9,
            9, 9, 9, 9,
        ];
        assert_eq!(padded.size(), ImageSize { width: 4, height: 4 });
        assert_eq!(padded.as_slice(), &expected[..]);

        Ok(())
    }

    #[test]
    fn asymmetric_padding() -> Result<(), ImageError> {
        let src = Image::<u8, 3>::from_size_val(ImageSize { width: 1, height: 1 }, 5)?;
        let padding = Padding2D {
            top: 0,
            bottom: 1,
            left: 2,
            right: 0,
        };
        let mut dst = Image::<u8, 3>::from_size_val(padding.padded_size(src.size()), 1)?;
        spatial_padding(&src, &mut dst, padding, [0; 3])?;

        assert_eq!(dst.size(), ImageSize { width: 3, height: 2 });
        assert_eq!(dst.pixel(2, 0)?, &[5, 5, 5]);
        assert_eq!(dst.pixel(0, 0)?, &[0, 0, 0]);
        assert_eq!(dst.pixel(2, 1)?, &[0, 0, 0]);

        Ok(())
    }

    #[test]
    fn padding_size_mismatch() -> Result<(), ImageError> {
        let src = Image::<u8, 1>::from_size_val(ImageSize { width: 2, height: 2 }, 0)?;
        let mut dst = Image::<u8, 1>::from_size_val(ImageSize { width: 3, height: 4 }, 0)?;
        let res = spatial_padding(&src, &mut dst, Padding2D::uniform(1), [0]);
        assert_eq!(res, Err(ImageError::InvalidImageSize(3, 4, 4, 4)));
        Ok(())
    }
}
