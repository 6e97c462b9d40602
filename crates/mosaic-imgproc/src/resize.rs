use mosaic_image::{Image, ImageDtype, ImageError, ImageSize};

use crate::parallel;

// Source spans [start, end) along one axis with the fractional coverage of each source index.
fn area_weights(dst_len: usize, src_len: usize) -> Vec<Vec<(usize, f32)>> {
    let scale = src_len as f64 / dst_len as f64;
    (0..dst_len)
        .map(|i| {
            let start = i as f64 * scale;
            let end = ((i + 1) as f64 * scale).min(src_len as f64);
            let first = start.floor() as usize;
            let last = (end.ceil() as usize).min(src_len);
            let span = end - start;
            (first..last)
                .filter_map(|j| {
                    let overlap = (end.min((j + 1) as f64) - start.max(j as f64)).max(0.0);
                    (overlap > 0.0).then_some((j, (overlap / span) as f32))
                })
                .collect()
        })
        .collect()
}

/// Resize an image using pixel area relation.
///
/// Every destination pixel is the area-weighted mean of the source pixels it covers,
/// which avoids aliasing when shrinking an image.
///
/// # Arguments
///
/// * `src` - The input image container.
/// * `dst` - The output image container. Its size sets the target size.
///
/// # Errors
///
/// Returns an error if either image is empty.
///
/// # Example
///
/// ```
/// use mosaic_image::{Image, ImageSize};
/// use mosaic_imgproc::resize::resize_area;
///
/// let image = Image::<u8, 1>::new(ImageSize { width: 4, height: 2 }, vec![
///     0, 10, 20, 30,
///     10, 20, 30, 40,
/// ]).unwrap();
///
/// let mut resized = Image::<u8, 1>::from_size_val(ImageSize { width: 2, height: 1 }, 0).unwrap();
/// resize_area(&image, &mut resized).unwrap();
///
/// assert_eq!(resized.as_slice(), &[10, 30]);
/// ```
pub fn resize_area<T: ImageDtype, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
) -> Result<(), ImageError> {
    if src.size().area() == 0 || dst.size().area() == 0 {
        return Err(ImageError::InvalidImageSize(
            src.width(),
            src.height(),
            dst.width(),
            dst.height(),
        ));
    }

    let x_weights = area_weights(dst.cols(), src.cols());
    let y_weights = area_weights(dst.rows(), src.rows());
    let src_cols = src.cols();
    let data = src.as_slice();

    parallel::par_iter_rows_indexed(dst, |x, y, dst_pixel| {
        let mut acc = [0f32; C];
        for &(sy, wy) in &y_weights[y] {
            for &(sx, wx) in &x_weights[x] {
                let base = (sy * src_cols + sx) * C;
                let w = wx * wy;
                for (k, value) in acc.iter_mut().enumerate() {
                    *value += Into::<f32>::into(data[base + k]) * w;
                }
            }
        }
        for (out, value) in dst_pixel.iter_mut().zip(acc) {
            *out = T::from_f32(value);
        }
    });

    Ok(())
}

/// Scale both image dimensions by `scale` with area resampling.
///
/// The new dimensions are rounded and never drop below one pixel. A scale of
/// exactly one returns a copy of the input.
pub fn resize_by_scale<T: ImageDtype, const C: usize>(
    src: &Image<T, C>,
    scale: f64,
) -> Result<Image<T, C>, ImageError> {
    if scale == 1.0 {
        return Ok(src.clone());
    }

    let new_size = ImageSize {
        width: ((src.width() as f64 * scale).round() as usize).max(1),
        height: ((src.height() as f64 * scale).round() as usize).max(1),
    };

    let mut dst = Image::from_size_val(new_size, T::default())?;
    resize_area(src, &mut dst)?;
    Ok(dst)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_area_halves() -> Result<(), ImageError> {
        #[rustfmt::skip]
        let image = Image::<f32, 1>::new(ImageSize { width: 4, height: 4 }, vec![
            1.0, 1.0, 2.0, 2.0,
            1.0, 1.0, 2.0, 2.0,
            3.0, 3.0, 4.0, 4.0,
            3.0, 3.0, 4.0, 4.0,
        ])?;

        let resized = resize_by_scale(&image, 0.5)?;
        assert_eq!(resized.size(), ImageSize { width: 2, height: 2 });
        approx::assert_relative_eq!(resized.as_slice(), &[1.0f32, 2.0, 3.0, 4.0][..]);

        Ok(())
    }

    #[test]
    fn resize_area_fractional_overlap() -> Result<(), ImageError> {
        let image = Image::<f32, 1>::new(ImageSize { width: 3, height: 1 }, vec![0.0, 3.0, 6.0])?;
        let mut resized = Image::<f32, 1>::from_size_val(ImageSize { width: 2, height: 1 }, 0.0)?;
        resize_area(&image, &mut resized)?;

        // [0, 1.5) and [1.5, 3)
        approx::assert_relative_eq!(resized.as_slice(), &[1.0f32, 5.0][..], epsilon = 1e-5);

        Ok(())
    }

    #[test]
    fn resize_identity_scale() -> Result<(), ImageError> {
        let image = Image::<u8, 3>::from_size_val(ImageSize { width: 5, height: 3 }, 42)?;
        assert_eq!(resize_by_scale(&image, 1.0)?, image);
        Ok(())
    }

    #[test]
    fn resize_never_empty() -> Result<(), ImageError> {
        let image = Image::<u8, 3>::from_size_val(ImageSize { width: 3, height: 2 }, 7)?;
        let resized = resize_by_scale(&image, 0.01)?;
        assert_eq!(resized.size(), ImageSize { width: 1, height: 1 });
        assert_eq!(resized.pixel(0, 0)?, &[7, 7, 7]);
        Ok(())
    }
}
