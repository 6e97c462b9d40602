use mosaic_image::{Image, ImageDtype};

/// Kernel for bilinear interpolation
///
/// The caller guarantees that `(u, v)` lies inside the image and that the image is not empty.
pub(crate) fn bilinear_interpolation<T: ImageDtype, const C: usize>(
    image: &Image<T, C>,
    u: f32,
    v: f32,
) -> [T; C] {
    let (rows, cols) = (image.rows(), image.cols());

    let iu0 = (u.trunc() as usize).min(cols - 1);
    let iv0 = (v.trunc() as usize).min(rows - 1);

    let frac_u = u.fract();
    let frac_v = v.fract();

    let frac_uu = 1.0 - frac_u;
    let frac_vv = 1.0 - frac_v;

    let w00 = frac_uu * frac_vv;
    let w01 = frac_u * frac_vv;
    let w10 = frac_uu * frac_v;
    let w11 = frac_u * frac_v;

    let iu1 = if iu0 + 1 < cols { iu0 + 1 } else { iu0 };
    let iv1 = if iv0 + 1 < rows { iv0 + 1 } else { iv0 };

    let data = image.as_slice();
    let at = |row: usize, col: usize| &data[(row * cols + col) * C..(row * cols + col + 1) * C];

    let p00 = at(iv0, iu0);
    let p01 = at(iv0, iu1);
    let p10 = at(iv1, iu0);
    let p11 = at(iv1, iu1);

    let f = |x: T| -> f32 { x.into() };

    let mut pixel = [T::default(); C];
    for k in 0..C {
        let value = f(p00[k]) * w00 + f(p01[k]) * w01 + f(p10[k]) * w10 + f(p11[k]) * w11;
        pixel[k] = T::from_f32(value);
    }

    pixel
}

#[cfg(test)]
mod tests {
    use mosaic_image::{Image, ImageError, ImageSize};

    #[test]
    fn bilinear_midpoint() -> Result<(), ImageError> {
        let image = Image::<f32, 1>::new(ImageSize { width: 2, height: 1 }, vec![0.0, 10.0])?;
        let pixel = super::bilinear_interpolation(&image, 0.5, 0.0);
        approx::assert_relative_eq!(pixel[0], 5.0);
        Ok(())
    }

    #[test]
    fn bilinear_rounds_u8() -> Result<(), ImageError> {
        let image = Image::<u8, 1>::new(ImageSize { width: 2, height: 2 }, vec![0, 255, 0, 255])?;
        let pixel = super::bilinear_interpolation(&image, 0.5, 0.5);
        assert_eq!(pixel, [128]);
        Ok(())
    }
}
