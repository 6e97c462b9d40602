use crate::{interpolation::bilinear_interpolation, parallel};

use mosaic_image::{Image, ImageDtype, ImageError};

#[rustfmt::skip]
fn determinant3x3(m: &[f64; 9]) -> f64 {
    m[0] * (m[4] * m[8] - m[5] * m[7]) -
    m[1] * (m[3] * m[8] - m[5] * m[6]) +
    m[2] * (m[3] * m[7] - m[4] * m[6])
}

#[rustfmt::skip]
fn adjugate3x3(m: &[f64; 9]) -> [f64; 9] {
    [
        m[4] * m[8] - m[5] * m[7],  // [0, 0]
        m[2] * m[7] - m[1] * m[8],  // [0, 1]
        m[1] * m[5] - m[2] * m[4],  // [0, 2]
        m[5] * m[6] - m[3] * m[8],  // [1, 0]
        m[0] * m[8] - m[2] * m[6],  // [1, 1]
        m[2] * m[3] - m[0] * m[5],  // [1, 2]
        m[3] * m[7] - m[4] * m[6],  // [2, 0]
        m[1] * m[6] - m[0] * m[7],  // [2, 1]
        m[0] * m[4] - m[1] * m[3],  // [2, 2]
    ]
}

/// Invert a row-major 3x3 perspective matrix.
///
/// # Errors
///
/// Returns [`ImageError::CannotComputeDeterminant`] when the matrix is singular
/// or contains non-finite values.
pub fn invert_perspective_matrix(m: &[f64; 9]) -> Result<[f64; 9], ImageError> {
    let det = determinant3x3(m);

    if det == 0.0 || !det.is_finite() {
        return Err(ImageError::CannotComputeDeterminant);
    }

    let adj = adjugate3x3(m);
    let inv_det = 1.0 / det;

    let mut inv_m = [0.0; 9];
    for i in 0..9 {
        inv_m[i] = adj[i] * inv_det;
    }

    Ok(inv_m)
}

/// Map a point through a row-major 3x3 perspective matrix.
///
/// Returns `None` when the point maps to infinity.
pub fn transform_point(x: f64, y: f64, m: &[f64; 9]) -> Option<(f64, f64)> {
    let w = m[6] * x + m[7] * y + m[8];
    if w == 0.0 {
        return None;
    }
    let xw = (m[0] * x + m[1] * y + m[2]) / w;
    let yw = (m[3] * x + m[4] * y + m[5]) / w;
    Some((xw, yw))
}

/// Applies a perspective transformation to an image.
///
/// Destination pixels whose preimage falls outside the source are left untouched,
/// so `dst` should be initialized with the desired background value.
///
/// * `src` - The input image with shape (height, width, channels).
/// * `dst` - The output image with shape (height, width, channels).
/// * `m` - The 3x3 perspective transformation matrix src -> dst, row-major.
///
/// The source is sampled with bilinear interpolation.
///
/// # Errors
///
/// Returns an error if `m` is not invertible.
pub fn warp_perspective<T: ImageDtype, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    m: &[f64; 9],
) -> Result<(), ImageError> {
    let inv_m = invert_perspective_matrix(m)?;

    if src.cols() == 0 || src.rows() == 0 {
        return Ok(());
    }

    let (src_cols, src_rows) = (src.cols() as f64, src.rows() as f64);

    parallel::par_iter_rows_indexed(dst, |x, y, dst_pixel| {
        let Some((u, v)) = transform_point(x as f64, y as f64, &inv_m) else {
            return;
        };
        if u >= 0.0 && u < src_cols && v >= 0.0 && v < src_rows {
            let pixel = bilinear_interpolation(src, u as f32, v as f32);
            dst_pixel.copy_from_slice(&pixel);
        }
    });

    Ok(())
}
