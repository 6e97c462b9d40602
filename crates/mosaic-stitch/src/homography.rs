use std::ops::Mul;

use mosaic_imgproc::warp::{invert_perspective_matrix, transform_point};

/// A 3x3 projective transformation mapping object coordinates into canvas coordinates.
///
/// Homographies compose by multiplication: `(a * b)` applies `b` first, then `a`.
///
/// # Example
///
/// ```
/// use mosaic_stitch::homography::Homography;
///
/// let h = Homography::translation(10.0, 0.0) * Homography::translation(0.0, 5.0);
/// assert_eq!(h.transform_point(1.0, 1.0), Some((11.0, 6.0)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Homography(pub [[f64; 3]; 3]);

impl Homography {
    /// The identity transformation.
    pub fn identity() -> Self {
        Self([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]])
    }

    /// A pure translation by `(tx, ty)`.
    pub fn translation(tx: f64, ty: f64) -> Self {
        Self([[1.0, 0.0, tx], [0.0, 1.0, ty], [0.0, 0.0, 1.0]])
    }

    /// Build a homography from a row-major array.
    pub fn from_row_major(m: [f64; 9]) -> Self {
        Self([[m[0], m[1], m[2]], [m[3], m[4], m[5]], [m[6], m[7], m[8]]])
    }

    /// The matrix as a row-major array.
    pub fn to_row_major(&self) -> [f64; 9] {
        let m = &self.0;
        [
            m[0][0], m[0][1], m[0][2], m[1][0], m[1][1], m[1][2], m[2][0], m[2][1], m[2][2],
        ]
    }

    /// The determinant of the matrix.
    #[rustfmt::skip]
    pub fn determinant(&self) -> f64 {
        let m = &self.0;
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1]) -
        m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0]) +
        m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    /// Whether every entry is finite and the matrix can be inverted.
    pub fn is_invertible(&self) -> bool {
        self.inverse().is_some()
    }

    /// The inverse transformation, or `None` for a singular matrix.
    pub fn inverse(&self) -> Option<Self> {
        if self.0.iter().flatten().any(|v| !v.is_finite()) {
            return None;
        }
        invert_perspective_matrix(&self.to_row_major())
            .ok()
            .map(Self::from_row_major)
    }

    /// Map a point through the homography. Returns `None` for points sent to infinity.
    pub fn transform_point(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        transform_point(x, y, &self.to_row_major())
    }
}

impl Default for Homography {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mul for Homography {
    type Output = Homography;

    fn mul(self, rhs: Homography) -> Homography {
        let (a, b) = (&self.0, &rhs.0);
        let mut out = [[0.0; 3]; 3];
        for (i, row) in out.iter_mut().enumerate() {
            for (j, value) in row.iter_mut().enumerate() {
                *value = (0..3).map(|k| a[i][k] * b[k][j]).sum();
            }
        }
        Homography(out)
    }
}
