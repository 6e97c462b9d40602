use mosaic_image::{Image, ImageSize};
use mosaic_imgproc::warp;

use crate::{error::StitchError, homography::Homography};

/// A feature location in the coordinates of the image it was detected in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyPoint {
    /// Horizontal pixel coordinate.
    pub x: f32,
    /// Vertical pixel coordinate.
    pub y: f32,
}

impl KeyPoint {
    /// Create a keypoint at `(x, y)`.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Fixed-length feature vectors, one row per keypoint.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Descriptors {
    dim: usize,
    data: Vec<f32>,
}

impl Descriptors {
    /// Wrap a row-major buffer of descriptors of length `dim` each.
    ///
    /// # Errors
    ///
    /// Returns an error if `dim` is zero or does not divide the buffer length.
    pub fn new(dim: usize, data: Vec<f32>) -> Result<Self, StitchError> {
        if dim == 0 || data.len() % dim != 0 {
            return Err(StitchError::Vision(format!(
                "descriptor buffer of length {} is not a multiple of dimension {dim}",
                data.len()
            )));
        }
        Ok(Self { dim, data })
    }

    /// The length of every descriptor.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// The number of descriptors.
    pub fn len(&self) -> usize {
        if self.dim == 0 {
            0
        } else {
            self.data.len() / self.dim
        }
    }

    /// Whether the set holds no descriptor.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The descriptor of the keypoint at `index`.
    pub fn row(&self, index: usize) -> Option<&[f32]> {
        self.data.get(index * self.dim..(index + 1) * self.dim)
    }

    /// Iterate over the descriptors in keypoint order.
    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks_exact(self.dim.max(1))
    }
}

/// A correspondence between an object keypoint and a scene keypoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match {
    /// Index into the object keypoints.
    pub object_idx: usize,
    /// Index into the scene keypoints.
    pub scene_idx: usize,
    /// Descriptor dissimilarity, lower is better.
    pub distance: f32,
}

/// The feature and geometry capabilities the stitcher relies on.
///
/// Implementations wrap a concrete feature detector, matcher and robust
/// estimator. The stitcher only orchestrates them.
pub trait VisionPrimitives: Send + Sync {
    /// Detect keypoints on a grayscale image and describe them.
    ///
    /// The descriptor rows are positionally aligned with the returned keypoints.
    fn detect_and_describe(
        &self,
        image: &Image<u8, 1>,
    ) -> Result<(Vec<KeyPoint>, Descriptors), StitchError>;

    /// Match every object descriptor against the scene descriptors.
    fn match_descriptors(
        &self,
        object: &Descriptors,
        scene: &Descriptors,
    ) -> Result<Vec<Match>, StitchError>;

    /// Robustly estimate the homography mapping `object_points` onto `scene_points`.
    ///
    /// Both slices hold `[x, y]` pairs and have the same length.
    fn estimate_homography(
        &self,
        object_points: &[[f64; 2]],
        scene_points: &[[f64; 2]],
    ) -> Result<Homography, StitchError>;

    /// Warp `image` through `homography` into a black canvas of `size`.
    fn warp_perspective(
        &self,
        image: &Image<u8, 3>,
        homography: &Homography,
        size: ImageSize,
    ) -> Result<Image<u8, 3>, StitchError> {
        let mut dst = Image::from_size_val(size, 0u8)?;
        warp::warp_perspective(image, &mut dst, &homography.to_row_major())?;
        Ok(dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct WarpOnly;

    impl VisionPrimitives for WarpOnly {
        fn detect_and_describe(
            &self,
            _image: &Image<u8, 1>,
        ) -> Result<(Vec<KeyPoint>, Descriptors), StitchError> {
            Ok((Vec::new(), Descriptors::default()))
        }

        fn match_descriptors(
            &self,
            _object: &Descriptors,
            _scene: &Descriptors,
        ) -> Result<Vec<Match>, StitchError> {
            Ok(Vec::new())
        }

        fn estimate_homography(
            &self,
            _object_points: &[[f64; 2]],
            _scene_points: &[[f64; 2]],
        ) -> Result<Homography, StitchError> {
            Err(StitchError::HomographyEstimation("unused".into()))
        }
    }

    #[test]
    fn descriptors_rows() -> Result<(), StitchError> {
        let desc = Descriptors::new(2, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])?;
        assert_eq!(desc.len(), 3);
        assert_eq!(desc.row(1), Some(&[3.0f32, 4.0][..]));
        assert_eq!(desc.row(3), None);
        assert_eq!(desc.rows().count(), 3);
        Ok(())
    }

    #[test]
    fn descriptors_bad_shape() {
        assert!(Descriptors::new(3, vec![0.0; 4]).is_err());
        assert!(Descriptors::new(0, vec![]).is_err());
        assert!(Descriptors::default().is_empty());
    }

    #[test]
    fn default_warp_translates() -> Result<(), StitchError> {
        let image = Image::<u8, 3>::from_size_val(ImageSize { width: 2, height: 2 }, 80)?;
        let warped = WarpOnly.warp_perspective(
            &image,
            &Homography::translation(1.0, 0.0),
            ImageSize { width: 3, height: 2 },
        )?;

        assert_eq!(warped.pixel(0, 0)?, &[0, 0, 0]);
        assert_eq!(warped.pixel(1, 0)?, &[80, 80, 80]);
        assert_eq!(warped.pixel(2, 1)?, &[80, 80, 80]);
        Ok(())
    }
}
