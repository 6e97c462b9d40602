//! Geometric image transformations.
//!
//! Perspective transformations (homographies) map every destination pixel back
//! into the source image and resample it there.
//!
//! # Examples
//!
//! Translating an image by one pixel:
//!
//! ```
//! use mosaic_image::{Image, ImageSize};
//! use mosaic_imgproc::warp::warp_perspective;
//!
//! let src = Image::<u8, 1>::from_size_val(ImageSize { width: 2, height: 2 }, 7).unwrap();
//! let mut dst = Image::<u8, 1>::from_size_val(ImageSize { width: 3, height: 3 }, 0).unwrap();
//!
//! let m = [1.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0];
//! warp_perspective(&src, &mut dst, &m).unwrap();
//!
//! assert_eq!(dst.as_slice(), &[0, 0, 0, 0, 7, 7, 0, 7, 7]);
//! ```

mod perspective;

pub use perspective::{invert_perspective_matrix, transform_point, warp_perspective};
