//! Pixel interpolation for image transformations.
//!
//! The kernel samples a source image at fractional coordinates by linear
//! interpolation between the four adjacent pixels. It is used by
//! [`crate::warp`] when resampling a warped image.

mod bilinear;

pub(crate) use bilinear::bilinear_interpolation;
