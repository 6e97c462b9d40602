#![deny(missing_docs)]
//! Image types used by the mosaic stitching crates.

/// image representation for computer vision purposes.
pub mod image;

/// Error types for the image module.
pub mod error;

/// axis-aligned rectangles in pixel coordinates.
pub mod rect;

pub use crate::error::ImageError;
pub use crate::image::{Image, ImageDtype, ImageSize};
pub use crate::rect::Rect;
