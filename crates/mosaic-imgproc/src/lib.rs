#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// color transformations module.
pub mod color;

/// find the boundaries of binary masks.
pub mod contours;

/// image cropping module.
pub mod crop;

// bilinear sampling used by the warps.
mod interpolation;

/// compose images by pasting their non-empty pixels.
pub mod overlay;

/// image padding module.
pub mod padding;

/// module containing parallization utilities.
pub mod parallel;

/// utility functions for resizing images.
pub mod resize;

/// operations to threshold images.
pub mod threshold;

/// image geometric transformations module.
pub mod warp;
