#![doc = env!("CARGO_PKG_DESCRIPTION")]

#[doc(inline)]
pub use mosaic_image as image;

#[doc(inline)]
pub use mosaic_imgproc as imgproc;

#[doc(inline)]
pub use mosaic_io as io;

#[doc(inline)]
pub use mosaic_stitch as stitch;
