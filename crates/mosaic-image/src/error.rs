/// An error type for the image module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ImageError {
    /// Error when channel and shape are not valid.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidChannelShape(usize, usize),

    /// Error when the image sizes do not match.
    #[error("Image size ({0}x{1}) does not match the expected size ({2}x{3})")]
    InvalidImageSize(usize, usize, usize, usize),

    /// Error when the pixel coordinates are out of bounds.
    #[error("Pixel coordinates ({0}, {1}) are out of bounds ({2}x{3})")]
    PixelIndexOutOfBounds(usize, usize, usize, usize),

    /// Error when a region does not fit in the image.
    #[error("Region {0} does not fit in an image of size {1}")]
    RegionOutOfBounds(crate::Rect, crate::ImageSize),

    /// Error when a transformation matrix is not invertible.
    #[error("Cannot compute the determinant of the transformation matrix")]
    CannotComputeDeterminant,
}
