use crate::ImageSize;

/// An axis-aligned rectangle in pixel coordinates.
///
/// The rectangle covers the columns `x..x + width` and the rows `y..y + height`.
///
/// # Examples
///
/// ```
/// use mosaic_image::{ImageSize, Rect};
///
/// let rect = Rect::new(2, 3, 4, 5);
/// assert_eq!(rect.right(), 6);
/// assert_eq!(rect.bottom(), 8);
/// assert!(rect.fits_in(ImageSize { width: 6, height: 8 }));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    /// Left column of the rectangle.
    pub x: usize,
    /// Top row of the rectangle.
    pub y: usize,
    /// Width of the rectangle in pixels.
    pub width: usize,
    /// Height of the rectangle in pixels.
    pub height: usize,
}

impl Rect {
    /// Create a new rectangle from its top left corner and size.
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The rectangle covering a whole image of the given size.
    pub fn from_size(size: ImageSize) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    /// One past the last column covered by the rectangle.
    pub fn right(&self) -> usize {
        self.x + self.width
    }

    /// One past the last row covered by the rectangle.
    pub fn bottom(&self) -> usize {
        self.y + self.height
    }

    /// The size of the rectangle.
    pub fn size(&self) -> ImageSize {
        ImageSize {
            width: self.width,
            height: self.height,
        }
    }

    /// Number of pixels covered by the rectangle.
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Whether the rectangle covers no pixel.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether the rectangle lies completely inside an image of the given size.
    pub fn fits_in(&self, size: ImageSize) -> bool {
        self.right() <= size.width && self.bottom() <= size.height
    }

    /// Translate the rectangle by `(dx, dy)`.
    ///
    /// Returns `None` if the translated origin would leave the non-negative quadrant.
    pub fn translate(&self, dx: isize, dy: isize) -> Option<Rect> {
        Some(Rect {
            x: self.x.checked_add_signed(dx)?,
            y: self.y.checked_add_signed(dy)?,
            ..*self
        })
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "Rect {{ x: {}, y: {}, width: {}, height: {} }}",
            self.x, self.y, self.width, self.height
        )
    }
}
