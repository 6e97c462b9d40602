use mosaic_image::{ImageSize, Rect};

/// Grow a region of interest about its centre and clamp it to the canvas.
///
/// The new width and height are the old ones scaled by `factor` and truncated
/// to whole pixels. Returns `None` when nothing of the grown region lies inside
/// `bounds`.
///
/// # Example
///
/// ```
/// use mosaic_image::{ImageSize, Rect};
/// use mosaic_stitch::roi::grow_roi;
///
/// let roi = grow_roi(Rect::new(10, 10, 20, 10), 1.5, ImageSize { width: 100, height: 100 });
/// assert_eq!(roi, Some(Rect::new(5, 8, 30, 15)));
/// ```
pub fn grow_roi(roi: Rect, factor: f64, bounds: ImageSize) -> Option<Rect> {
    let new_width = (roi.width as f64 * factor) as i64;
    let new_height = (roi.height as f64 * factor) as i64;

    let x = roi.x as i64 - (new_width - roi.width as i64) / 2;
    let y = roi.y as i64 - (new_height - roi.height as i64) / 2;

    let (x0, y0) = (x.max(0), y.max(0));
    let x1 = (x + new_width).min(bounds.width as i64);
    let y1 = (y + new_height).min(bounds.height as i64);

    if x1 <= x0 || y1 <= y0 {
        return None;
    }

    Some(Rect::new(
        x0 as usize,
        y0 as usize,
        (x1 - x0) as usize,
        (y1 - y0) as usize,
    ))
}
