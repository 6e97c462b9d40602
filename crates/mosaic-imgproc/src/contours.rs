use std::collections::HashMap;

use mosaic_image::{Image, Rect};

/// A closed boundary traced around a connected foreground region.
///
/// The points lie halfway between foreground and background pixel centers,
/// so a single isolated pixel yields a diamond with a non-zero area.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    /// The boundary points as `(x, y)` pixel coordinates, in traversal order.
    pub points: Vec<[f64; 2]>,
}

impl Contour {
    /// The absolute enclosed area computed with the shoelace formula.
    pub fn area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let twice_area = (0..n).fold(0.0, |acc, i| {
            let [x0, y0] = self.points[i];
            let [x1, y1] = self.points[(i + 1) % n];
            acc + x0 * y1 - x1 * y0
        });
        0.5 * twice_area.abs()
    }

    /// The smallest pixel rectangle containing every foreground pixel enclosed by the contour.
    ///
    /// Returns `None` for an empty contour.
    pub fn bounding_rect(&self) -> Option<Rect> {
        let first = self.points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first[0], first[1], first[0], first[1]);
        for &[x, y] in &self.points[1..] {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }

        // boundary points sit half a pixel outside the enclosed pixel centers
        let x0 = min_x.ceil().max(0.0) as usize;
        let y0 = min_y.ceil().max(0.0) as usize;
        let x1 = max_x.floor().max(0.0) as usize;
        let y1 = max_y.floor().max(0.0) as usize;
        if x1 < x0 || y1 < y0 {
            return None;
        }

        Some(Rect::new(x0, y0, x1 - x0 + 1, y1 - y0 + 1))
    }
}

// A boundary vertex in doubled coordinates of the zero-bordered grid, stored as (row, col).
type Vertex = (i64, i64);

/// Find the external and internal boundaries of the non-zero regions of a binary mask.
///
/// The mask is treated as if surrounded by a one pixel border of zeros, so every
/// returned contour is closed. Diagonally touching pixels belong to separate contours.
///
/// # Arguments
///
/// * `src` - The input mask. Any non-zero value is foreground.
///
/// # Returns
///
/// The list of closed contours, in no particular order.
///
/// # Example
///
/// ```
/// use mosaic_image::{Image, ImageSize, Rect};
/// use mosaic_imgproc::contours::find_contours;
///
/// #[rustfmt::skip]
/// let mask = Image::<u8, 1>::new(ImageSize { width: 4, height: 3 }, vec![
///     0, 0, 0, 0,
///     0, 255, 255, 0,
///     0, 0, 0, 0,
/// ]).unwrap();
///
/// let contours = find_contours(&mask);
/// assert_eq!(contours.len(), 1);
/// assert_eq!(contours[0].bounding_rect(), Some(Rect::new(1, 1, 2, 1)));
/// ```
pub fn find_contours(src: &Image<u8, 1>) -> Vec<Contour> {
    let (rows, cols) = (src.rows() as i64, src.cols() as i64);
    let data = src.as_slice();

    let is_set = |r: i64, c: i64| -> bool {
        r >= 0 && c >= 0 && r < rows && c < cols && data[(r * cols + c) as usize] != 0
    };

    let mut adjacency: HashMap<Vertex, Vec<Vertex>> = HashMap::new();
    let mut link = |a: Vertex, b: Vertex| {
        adjacency.entry(a).or_default().push(b);
        adjacency.entry(b).or_default().push(a);
    };

    // cells span the pixel centers (r, c)..(r + 1, c + 1), including the zero border
    for r in -1..rows {
        for c in -1..cols {
            let ul = is_set(r, c);
            let ur = is_set(r, c + 1);
            let ll = is_set(r + 1, c);
            let lr = is_set(r + 1, c + 1);

            let (pr, pc) = (2 * (r + 1), 2 * (c + 1));
            let top = (pr, pc + 1);
            let bottom = (pr + 2, pc + 1);
            let left = (pr + 1, pc);
            let right = (pr + 1, pc + 2);

            match (ul, ur, ll, lr) {
                (false, false, false, false) | (true, true, true, true) => {}
                // saddles keep diagonal foreground pixels apart
                (true, false, false, true) => {
                    link(top, left);
                    link(bottom, right);
                }
                (false, true, true, false) => {
                    link(top, right);
                    link(bottom, left);
                }
                _ => {
                    let crossings = [
                        (ul != ur, top),
                        (ll != lr, bottom),
                        (ul != ll, left),
                        (ur != lr, right),
                    ];
                    let mut crossed = crossings.iter().filter(|(hit, _)| *hit).map(|(_, v)| *v);
                    if let (Some(a), Some(b)) = (crossed.next(), crossed.next()) {
                        link(a, b);
                    }
                }
            }
        }
    }

    assemble_loops(adjacency)
}

// Every vertex has exactly two neighbours, so the graph is a union of disjoint cycles.
fn assemble_loops(mut adjacency: HashMap<Vertex, Vec<Vertex>>) -> Vec<Contour> {
    let mut starts = adjacency.keys().copied().collect::<Vec<_>>();
    starts.sort_unstable();

    let mut contours = Vec::new();
    for start in starts {
        if !adjacency.contains_key(&start) {
            continue;
        }

        let mut loop_vertices = vec![start];
        let mut prev = start;
        let mut current = match adjacency.remove(&start).and_then(|n| n.first().copied()) {
            Some(next) => next,
            None => continue,
        };

        while current != start {
            loop_vertices.push(current);
            let neighbours = match adjacency.remove(&current) {
                Some(n) => n,
                None => break,
            };
            let next = neighbours
                .iter()
                .copied()
                .find(|&v| v != prev)
                .unwrap_or(prev);
            prev = current;
            current = next;
        }

        let points = loop_vertices
            .into_iter()
            .map(|(r, c)| [c as f64 / 2.0 - 1.0, r as f64 / 2.0 - 1.0])
            .collect();
        contours.push(Contour { points });
    }

    contours
}

#[cfg(test)]
mod tests {
    use super::*;
    use mosaic_image::{ImageError, ImageSize};

    #[test]
    fn single_pixel() -> Result<(), ImageError> {
        let mut mask = Image::<u8, 1>::from_size_val(ImageSize { width: 3, height: 3 }, 0)?;
        mask.set_pixel(1, 1, [1])?;

        let contours = find_contours(&mask);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].points.len(), 4);
        approx::assert_relative_eq!(contours[0].area(), 0.5);
        assert_eq!(contours[0].bounding_rect(), Some(Rect::new(1, 1, 1, 1)));

        Ok(())
    }

    #[test]
    fn full_mask_touches_borders() -> Result<(), ImageError> {
        let mask = Image::<u8, 1>::from_size_val(ImageSize { width: 5, height: 4 }, 255)?;

        let contours = find_contours(&mask);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].bounding_rect(), Some(Rect::new(0, 0, 5, 4)));

        Ok(())
    }

    #[test]
    fn diagonal_pixels_are_separate() -> Result<(), ImageError> {
        #[rustfmt::skip]
        let mask = Image::<u8, 1>::new(ImageSize { width: 2, height: 2 }, vec![
            1, 0,
            0, 1,
        ])?;

        let contours = find_contours(&mask);
        assert_eq!(contours.len(), 2);

        Ok(())
    }

    #[test]
    fn ring_has_inner_and_outer_boundaries() -> Result<(), ImageError> {
        #[rustfmt::skip]
        let mask = Image::<u8, 1>::new(ImageSize { width: 5, height: 5 }, vec![
            0, 0, 0, 0, 0,
            0, 1, 1, 1, 0,
            0, 1, 0, 1, 0,
            0, 1, 1, 1, 0,
            0, 0, 0, 0, 0,
        ])?;

        let mut contours = find_contours(&mask);
        assert_eq!(contours.len(), 2);

        contours.sort_by(|a, b| b.area().total_cmp(&a.area()));
        assert_eq!(contours[0].bounding_rect(), Some(Rect::new(1, 1, 3, 3)));
        assert!(contours[0].area() > contours[1].area());

        Ok(())
    }

    #[test]
    fn empty_mask() -> Result<(), ImageError> {
        let mask = Image::<u8, 1>::from_size_val(ImageSize { width: 4, height: 4 }, 0)?;
        assert!(find_contours(&mask).is_empty());
        Ok(())
    }
}
