//! Synthetic scenes and a deterministic vision backend for the stitching tests.
#![allow(dead_code)]

use mosaic_image::{Image, ImageSize, Rect};
use mosaic_imgproc::crop::crop_rect;
use mosaic_stitch::{
    events::StitchEvent,
    homography::Homography,
    vision::{Descriptors, KeyPoint, Match, VisionPrimitives},
    StitchError,
};

pub const FRAME_WIDTH: usize = 60;
pub const FRAME_HEIGHT: usize = 50;
pub const FRAME_STEP: usize = 20;

const BACKGROUND: u8 = 50;
const MARKER_THRESHOLD: u8 = 200;
const MARKER_ROWS: [usize; 3] = [10, 25, 40];

/// Keypoints are the marker pixels, described by their intensity.
///
/// Every marker of the synthetic world has a unique intensity, so matching by
/// equal descriptors yields exact correspondences. The homography is the mean
/// translation between the matched points.
#[derive(Debug, Default)]
pub struct MarkerVision {
    /// Score the first match 1 and every other match 5.
    pub graded: bool,
}

impl VisionPrimitives for MarkerVision {
    fn detect_and_describe(
        &self,
        image: &Image<u8, 1>,
    ) -> Result<(Vec<KeyPoint>, Descriptors), StitchError> {
        let mut keypoints = Vec::new();
        let mut data = Vec::new();
        for (i, &v) in image.as_slice().iter().enumerate() {
            if v >= MARKER_THRESHOLD {
                let (x, y) = (i % image.width(), i / image.width());
                keypoints.push(KeyPoint::new(x as f32, y as f32));
                data.push(v as f32);
            }
        }
        Ok((keypoints, Descriptors::new(1, data)?))
    }

    fn match_descriptors(
        &self,
        object: &Descriptors,
        scene: &Descriptors,
    ) -> Result<Vec<Match>, StitchError> {
        let mut matches: Vec<Match> = Vec::new();
        for (object_idx, o) in object.rows().enumerate() {
            if let Some(scene_idx) = scene.rows().position(|s| s == o) {
                let distance = if self.graded && !matches.is_empty() {
                    5.0
                } else {
                    1.0
                };
                matches.push(Match {
                    object_idx,
                    scene_idx,
                    distance,
                });
            }
        }
        Ok(matches)
    }

    fn estimate_homography(
        &self,
        object_points: &[[f64; 2]],
        scene_points: &[[f64; 2]],
    ) -> Result<Homography, StitchError> {
        if object_points.is_empty() {
            return Err(StitchError::HomographyEstimation("no points".into()));
        }
        let n = object_points.len() as f64;
        let (mut tx, mut ty) = (0.0, 0.0);
        for (o, s) in object_points.iter().zip(scene_points) {
            tx += s[0] - o[0];
            ty += s[1] - o[1];
        }
        Ok(Homography::translation(tx / n, ty / n))
    }
}

/// Finds and matches markers like [`MarkerVision`] but never yields a usable homography.
#[derive(Debug, Default)]
pub struct BrokenEstimator {
    /// Return a rank deficient matrix instead of an estimation error.
    pub singular: bool,
}

impl VisionPrimitives for BrokenEstimator {
    fn detect_and_describe(
        &self,
        image: &Image<u8, 1>,
    ) -> Result<(Vec<KeyPoint>, Descriptors), StitchError> {
        MarkerVision::default().detect_and_describe(image)
    }

    fn match_descriptors(
        &self,
        object: &Descriptors,
        scene: &Descriptors,
    ) -> Result<Vec<Match>, StitchError> {
        MarkerVision::default().match_descriptors(object, scene)
    }

    fn estimate_homography(
        &self,
        _object_points: &[[f64; 2]],
        _scene_points: &[[f64; 2]],
    ) -> Result<Homography, StitchError> {
        if self.singular {
            return Ok(Homography([[1.0, 2.0, 0.0], [2.0, 4.0, 0.0], [0.0, 0.0, 1.0]]));
        }
        Err(StitchError::HomographyEstimation("collinear points".into()))
    }
}

/// Width of the world covered by `n` frames.
pub fn world_width(n: usize) -> usize {
    FRAME_WIDTH + FRAME_STEP * (n - 1)
}

/// A flat world with a grid of uniquely valued markers, wide enough for `n` frames.
pub fn world(n: usize) -> Result<Image<u8, 3>, StitchError> {
    let size = ImageSize {
        width: world_width(n),
        height: FRAME_HEIGHT,
    };
    let mut image = Image::<u8, 3>::from_size_val(size, BACKGROUND)?;

    let mut value = MARKER_THRESHOLD;
    for x in (5..size.width).step_by(10) {
        for y in MARKER_ROWS {
            image.set_pixel(x, y, [value, value, value])?;
            value = value.checked_add(1).ok_or(StitchError::InvalidConfig(
                "too many markers for a u8 intensity".into(),
            ))?;
        }
    }
    Ok(image)
}

/// `n` overlapping frames sliding left to right over the world.
pub fn frames(world: &Image<u8, 3>, n: usize) -> Result<Vec<Image<u8, 3>>, StitchError> {
    (0..n)
        .map(|i| {
            let rect = Rect::new(i * FRAME_STEP, 0, FRAME_WIDTH, FRAME_HEIGHT);
            Ok(crop_rect(world, rect)?)
        })
        .collect()
}

/// The leftmost `width` columns of the world.
pub fn world_prefix(world: &Image<u8, 3>, width: usize) -> Result<Image<u8, 3>, StitchError> {
    Ok(crop_rect(world, Rect::new(0, 0, width, world.height()))?)
}

/// The `(index, total)` pairs of the progress events.
pub fn progress(events: &[StitchEvent]) -> Vec<(usize, usize)> {
    events
        .iter()
        .filter_map(|e| match e {
            StitchEvent::Progress { index, total, .. } => Some((*index, *total)),
            _ => None,
        })
        .collect()
}

/// The success flags of the finish events.
pub fn finished(events: &[StitchEvent]) -> Vec<bool> {
    events
        .iter()
        .filter_map(|e| match e {
            StitchEvent::Finished { success } => Some(*success),
            _ => None,
        })
        .collect()
}
