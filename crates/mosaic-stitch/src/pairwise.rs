use mosaic_image::{Image, Rect};
use mosaic_imgproc::{color, crop::crop_rect, overlay::overlay_non_zero, padding::pad_uniform};

use crate::{
    cropper::bounding_box,
    error::StitchError,
    events::{EventSink, MatchReview, StitchEvent},
    homography::Homography,
    pruner::{match_stats, prune_matches},
    roi::grow_roi,
    step::StepController,
    vision::VisionPrimitives,
};

/// Minimum number of pruned matches a homography is estimated from.
pub const MIN_GOOD_MATCHES: usize = 4;

/// How much of the pairwise stitch to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairMode {
    /// Pad the scene, warp the object onto it and crop the composite.
    Composite,
    /// Only estimate the homography, against the unpadded scene.
    HomographyOnly,
}

/// The outcome of one successful pairwise stitch.
#[derive(Debug, Clone)]
pub struct StitchResult {
    /// The cropped composite, absent in [`PairMode::HomographyOnly`].
    pub composite: Option<Image<u8, 3>>,
    /// Object to padded canvas transformation.
    pub homography: Homography,
    /// Where the warped object lies in the composite, absent in [`PairMode::HomographyOnly`].
    pub roi: Option<Rect>,
    /// The region of the padded canvas kept as composite, absent in [`PairMode::HomographyOnly`].
    pub crop: Option<Rect>,
    /// Number of raw matches.
    pub num_matches: usize,
    /// Number of matches kept by the pruner.
    pub num_good_matches: usize,
}

/// Padding added around the scene so a warped object of this size fits.
pub fn scene_padding(object: &Image<u8, 3>) -> usize {
    object.width().max(object.height()) / 2
}

/// Aligns one object image against one scene canvas.
pub struct PairwiseStitcher<'a> {
    vision: &'a dyn VisionPrimitives,
    controller: &'a StepController,
    roi_growth: f64,
}

impl<'a> PairwiseStitcher<'a> {
    /// Create a stitcher using `vision` for features and `controller` for the step gate.
    pub fn new(
        vision: &'a dyn VisionPrimitives,
        controller: &'a StepController,
        roi_growth: f64,
    ) -> Self {
        Self {
            vision,
            controller,
            roi_growth,
        }
    }

    /// Stitch `object` onto `scene`.
    ///
    /// With `use_roi` and a previous region of interest, the scene side feature
    /// search is limited to that region, shifted by the padding and grown by the
    /// growth factor. The review of the raw matches goes to `sink` when the
    /// controller is in step mode, and the pruning uses the thresholds the gate
    /// hands back.
    ///
    /// # Arguments
    ///
    /// * `object` - The image to add.
    /// * `scene` - The canvas built so far.
    /// * `previous_roi` - Where the previous object landed in `scene`.
    /// * `use_roi` - Whether to restrict the scene search to `previous_roi`.
    /// * `mode` - Whether to build a composite or only estimate the homography.
    /// * `sink` - Receiver of the match review.
    ///
    /// # Errors
    ///
    /// Fails when fewer than [`MIN_GOOD_MATCHES`] matches survive pruning, when
    /// the homography cannot be estimated or inverted, when a collaborator fails,
    /// or when the job is cancelled at the gate.
    pub fn stitch_pair(
        &self,
        object: &Image<u8, 3>,
        scene: &Image<u8, 3>,
        previous_roi: Option<Rect>,
        use_roi: bool,
        mode: PairMode,
        sink: &mut dyn EventSink,
    ) -> Result<StitchResult, StitchError> {
        let padding = match mode {
            PairMode::Composite => scene_padding(object),
            PairMode::HomographyOnly => 0,
        };
        log::debug!("padding scene by {padding} pixels");

        let padded = pad_uniform(scene, padding, [0u8; 3])?;

        let gray_object = color::to_gray_u8(object)?;
        let gray_scene = color::to_gray_u8(&padded)?;

        let full = Rect::from_size(padded.size());
        let roi = match previous_roi.filter(|r| use_roi && !r.is_empty()) {
            Some(prev) => prev
                .translate(padding as isize, padding as isize)
                .and_then(|shifted| grow_roi(shifted, self.roi_growth, padded.size()))
                .unwrap_or_else(|| {
                    log::warn!("region of interest {prev} left the canvas, searching everywhere");
                    full
                }),
            None => full,
        };
        log::debug!("scene search region {roi}");

        let scene_region = if roi == full {
            gray_scene
        } else {
            crop_rect(&gray_scene, roi)?
        };

        let (object_keypoints, object_descriptors) = self.vision.detect_and_describe(&gray_object)?;
        let (scene_keypoints, scene_descriptors) = self.vision.detect_and_describe(&scene_region)?;
        let matches = self
            .vision
            .match_descriptors(&object_descriptors, &scene_descriptors)?;

        let thresholds = self.controller.gate(|| {
            sink.emit(StitchEvent::MatchesForReview(Box::new(MatchReview {
                object: gray_object.clone(),
                scene: scene_region.clone(),
                roi,
                object_keypoints: object_keypoints.clone(),
                scene_keypoints: scene_keypoints.clone(),
                matches: matches.clone(),
            })))
        })?;

        let good_matches =
            prune_matches(&matches, &object_keypoints, &scene_keypoints, &thresholds);
        if let Some(stats) =
            match_stats(&matches, &object_keypoints, &scene_keypoints, &thresholds)
        {
            log::debug!("{stats:?}");
        }
        log::debug!(
            "pruned with angle {} length {} heuristic {}: {} of {} matches kept",
            thresholds.angle,
            thresholds.length,
            thresholds.heuristic,
            good_matches.len(),
            matches.len()
        );

        if good_matches.len() < MIN_GOOD_MATCHES {
            return Err(StitchError::InsufficientMatches {
                found: good_matches.len(),
                required: MIN_GOOD_MATCHES,
            });
        }

        // prune_matches only returns matches with valid indices
        let (object_points, scene_points): (Vec<[f64; 2]>, Vec<[f64; 2]>) = good_matches
            .iter()
            .map(|m| {
                let o = object_keypoints[m.object_idx];
                let s = scene_keypoints[m.scene_idx];
                ([o.x as f64, o.y as f64], [s.x as f64, s.y as f64])
            })
            .unzip();

        let local = self
            .vision
            .estimate_homography(&object_points, &scene_points)?;
        let homography = Homography::translation(roi.x as f64, roi.y as f64) * local;
        if !homography.is_invertible() {
            return Err(StitchError::SingularHomography);
        }
        log::debug!("homography {:?}", homography.0);

        let mut result = StitchResult {
            composite: None,
            homography,
            roi: None,
            crop: None,
            num_matches: matches.len(),
            num_good_matches: good_matches.len(),
        };

        if mode == PairMode::HomographyOnly {
            return Ok(result);
        }

        let warped = self
            .vision
            .warp_perspective(object, &homography, padded.size())?;
        let object_region = bounding_box(&warped)?;

        let mut canvas = padded;
        overlay_non_zero(&warped, &mut canvas)?;

        let crop = bounding_box(&canvas)?;
        result.composite = Some(crop_rect(&canvas, crop)?);
        result.roi = object_region.translate(-(crop.x as isize), -(crop.y as isize));
        result.crop = Some(crop);

        Ok(result)
    }
}
