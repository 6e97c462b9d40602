use mosaic_image::Image;
use mosaic_imgproc::{crop::crop_rect, overlay::overlay_non_zero, padding::pad_uniform};

use super::{ensure_enough_images, Algorithm, SequenceOutcome, SequenceStrategy, StitchContext};
use crate::{
    cropper::bounding_box,
    error::StitchError,
    homography::Homography,
    pairwise::{scene_padding, PairMode},
};

/// Chain the homographies between consecutive raw images.
///
/// Each image is aligned against the previous raw image only, and the
/// incremental homography is folded into an accumulator mapping the image
/// into the mosaic. Feature work stays constant per image, but the estimation
/// errors of the chain add up since the accumulator is never re-anchored.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompoundHomography;

impl SequenceStrategy for CompoundHomography {
    fn algorithm(&self) -> Algorithm {
        Algorithm::CompoundHomography
    }

    fn run(
        &self,
        ctx: &mut StitchContext<'_>,
        images: Vec<Image<u8, 3>>,
    ) -> Result<SequenceOutcome, StitchError> {
        ensure_enough_images(&images)?;
        let total = images.len();

        let mut images = images.into_iter();
        let mut previous = images.next().ok_or(StitchError::NotEnoughImages {
            found: 0,
            required: total,
        })?;
        let mut canvas = previous.clone();
        let mut accumulated = Homography::identity();

        for (i, object) in images.enumerate().map(|(k, object)| (k + 1, object)) {
            ctx.check_cancelled()?;

            let step =
                ctx.stitch_pair(&object, &previous, None, false, PairMode::HomographyOnly)?;

            let padding = scene_padding(&object);
            let mut padded = pad_uniform(&canvas, padding, [0u8; 3])?;

            let combined = Homography::translation(padding as f64, padding as f64)
                * accumulated
                * step.homography;

            let warped = ctx
                .vision()
                .warp_perspective(&object, &combined, padded.size())?;
            overlay_non_zero(&warped, &mut padded)?;

            let crop = bounding_box(&padded)?;
            canvas = crop_rect(&padded, crop)?;

            ctx.report(i + 1, total, &canvas)?;

            accumulated = Homography::translation(-(crop.x as f64), -(crop.y as f64)) * combined;
            log::debug!("accumulated homography {:?}", accumulated.0);

            previous = object;
        }

        Ok(SequenceOutcome {
            composite: canvas,
            stitches: total - 1,
            rounds: total - 1,
            accumulated: Some(accumulated),
        })
    }
}
