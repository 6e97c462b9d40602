use mosaic_image::Image;

use super::{ensure_enough_images, Algorithm, SequenceOutcome, SequenceStrategy, StitchContext};
use crate::{error::StitchError, pairwise::PairMode};

/// Stitch every image onto one growing canvas, searching the whole canvas.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullMatches;

/// Stitch every image onto one growing canvas, searching around the previous image.
///
/// Limiting the scene side search to the region where the previous image
/// landed keeps the feature work bounded as the canvas grows.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cumulative;

impl SequenceStrategy for FullMatches {
    fn algorithm(&self) -> Algorithm {
        Algorithm::FullMatches
    }

    fn run(
        &self,
        ctx: &mut StitchContext<'_>,
        images: Vec<Image<u8, 3>>,
    ) -> Result<SequenceOutcome, StitchError> {
        run_chain(ctx, images, false)
    }
}

impl SequenceStrategy for Cumulative {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Cumulative
    }

    fn run(
        &self,
        ctx: &mut StitchContext<'_>,
        images: Vec<Image<u8, 3>>,
    ) -> Result<SequenceOutcome, StitchError> {
        run_chain(ctx, images, true)
    }
}

fn run_chain(
    ctx: &mut StitchContext<'_>,
    images: Vec<Image<u8, 3>>,
    use_roi: bool,
) -> Result<SequenceOutcome, StitchError> {
    ensure_enough_images(&images)?;
    let total = images.len();

    let mut images = images.into_iter();
    let mut canvas = images.next().ok_or(StitchError::NotEnoughImages {
        found: 0,
        required: total,
    })?;
    let mut roi = None;

    for (i, object) in images.enumerate().map(|(k, object)| (k + 1, object)) {
        ctx.check_cancelled()?;

        let result = ctx.stitch_pair(&object, &canvas, roi, use_roi, PairMode::Composite)?;
        canvas = result.composite.ok_or(StitchError::EmptyComposite)?;
        roi = result.roi;

        ctx.report(i + 1, total, &canvas)?;
    }

    Ok(SequenceOutcome {
        composite: canvas,
        stitches: total - 1,
        rounds: total - 1,
        accumulated: None,
    })
}
