use mosaic_image::Image;

use super::{ensure_enough_images, Algorithm, SequenceOutcome, SequenceStrategy, StitchContext};
use crate::{error::StitchError, pairwise::PairMode};

/// Merge neighbouring images pairwise in a balanced tree.
///
/// Every round stitches the right member of each adjacent pair onto the left
/// one. An odd image out is carried to the next round unchanged, where it is
/// stitched against the composite produced to its left. The tree depth, and so
/// the length of any homography chain, is `ceil(log2(n))`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reduce;

impl SequenceStrategy for Reduce {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Reduce
    }

    fn run(
        &self,
        ctx: &mut StitchContext<'_>,
        images: Vec<Image<u8, 3>>,
    ) -> Result<SequenceOutcome, StitchError> {
        ensure_enough_images(&images)?;
        let total = images.len() - 1;

        let mut level = images;
        let mut stitches = 0;
        let mut rounds = 0;

        while level.len() > 1 {
            let mut next = Vec::with_capacity(level.len().div_ceil(2));
            let mut members = level.into_iter();

            while let Some(scene) = members.next() {
                let Some(object) = members.next() else {
                    log::debug!("round {rounds}: carrying the last image to the next round");
                    next.push(scene);
                    break;
                };

                ctx.check_cancelled()?;

                let result = ctx.stitch_pair(&object, &scene, None, false, PairMode::Composite)?;
                let composite = result.composite.ok_or(StitchError::EmptyComposite)?;

                stitches += 1;
                ctx.report(stitches, total, &composite)?;
                next.push(composite);
            }

            level = next;
            rounds += 1;
        }

        let composite = level.pop().ok_or(StitchError::EmptyComposite)?;

        Ok(SequenceOutcome {
            composite,
            stitches,
            rounds,
            accumulated: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        events::StitchEvent,
        homography::Homography,
        step::StepController,
        vision::{Descriptors, KeyPoint, Match, VisionPrimitives},
    };
    use mosaic_image::ImageSize;

    // Four fixed corners on every image, matched one to one, aligned by identity.
    struct Corners;

    impl VisionPrimitives for Corners {
        fn detect_and_describe(
            &self,
            _image: &Image<u8, 1>,
        ) -> Result<(Vec<KeyPoint>, Descriptors), StitchError> {
            let keypoints = vec![
                KeyPoint::new(0.0, 0.0),
                KeyPoint::new(1.0, 0.0),
                KeyPoint::new(0.0, 1.0),
                KeyPoint::new(1.0, 1.0),
            ];
            Ok((keypoints, Descriptors::new(1, vec![0.0, 1.0, 2.0, 3.0])?))
        }

        fn match_descriptors(
            &self,
            object: &Descriptors,
            _scene: &Descriptors,
        ) -> Result<Vec<Match>, StitchError> {
            Ok((0..object.len())
                .map(|i| Match {
                    object_idx: i,
                    scene_idx: i,
                    distance: 1.0,
                })
                .collect())
        }

        fn estimate_homography(
            &self,
            _object_points: &[[f64; 2]],
            _scene_points: &[[f64; 2]],
        ) -> Result<Homography, StitchError> {
            Ok(Homography::identity())
        }
    }

    #[test]
    fn rounds_match_tree_depth() -> Result<(), StitchError> {
        let size = ImageSize {
            width: 8,
            height: 6,
        };

        for n in 2..=16usize {
            let images = (0..n)
                .map(|_| Image::<u8, 3>::from_size_val(size, 100))
                .collect::<Result<Vec<_>, _>>()?;

            let controller = StepController::default();
            let mut events = Vec::new();
            let mut ctx = StitchContext::new(&Corners, &controller, &mut events, None, 1.25);
            let outcome = Reduce.run(&mut ctx, images)?;

            let expected = (n as f64).log2().ceil() as usize;
            assert_eq!(outcome.rounds, expected, "n = {n}");
            assert_eq!(outcome.stitches, n - 1, "n = {n}");

            let totals = events
                .iter()
                .filter_map(|e| match e {
                    StitchEvent::Progress { index, total, .. } => Some((*index, *total)),
                    _ => None,
                })
                .collect::<Vec<_>>();
            let expected_totals = (1..n).map(|i| (i, n - 1)).collect::<Vec<_>>();
            assert_eq!(totals, expected_totals, "n = {n}");
        }
        Ok(())
    }
}
