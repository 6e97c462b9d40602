//! Sequencing strategies deciding which image pairs are aligned, and in what order.
//!
//! Every strategy drives the same pairwise primitive through a [`StitchContext`]:
//!
//! - [`FullMatches`]: grow one canvas, searching the whole canvas each time.
//! - [`Cumulative`]: grow one canvas, searching only around the previous object.
//! - [`CompoundHomography`]: chain the homographies between consecutive raw images.
//! - [`Reduce`]: merge neighbours pairwise in a balanced tree.

mod chain;
mod compound;
mod reduce;

pub use chain::{Cumulative, FullMatches};
pub use compound::CompoundHomography;
pub use reduce::Reduce;

use mosaic_image::{Image, Rect};
use serde::{Deserialize, Serialize};

use crate::{
    config::MIN_IMAGES,
    error::StitchError,
    events::{EventSink, StitchEvent},
    homography::Homography,
    pairwise::{PairMode, PairwiseStitcher, StitchResult},
    step::StepController,
    store::ResultStore,
    vision::VisionPrimitives,
};

/// The available sequencing algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// Match every new image against the whole canvas.
    FullMatches,
    /// Match every new image against the region of the previous one.
    Cumulative,
    /// Chain pairwise homographies between consecutive raw images.
    #[default]
    CompoundHomography,
    /// Balanced pairwise reduction tree.
    Reduce,
}

impl Algorithm {
    /// The prefix of the files written by this algorithm.
    pub fn tag(&self) -> &'static str {
        match self {
            Algorithm::FullMatches => "FULL",
            Algorithm::Cumulative => "CUMULATIVE",
            Algorithm::CompoundHomography => "COMPOUND",
            Algorithm::Reduce => "REDUCE",
        }
    }

    /// The strategy implementing this algorithm.
    pub fn strategy(&self) -> Box<dyn SequenceStrategy> {
        match self {
            Algorithm::FullMatches => Box::new(FullMatches),
            Algorithm::Cumulative => Box::new(Cumulative),
            Algorithm::CompoundHomography => Box::new(CompoundHomography),
            Algorithm::Reduce => Box::new(Reduce),
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// The result of a complete run.
#[derive(Debug, Clone)]
pub struct SequenceOutcome {
    /// The final mosaic.
    pub composite: Image<u8, 3>,
    /// Number of pairwise stitches performed.
    pub stitches: usize,
    /// Number of passes over the images, tree levels for [`Reduce`].
    pub rounds: usize,
    /// Last image to mosaic transformation, for [`CompoundHomography`] only.
    pub accumulated: Option<Homography>,
}

/// One way of ordering the pairwise stitches of a run.
pub trait SequenceStrategy: Send {
    /// The algorithm this strategy implements.
    fn algorithm(&self) -> Algorithm;

    /// Stitch `images` into one mosaic.
    ///
    /// # Errors
    ///
    /// Fails with [`StitchError::NotEnoughImages`] before any work for fewer
    /// than two images, and with the first pairwise failure otherwise.
    fn run(
        &self,
        ctx: &mut StitchContext<'_>,
        images: Vec<Image<u8, 3>>,
    ) -> Result<SequenceOutcome, StitchError>;
}

/// The collaborators a strategy works with.
pub struct StitchContext<'a> {
    vision: &'a dyn VisionPrimitives,
    controller: &'a StepController,
    sink: &'a mut dyn EventSink,
    store: Option<&'a mut dyn ResultStore>,
    roi_growth: f64,
}

impl<'a> StitchContext<'a> {
    /// Bundle the collaborators of a run.
    pub fn new(
        vision: &'a dyn VisionPrimitives,
        controller: &'a StepController,
        sink: &'a mut dyn EventSink,
        store: Option<&'a mut dyn ResultStore>,
        roi_growth: f64,
    ) -> Self {
        Self {
            vision,
            controller,
            sink,
            store,
            roi_growth,
        }
    }

    /// The vision backend.
    pub fn vision(&self) -> &dyn VisionPrimitives {
        self.vision
    }

    /// Fail once the run has been cancelled.
    pub fn check_cancelled(&self) -> Result<(), StitchError> {
        self.controller.check_cancelled()
    }

    /// Run one pairwise stitch.
    pub fn stitch_pair(
        &mut self,
        object: &Image<u8, 3>,
        scene: &Image<u8, 3>,
        previous_roi: Option<Rect>,
        use_roi: bool,
        mode: PairMode,
    ) -> Result<StitchResult, StitchError> {
        PairwiseStitcher::new(self.vision, self.controller, self.roi_growth).stitch_pair(
            object,
            scene,
            previous_roi,
            use_roi,
            mode,
            &mut *self.sink,
        )
    }

    /// Persist a composite, then announce it.
    pub fn report(
        &mut self,
        index: usize,
        total: usize,
        composite: &Image<u8, 3>,
    ) -> Result<(), StitchError> {
        if let Some(store) = self.store.as_deref_mut() {
            store.persist(index, composite)?;
        }
        self.sink.emit(StitchEvent::Progress {
            index,
            total,
            composite: composite.clone(),
        });
        log::info!("finished stitch {index} of {total}");
        Ok(())
    }
}

fn ensure_enough_images(images: &[Image<u8, 3>]) -> Result<(), StitchError> {
    if images.len() < MIN_IMAGES {
        return Err(StitchError::NotEnoughImages {
            found: images.len(),
            required: MIN_IMAGES,
        });
    }
    Ok(())
}
