use std::{
    path::PathBuf,
    sync::{Arc, Mutex, PoisonError},
    thread::JoinHandle,
};

use mosaic_image::Image;
use mosaic_imgproc::resize::resize_by_scale;
use mosaic_io::functional::read_image_any_rgb8;

use crate::{
    config::{AlgorithmParams, JobConfig, MIN_IMAGES},
    error::StitchError,
    events::{EventSink, StitchEvent},
    pruner::PruneThresholds,
    step::StepController,
    store::{JpegDirectoryStore, ResultStore},
    strategy::{Algorithm, SequenceOutcome, StitchContext},
    vision::VisionPrimitives,
};

/// Where the images of a job come from.
#[derive(Debug, Clone)]
pub enum JobInputs {
    /// Image files, read and converted to RGB8 when the job starts.
    Files(Vec<PathBuf>),
    /// Images already in memory.
    Images(Vec<Image<u8, 3>>),
}

impl JobInputs {
    fn len(&self) -> usize {
        match self {
            JobInputs::Files(paths) => paths.len(),
            JobInputs::Images(images) => images.len(),
        }
    }
}

/// The lifecycle of a spawned job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// The worker is still stitching or waiting at the step gate.
    Running,
    /// The mosaic was produced.
    Succeeded,
    /// A precondition or a pairwise stitch failed.
    Failed,
    /// The job was cancelled before it completed.
    Aborted,
}

/// One stitching run, ready to be executed in place or on a worker thread.
pub struct StitchJob {
    inputs: JobInputs,
    params: AlgorithmParams,
    algorithm: Algorithm,
    interactive: bool,
    store: Option<Box<dyn ResultStore>>,
    vision: Arc<dyn VisionPrimitives>,
}

impl StitchJob {
    /// Build a job from a validated configuration, writing JPEG files to its output directory.
    ///
    /// # Errors
    ///
    /// Fails with a precondition error when the configuration is invalid, and
    /// with an I/O error when the output directory cannot be created.
    pub fn from_config(
        config: &JobConfig,
        vision: Arc<dyn VisionPrimitives>,
    ) -> Result<Self, StitchError> {
        config.validate()?;
        let store =
            JpegDirectoryStore::new(&config.output_dir, config.algorithm, config.jpeg_quality)?;
        Ok(Self {
            inputs: JobInputs::Files(config.inputs.clone()),
            params: config.params(),
            algorithm: config.algorithm,
            interactive: config.interactive,
            store: Some(Box::new(store)),
            vision,
        })
    }

    /// Build a job over in-memory images with default parameters and no store.
    pub fn from_images(
        images: Vec<Image<u8, 3>>,
        algorithm: Algorithm,
        vision: Arc<dyn VisionPrimitives>,
    ) -> Self {
        Self {
            inputs: JobInputs::Images(images),
            params: AlgorithmParams::default(),
            algorithm,
            interactive: false,
            store: None,
            vision,
        }
    }

    /// Replace the tuning parameters.
    pub fn with_params(mut self, params: AlgorithmParams) -> Self {
        self.params = params;
        self
    }

    /// Persist the composites to `store`.
    pub fn with_store(mut self, store: impl ResultStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    /// Start the job in step mode.
    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    /// The sequencing algorithm of the job.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// The controller a job with these settings starts with.
    pub fn controller(&self) -> StepController {
        StepController::new(self.params.thresholds, self.interactive)
    }

    fn load_images(&self) -> Result<Vec<Image<u8, 3>>, StitchError> {
        let images = match &self.inputs {
            JobInputs::Images(images) => images.clone(),
            JobInputs::Files(paths) => paths
                .iter()
                .map(|path| {
                    read_image_any_rgb8(path).map_err(|source| StitchError::ImageLoad {
                        path: path.clone(),
                        source,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?,
        };

        if self.params.scale == 1.0 {
            return Ok(images);
        }

        log::debug!("resizing {} images by {}", images.len(), self.params.scale);
        images
            .iter()
            .map(|image| Ok(resize_by_scale(image, self.params.scale)?))
            .collect()
    }

    /// Run the job on the calling thread.
    ///
    /// Precondition errors are returned before any stitching starts and send
    /// no event. Once stitching has started, the run always ends with a
    /// [`StitchEvent::Finished`] event.
    ///
    /// # Arguments
    ///
    /// * `controller` - The step gate and cancellation flag of the run.
    /// * `sink` - Receiver of the progress, review and finish events.
    ///
    /// # Returns
    ///
    /// The final mosaic with the run statistics.
    pub fn run(
        mut self,
        controller: &StepController,
        sink: &mut dyn EventSink,
    ) -> Result<SequenceOutcome, StitchError> {
        if self.inputs.len() < MIN_IMAGES {
            return Err(StitchError::NotEnoughImages {
                found: self.inputs.len(),
                required: MIN_IMAGES,
            });
        }
        self.params.validate()?;

        let images = self.load_images()?;
        log::info!(
            "stitching {} images with the {} algorithm",
            images.len(),
            self.algorithm
        );

        let result = self.stitch(images, controller, sink);
        sink.emit(StitchEvent::Finished {
            success: result.is_ok(),
        });

        match &result {
            Ok(outcome) => log::info!(
                "mosaic of {}x{} done after {} stitches in {} rounds",
                outcome.composite.width(),
                outcome.composite.height(),
                outcome.stitches,
                outcome.rounds
            ),
            Err(StitchError::Cancelled) => log::warn!("stitching cancelled"),
            Err(err) => log::error!("stitching failed: {err}"),
        }

        result
    }

    fn stitch(
        &mut self,
        images: Vec<Image<u8, 3>>,
        controller: &StepController,
        sink: &mut dyn EventSink,
    ) -> Result<SequenceOutcome, StitchError> {
        let strategy = self.algorithm.strategy();
        let store = self
            .store
            .as_mut()
            .map(|store| &mut **store as &mut dyn ResultStore);

        let mut ctx = StitchContext::new(
            &*self.vision,
            controller,
            sink,
            store,
            self.params.roi_growth,
        );
        let outcome = strategy.run(&mut ctx, images)?;

        if let Some(store) = self.store.as_mut() {
            store.persist_final(&outcome.composite)?;
        }

        Ok(outcome)
    }

    /// Run the job on a dedicated worker thread.
    pub fn spawn(self, sink: impl EventSink + 'static) -> JobHandle {
        let controller = Arc::new(self.controller());
        let state = Arc::new(Mutex::new(JobState::Running));

        let thread = {
            let controller = controller.clone();
            let state = state.clone();
            let mut sink = sink;
            std::thread::spawn(move || {
                let result = self.run(&controller, &mut sink);
                let end = match &result {
                    Ok(_) => JobState::Succeeded,
                    Err(StitchError::Cancelled) => JobState::Aborted,
                    Err(_) if controller.is_cancelled() => JobState::Aborted,
                    Err(_) => JobState::Failed,
                };
                *state.lock().unwrap_or_else(PoisonError::into_inner) = end;
                result
            })
        };

        JobHandle {
            controller,
            state,
            thread,
        }
    }
}

/// Control surface of a job running on a worker thread.
pub struct JobHandle {
    controller: Arc<StepController>,
    state: Arc<Mutex<JobState>>,
    thread: JoinHandle<Result<SequenceOutcome, StitchError>>,
}

impl JobHandle {
    /// Install new thresholds and release the worker if it waits at the step gate.
    pub fn advance(&self, thresholds: PruneThresholds) {
        self.controller.advance(thresholds);
    }

    /// Switch step mode on or off.
    pub fn set_interactive(&self, interactive: bool) {
        self.controller.set_interactive(interactive);
    }

    /// Ask the worker to stop at its next iteration boundary or gate.
    pub fn cancel(&self) {
        self.controller.cancel();
    }

    /// The controller shared with the worker.
    pub fn controller(&self) -> &StepController {
        &self.controller
    }

    /// The current state of the job.
    pub fn state(&self) -> JobState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether the worker thread has ended.
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Wait for the worker and return its outcome.
    pub fn join(self) -> Result<SequenceOutcome, StitchError> {
        match self.thread.join() {
            Ok(result) => result,
            Err(_) => {
                log::error!("stitching worker panicked");
                *self.state.lock().unwrap_or_else(PoisonError::into_inner) = JobState::Failed;
                Err(StitchError::WorkerPanicked)
            }
        }
    }
}

/// Holds at most one active job.
#[derive(Default)]
pub struct StitchSession {
    active: Option<JobHandle>,
}

impl StitchSession {
    /// An empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `job` as the active job.
    ///
    /// A finished or cancelled previous job is joined first. Its result is
    /// discarded.
    ///
    /// # Errors
    ///
    /// Fails with [`StitchError::AlreadyRunning`] while the previous job runs
    /// and has not been cancelled.
    pub fn start(
        &mut self,
        job: StitchJob,
        sink: impl EventSink + 'static,
    ) -> Result<&JobHandle, StitchError> {
        if let Some(previous) = self.active.take() {
            if !previous.is_finished() && !previous.controller().is_cancelled() {
                self.active = Some(previous);
                return Err(StitchError::AlreadyRunning);
            }
            if let Err(err) = previous.join() {
                log::debug!("previous job ended with: {err}");
            }
        }

        Ok(&*self.active.insert(job.spawn(sink)))
    }

    /// Cancel the active job, if any.
    pub fn cancel(&self) {
        if let Some(handle) = &self.active {
            handle.cancel();
        }
    }

    /// The active job.
    pub fn handle(&self) -> Option<&JobHandle> {
        self.active.as_ref()
    }

    /// Take the active job out of the session, for instance to join it.
    pub fn take(&mut self) -> Option<JobHandle> {
        self.active.take()
    }
}
