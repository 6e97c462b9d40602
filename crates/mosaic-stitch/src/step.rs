use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use crate::{error::StitchError, pruner::PruneThresholds};

#[derive(Debug)]
struct ControlState {
    thresholds: PruneThresholds,
    interactive: bool,
    paused: bool,
    cancelled: bool,
}

/// Pause and resume gate shared by the worker and the controlling side.
///
/// In interactive mode the worker stops at [`StepController::gate`] after
/// emitting the raw matches of a pair and sleeps until [`StepController::advance`]
/// delivers new thresholds. In non-interactive mode the gate never blocks.
///
/// The thresholds live behind the same mutex, so an update and the pruning
/// step reading it never interleave.
#[derive(Debug)]
pub struct StepController {
    state: Mutex<ControlState>,
    resumed: Condvar,
}

impl StepController {
    /// Create a running controller.
    pub fn new(thresholds: PruneThresholds, interactive: bool) -> Self {
        Self {
            state: Mutex::new(ControlState {
                thresholds,
                interactive,
                paused: false,
                cancelled: false,
            }),
            resumed: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ControlState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The thresholds the next pruning step will use.
    pub fn thresholds(&self) -> PruneThresholds {
        self.lock().thresholds
    }

    /// Whether the gate pauses the worker.
    pub fn is_interactive(&self) -> bool {
        self.lock().interactive
    }

    /// Whether the worker is currently waiting at the gate.
    pub fn is_paused(&self) -> bool {
        self.lock().paused
    }

    /// Whether the job has been asked to stop.
    pub fn is_cancelled(&self) -> bool {
        self.lock().cancelled
    }

    /// Switch step mode on or off. Switching it off releases a waiting worker.
    pub fn set_interactive(&self, interactive: bool) {
        let mut state = self.lock();
        state.interactive = interactive;
        if !interactive && state.paused {
            state.paused = false;
            self.resumed.notify_all();
        }
    }

    /// Install new thresholds and release the worker if it is paused.
    pub fn advance(&self, thresholds: PruneThresholds) {
        let mut state = self.lock();
        state.thresholds = thresholds;
        state.paused = false;
        self.resumed.notify_all();
    }

    /// Ask the worker to stop at the next iteration boundary or gate.
    pub fn cancel(&self) {
        let mut state = self.lock();
        state.cancelled = true;
        state.paused = false;
        self.resumed.notify_all();
    }

    /// Fail with [`StitchError::Cancelled`] once the job has been cancelled.
    pub fn check_cancelled(&self) -> Result<(), StitchError> {
        if self.is_cancelled() {
            return Err(StitchError::Cancelled);
        }
        Ok(())
    }

    /// Pass the step gate and return the thresholds to prune with.
    ///
    /// In interactive mode the controller is marked paused before `on_paused`
    /// runs, so an advance issued from inside or right after the callback is
    /// never lost. The call then blocks until the controller is advanced,
    /// switched to non-interactive or cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`StitchError::Cancelled`] if the job is cancelled before or while waiting.
    pub fn gate(&self, on_paused: impl FnOnce()) -> Result<PruneThresholds, StitchError> {
        {
            let mut state = self.lock();
            if state.cancelled {
                return Err(StitchError::Cancelled);
            }
            if !state.interactive {
                return Ok(state.thresholds);
            }
            state.paused = true;
        }

        on_paused();

        let mut state = self.lock();
        while state.paused && !state.cancelled {
            state = self
                .resumed
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }

        if state.cancelled {
            return Err(StitchError::Cancelled);
        }

        log::debug!("resumed with thresholds {:?}", state.thresholds);
        Ok(state.thresholds)
    }
}

impl Default for StepController {
    fn default() -> Self {
        Self::new(PruneThresholds::default(), false)
    }
}
