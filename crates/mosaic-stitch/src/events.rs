use std::sync::mpsc::Sender;

use mosaic_image::{Image, Rect};

use crate::vision::{KeyPoint, Match};

/// The raw correspondences of one pair, offered for review in step mode.
#[derive(Debug, Clone)]
pub struct MatchReview {
    /// The grayscale object image.
    pub object: Image<u8, 1>,
    /// The grayscale scene region the features were searched in.
    pub scene: Image<u8, 1>,
    /// Where `scene` lies in the padded canvas.
    pub roi: Rect,
    /// Keypoints detected on the object image.
    pub object_keypoints: Vec<KeyPoint>,
    /// Keypoints detected on the scene region, in region coordinates.
    pub scene_keypoints: Vec<KeyPoint>,
    /// The unpruned matches.
    pub matches: Vec<Match>,
}

/// Notifications sent by a running job.
#[derive(Debug, Clone)]
pub enum StitchEvent {
    /// A pairwise stitch finished and its composite was persisted.
    Progress {
        /// One-based progress counter.
        index: usize,
        /// The value `index` reaches on the last stitch.
        total: usize,
        /// The composite after this stitch.
        composite: Image<u8, 3>,
    },
    /// Raw matches awaiting an advance, emitted in step mode only.
    MatchesForReview(Box<MatchReview>),
    /// The job ended.
    Finished {
        /// Whether the full mosaic was produced.
        success: bool,
    },
}

/// Receiver of [`StitchEvent`]s, owned by the worker.
pub trait EventSink: Send {
    /// Deliver one event.
    fn emit(&mut self, event: StitchEvent);
}

impl EventSink for Sender<StitchEvent> {
    fn emit(&mut self, event: StitchEvent) {
        if self.send(event).is_err() {
            log::debug!("event receiver disconnected, dropping event");
        }
    }
}

impl EventSink for Vec<StitchEvent> {
    fn emit(&mut self, event: StitchEvent) {
        self.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn channel_sink_forwards() {
        let (mut tx, rx) = mpsc::channel();
        tx.emit(StitchEvent::Finished { success: true });
        assert!(matches!(
            rx.try_recv(),
            Ok(StitchEvent::Finished { success: true })
        ));
    }

    #[test]
    fn channel_sink_survives_disconnect() {
        let (mut tx, rx) = mpsc::channel();
        drop(rx);
        tx.emit(StitchEvent::Finished { success: false });
    }
}
