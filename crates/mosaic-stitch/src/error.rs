use std::path::PathBuf;

use mosaic_image::ImageError;
use mosaic_io::IoError;

/// Errors that can occur while stitching a mosaic.
#[derive(Debug, thiserror::Error)]
pub enum StitchError {
    /// Fewer input images than a mosaic needs.
    #[error("At least {required} images are required, got {found}")]
    NotEnoughImages {
        /// Number of images provided.
        found: usize,
        /// Minimum number of images.
        required: usize,
    },

    /// A job configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The job configuration could not be parsed.
    #[error("Failed to parse the job configuration. {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// An input image could not be read.
    #[error("Failed to load image {path}. {source}")]
    ImageLoad {
        /// The offending input path.
        path: PathBuf,
        /// The underlying reading error.
        #[source]
        source: IoError,
    },

    /// Too few correspondences survived pruning to estimate a homography.
    #[error("Only {found} good matches survived pruning, at least {required} are required")]
    InsufficientMatches {
        /// Number of pruned matches.
        found: usize,
        /// Minimum number of matches.
        required: usize,
    },

    /// The vision backend could not estimate a homography.
    #[error("Homography estimation failed: {0}")]
    HomographyEstimation(String),

    /// The estimated homography cannot be inverted.
    #[error("The estimated homography is singular")]
    SingularHomography,

    /// The canvas holds no foreground pixel to crop to.
    #[error("The composite image has no foreground pixels")]
    EmptyComposite,

    /// Feature detection, description or matching failed.
    #[error("Vision primitive failed: {0}")]
    Vision(String),

    /// The job was cancelled before it completed.
    #[error("The stitching job was cancelled")]
    Cancelled,

    /// A job is still running in the session.
    #[error("A stitching job is already running")]
    AlreadyRunning,

    /// The worker thread panicked.
    #[error("The stitching worker panicked")]
    WorkerPanicked,

    /// Error related to image.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// Error related to reading or writing files.
    #[error(transparent)]
    Io(#[from] IoError),
}

impl StitchError {
    /// Whether the error is detected before any pairwise stitch runs.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            StitchError::NotEnoughImages { .. }
                | StitchError::InvalidConfig(_)
                | StitchError::ConfigParse(_)
                | StitchError::ImageLoad { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::StitchError;

    #[test]
    fn precondition_classification() {
        assert!(StitchError::NotEnoughImages { found: 1, required: 2 }.is_precondition());
        assert!(StitchError::InvalidConfig("scale".into()).is_precondition());
        assert!(!StitchError::EmptyComposite.is_precondition());
        assert!(!StitchError::InsufficientMatches { found: 2, required: 4 }.is_precondition());
    }
}
