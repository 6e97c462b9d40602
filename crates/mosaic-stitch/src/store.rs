use std::path::{Path, PathBuf};

use mosaic_image::Image;
use mosaic_io::{jpeg::write_image_jpeg_rgb8, IoError};

use crate::{error::StitchError, strategy::Algorithm};

/// Destination of the intermediate and final composites of a run.
pub trait ResultStore: Send {
    /// Persist the composite produced by stitch number `index`.
    fn persist(&mut self, index: usize, composite: &Image<u8, 3>) -> Result<(), StitchError>;

    /// Persist the finished mosaic.
    fn persist_final(&mut self, composite: &Image<u8, 3>) -> Result<(), StitchError>;
}

/// Writes composites as `<dir>/<TAG>_<index>.jpg` and `<dir>/<TAG>_final.jpg`.
#[derive(Debug, Clone)]
pub struct JpegDirectoryStore {
    dir: PathBuf,
    tag: &'static str,
    quality: u8,
}

impl JpegDirectoryStore {
    /// Create the store, creating `dir` if needed.
    pub fn new(
        dir: impl AsRef<Path>,
        algorithm: Algorithm,
        quality: u8,
    ) -> Result<Self, StitchError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir).map_err(IoError::from)?;
        Ok(Self {
            dir,
            tag: algorithm.tag(),
            quality,
        })
    }

    /// The file an intermediate composite is written to.
    pub fn path_for(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{}_{index}.jpg", self.tag))
    }

    /// The file the final mosaic is written to.
    pub fn final_path(&self) -> PathBuf {
        self.dir.join(format!("{}_final.jpg", self.tag))
    }
}

impl ResultStore for JpegDirectoryStore {
    fn persist(&mut self, index: usize, composite: &Image<u8, 3>) -> Result<(), StitchError> {
        let path = self.path_for(index);
        write_image_jpeg_rgb8(&path, composite, self.quality)?;
        log::info!("finished iteration {index}, output file: {}", path.display());
        Ok(())
    }

    fn persist_final(&mut self, composite: &Image<u8, 3>) -> Result<(), StitchError> {
        let path = self.final_path();
        write_image_jpeg_rgb8(&path, composite, self.quality)?;
        log::info!("final mosaic written to {}", path.display());
        Ok(())
    }
}
