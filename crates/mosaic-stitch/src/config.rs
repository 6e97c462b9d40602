use std::path::{Path, PathBuf};

use mosaic_io::IoError;
use serde::{Deserialize, Serialize};

use crate::{error::StitchError, pruner::PruneThresholds, strategy::Algorithm};

/// Minimum number of images a mosaic is built from.
pub const MIN_IMAGES: usize = 2;

fn default_scale() -> f64 {
    1.0
}

fn default_roi_growth() -> f64 {
    1.25
}

fn default_jpeg_quality() -> u8 {
    95
}

/// The tuning parameters of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmParams {
    /// Factor every input is resized by before stitching, in `(0, 1]`.
    pub scale: f64,
    /// Factor the previous region of interest grows by, at least one.
    pub roi_growth: f64,
    /// Initial pruning thresholds.
    pub thresholds: PruneThresholds,
}

impl Default for AlgorithmParams {
    fn default() -> Self {
        Self {
            scale: default_scale(),
            roi_growth: default_roi_growth(),
            thresholds: PruneThresholds::default(),
        }
    }
}

impl AlgorithmParams {
    /// Check every parameter is in range.
    pub fn validate(&self) -> Result<(), StitchError> {
        if !(self.scale.is_finite() && self.scale > 0.0 && self.scale <= 1.0) {
            return Err(StitchError::InvalidConfig(format!(
                "scale must be in (0, 1], got {}",
                self.scale
            )));
        }
        if !(self.roi_growth.is_finite() && self.roi_growth >= 1.0) {
            return Err(StitchError::InvalidConfig(format!(
                "roi growth must be at least 1, got {}",
                self.roi_growth
            )));
        }
        let t = &self.thresholds;
        for (name, value) in [
            ("angle", t.angle),
            ("length", t.length),
            ("heuristic", t.heuristic),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(StitchError::InvalidConfig(format!(
                    "{name} threshold must be positive, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Everything a stitching job needs, loadable from JSON.
///
/// # Example
///
/// ```
/// use mosaic_stitch::{config::JobConfig, strategy::Algorithm};
///
/// let config = JobConfig::from_json_str(r#"{
///     "inputs": ["a.jpg", "b.jpg"],
///     "output_dir": "out",
///     "algorithm": "reduce",
///     "thresholds": { "angle": 1.5, "length": 1.0, "heuristic": 3.0 }
/// }"#).unwrap();
///
/// assert_eq!(config.algorithm, Algorithm::Reduce);
/// assert_eq!(config.scale, 1.0);
/// assert_eq!(config.jpeg_quality, 95);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    /// Ordered input image paths.
    pub inputs: Vec<PathBuf>,
    /// Directory the composites are written to.
    pub output_dir: PathBuf,
    /// Factor every input is resized by before stitching.
    #[serde(default = "default_scale")]
    pub scale: f64,
    /// Factor the previous region of interest grows by.
    #[serde(default = "default_roi_growth")]
    pub roi_growth: f64,
    /// Initial pruning thresholds.
    #[serde(default)]
    pub thresholds: PruneThresholds,
    /// The sequencing algorithm.
    #[serde(default)]
    pub algorithm: Algorithm,
    /// Start in step mode.
    #[serde(default)]
    pub interactive: bool,
    /// Quality of the written JPEG files, 1 to 100.
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

impl JobConfig {
    /// A configuration with default parameters.
    pub fn new(inputs: Vec<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        let params = AlgorithmParams::default();
        Self {
            inputs,
            output_dir: output_dir.into(),
            scale: params.scale,
            roi_growth: params.roi_growth,
            thresholds: params.thresholds,
            algorithm: Algorithm::default(),
            interactive: false,
            jpeg_quality: default_jpeg_quality(),
        }
    }

    /// Parse a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, StitchError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, StitchError> {
        let json = std::fs::read_to_string(path).map_err(IoError::from)?;
        Self::from_json_str(&json)
    }

    /// The tuning parameters of the job.
    pub fn params(&self) -> AlgorithmParams {
        AlgorithmParams {
            scale: self.scale,
            roi_growth: self.roi_growth,
            thresholds: self.thresholds,
        }
    }

    /// Check the configuration before any work starts.
    ///
    /// # Errors
    ///
    /// Fails with a precondition error for too few inputs, out of range
    /// parameters or a missing input file.
    pub fn validate(&self) -> Result<(), StitchError> {
        if self.inputs.len() < MIN_IMAGES {
            return Err(StitchError::NotEnoughImages {
                found: self.inputs.len(),
                required: MIN_IMAGES,
            });
        }

        self.params().validate()?;

        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(StitchError::InvalidConfig(format!(
                "jpeg quality must be in 1..=100, got {}",
                self.jpeg_quality
            )));
        }

        if let Some(missing) = self.inputs.iter().find(|p| !p.exists()) {
            return Err(StitchError::ImageLoad {
                path: missing.clone(),
                source: IoError::FileDoesNotExist(missing.clone()),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) -> Result<PathBuf, StitchError> {
        let path = dir.join(name);
        std::fs::write(&path, b"").map_err(IoError::from)?;
        Ok(path)
    }

    #[test]
    fn defaults_from_minimal_json() -> Result<(), StitchError> {
        let config = JobConfig::from_json_str(r#"{"inputs": [], "output_dir": "/tmp/out"}"#)?;
        assert_eq!(config.scale, 1.0);
        assert_eq!(config.roi_growth, 1.25);
        assert_eq!(config.thresholds, PruneThresholds::default());
        assert_eq!(config.algorithm, Algorithm::CompoundHomography);
        assert!(!config.interactive);
        Ok(())
    }

    #[test]
    fn malformed_json() {
        let res = JobConfig::from_json_str(r#"{"inputs": 3}"#);
        assert!(matches!(res, Err(StitchError::ConfigParse(_))));
    }

    #[test]
    fn too_few_inputs() -> Result<(), StitchError> {
        let tmp_dir = tempfile::tempdir().map_err(IoError::from)?;
        let a = touch(tmp_dir.path(), "a.png")?;
        let config = JobConfig::new(vec![a], tmp_dir.path());
        assert!(matches!(
            config.validate(),
            Err(StitchError::NotEnoughImages { found: 1, required: 2 })
        ));
        Ok(())
    }

    #[test]
    fn out_of_range_parameters() -> Result<(), StitchError> {
        let tmp_dir = tempfile::tempdir().map_err(IoError::from)?;
        let inputs = vec![
            touch(tmp_dir.path(), "a.png")?,
            touch(tmp_dir.path(), "b.png")?,
        ];
        let base = JobConfig::new(inputs, tmp_dir.path());
        assert!(base.validate().is_ok());

        let mut config = base.clone();
        config.scale = 0.0;
        assert!(matches!(config.validate(), Err(StitchError::InvalidConfig(_))));

        let mut config = base.clone();
        config.scale = 1.5;
        assert!(config.validate().is_err());

        let mut config = base.clone();
        config.roi_growth = 0.9;
        assert!(config.validate().is_err());

        let mut config = base.clone();
        config.thresholds.heuristic = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = base;
        config.jpeg_quality = 0;
        assert!(config.validate().is_err());

        Ok(())
    }

    #[test]
    fn missing_input_file() -> Result<(), StitchError> {
        let tmp_dir = tempfile::tempdir().map_err(IoError::from)?;
        let a = touch(tmp_dir.path(), "a.png")?;
        let missing = tmp_dir.path().join("missing.png");
        let config = JobConfig::new(vec![a, missing.clone()], tmp_dir.path());

        match config.validate() {
            Err(err @ StitchError::ImageLoad { .. }) => {
                assert!(err.is_precondition());
                assert!(err.to_string().contains("missing.png"));
            }
            other => panic!("unexpected result {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn json_file_round_trip() -> Result<(), StitchError> {
        let tmp_dir = tempfile::tempdir().map_err(IoError::from)?;
        let mut config = JobConfig::new(vec!["x.jpg".into(), "y.jpg".into()], "out");
        config.algorithm = Algorithm::Cumulative;
        config.interactive = true;

        let path = tmp_dir.path().join("job.json");
        std::fs::write(&path, serde_json::to_string_pretty(&config)?).map_err(IoError::from)?;

        assert_eq!(JobConfig::from_json_file(&path)?, config);
        Ok(())
    }
}
