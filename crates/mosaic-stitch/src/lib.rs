#![deny(missing_docs)]
//! Panorama stitching orchestration.
//!
//! An ordered list of overlapping images is merged into one mosaic by
//! repeatedly aligning an object image against a scene canvas. Feature
//! detection, matching and robust homography estimation are supplied through
//! [`vision::VisionPrimitives`]; this crate prunes the correspondences, tracks
//! the region of interest, crops the composites and sequences the pairwise
//! stitches according to one of four [`strategy::Algorithm`]s.
//!
//! Jobs run on a dedicated worker thread ([`job::StitchJob::spawn`]) and report
//! through [`events::StitchEvent`]s. In step mode the worker pauses after each
//! matching step until new pruning thresholds are supplied.

/// job configuration loaded from JSON.
pub mod config;

/// crop a composite to its content.
pub mod cropper;

/// error types of the stitching pipeline.
pub mod error;

/// notifications sent by a running job.
pub mod events;

/// 3x3 planar homographies.
pub mod homography;

/// worker thread, job handle and session.
pub mod job;

/// alignment of one image against a canvas.
pub mod pairwise;

/// geometric pruning of feature matches.
pub mod pruner;

/// growth of the region of interest between iterations.
pub mod roi;

/// pause and resume gate of step mode.
pub mod step;

/// persistence of intermediate and final composites.
pub mod store;

/// sequencing of the pairwise stitches.
pub mod strategy;

/// feature and geometry primitives supplied by a vision backend.
pub mod vision;

pub use error::StitchError;
