//! Per-frame feature detection: pupil ellipse and corneal glints.

mod config;
mod glints;
mod pupil;

pub use config::{
    DetectConfig, GlintConfig, PupilConfig, DEFAULT_GLINT_THRESHOLD, DEFAULT_MAX_GLINTS,
    DEFAULT_PUPIL_THRESHOLD,
};
pub use glints::find_glints;
pub use pupil::{find_pupil, find_pupil_or_sentinel};

/// Pupil detection failure.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DetectionError {
    #[error("no dark region found at pupil threshold {threshold}")]
    NoRegionFound { threshold: u8 },
}
