//! Offline evaluation: calibrate on the first frames of a dataset, estimate
//! the held-out rest and summarize gaze error in screen pixels.

use image::GrayImage;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::calibration::{CalibrationConfig, CalibrationError, CalibrationModel, EstimateError};
use crate::dataset::{Dataset, DatasetError};
use crate::features::FeatureBasis;
use crate::ScreenPoint;

#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    Calibration(#[from] CalibrationError),
    #[error(transparent)]
    Estimate(#[from] EstimateError),
    #[error("no held-out frames: dataset has {frames} frames, train size {train_size}")]
    NoHeldOutFrames { frames: usize, train_size: usize },
}

/// Result for one held-out frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleError {
    pub index: usize,
    pub truth: ScreenPoint,
    pub estimate: ScreenPoint,
    /// Euclidean distance between estimate and truth.
    pub gaze_error: f64,
    /// Distance between detected and ground-truth pupil centers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pupil_error: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ErrorSummary {
    pub total: f64,
    pub mean: f64,
    pub median: f64,
}

impl ErrorSummary {
    /// `None` for an empty slice.
    pub fn from_errors(errors: &[f64]) -> Option<Self> {
        if errors.is_empty() {
            return None;
        }
        let total: f64 = errors.iter().sum();
        let mut sorted = errors.to_vec();
        sorted.sort_by(f64::total_cmp);
        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        };
        Some(Self {
            total,
            mean: total / errors.len() as f64,
            median,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub basis: FeatureBasis,
    pub train_size: usize,
    pub samples: Vec<SampleError>,
    /// Held-out frames whose pupil detection failed.
    pub failed: Vec<usize>,
    pub gaze: Option<ErrorSummary>,
    pub pupil: Option<ErrorSummary>,
}

/// Calibrate on frames `0..train_size` and evaluate the remaining frames.
pub fn evaluate(
    dataset: &Dataset,
    train_size: usize,
    config: &CalibrationConfig,
) -> Result<EvaluationReport, EvaluationError> {
    let frames = load_frames(dataset, train_size)?;
    evaluate_frames(dataset, &frames, train_size, config)
}

/// Evaluate every basis on the same split; frames are decoded once.
///
/// Each basis gets its own result so a rank-deficient high-degree fit does
/// not hide the others.
pub fn compare_bases(
    dataset: &Dataset,
    train_size: usize,
    config: &CalibrationConfig,
    bases: &[FeatureBasis],
) -> Result<Vec<(FeatureBasis, Result<EvaluationReport, EvaluationError>)>, EvaluationError> {
    let frames = load_frames(dataset, train_size)?;
    Ok(bases
        .iter()
        .map(|&basis| {
            let cfg = CalibrationConfig {
                basis,
                ..config.clone()
            };
            (basis, evaluate_frames(dataset, &frames, train_size, &cfg))
        })
        .collect())
}

fn load_frames(dataset: &Dataset, train_size: usize) -> Result<Vec<GrayImage>, EvaluationError> {
    let (_, held_out) = dataset.split(train_size);
    if held_out.is_empty() {
        return Err(EvaluationError::NoHeldOutFrames {
            frames: dataset.len(),
            train_size,
        });
    }
    Ok(dataset.frames(0..dataset.len())?)
}

fn evaluate_frames(
    dataset: &Dataset,
    frames: &[GrayImage],
    train_size: usize,
    config: &CalibrationConfig,
) -> Result<EvaluationReport, EvaluationError> {
    let (train, held_out) = dataset.split(train_size);
    let positions = dataset.positions();

    let mut model = CalibrationModel::new(config.clone());
    model.calibrate(&frames[train.clone()], &positions[train])?;

    let mut samples = Vec::with_capacity(held_out.len());
    let mut failed = Vec::new();
    for index in held_out {
        let center = match model.detect_center(&frames[index]) {
            Ok(c) => c,
            Err(err) => {
                warn!(index, %err, "held-out frame skipped");
                failed.push(index);
                continue;
            }
        };
        let estimate = model.estimate_from_center(center)?;
        let truth = positions[index];
        let pupil_error = dataset.pupils().map(|gt| {
            let c = gt[index].center;
            (center[0] - c[0]).hypot(center[1] - c[1])
        });
        samples.push(SampleError {
            index,
            truth,
            estimate,
            gaze_error: estimate.distance(&truth),
            pupil_error,
        });
    }

    let gaze_errors: Vec<f64> = samples.iter().map(|s| s.gaze_error).collect();
    let pupil_errors: Vec<f64> = samples.iter().filter_map(|s| s.pupil_error).collect();
    let gaze = ErrorSummary::from_errors(&gaze_errors);
    if let Some(g) = &gaze {
        info!(
            basis = %config.basis,
            samples = samples.len(),
            failed = failed.len(),
            mean = g.mean,
            median = g.median,
            "evaluation"
        );
    }

    Ok(EvaluationReport {
        basis: config.basis,
        train_size,
        samples,
        failed,
        gaze,
        pupil: ErrorSummary::from_errors(&pupil_errors),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn summary_statistics() {
        let s = ErrorSummary::from_errors(&[4.0, 1.0, 3.0, 2.0]).expect("non-empty");
        assert_relative_eq!(s.total, 10.0);
        assert_relative_eq!(s.mean, 2.5);
        assert_relative_eq!(s.median, 2.5);

        let odd = ErrorSummary::from_errors(&[9.0, 1.0, 5.0]).expect("non-empty");
        assert_relative_eq!(odd.median, 5.0);

        assert!(ErrorSummary::from_errors(&[]).is_none());
    }
}
