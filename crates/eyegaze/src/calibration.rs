//! Calibration-driven gaze regression.
//!
//! [`CalibrationModel`] starts uncalibrated. [`CalibrationModel::calibrate`]
//! detects the pupil in every calibration image, expands the centers with the
//! configured [`FeatureBasis`] and fits one least-squares regression per
//! screen axis: the first predicts screen `x`, the second screen `y`. A new
//! `calibrate` call always refits from scratch and only replaces the fitted
//! state when every step succeeded.

use image::GrayImage;
use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::detector::{find_pupil, DetectConfig, DetectionError};
use crate::features::FeatureBasis;
use crate::regression::{LinearRegression, RegressionError};
use crate::{PupilEllipse, ScreenPoint};

/// What to do with a frame in which no pupil was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailedDetectionPolicy {
    /// Fail the call.
    #[default]
    Reject,
    /// Continue with the sentinel center `(-1, -1)`.
    Sentinel,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    pub basis: FeatureBasis,
    pub on_failed_detection: FailedDetectionPolicy,
    pub detect: DetectConfig,
    /// Singular-value cutoff for rank detection; `None` uses the
    /// size-scaled machine-epsilon default.
    pub rank_tolerance: Option<f64>,
}

impl CalibrationConfig {
    pub fn with_basis(basis: FeatureBasis) -> Self {
        Self {
            basis,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalibrationError {
    #[error("{images} calibration images but {positions} known positions")]
    DimensionMismatch { images: usize, positions: usize },
    #[error("calibration needs at least one sample")]
    Empty,
    #[error("polynomial degree must be in 1..={}, got {degree}", crate::features::MAX_POLYNOMIAL_DEGREE)]
    InvalidDegree { degree: u32 },
    #[error("no pupil detected in calibration image {index}")]
    DetectionFailed { index: usize },
    #[error(transparent)]
    Regression(#[from] RegressionError),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EstimateError {
    #[error("model is not calibrated")]
    NotCalibrated,
    #[error(transparent)]
    DetectionFailed(#[from] DetectionError),
}

#[derive(Debug, Clone)]
struct FittedAxes {
    x: LinearRegression,
    y: LinearRegression,
}

/// Two-state gaze model: uncalibrated until the first successful
/// [`calibrate`](Self::calibrate).
#[derive(Debug, Clone, Default)]
pub struct CalibrationModel {
    config: CalibrationConfig,
    fitted: Option<FittedAxes>,
}

impl CalibrationModel {
    pub fn new(config: CalibrationConfig) -> Self {
        Self {
            config,
            fitted: None,
        }
    }

    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    pub fn is_calibrated(&self) -> bool {
        self.fitted.is_some()
    }

    /// Regression weights for screen x and y, once calibrated.
    pub fn weights(&self) -> Option<(&DVector<f64>, &DVector<f64>)> {
        self.fitted.as_ref().map(|f| (f.x.weights(), f.y.weights()))
    }

    /// Fit the model from calibration images and their known screen
    /// positions (matched by index).
    ///
    /// On error the previous fitted state is kept.
    pub fn calibrate(
        &mut self,
        images: &[GrayImage],
        positions: &[ScreenPoint],
    ) -> Result<(), CalibrationError> {
        self.check_inputs(images.len(), positions.len())?;

        let centers = images
            .iter()
            .enumerate()
            .map(|(index, img)| {
                self.detect_center(img)
                    .map_err(|_| CalibrationError::DetectionFailed { index })
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.calibrate_from_centers(&centers, positions)
    }

    /// Fit directly from pupil centers, skipping detection.
    pub fn calibrate_from_centers(
        &mut self,
        centers: &[[f64; 2]],
        positions: &[ScreenPoint],
    ) -> Result<(), CalibrationError> {
        self.check_inputs(centers.len(), positions.len())?;

        let basis = self.config.basis;
        let design = basis.build_matrix(centers);
        let tx = DVector::from_iterator(positions.len(), positions.iter().map(|p| p.x));
        let ty = DVector::from_iterator(positions.len(), positions.iter().map(|p| p.y));

        let x = LinearRegression::fit(&design, &tx, self.config.rank_tolerance)?;
        let y = LinearRegression::fit(&design, &ty, self.config.rank_tolerance)?;
        info!(
            samples = centers.len(),
            %basis,
            columns = design.ncols(),
            rank = x.rank(),
            "calibrated"
        );

        self.fitted = Some(FittedAxes { x, y });
        Ok(())
    }

    /// Estimate the gaze position for one image.
    pub fn estimate(&self, image: &GrayImage) -> Result<ScreenPoint, EstimateError> {
        if !self.is_calibrated() {
            return Err(EstimateError::NotCalibrated);
        }
        let center = self.detect_center(image)?;
        self.estimate_from_center(center)
    }

    pub fn estimate_from_center(&self, center: [f64; 2]) -> Result<ScreenPoint, EstimateError> {
        let fitted = self.fitted.as_ref().ok_or(EstimateError::NotCalibrated)?;
        let row = self.config.basis.build_row(center);
        Ok(ScreenPoint {
            x: fitted.x.predict_row(&row),
            y: fitted.y.predict_row(&row),
        })
    }

    /// Pupil center as the model consumes it, applying the failed-detection
    /// policy.
    pub fn detect_center(&self, image: &GrayImage) -> Result<[f64; 2], DetectionError> {
        match find_pupil(image, &self.config.detect.pupil) {
            Ok(det) => Ok(det.center()),
            Err(err) => match self.config.on_failed_detection {
                FailedDetectionPolicy::Reject => Err(err),
                FailedDetectionPolicy::Sentinel => {
                    warn!(%err, "using sentinel pupil center");
                    Ok(PupilEllipse::SENTINEL.center)
                }
            },
        }
    }

    fn check_inputs(&self, images: usize, positions: usize) -> Result<(), CalibrationError> {
        if images != positions {
            return Err(CalibrationError::DimensionMismatch { images, positions });
        }
        if images == 0 {
            return Err(CalibrationError::Empty);
        }
        match self.config.basis {
            FeatureBasis::Polynomial { degree, .. } if !self.config.basis.is_valid() => {
                Err(CalibrationError::InvalidDegree { degree })
            }
            _ => Ok(()),
        }
    }
}
