//! eyegaze — pupil/glint detection and calibration-driven gaze regression.
//!
//! The pipeline stages are:
//!
//! 1. **Contour** – fixed global threshold (dark or bright regions) and
//!    border following with full hierarchy.
//! 2. **Pupil** – largest-area dark contour, direct ellipse fit or
//!    minimum-area rectangle for small contours.
//! 3. **Glints** – bright contour centroids ranked by distance to the pupil.
//! 4. **Features** – affine or polynomial expansion of the pupil center.
//! 5. **Calibration** – one least-squares regression per screen axis, fit
//!    from (image, known screen position) pairs and used to estimate gaze.
//!
//! # Public API
//! - [`Detector`] for per-frame pupil and glint detection
//! - [`CalibrationModel`] for the calibrate/estimate state machine
//! - [`Dataset`] and [`evaluate()`] for offline evaluation over recorded
//!   sessions

mod api;
mod calibration;
pub mod conic;
pub mod contour;
mod dataset;
mod detector;
mod evaluate;
mod features;
mod regression;

#[cfg(test)]
mod test_utils;

pub use api::Detector;
pub use calibration::{
    CalibrationConfig, CalibrationError, CalibrationModel, EstimateError, FailedDetectionPolicy,
};
pub use dataset::{Dataset, DatasetError, GroundTruthPupil, PositionOrder};
pub use detector::{
    find_glints, find_pupil, find_pupil_or_sentinel, DetectConfig, DetectionError, GlintConfig,
    PupilConfig, DEFAULT_GLINT_THRESHOLD, DEFAULT_MAX_GLINTS, DEFAULT_PUPIL_THRESHOLD,
};
pub use evaluate::{
    compare_bases, evaluate, ErrorSummary, EvaluationError, EvaluationReport, SampleError,
};
pub use features::{FeatureBasis, MAX_POLYNOMIAL_DEGREE};
pub use regression::{LinearRegression, RegressionError};

use contour::RotatedRect;

/// Pupil ellipse in image pixel coordinates.
///
/// Axes are full lengths (not semi-axes) and the angle is in degrees,
/// matching [`RotatedRect`].
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PupilEllipse {
    /// Center (x, y).
    pub center: [f64; 2],
    /// Full axis lengths; the first is measured along `angle_deg`.
    pub axes: [f64; 2],
    /// Rotation from +x, degrees in [0, 180).
    pub angle_deg: f64,
}

impl PupilEllipse {
    /// Legacy "no pupil" value `((-1, -1), (0, 0), 0)`.
    pub const SENTINEL: Self = Self {
        center: [-1.0, -1.0],
        axes: [0.0, 0.0],
        angle_deg: 0.0,
    };

    pub fn is_sentinel(&self) -> bool {
        *self == Self::SENTINEL
    }

    pub fn from_rect(rect: &RotatedRect) -> Self {
        Self {
            center: rect.center,
            axes: rect.size,
            angle_deg: rect.angle_deg,
        }
    }
}

impl From<conic::Ellipse> for PupilEllipse {
    fn from(e: conic::Ellipse) -> Self {
        Self {
            center: [e.cx, e.cy],
            axes: [2.0 * e.a, 2.0 * e.b],
            angle_deg: e.angle.to_degrees().rem_euclid(180.0) % 180.0,
        }
    }
}

impl From<PupilEllipse> for conic::Ellipse {
    fn from(p: PupilEllipse) -> Self {
        Self {
            cx: p.center[0],
            cy: p.center[1],
            a: p.axes[0].abs() / 2.0,
            b: p.axes[1].abs() / 2.0,
            angle: p.angle_deg.to_radians(),
        }
    }
}

/// How the pupil ellipse was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PupilFit {
    /// Direct least-squares ellipse fit through the boundary.
    Ellipse,
    /// Minimum-area enclosing rectangle (five or fewer boundary points, or a
    /// degenerate direct fit).
    MinAreaRect,
}

/// A successful pupil detection.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PupilDetection {
    pub ellipse: PupilEllipse,
    pub fit: PupilFit,
    /// Enclosed area of the selected contour.
    pub area: f64,
    /// Boundary points of the selected contour after chain compression.
    pub n_points: usize,
    /// RMS Sampson distance of the boundary to the fitted ellipse.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rms_residual: Option<f64>,
}

impl PupilDetection {
    pub fn center(&self) -> [f64; 2] {
        self.ellipse.center
    }
}

/// Per-frame detection result.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EyeDetection {
    /// `None` when no dark region crossed the pupil threshold.
    pub pupil: Option<PupilDetection>,
    /// Up to `max_glints` glint centers, nearest to the pupil first.
    pub glints: Vec<[f64; 2]>,
}

impl EyeDetection {
    /// Pupil ellipse, or [`PupilEllipse::SENTINEL`] when detection failed.
    pub fn pupil_or_sentinel(&self) -> PupilEllipse {
        self.pupil
            .as_ref()
            .map_or(PupilEllipse::SENTINEL, |p| p.ellipse)
    }
}

/// Position on the screen, in screen pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &ScreenPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sentinel_is_recognized() {
        assert!(PupilEllipse::SENTINEL.is_sentinel());
        assert!(EyeDetection::default().pupil_or_sentinel().is_sentinel());
        let real = PupilEllipse {
            center: [-1.0, -1.0],
            axes: [4.0, 3.0],
            angle_deg: 0.0,
        };
        assert!(!real.is_sentinel());
    }

    #[test]
    fn ellipse_conversion_uses_full_axes_and_degrees() {
        let e = conic::Ellipse {
            cx: 10.0,
            cy: 20.0,
            a: 8.0,
            b: 5.0,
            angle: -std::f64::consts::FRAC_PI_4,
        };
        let p = PupilEllipse::from(e);
        assert_eq!(p.axes, [16.0, 10.0]);
        assert_relative_eq!(p.angle_deg, 135.0, epsilon = 1e-9);

        let back = conic::Ellipse::from(p);
        assert_relative_eq!(back.a, 8.0);
        assert_relative_eq!(back.b, 5.0);
        assert_relative_eq!(back.angle.tan(), e.angle.tan(), epsilon = 1e-9);
    }

    #[test]
    fn screen_point_distance() {
        let a = ScreenPoint::new(0.0, 0.0);
        assert_relative_eq!(a.distance(&ScreenPoint::new(3.0, 4.0)), 5.0);
    }
}
