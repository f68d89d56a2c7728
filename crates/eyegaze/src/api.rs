//! High-level detection API.
//!
//! [`Detector`] wraps a [`DetectConfig`] and runs pupil and glint detection
//! on one frame.

use image::{DynamicImage, GrayImage};
use tracing::debug;

use crate::detector::{self, DetectConfig, DetectionError};
use crate::{EyeDetection, PupilDetection};

/// Primary per-frame detection interface.
///
/// Create once, detect on many images.
///
/// # Examples
///
/// ```no_run
/// use eyegaze::Detector;
///
/// let image = image::open("eye.jpg").unwrap().to_luma8();
/// let result = Detector::new().detect(&image);
/// match &result.pupil {
///     Some(p) => println!("pupil at {:?}, {} glints", p.ellipse.center, result.glints.len()),
///     None => println!("no pupil"),
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Detector {
    config: DetectConfig,
}

impl Detector {
    /// Detector with the reference thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DetectConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectConfig {
        &self.config
    }

    /// Mutable access to configuration for post-construction tuning.
    pub fn config_mut(&mut self) -> &mut DetectConfig {
        &mut self.config
    }

    /// Detect the pupil, then the glints nearest to it.
    ///
    /// Without a pupil, glints are ranked against the image center.
    pub fn detect(&self, image: &GrayImage) -> EyeDetection {
        let pupil = self.find_pupil(image).ok();
        let reference = pupil.as_ref().map_or_else(
            || {
                [
                    f64::from(image.width()) / 2.0,
                    f64::from(image.height()) / 2.0,
                ]
            },
            PupilDetection::center,
        );
        let glints = self.find_glints(image, reference);
        debug!(pupil = pupil.is_some(), n_glints = glints.len(), "frame detected");
        EyeDetection { pupil, glints }
    }

    /// [`detect`](Self::detect) on colour input, converted to 8-bit luma.
    pub fn detect_dynamic(&self, image: &DynamicImage) -> EyeDetection {
        self.detect(&image.to_luma8())
    }

    pub fn find_pupil(&self, image: &GrayImage) -> Result<PupilDetection, DetectionError> {
        detector::find_pupil(image, &self.config.pupil)
    }

    pub fn find_glints(&self, image: &GrayImage, reference: [f64; 2]) -> Vec<[f64; 2]> {
        detector::find_glints(image, reference, &self.config.glints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::eye_image;
    use approx::assert_abs_diff_eq;
    use image::Luma;

    #[test]
    fn detects_pupil_and_glints() {
        let glints = [[92.0, 58.0], [100.0, 58.0], [92.0, 66.0], [100.0, 66.0]];
        let img = eye_image((200, 150), [96.0, 70.0], [44.0, 36.0], 0.0, &glints);

        let result = Detector::new().detect(&img);
        let pupil = result.pupil.as_ref().expect("pupil");
        assert_abs_diff_eq!(pupil.ellipse.center[0], 96.0, epsilon = 1.5);
        assert_abs_diff_eq!(pupil.ellipse.center[1], 70.0, epsilon = 1.5);
        assert_eq!(result.glints.len(), 4);
    }

    #[test]
    fn empty_frame_has_no_pupil() {
        let det = Detector::new();
        let result = det.detect(&GrayImage::from_pixel(64, 64, Luma([128])));
        assert!(result.pupil.is_none());
        assert!(result.glints.is_empty());
        assert!(result.pupil_or_sentinel().is_sentinel());
    }

    #[test]
    fn config_mut_changes_thresholds() {
        let mut det = Detector::new();
        det.config_mut().pupil.threshold = 90;
        det.config_mut().glints.max_glints = 2;
        assert_eq!(det.config().pupil.threshold, 90);
        assert_eq!(det.config().glints.max_glints, 2);
    }

    #[test]
    fn colour_input_is_converted() {
        let gray = eye_image((120, 90), [60.0, 45.0], [30.0, 24.0], 0.0, &[]);
        let rgb = DynamicImage::ImageLuma8(gray).to_rgb8();
        let result = Detector::new().detect_dynamic(&DynamicImage::ImageRgb8(rgb));
        assert!(result.pupil.is_some());
    }
}
