use image::GrayImage;
use tracing::debug;

use super::{DetectionError, PupilConfig};
use crate::conic;
use crate::contour::{self, Contour, RegionPolarity};
use crate::{PupilDetection, PupilEllipse, PupilFit};

/// Detect the pupil as the largest dark region.
///
/// Among all contours at `config.threshold` the one with maximum enclosed
/// area wins; on equal area the first traced contour is kept. Contours with
/// more than five boundary points get a direct ellipse fit, smaller ones the
/// minimum-area rectangle.
pub fn find_pupil(
    gray: &GrayImage,
    config: &PupilConfig,
) -> Result<PupilDetection, DetectionError> {
    let contours = contour::extract(gray, config.threshold, RegionPolarity::Dark, &config.contour);
    debug!(
        threshold = config.threshold,
        n_contours = contours.len(),
        "pupil contours"
    );

    let mut best: Option<(&Contour, f64)> = None;
    for c in &contours {
        let area = c.area();
        if best.map_or(true, |(_, best_area)| area > best_area) {
            best = Some((c, area));
        }
    }
    let (selected, area) = best.ok_or(DetectionError::NoRegionFound {
        threshold: config.threshold,
    })?;

    fit_selected(selected, area).ok_or(DetectionError::NoRegionFound {
        threshold: config.threshold,
    })
}

/// [`find_pupil`] with [`PupilEllipse::SENTINEL`] in place of an error.
pub fn find_pupil_or_sentinel(gray: &GrayImage, config: &PupilConfig) -> PupilEllipse {
    find_pupil(gray, config).map_or(PupilEllipse::SENTINEL, |d| d.ellipse)
}

fn fit_selected(contour: &Contour, area: f64) -> Option<PupilDetection> {
    let n_points = contour.len();

    if n_points > 5 {
        let pts = contour.points_f64();
        match conic::fit_ellipse_direct(&pts) {
            Some(e) => {
                let rms = conic::rms_sampson_distance(&e, &pts);
                debug!(area, n_points, rms, "pupil ellipse fit");
                return Some(PupilDetection {
                    ellipse: e.into(),
                    fit: PupilFit::Ellipse,
                    area,
                    n_points,
                    rms_residual: Some(rms),
                });
            }
            None => debug!(n_points, "direct ellipse fit degenerate, using min-area rect"),
        }
    }

    let rect = contour.min_area_rect()?;
    debug!(area, n_points, "pupil min-area rect");
    Some(PupilDetection {
        ellipse: PupilEllipse::from_rect(&rect),
        fit: PupilFit::MinAreaRect,
        area,
        n_points,
        rms_residual: None,
    })
}
