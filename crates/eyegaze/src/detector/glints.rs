use image::GrayImage;
use tracing::debug;

use super::GlintConfig;
use crate::contour::{self, geometry, Contour, RegionPolarity};

/// Detect bright corneal reflections nearest to `reference`.
///
/// Returns at most `config.max_glints` centers in ascending distance to
/// `reference`; equal distances keep contour order.
pub fn find_glints(gray: &GrayImage, reference: [f64; 2], config: &GlintConfig) -> Vec<[f64; 2]> {
    let contours = contour::extract(
        gray,
        config.threshold,
        RegionPolarity::Bright,
        &config.contour,
    );

    let mut centers: Vec<[f64; 2]> = contours.iter().filter_map(glint_center).collect();
    let dist2 = |p: &[f64; 2]| (p[0] - reference[0]).powi(2) + (p[1] - reference[1]).powi(2);
    centers.sort_by(|a, b| dist2(a).total_cmp(&dist2(b)));
    centers.truncate(config.max_glints);

    debug!(
        n_contours = contours.len(),
        n_glints = centers.len(),
        "glint candidates"
    );
    centers
}

/// Moment centroid, or the boundary point mean when the contour encloses
/// no area (single pixels and one-pixel-wide lines).
fn glint_center(c: &Contour) -> Option<[f64; 2]> {
    match c.moments().centroid() {
        Some(center) => Some(center),
        None => {
            debug!(n_points = c.len(), "zero-area glint contour, using point mean");
            geometry::mean_point(&c.points)
        }
    }
}
