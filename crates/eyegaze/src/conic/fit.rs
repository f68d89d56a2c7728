//! Direct least-squares ellipse fitting (Fitzgibbon et al., 1999).

use nalgebra::{DMatrix, Matrix3, Vector6};

use super::eigen::constrained_eigenvector;
use super::types::{ConicCoeffs, Ellipse};

/// Minimum number of boundary points for a direct ellipse fit.
pub const MIN_FIT_POINTS: usize = 6;

/// Fit a conic constrained to be an ellipse through `points`.
///
/// Points are normalized (centroid shift, mean distance √2) before the
/// scatter matrix is built; coefficients are mapped back to pixel space.
/// Returns `None` for fewer than six points or degenerate configurations
/// (collinear, coincident, or a fit that is not a real ellipse).
pub fn fit_conic_direct(points: &[[f64; 2]]) -> Option<ConicCoeffs> {
    let n = points.len();
    if n < MIN_FIT_POINTS {
        return None;
    }

    let (mean_x, mean_y, scale) = normalization(points);

    let mut d = DMatrix::<f64>::zeros(n, 6);
    for (i, &[px, py]) in points.iter().enumerate() {
        let x = (px - mean_x) * scale;
        let y = (py - mean_y) * scale;
        d[(i, 0)] = x * x;
        d[(i, 1)] = x * y;
        d[(i, 2)] = y * y;
        d[(i, 3)] = x;
        d[(i, 4)] = y;
        d[(i, 5)] = 1.0;
    }

    let s = d.transpose() * &d;
    let s11 = s.fixed_view::<3, 3>(0, 0).into_owned();
    let s12 = s.fixed_view::<3, 3>(0, 3).into_owned();
    let s22 = s.fixed_view::<3, 3>(3, 3).into_owned();

    // Ellipse constraint 4AC − B² = 1 in matrix form.
    let c1 = Matrix3::new(0.0, 0.0, 2.0, 0.0, -1.0, 0.0, 2.0, 0.0, 0.0);

    let s22_inv = s22.try_inverse()?;
    let reduced = s11 - s12 * s22_inv * s12.transpose();
    let system = c1.try_inverse()? * reduced;

    let quad = constrained_eigenvector(&system)?;
    let linear = -s22_inv * s12.transpose() * quad;

    let normalized = Vector6::new(quad[0], quad[1], quad[2], linear[0], linear[1], linear[2]);
    let conic = ConicCoeffs(denormalize(&normalized, mean_x, mean_y, scale));

    if !conic.is_ellipse() || !conic.to_ellipse()?.is_valid() {
        return None;
    }
    Some(conic)
}

/// Fit and return geometric ellipse parameters.
pub fn fit_ellipse_direct(points: &[[f64; 2]]) -> Option<Ellipse> {
    fit_conic_direct(points)?.to_ellipse()
}

/// RMS Sampson distance of `points` to `ellipse`.
pub fn rms_sampson_distance(ellipse: &Ellipse, points: &[[f64; 2]]) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = points
        .iter()
        .map(|&[x, y]| ellipse.sampson_distance(x, y).powi(2))
        .sum();
    (sum_sq / points.len() as f64).sqrt()
}

/// (mean_x, mean_y, scale) such that normalized points have mean distance √2.
fn normalization(points: &[[f64; 2]]) -> (f64, f64, f64) {
    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p[0]).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p[1]).sum::<f64>() / n;
    let mean_dist = points
        .iter()
        .map(|p| (p[0] - mean_x).hypot(p[1] - mean_y))
        .sum::<f64>()
        / n;

    let scale = if mean_dist > 1e-15 {
        std::f64::consts::SQRT_2 / mean_dist
    } else {
        1.0
    };
    (mean_x, mean_y, scale)
}

/// Undo x' = s(x − mx), y' = s(y − my) on conic coefficients.
fn denormalize(c: &Vector6<f64>, mx: f64, my: f64, s: f64) -> [f64; 6] {
    let [a_, b_, c_, d_, e_, f_] = [c[0], c[1], c[2], c[3], c[4], c[5]];
    let s2 = s * s;

    let a = a_ * s2;
    let b = b_ * s2;
    let c = c_ * s2;
    let d = -2.0 * a_ * s2 * mx - b_ * s2 * my + d_ * s;
    let e = -b_ * s2 * mx - 2.0 * c_ * s2 * my + e_ * s;
    let f =
        a_ * s2 * mx * mx + b_ * s2 * mx * my + c_ * s2 * my * my - d_ * s * mx - e_ * s * my + f_;

    [a, b, c, d, e, f]
}
