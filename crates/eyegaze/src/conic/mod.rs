//! Ellipse / conic fitting primitives.
//!
//! Implements:
//! - Direct least-squares conic fit (Fitzgibbon et al., "Direct Least Square Fitting of Ellipses", 1999).
//! - Conversion between general conic coefficients and geometric ellipse parameters.
//! - Sampson residuals used to report pupil fit quality.

mod eigen;
mod fit;
mod types;

pub use fit::{fit_conic_direct, fit_ellipse_direct, rms_sampson_distance, MIN_FIT_POINTS};
pub use types::{ConicCoeffs, Ellipse};
