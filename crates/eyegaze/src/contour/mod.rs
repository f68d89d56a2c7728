//! Binary-threshold contour extraction.
//!
//! A grayscale frame is binarized with a fixed global threshold (inverted for
//! dark regions, direct for bright regions) and every region boundary is
//! traced with full parent/child hierarchy (Suzuki–Abe border following, via
//! `imageproc`). Boundaries are optionally compressed to the endpoints of
//! straight pixel runs.

pub mod geometry;

use image::{DynamicImage, GrayImage};
use imageproc::contours::BorderType;
use imageproc::contrast::{threshold, ThresholdType};
use imageproc::point::Point;
use serde::{Deserialize, Serialize};

pub use geometry::{PolygonMoments, RotatedRect};

/// Which side of the threshold is foreground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionPolarity {
    /// Pixels `<= threshold` are foreground (pupil).
    Dark,
    /// Pixels `> threshold` are foreground (glints).
    Bright,
}

/// Boundary point storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainApproximation {
    /// Every boundary pixel.
    None,
    /// Endpoints of horizontal, vertical and diagonal runs only.
    #[default]
    Simple,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContourConfig {
    pub approximation: ChainApproximation,
}

/// Closed boundary of one thresholded region.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    pub points: Vec<Point<i32>>,
    /// `true` for the inner boundary of a hole inside a region.
    pub is_hole: bool,
    /// Index of the enclosing contour in the same extraction result.
    pub parent: Option<usize>,
}

impl Contour {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn area(&self) -> f64 {
        geometry::polygon_area(&self.points)
    }

    pub fn moments(&self) -> PolygonMoments {
        geometry::moments(&self.points)
    }

    pub fn min_area_rect(&self) -> Option<RotatedRect> {
        geometry::min_area_rect(&self.points)
    }

    pub fn points_f64(&self) -> Vec<[f64; 2]> {
        self.points
            .iter()
            .map(|p| [f64::from(p.x), f64::from(p.y)])
            .collect()
    }
}

/// Threshold `gray` and trace all region boundaries.
///
/// Returns an empty vector when nothing crosses the threshold.
pub fn extract(
    gray: &GrayImage,
    threshold_value: u8,
    polarity: RegionPolarity,
    config: &ContourConfig,
) -> Vec<Contour> {
    let binary = binarize(gray, threshold_value, polarity);
    imageproc::contours::find_contours::<i32>(&binary)
        .into_iter()
        .map(|c| {
            let points = match config.approximation {
                ChainApproximation::None => c.points,
                ChainApproximation::Simple => geometry::compress_chain(c.points),
            };
            Contour {
                points,
                is_hole: matches!(c.border_type, BorderType::Hole),
                parent: c.parent,
            }
        })
        .collect()
}

/// Same as [`extract`], converting colour input to 8-bit luma first.
pub fn extract_dynamic(
    image: &DynamicImage,
    threshold_value: u8,
    polarity: RegionPolarity,
    config: &ContourConfig,
) -> Vec<Contour> {
    extract(&image.to_luma8(), threshold_value, polarity, config)
}

/// Foreground = 255, background = 0.
pub fn binarize(gray: &GrayImage, threshold_value: u8, polarity: RegionPolarity) -> GrayImage {
    let kind = match polarity {
        RegionPolarity::Dark => ThresholdType::BinaryInverted,
        RegionPolarity::Bright => ThresholdType::Binary,
    };
    threshold(gray, threshold_value, kind)
}
