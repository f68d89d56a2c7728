//! Design-matrix construction from pupil centers.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// Highest accepted polynomial degree.
pub const MAX_POLYNOMIAL_DEGREE: u32 = 16;

/// Feature expansion applied to a pupil center `(x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureBasis {
    /// `[x, y, 1]`.
    #[default]
    Affine,
    /// Every monomial `x^i y^j` with `i + j <= degree`, ordered by total
    /// degree and then by descending power of `x`, constant first. With
    /// `zero_padding` an all-zero column is appended.
    Polynomial {
        degree: u32,
        #[serde(default = "default_zero_padding")]
        zero_padding: bool,
    },
}

fn default_zero_padding() -> bool {
    true
}

impl FeatureBasis {
    /// Polynomial basis with the trailing zero column.
    pub fn polynomial(degree: u32) -> Self {
        Self::Polynomial {
            degree,
            zero_padding: true,
        }
    }

    /// Polynomial degree must lie in `1..=MAX_POLYNOMIAL_DEGREE`.
    pub fn is_valid(&self) -> bool {
        match *self {
            Self::Affine => true,
            Self::Polynomial { degree, .. } => (1..=MAX_POLYNOMIAL_DEGREE).contains(&degree),
        }
    }

    pub fn n_columns(&self) -> usize {
        match *self {
            Self::Affine => 3,
            Self::Polynomial {
                degree,
                zero_padding,
            } => {
                let d = degree as usize;
                (d + 1) * (d + 2) / 2 + usize::from(zero_padding)
            }
        }
    }

    pub fn build_row(&self, center: [f64; 2]) -> Vec<f64> {
        let [x, y] = center;
        match *self {
            Self::Affine => vec![x, y, 1.0],
            Self::Polynomial {
                degree,
                zero_padding,
            } => {
                let mut row = Vec::with_capacity(self.n_columns());
                for total in 0..=degree {
                    for j in 0..=total {
                        row.push(pow(x, total - j) * pow(y, j));
                    }
                }
                if zero_padding {
                    row.push(0.0);
                }
                row
            }
        }
    }

    /// One row per center.
    pub fn build_matrix(&self, centers: &[[f64; 2]]) -> DMatrix<f64> {
        let cols = self.n_columns();
        let data: Vec<f64> = centers.iter().flat_map(|&c| self.build_row(c)).collect();
        DMatrix::from_row_slice(centers.len(), cols, &data)
    }
}

fn pow(v: f64, e: u32) -> f64 {
    match i32::try_from(e) {
        Ok(e) => v.powi(e),
        Err(_) => v.powf(f64::from(e)),
    }
}

impl std::fmt::Display for FeatureBasis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Affine => write!(f, "affine"),
            Self::Polynomial { degree, .. } => write!(f, "polynomial(degree={degree})"),
        }
    }
}
