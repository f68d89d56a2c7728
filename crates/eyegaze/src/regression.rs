//! Ordinary least squares via SVD.
//!
//! All-zero columns are inactive: they contribute no singular value and get
//! weight zero from the minimum-norm solve. A fit whose numerical rank is
//! below the number of active columns is rejected instead of returning
//! arbitrary coefficients.

use nalgebra::{DMatrix, DVector};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegressionError {
    #[error("regression needs at least one sample")]
    Empty,
    #[error("design matrix has {rows} rows but {targets} targets were given")]
    RowMismatch { rows: usize, targets: usize },
    #[error("rank-deficient design matrix: rank {rank} < {columns} active columns")]
    SingularFit { rank: usize, columns: usize },
    #[error("non-finite value in regression input")]
    NonFinite,
    #[error("rank tolerance must be finite and non-negative, got {tolerance}")]
    InvalidTolerance { tolerance: f64 },
}

/// Fitted weights of `target ≈ row · w`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearRegression {
    weights: DVector<f64>,
    rank: usize,
}

impl LinearRegression {
    /// Fit weights minimizing `‖design · w − targets‖²`.
    ///
    /// `tolerance` overrides the singular-value cutoff, which defaults to
    /// `σ_max · max(rows, cols) · ε`. A negative or non-finite override is
    /// rejected.
    pub fn fit(
        design: &DMatrix<f64>,
        targets: &DVector<f64>,
        tolerance: Option<f64>,
    ) -> Result<Self, RegressionError> {
        if let Some(t) = tolerance.filter(|t| !t.is_finite() || *t < 0.0) {
            return Err(RegressionError::InvalidTolerance { tolerance: t });
        }
        let (rows, cols) = design.shape();
        if rows == 0 {
            return Err(RegressionError::Empty);
        }
        if targets.len() != rows {
            return Err(RegressionError::RowMismatch {
                rows,
                targets: targets.len(),
            });
        }
        if design.iter().chain(targets.iter()).any(|v| !v.is_finite()) {
            return Err(RegressionError::NonFinite);
        }

        let active = (0..cols)
            .filter(|&j| design.column(j).iter().any(|&v| v != 0.0))
            .count();

        let svd = design.clone().svd(true, true);
        let sigma_max = svd.singular_values.max();
        let tol = tolerance.unwrap_or(sigma_max * rows.max(cols) as f64 * f64::EPSILON);
        let rank = svd.rank(tol);
        if rank < active {
            return Err(RegressionError::SingularFit {
                rank,
                columns: active,
            });
        }

        let weights = svd
            .solve(targets, tol)
            .map_err(|_| RegressionError::SingularFit {
                rank,
                columns: active,
            })?;
        if weights.iter().any(|w| !w.is_finite()) {
            return Err(RegressionError::NonFinite);
        }

        Ok(Self { weights, rank })
    }

    /// `row · w`; `row` must have one entry per design column.
    pub fn predict_row(&self, row: &[f64]) -> f64 {
        row.iter().zip(self.weights.iter()).map(|(a, w)| a * w).sum()
    }

    pub fn weights(&self) -> &DVector<f64> {
        &self.weights
    }

    /// Numerical rank of the design matrix at fit time.
    pub fn rank(&self) -> usize {
        self.rank
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn recovers_exact_plane() {
        let design = DMatrix::from_row_slice(
            4,
            3,
            &[
                0.0, 0.0, 1.0, //
                1.0, 0.0, 1.0, //
                0.0, 1.0, 1.0, //
                2.0, 3.0, 1.0,
            ],
        );
        let targets = DVector::from_iterator(
            4,
            design.row_iter().map(|r| 2.0 * r[0] - 3.0 * r[1] + 5.0),
        );
        let fit = LinearRegression::fit(&design, &targets, None).expect("fit");
        assert_relative_eq!(fit.weights()[0], 2.0, epsilon = 1e-10);
        assert_relative_eq!(fit.weights()[1], -3.0, epsilon = 1e-10);
        assert_relative_eq!(fit.weights()[2], 5.0, epsilon = 1e-10);
        assert_eq!(fit.rank(), 3);
        assert_relative_eq!(fit.predict_row(&[4.0, 1.0, 1.0]), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn zero_column_gets_zero_weight() {
        let design = DMatrix::from_row_slice(
            3,
            3,
            &[
                1.0, 0.0, 0.0, //
                1.0, 1.0, 0.0, //
                1.0, 2.0, 0.0,
            ],
        );
        let targets = DVector::from_vec(vec![1.0, 3.0, 5.0]);
        let fit = LinearRegression::fit(&design, &targets, None).expect("fit");
        assert_relative_eq!(fit.weights()[2], 0.0);
        assert_relative_eq!(fit.weights()[1], 2.0, epsilon = 1e-10);
    }

    #[test]
    fn collinear_samples_are_singular() {
        let design = DMatrix::from_row_slice(
            3,
            3,
            &[
                0.0, 0.0, 1.0, //
                1.0, 1.0, 1.0, //
                2.0, 2.0, 1.0,
            ],
        );
        let targets = DVector::from_vec(vec![0.0, 1.0, 2.0]);
        assert_eq!(
            LinearRegression::fit(&design, &targets, None),
            Err(RegressionError::SingularFit {
                rank: 2,
                columns: 3
            })
        );
    }

    #[test]
    fn underdetermined_is_singular() {
        let design = DMatrix::from_row_slice(2, 3, &[0.0, 0.0, 1.0, 1.0, 2.0, 1.0]);
        let targets = DVector::from_vec(vec![0.0, 1.0]);
        assert!(matches!(
            LinearRegression::fit(&design, &targets, None),
            Err(RegressionError::SingularFit { rank: 2, columns: 3 })
        ));
    }

    #[test]
    fn input_validation() {
        let empty = DMatrix::<f64>::zeros(0, 3);
        assert_eq!(
            LinearRegression::fit(&empty, &DVector::zeros(0), None),
            Err(RegressionError::Empty)
        );

        let design = DMatrix::from_element(2, 2, 1.0);
        assert_eq!(
            LinearRegression::fit(&design, &DVector::zeros(3), None),
            Err(RegressionError::RowMismatch {
                rows: 2,
                targets: 3
            })
        );

        let mut bad = DMatrix::identity(2, 2);
        bad[(0, 1)] = f64::NAN;
        assert_eq!(
            LinearRegression::fit(&bad, &DVector::zeros(2), None),
            Err(RegressionError::NonFinite)
        );
    }

    #[test]
    fn bad_tolerance_is_rejected() {
        let design = DMatrix::identity(3, 3);
        let targets = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        assert_eq!(
            LinearRegression::fit(&design, &targets, Some(-1.0)),
            Err(RegressionError::InvalidTolerance { tolerance: -1.0 })
        );
        for t in [f64::NAN, f64::INFINITY] {
            assert!(matches!(
                LinearRegression::fit(&design, &targets, Some(t)),
                Err(RegressionError::InvalidTolerance { .. })
            ));
        }
        assert!(LinearRegression::fit(&design, &targets, Some(0.0)).is_ok());
    }
}
