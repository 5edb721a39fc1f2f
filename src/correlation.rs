//! Correlation and regression
//!
//! This module relates metrics to each other across a set of reels:
//! - Pearson correlation between two series
//! - Correlation matrix over an ordered list of metrics
//! - Ordinary least-squares line between two series

use crate::error::ComputeError;
use crate::series;
use crate::types::{CorrelationMatrix, Metric, MetricRecord, MissingMetricPolicy, RegressionModel};
use serde::{Deserialize, Serialize};

/// Engine for pairwise metric relationships
pub struct CorrelationEngine;

impl CorrelationEngine {
    /// Pearson product-moment correlation of two equal-length series.
    ///
    /// A constant series has no variance; the coefficient is then defined as 0.0.
    /// Sums too large for `f64` fail with `DegenerateInput`.
    pub fn compute_correlation(x: &[f64], y: &[f64]) -> Result<f64, ComputeError> {
        let sums = PairSums::new(x, y)?;
        if sums.x_constant || sums.y_constant {
            return Ok(0.0);
        }

        let numerator = sums.n * sums.xy - sums.x * sums.y;
        let x_spread = sums.n * sums.xx - sums.x * sums.x;
        let y_spread = sums.n * sums.yy - sums.y * sums.y;
        if !(numerator.is_finite() && x_spread.is_finite() && y_spread.is_finite()) {
            return Err(overflow());
        }
        // Cancellation can leave a near-constant series with no usable spread
        if x_spread <= 0.0 || y_spread <= 0.0 {
            return Ok(0.0);
        }

        let denominator = x_spread.sqrt() * y_spread.sqrt();
        if denominator == 0.0 {
            return Ok(0.0);
        }

        Ok((numerator / denominator).clamp(-1.0, 1.0))
    }

    /// Correlation matrix over `metrics`, one series per metric across `records`.
    ///
    /// Only the upper triangle is computed; the lower triangle mirrors it.
    pub fn compute_correlation_matrix(
        records: &[MetricRecord],
        metrics: &[Metric],
        policy: MissingMetricPolicy,
    ) -> Result<CorrelationMatrix, ComputeError> {
        if metrics.is_empty() {
            return Err(ComputeError::EmptyInput(
                "correlation matrix needs at least one metric".to_string(),
            ));
        }

        let size = metrics.len();
        let mut values = vec![vec![0.0; size]; size];

        for i in 0..size {
            for j in i..size {
                let (x, y) = series::project_pair(records, metrics[i], metrics[j], policy)?;
                let coefficient = Self::compute_correlation(&x, &y)?;
                values[i][j] = coefficient;
                values[j][i] = coefficient;
            }
        }

        log::debug!(
            "computed {}x{} correlation matrix over {} records",
            size,
            size,
            records.len()
        );

        Ok(CorrelationMatrix {
            metrics: metrics.to_vec(),
            values,
        })
    }

    /// Least-squares fit of `y` on `x`.
    ///
    /// Fails with `DegenerateInput` when `x` has no variance.
    pub fn fit_linear_regression(x: &[f64], y: &[f64]) -> Result<RegressionModel, ComputeError> {
        let sums = PairSums::new(x, y)?;

        let numerator = sums.n * sums.xy - sums.x * sums.y;
        let denominator = sums.n * sums.xx - sums.x * sums.x;
        if !(numerator.is_finite() && denominator.is_finite()) {
            return Err(overflow());
        }
        if sums.x_constant || denominator <= 0.0 {
            return Err(ComputeError::DegenerateInput(
                "independent variable has zero variance".to_string(),
            ));
        }

        let slope = numerator / denominator;
        let intercept = (sums.y - slope * sums.x) / sums.n;

        Ok(RegressionModel { slope, intercept })
    }

    /// Fit `y_metric` against `x_metric` across records
    pub fn fit_metrics(
        records: &[MetricRecord],
        x_metric: Metric,
        y_metric: Metric,
        policy: MissingMetricPolicy,
    ) -> Result<RegressionModel, ComputeError> {
        let (x, y) = series::project_pair(records, x_metric, y_metric, policy)?;
        Self::fit_linear_regression(&x, &y)
    }
}

/// Point on a fitted trend line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub x: f64,
    pub y: f64,
}

impl RegressionModel {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// Expected change in `y` per 1,000 units of `x`, rounded
    pub fn per_thousand(&self) -> i64 {
        (self.slope * 1000.0).round() as i64
    }

    /// Endpoints of the line drawn from x = 0 to `max_x`
    pub fn trend_line(&self, max_x: f64) -> [TrendPoint; 2] {
        [
            TrendPoint {
                x: 0.0,
                y: self.intercept,
            },
            TrendPoint {
                x: max_x,
                y: self.predict(max_x),
            },
        ]
    }
}

fn overflow() -> ComputeError {
    ComputeError::DegenerateInput("series sums exceed the f64 range".to_string())
}

/// Running sums shared by correlation and regression
struct PairSums {
    n: f64,
    x: f64,
    y: f64,
    xy: f64,
    xx: f64,
    yy: f64,
    /// Every value equal, checked exactly rather than through the sums
    x_constant: bool,
    y_constant: bool,
}

impl PairSums {
    fn new(x: &[f64], y: &[f64]) -> Result<Self, ComputeError> {
        if x.len() != y.len() {
            return Err(ComputeError::LengthMismatch {
                x_len: x.len(),
                y_len: y.len(),
            });
        }
        if x.len() < 2 {
            return Err(ComputeError::InsufficientData {
                needed: 2,
                actual: x.len(),
            });
        }
        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err(ComputeError::DegenerateInput(
                "series contains a non-finite value".to_string(),
            ));
        }

        let mut sums = PairSums {
            n: x.len() as f64,
            x: 0.0,
            y: 0.0,
            xy: 0.0,
            xx: 0.0,
            yy: 0.0,
            x_constant: x.iter().all(|v| *v == x[0]),
            y_constant: y.iter().all(|v| *v == y[0]),
        };
        for (&xi, &yi) in x.iter().zip(y) {
            sums.x += xi;
            sums.y += yi;
            sums.xy += xi * yi;
            sums.xx += xi * xi;
            sums.yy += yi * yi;
        }

        Ok(sums)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::sample_reels;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_manual_pearson() {
        // n=3, Σx=600, Σy=45, Σxy=9500, Σx²=140000, Σy²=725
        // (28500 - 27000) / sqrt(60000 * 150) = 1500 / 3000
        let r = CorrelationEngine::compute_correlation(&[100.0, 200.0, 300.0], &[10.0, 20.0, 15.0])
            .unwrap();
        assert!((r - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_self_correlation_is_one() {
        let x = [874058.0, 2806994.0, 1209592.0, 778939.0, 404739.0, 5500000.0];
        assert_eq!(CorrelationEngine::compute_correlation(&x, &x).unwrap(), 1.0);
    }

    #[test]
    fn test_perfect_negative_correlation() {
        let r = CorrelationEngine::compute_correlation(&[1.0, 2.0, 3.0], &[30.0, 20.0, 10.0])
            .unwrap();
        assert!((r + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_symmetry() {
        let x = [16932.0, 15055.0, 12757.0, 6284.0, 8830.0, 45000.0];
        let y = [145.0, 175.0, 732.0, 229.0, 68.0, 1150.0];

        let xy = CorrelationEngine::compute_correlation(&x, &y).unwrap();
        let yx = CorrelationEngine::compute_correlation(&y, &x).unwrap();
        assert_eq!(xy.to_bits(), yx.to_bits());
    }

    #[test]
    fn test_constant_series_correlates_to_zero() {
        let r = CorrelationEngine::compute_correlation(&[5.0, 5.0, 5.0], &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(r, 0.0);
        assert!(r.is_finite());
    }

    #[test]
    fn test_fractional_constant_series_correlates_to_zero() {
        let constant = [0.7, 0.7, 0.7];
        let varying = [1.0, 2.0, 4.0];

        assert_eq!(CorrelationEngine::compute_correlation(&constant, &varying).unwrap(), 0.0);
        assert_eq!(CorrelationEngine::compute_correlation(&varying, &constant).unwrap(), 0.0);
        assert_eq!(
            CorrelationEngine::compute_correlation(&[3.3, 3.3, 3.3], &varying).unwrap(),
            0.0
        );
    }

    #[test]
    fn test_overflowing_sums_are_degenerate() {
        let result = CorrelationEngine::compute_correlation(&[1e200, 2e200, 3e200], &[1.0, 2.0, 3.0]);
        assert!(matches!(result, Err(ComputeError::DegenerateInput(_))));

        let result =
            CorrelationEngine::fit_linear_regression(&[1e200, 2e200, 3e200], &[1.0, 2.0, 3.0]);
        assert!(matches!(result, Err(ComputeError::DegenerateInput(_))));
    }

    #[test]
    fn test_length_mismatch() {
        let result = CorrelationEngine::compute_correlation(&[1.0, 2.0, 3.0], &[1.0, 2.0]);
        assert!(matches!(
            result,
            Err(ComputeError::LengthMismatch { x_len: 3, y_len: 2 })
        ));
    }

    #[test]
    fn test_single_point_is_insufficient() {
        let result = CorrelationEngine::compute_correlation(&[1.0], &[2.0]);
        assert!(matches!(
            result,
            Err(ComputeError::InsufficientData { needed: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_matrix_is_symmetric_with_unit_diagonal() {
        let records = sample_reels();
        let matrix = CorrelationEngine::compute_correlation_matrix(
            &records,
            &Metric::CORE,
            MissingMetricPolicy::Zero,
        )
        .unwrap();

        assert_eq!(matrix.len(), 6);
        for i in 0..matrix.len() {
            assert_eq!(matrix.values[i][i], 1.0);
            for j in 0..matrix.len() {
                assert_eq!(matrix.values[i][j].to_bits(), matrix.values[j][i].to_bits());
                assert!((-1.0..=1.0).contains(&matrix.values[i][j]));
            }
        }

        let likes_views = matrix.get(Metric::Likes, Metric::Views).unwrap();
        assert!(likes_views > 0.9);
    }

    #[test]
    fn test_matrix_cells_match_direct_correlation() {
        let records = sample_reels();
        let matrix = CorrelationEngine::compute_correlation_matrix(
            &records,
            &[Metric::Shares, Metric::Follows],
            MissingMetricPolicy::Zero,
        )
        .unwrap();

        let shares = series::project(&records, Metric::Shares, MissingMetricPolicy::Zero).unwrap();
        let follows = series::project(&records, Metric::Follows, MissingMetricPolicy::Zero).unwrap();
        let direct = CorrelationEngine::compute_correlation(&shares, &follows).unwrap();

        assert_eq!(matrix.get(Metric::Follows, Metric::Shares), Some(direct));
    }

    #[test]
    fn test_matrix_needs_metrics() {
        let result =
            CorrelationEngine::compute_correlation_matrix(&sample_reels(), &[], MissingMetricPolicy::Zero);
        assert!(matches!(result, Err(ComputeError::EmptyInput(_))));
    }

    #[test]
    fn test_regression_recovers_linear_data() {
        let x: Vec<f64> = (0..10).map(|i| i as f64 * 3.5).collect();
        let y: Vec<f64> = x.iter().map(|xi| 12.0 + 0.25 * xi).collect();

        let model = CorrelationEngine::fit_linear_regression(&x, &y).unwrap();
        assert!((model.slope - 0.25).abs() < 1e-9);
        assert!((model.intercept - 12.0).abs() < 1e-9);

        for (xi, yi) in x.iter().zip(&y) {
            assert!((model.predict(*xi) - yi).abs() < 1e-9);
        }
    }

    #[test]
    fn test_regression_minimizes_residuals() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.1, 3.9, 6.2, 7.8, 10.1];
        let model = CorrelationEngine::fit_linear_regression(&x, &y).unwrap();

        let rss = |m: &RegressionModel| -> f64 {
            x.iter()
                .zip(&y)
                .map(|(xi, yi)| (yi - m.predict(*xi)).powi(2))
                .sum()
        };
        let best = rss(&model);

        for (ds, di) in [(0.05, 0.0), (-0.05, 0.0), (0.0, 0.1), (0.0, -0.1), (0.02, -0.05)] {
            let other = RegressionModel {
                slope: model.slope + ds,
                intercept: model.intercept + di,
            };
            assert!(rss(&other) > best);
        }
    }

    #[test]
    fn test_regression_rejects_constant_x() {
        let result = CorrelationEngine::fit_linear_regression(&[3.0, 3.0, 3.0], &[1.0, 2.0, 3.0]);
        assert!(matches!(result, Err(ComputeError::DegenerateInput(_))));
    }

    #[test]
    fn test_regression_rejects_fractional_constant_x() {
        for constant in [[0.7, 0.7, 0.7], [3.3, 3.3, 3.3]] {
            let result = CorrelationEngine::fit_linear_regression(&constant, &[1.0, 2.0, 4.0]);
            assert!(matches!(result, Err(ComputeError::DegenerateInput(_))));
        }
    }

    #[test]
    fn test_regression_rejects_length_mismatch() {
        let result = CorrelationEngine::fit_linear_regression(&[1.0, 2.0], &[1.0]);
        assert!(matches!(result, Err(ComputeError::LengthMismatch { .. })));
    }

    #[test]
    fn test_trend_line_and_per_thousand() {
        let model = RegressionModel {
            slope: 0.0234,
            intercept: 12.5,
        };

        assert_eq!(model.per_thousand(), 23);
        let [start, end] = model.trend_line(1000.0);
        assert_eq!(start, TrendPoint { x: 0.0, y: 12.5 });
        assert!((end.y - 35.9).abs() < 1e-9);
    }

    #[test]
    fn test_sample_shares_predict_follows() {
        let model = CorrelationEngine::fit_metrics(
            &sample_reels(),
            Metric::Shares,
            Metric::Follows,
            MissingMetricPolicy::Zero,
        )
        .unwrap();

        assert!(model.slope > 0.0);
    }
}
