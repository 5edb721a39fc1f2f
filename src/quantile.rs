//! Boxplot statistics
//!
//! Five-number summary with Tukey-fence outlier detection. Quartiles use
//! linear interpolation between adjacent order statistics at position `(n - 1) * q`.

use crate::error::ComputeError;
use crate::types::{DistributionBand, FiveNumberSummary};

/// Tukey fence multiplier applied to the interquartile range
pub const TUKEY_K: f64 = 1.5;

/// Summarizer producing `FiveNumberSummary` values
pub struct QuantileSummarizer;

impl QuantileSummarizer {
    /// Summarize a series.
    ///
    /// The reported fences are clamped to the observed range, while outliers are
    /// tested against the unclamped `Q1 - 1.5 IQR` / `Q3 + 1.5 IQR` bounds.
    /// Fewer than four values still summarize, though the fences carry little meaning.
    pub fn summarize(values: &[f64]) -> Result<FiveNumberSummary, ComputeError> {
        if values.is_empty() {
            return Err(ComputeError::EmptyInput(
                "cannot summarize an empty series".to_string(),
            ));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ComputeError::DegenerateInput(
                "series contains a non-finite value".to_string(),
            ));
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let min = sorted[0];
        let max = sorted[sorted.len() - 1];
        let q1 = quantile(&sorted, 0.25)?;
        let median = quantile(&sorted, 0.5)?;
        let q3 = quantile(&sorted, 0.75)?;

        let (lower_bound, upper_bound) = tukey_bounds(q1, q3);

        let outliers = values
            .iter()
            .copied()
            .filter(|v| *v < lower_bound || *v > upper_bound)
            .collect();

        Ok(FiveNumberSummary {
            min,
            q1,
            median,
            q3,
            max,
            lower_fence: min.max(lower_bound),
            upper_fence: max.min(upper_bound),
            outliers,
        })
    }
}

/// Quantile of an ascending series by linear interpolation.
///
/// `q` is clamped to [0, 1]. An empty series fails with `EmptyInput`.
pub fn quantile(sorted: &[f64], q: f64) -> Result<f64, ComputeError> {
    if sorted.is_empty() {
        return Err(ComputeError::EmptyInput(
            "cannot take a quantile of an empty series".to_string(),
        ));
    }

    let position = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;

    if lower == upper {
        Ok(sorted[lower])
    } else {
        let weight = position - lower as f64;
        Ok(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
    }
}

fn tukey_bounds(q1: f64, q3: f64) -> (f64, f64) {
    let iqr = q3 - q1;
    (q1 - TUKEY_K * iqr, q3 + TUKEY_K * iqr)
}

impl FiveNumberSummary {
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    /// Place a value, typically one reel's rate, within this distribution
    pub fn band_of(&self, value: f64) -> DistributionBand {
        let (lower_bound, upper_bound) = tukey_bounds(self.q1, self.q3);

        if value < lower_bound {
            DistributionBand::LowOutlier
        } else if value < self.q1 {
            DistributionBand::BottomQuartile
        } else if value < self.median {
            DistributionBand::LowerMiddle
        } else if value < self.q3 {
            DistributionBand::UpperMiddle
        } else if value <= upper_bound {
            DistributionBand::TopQuartile
        } else {
            DistributionBand::HighOutlier
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_integral_positions() {
        let summary = QuantileSummarizer::summarize(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();

        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.q1, 2.0);
        assert_eq!(summary.median, 3.0);
        assert_eq!(summary.q3, 4.0);
        assert_eq!(summary.max, 5.0);
        assert!(summary.outliers.is_empty());
    }

    #[test]
    fn test_interpolated_positions() {
        let summary = QuantileSummarizer::summarize(&[4.0, 1.0, 3.0, 2.0]).unwrap();

        assert!((summary.q1 - 1.75).abs() < 1e-12);
        assert!((summary.median - 2.5).abs() < 1e-12);
        assert!((summary.q3 - 3.25).abs() < 1e-12);
    }

    #[test]
    fn test_high_outlier_and_clamped_fences() {
        let summary = QuantileSummarizer::summarize(&[1.0, 2.0, 3.0, 4.0, 100.0]).unwrap();

        // IQR = 2, bounds are [-1, 7]
        assert_eq!(summary.outliers, vec![100.0]);
        assert_eq!(summary.upper_fence, 7.0);
        assert_eq!(summary.lower_fence, 1.0);
    }

    #[test]
    fn test_outliers_keep_input_order() {
        let summary =
            QuantileSummarizer::summarize(&[500.0, 10.0, 11.0, 12.0, 13.0, 14.0, -300.0]).unwrap();

        assert_eq!(summary.outliers, vec![500.0, -300.0]);
        assert!(summary.lower_fence > -300.0);
        assert!(summary.upper_fence < 500.0);
    }

    #[test]
    fn test_single_value() {
        let summary = QuantileSummarizer::summarize(&[7.0]).unwrap();

        assert_eq!(
            summary,
            FiveNumberSummary {
                min: 7.0,
                q1: 7.0,
                median: 7.0,
                q3: 7.0,
                max: 7.0,
                lower_fence: 7.0,
                upper_fence: 7.0,
                outliers: vec![],
            }
        );
    }

    #[test]
    fn test_empty_input() {
        let result = QuantileSummarizer::summarize(&[]);
        assert!(matches!(result, Err(ComputeError::EmptyInput(_))));
    }

    #[test]
    fn test_nan_rejected() {
        let result = QuantileSummarizer::summarize(&[1.0, f64::NAN]);
        assert!(matches!(result, Err(ComputeError::DegenerateInput(_))));
    }

    #[test]
    fn test_band_of() {
        let summary = QuantileSummarizer::summarize(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();

        assert_eq!(summary.band_of(-10.0), DistributionBand::LowOutlier);
        assert_eq!(summary.band_of(1.5), DistributionBand::BottomQuartile);
        assert_eq!(summary.band_of(2.5), DistributionBand::LowerMiddle);
        assert_eq!(summary.band_of(3.0), DistributionBand::UpperMiddle);
        assert_eq!(summary.band_of(4.5), DistributionBand::TopQuartile);
        assert_eq!(summary.band_of(50.0), DistributionBand::HighOutlier);
    }

    #[test]
    fn test_quantile_of_empty_series() {
        assert!(matches!(quantile(&[], 0.5), Err(ComputeError::EmptyInput(_))));
        assert_eq!(quantile(&[1.0, 3.0], 0.5).unwrap(), 2.0);
        assert_eq!(quantile(&[1.0, 3.0], 7.0).unwrap(), 3.0);
    }

    #[test]
    fn test_repeatable() {
        let values = [9.67, 5.24, 6.96, 6.17, 9.84, 11.75];
        assert_eq!(
            QuantileSummarizer::summarize(&values).unwrap(),
            QuantileSummarizer::summarize(&values).unwrap()
        );
    }
}
