//! Engagement rates
//!
//! Percentages derived from a reel's counters:
//! - Engagement rate: (likes + comments + shares) / views
//! - Follow (conversion) rate: follows / views
//! - Interactions per new follower

use crate::error::ComputeError;
use crate::types::{Metric, MetricRecord};

/// Calculator for engagement-style ratios
pub struct EngagementCalculator;

impl EngagementCalculator {
    /// Engagement rate as a percentage rounded to two decimals.
    ///
    /// Fails with `DivisionByZero` when `views` is zero.
    ///
    /// # Example
    /// ```
    /// use reel_insight::engagement::EngagementCalculator;
    ///
    /// let rate = EngagementCalculator::compute_engagement_rate(10, 5, 5, 400).unwrap();
    /// assert_eq!(rate, 5.0);
    /// ```
    pub fn compute_engagement_rate(
        likes: u64,
        comments: u64,
        shares: u64,
        views: u64,
    ) -> Result<f64, ComputeError> {
        let interactions = likes as u128 + comments as u128 + shares as u128;
        percentage(interactions, views, "engagement rate")
    }

    /// Engagement rate of a record.
    ///
    /// Missing likes, comments or shares count as zero; missing views is an error.
    pub fn record_engagement_rate(record: &MetricRecord) -> Result<f64, ComputeError> {
        let views = record
            .value(Metric::Views)
            .ok_or_else(|| ComputeError::MissingField(format!("views of reel {}", record.id)))?;

        Self::compute_engagement_rate(
            record.value_or_zero(Metric::Likes),
            record.value_or_zero(Metric::Comments),
            record.value_or_zero(Metric::Shares),
            views,
        )
    }

    /// Share of viewers that became followers, as a percentage
    pub fn follow_rate(follows: u64, views: u64) -> Result<f64, ComputeError> {
        percentage(follows as u128, views, "follow rate")
    }

    /// Average number of interactions behind each new follower
    pub fn interactions_per_follow(interactions: u64, follows: u64) -> Result<u64, ComputeError> {
        if follows == 0 {
            return Err(ComputeError::DivisionByZero(
                "interactions per follow with zero follows".to_string(),
            ));
        }
        Ok((interactions as f64 / follows as f64).round() as u64)
    }
}

/// `part / whole * 100`, rounded half-up to two decimals.
///
/// Computed in hundredths of a percent on integers so exact halves round up.
fn percentage(part: u128, whole: u64, what: &str) -> Result<f64, ComputeError> {
    if whole == 0 {
        return Err(ComputeError::DivisionByZero(format!("{} with zero views", what)));
    }
    let whole = whole as u128;
    let hundredths = (2 * part * 10_000 + whole) / (2 * whole);
    Ok(hundredths as f64 / 100.0)
}

/// Round to `decimals` places, halves away from zero.
///
/// Floating-point only; used for display shares, not for rates.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
