//! Portfolio summary
//!
//! Totals and averages across every reel, plus the overall engagement rate.

use crate::engagement::EngagementCalculator;
use crate::error::ComputeError;
use crate::types::{Metric, MetricRecord};
use serde::{Deserialize, Serialize};

/// Metrics listed in the totals table
const SUMMARY_METRICS: [Metric; 5] = [
    Metric::Views,
    Metric::Likes,
    Metric::Comments,
    Metric::Shares,
    Metric::Saves,
];

/// Total and per-reel average of one metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricTotal {
    pub metric: Metric,
    pub total: u64,
    /// Rounded per-reel average
    pub average: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub reel_count: usize,
    pub totals: Vec<MetricTotal>,
    /// Engagement rate over the summed counters, not a mean of per-reel rates
    pub average_engagement_rate: f64,
    pub most_popular_id: String,
    pub most_popular_title: String,
}

impl PortfolioSummary {
    pub fn from_records(records: &[MetricRecord]) -> Result<Self, ComputeError> {
        if records.is_empty() {
            return Err(ComputeError::EmptyInput(
                "portfolio summary needs at least one reel".to_string(),
            ));
        }

        let total_of = |metric: Metric| -> Result<u64, ComputeError> {
            records
                .iter()
                .try_fold(0u64, |acc, r| acc.checked_add(r.value_or_zero(metric)))
                .ok_or_else(|| ComputeError::CounterOverflow(format!("total {}", metric)))
        };

        let count = records.len();
        let totals = SUMMARY_METRICS
            .iter()
            .map(|&metric| {
                let total = total_of(metric)?;
                Ok(MetricTotal {
                    metric,
                    total,
                    average: (total as f64 / count as f64).round() as u64,
                })
            })
            .collect::<Result<Vec<_>, ComputeError>>()?;

        let average_engagement_rate = EngagementCalculator::compute_engagement_rate(
            total_of(Metric::Likes)?,
            total_of(Metric::Comments)?,
            total_of(Metric::Shares)?,
            total_of(Metric::Views)?,
        )?;

        // Later reels win ties
        let mut most_popular = &records[0];
        for record in &records[1..] {
            if record.value_or_zero(Metric::Views) >= most_popular.value_or_zero(Metric::Views) {
                most_popular = record;
            }
        }

        Ok(PortfolioSummary {
            reel_count: count,
            totals,
            average_engagement_rate,
            most_popular_id: most_popular.id.clone(),
            most_popular_title: most_popular.title.clone(),
        })
    }

    pub fn total(&self, metric: Metric) -> Option<&MetricTotal> {
        self.totals.iter().find(|t| t.metric == metric)
    }
}
