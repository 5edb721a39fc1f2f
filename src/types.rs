//! Core types for reel-insight
//!
//! This module defines the value objects that flow between ingestion, the
//! statistical components and the report: metric records, the correlation
//! matrix, the regression model and the five-number summary.

use crate::chart::ChartSpec;
use crate::correlation::TrendPoint;
use crate::error::ComputeError;
use crate::portfolio::PortfolioSummary;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Engagement counter tracked per reel
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Views,
    Likes,
    Comments,
    Shares,
    Saves,
    Follows,
    AccountsReached,
    AccountsEngaged,
    ProfileActivity,
}

impl Metric {
    /// The six counters every report panel works with, in display order
    pub const CORE: [Metric; 6] = [
        Metric::Views,
        Metric::Likes,
        Metric::Comments,
        Metric::Shares,
        Metric::Saves,
        Metric::Follows,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Views => "views",
            Metric::Likes => "likes",
            Metric::Comments => "comments",
            Metric::Shares => "shares",
            Metric::Saves => "saves",
            Metric::Follows => "follows",
            Metric::AccountsReached => "accounts_reached",
            Metric::AccountsEngaged => "accounts_engaged",
            Metric::ProfileActivity => "profile_activity",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = ComputeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "views" => Ok(Metric::Views),
            "likes" => Ok(Metric::Likes),
            "comments" => Ok(Metric::Comments),
            "shares" => Ok(Metric::Shares),
            "saves" => Ok(Metric::Saves),
            "follows" => Ok(Metric::Follows),
            "accounts_reached" | "reach" => Ok(Metric::AccountsReached),
            "accounts_engaged" => Ok(Metric::AccountsEngaged),
            "profile_activity" => Ok(Metric::ProfileActivity),
            other => Err(ComputeError::UnknownMetric(other.to_string())),
        }
    }
}

/// Presentation a record is analysed with, assigned once at ingestion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisVariant {
    /// Views, interactions and new followers side by side with conversion rates
    ConversionFunnel,
    /// Reach in millions against engagement rate
    ReachVsEngagement,
    /// Accounts reached stacked against accounts that interacted
    ReachBreakdown,
    /// Share of each interaction type
    InteractionMix,
    /// Reach in thousands against engagement rate, sized by comments
    NicheEngagement,
    /// Views, interactions and follows compared directly
    ViralComparison,
    #[default]
    Standard,
}

/// How a metric absent from a record is treated when building a series
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingMetricPolicy {
    /// Count a missing metric as zero
    #[default]
    Zero,
    /// Leave the record out of the series (pairwise for two-metric series)
    Skip,
    /// Fail with `MissingField`
    Reject,
}

/// Quality flag attached to an ingested record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityFlag {
    MissingViews,
    MissingLikes,
    MissingComments,
    MissingShares,
    MissingSaves,
    MissingFollows,
    MissingInsights,
    EstimatedValue,
    MissingDate,
}

impl QualityFlag {
    /// Flag raised when a core metric could not be resolved
    pub fn missing(metric: Metric) -> Option<QualityFlag> {
        match metric {
            Metric::Views => Some(QualityFlag::MissingViews),
            Metric::Likes => Some(QualityFlag::MissingLikes),
            Metric::Comments => Some(QualityFlag::MissingComments),
            Metric::Shares => Some(QualityFlag::MissingShares),
            Metric::Saves => Some(QualityFlag::MissingSaves),
            Metric::Follows => Some(QualityFlag::MissingFollows),
            _ => None,
        }
    }
}

/// Media item as reported by the source API, before metric resolution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalReel {
    pub id: String,
    pub caption: Option<String>,
    pub media_type: Option<String>,
    pub permalink: Option<String>,
    pub media_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub like_count: Option<u64>,
    pub comments_count: Option<u64>,
    /// Name of the page the media was fetched through
    pub page_name: Option<String>,
    /// Insight counters by Graph metric name; `None` when insights were unavailable
    pub insights: Option<BTreeMap<String, u64>>,
}

impl CanonicalReel {
    /// Insight counter by name
    pub fn insight(&self, name: &str) -> Option<u64> {
        self.insights.as_ref().and_then(|i| i.get(name).copied())
    }
}

/// Engagement counters of one reel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub id: String,
    pub title: String,
    /// Publication date
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub variant: AnalysisVariant,
    /// Known counters; a metric absent from the map is missing, not zero
    pub counts: BTreeMap<Metric, u64>,
    #[serde(default)]
    pub permalink: Option<String>,
    /// Fraction of the core metrics present (0-1)
    #[serde(default = "full_coverage")]
    pub coverage: f64,
    #[serde(default)]
    pub quality_flags: Vec<QualityFlag>,
}

fn full_coverage() -> f64 {
    1.0
}

impl MetricRecord {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            date: None,
            variant: AnalysisVariant::Standard,
            counts: BTreeMap::new(),
            permalink: None,
            coverage: 1.0,
            quality_flags: Vec::new(),
        }
    }

    pub fn with_count(mut self, metric: Metric, value: u64) -> Self {
        self.counts.insert(metric, value);
        self
    }

    pub fn with_variant(mut self, variant: AnalysisVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Value of a metric, `None` if it was never observed
    pub fn value(&self, metric: Metric) -> Option<u64> {
        self.counts.get(&metric).copied()
    }

    /// Value of a metric, counting a missing one as zero
    pub fn value_or_zero(&self, metric: Metric) -> u64 {
        self.value(metric).unwrap_or(0)
    }

    /// likes + comments + shares, missing counters contributing zero
    pub fn interactions(&self) -> Result<u64, ComputeError> {
        self.value_or_zero(Metric::Likes)
            .checked_add(self.value_or_zero(Metric::Comments))
            .and_then(|sum| sum.checked_add(self.value_or_zero(Metric::Shares)))
            .ok_or_else(|| {
                ComputeError::CounterOverflow(format!("interactions of reel {}", self.id))
            })
    }
}

/// Pairwise Pearson coefficients over an ordered list of metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub metrics: Vec<Metric>,
    /// Row-major, `values[i][j]` is the coefficient of `metrics[i]` with `metrics[j]`
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Coefficient for a pair of metrics, `None` if either is not in the matrix
    pub fn get(&self, a: Metric, b: Metric) -> Option<f64> {
        let i = self.metrics.iter().position(|m| *m == a)?;
        let j = self.metrics.iter().position(|m| *m == b)?;
        Some(self.values[i][j])
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

/// Least-squares line `y = intercept + slope * x`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionModel {
    pub slope: f64,
    pub intercept: f64,
}

/// Boxplot statistics of one series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiveNumberSummary {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    /// Lower whisker, clamped to the observed minimum
    pub lower_fence: f64,
    /// Upper whisker, clamped to the observed maximum
    pub upper_fence: f64,
    /// Values outside the unclamped Tukey bounds, in input order
    pub outliers: Vec<f64>,
}

/// Where a single value sits within a reference distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionBand {
    LowOutlier,
    BottomQuartile,
    LowerMiddle,
    UpperMiddle,
    TopQuartile,
    HighOutlier,
}

/// Report producer metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Per-reel panel of the report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReelInsight {
    pub id: String,
    pub title: String,
    pub date: Option<NaiveDate>,
    pub variant: AnalysisVariant,
    pub engagement_rate: Option<f64>,
    /// Position of this reel's engagement rate among all reels
    pub rate_band: Option<DistributionBand>,
    pub chart: Option<ChartSpec>,
    pub coverage: f64,
    pub quality_flags: Vec<QualityFlag>,
}

/// Regression panel of the report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionPanel {
    pub x_metric: Metric,
    pub y_metric: Metric,
    pub model: RegressionModel,
    /// Change in `y_metric` per 1,000 of `x_metric`
    pub per_thousand: i64,
    pub correlation: f64,
    pub trend_line: [TrendPoint; 2],
}

/// Panel left out of a report, with the reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OmittedPanel {
    pub panel: String,
    pub reason: String,
}

/// Panels computed for a set of reels, before report metadata is attached
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReelAnalysis {
    pub reels: Vec<ReelInsight>,
    pub portfolio: Option<PortfolioSummary>,
    pub correlation: Option<CorrelationMatrix>,
    pub regression: Option<RegressionPanel>,
    pub engagement_distribution: Option<FiveNumberSummary>,
    pub omitted: Vec<OmittedPanel>,
}

/// Complete analysis report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub report_version: String,
    pub producer: ReportProducer,
    pub computed_at_utc: String,
    pub record_count: usize,
    pub reels: Vec<ReelInsight>,
    pub portfolio: Option<PortfolioSummary>,
    pub correlation: Option<CorrelationMatrix>,
    pub regression: Option<RegressionPanel>,
    pub engagement_distribution: Option<FiveNumberSummary>,
    pub omitted: Vec<OmittedPanel>,
}
