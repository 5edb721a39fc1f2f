//! Chart selection
//!
//! Builds the chart model for a record from its `AnalysisVariant`. The
//! variant is fixed at ingestion, so selection is a plain `match`.

use crate::engagement::EngagementCalculator;
use crate::error::ComputeError;
use crate::types::{AnalysisVariant, Metric, MetricRecord};
use serde::{Deserialize, Serialize};

/// Chart family a variant renders as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    EnhancedBar,
    Scatter,
    StackedBar,
    Pie,
    ComparisonBar,
    Bar,
}

/// Single bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarDatum {
    pub label: String,
    pub value: u64,
    /// Compact label such as `1.2M`
    pub formatted: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

/// Bubble on a scatter chart
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    /// Value shown next to the bubble
    pub z: f64,
    /// Bubble size
    pub size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackSegment {
    pub label: String,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackedGroup {
    pub label: String,
    pub segments: Vec<StackSegment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieSlice {
    pub label: String,
    pub value: u64,
    /// Percentage of the whole pie, one decimal
    pub share: f64,
}

/// Data behind a chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ChartData {
    Bars { bars: Vec<BarDatum> },
    Scatter { points: Vec<ScatterPoint> },
    Stacked { groups: Vec<StackedGroup> },
    Pie { slices: Vec<PieSlice> },
}

/// Chart model for one record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub variant: AnalysisVariant,
    pub kind: ChartKind,
    pub data: ChartData,
    /// One-line takeaway shown under the chart
    pub insight: String,
}

impl ChartSpec {
    /// Build the chart for a record.
    ///
    /// Fails when the record has no views, since every chart shows a rate.
    pub fn for_record(record: &MetricRecord) -> Result<ChartSpec, ComputeError> {
        let views = record
            .value(Metric::Views)
            .ok_or_else(|| ComputeError::MissingField(format!("views of reel {}", record.id)))?;
        let likes = record.value_or_zero(Metric::Likes);
        let comments = record.value_or_zero(Metric::Comments);
        let shares = record.value_or_zero(Metric::Shares);
        let saves = record.value_or_zero(Metric::Saves);
        let follows = record.value_or_zero(Metric::Follows);
        let interactions = record.interactions()?;
        let engagement_rate =
            EngagementCalculator::compute_engagement_rate(likes, comments, shares, views)?;

        let (kind, data, insight) = match record.variant {
            AnalysisVariant::ConversionFunnel => {
                let follow_rate = EngagementCalculator::follow_rate(follows, views)?;

                let mut follow_details = vec![
                    format!("{} new followers", group_thousands(follows)),
                    format!("Conversion rate: {:.2}%", follow_rate),
                ];
                if let Ok(per_follow) =
                    EngagementCalculator::interactions_per_follow(interactions, follows)
                {
                    follow_details.push(format!("{} interactions per follower", per_follow));
                }

                let bars = vec![
                    bar("Views", views)
                        .with_details(vec![format!("{} views", group_thousands(views))]),
                    bar("Interactions", interactions).with_details(vec![
                        format!("{} likes", group_thousands(likes)),
                        format!("{} comments", group_thousands(comments)),
                        format!("{} shares", group_thousands(shares)),
                        format!("Rate: {:.2}%", engagement_rate),
                    ]),
                    bar("New followers", follows).with_details(follow_details),
                ];

                (
                    ChartKind::EnhancedBar,
                    ChartData::Bars { bars },
                    "Not the most viral, but it converted well: niche humour drives deep engagement.",
                )
            }
            AnalysisVariant::ReachVsEngagement => (
                ChartKind::Scatter,
                ChartData::Scatter {
                    points: vec![ScatterPoint {
                        x: views as f64 / 1_000_000.0,
                        y: engagement_rate,
                        z: follows as f64,
                        size: likes as f64 / 5000.0,
                    }],
                },
                "Reached millions with a low engagement rate: mass reach is not always real connection.",
            ),
            AnalysisVariant::ReachBreakdown => {
                let reached = record.value(Metric::AccountsReached).unwrap_or(views);
                let engaged = record
                    .value(Metric::AccountsEngaged)
                    .unwrap_or(interactions);

                (
                    ChartKind::StackedBar,
                    ChartData::Stacked {
                        groups: vec![StackedGroup {
                            label: "Reach vs interaction".to_string(),
                            segments: vec![
                                StackSegment {
                                    label: "Accounts reached".to_string(),
                                    value: reached,
                                },
                                StackSegment {
                                    label: "Accounts engaged".to_string(),
                                    value: engaged,
                                },
                            ],
                        }],
                    },
                    "Fewer views than other hits, yet a strong follower conversion: authenticity converts.",
                )
            }
            AnalysisVariant::InteractionMix => (
                ChartKind::Pie,
                ChartData::Pie {
                    slices: pie_slices(&[
                        ("Likes", likes),
                        ("Comments", comments),
                        ("Shares", shares),
                        ("Saves", saves),
                    ]),
                },
                "Sparked more conversation in the comments than the others: it invites debate.",
            ),
            AnalysisVariant::NicheEngagement => (
                ChartKind::Scatter,
                ChartData::Scatter {
                    points: vec![ScatterPoint {
                        x: views as f64 / 1000.0,
                        y: engagement_rate,
                        z: follows as f64,
                        size: comments as f64,
                    }],
                },
                "Fewer views but a very high engagement rate: niche content builds loyalty.",
            ),
            AnalysisVariant::ViralComparison => (
                ChartKind::ComparisonBar,
                ChartData::Bars {
                    bars: vec![
                        bar("Views", views),
                        bar("Interactions", interactions),
                        bar("New followers", follows),
                    ],
                },
                "The most viral reel and the best converter, balancing reach and connection.",
            ),
            AnalysisVariant::Standard => {
                return Ok(ChartSpec {
                    variant: record.variant,
                    kind: ChartKind::Bar,
                    data: ChartData::Bars {
                        bars: vec![
                            bar("Views", views),
                            bar("Likes", likes),
                            bar("Comments", comments),
                            bar("Shares", shares),
                        ],
                    },
                    insight: format!("Engagement rate: {:.2}%", engagement_rate),
                });
            }
        };

        Ok(ChartSpec {
            variant: record.variant,
            kind,
            data,
            insight: insight.to_string(),
        })
    }
}

fn bar(label: &str, value: u64) -> BarDatum {
    BarDatum {
        label: label.to_string(),
        value,
        formatted: format_compact(value),
        details: Vec::new(),
    }
}

impl BarDatum {
    fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }
}

fn pie_slices(parts: &[(&str, u64)]) -> Vec<PieSlice> {
    let total: u128 = parts.iter().map(|(_, v)| *v as u128).sum();

    parts
        .iter()
        .map(|(label, value)| PieSlice {
            label: label.to_string(),
            value: *value,
            share: if total == 0 {
                0.0
            } else {
                crate::engagement::round_to(*value as f64 / total as f64 * 100.0, 1)
            },
        })
        .collect()
}

/// Short label: `5.5M`, `874.1K`, `950`
pub fn format_compact(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1000 {
        format!("{:.1}K", n as f64 / 1000.0)
    } else {
        n.to_string()
    }
}

/// Digits grouped by thousands: `67,380`
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
