//! Record normalization
//!
//! This module resolves canonical reels into metric records:
//! - Counters picked from the media fields and insights in priority order
//! - Missing counters left absent and flagged, never invented
//! - Display title derived from the caption
//! - Coverage of the core metrics

use crate::config::AnalysisConfig;
use crate::types::{AnalysisVariant, CanonicalReel, Metric, MetricRecord, QualityFlag};
use std::collections::BTreeMap;

/// Insight names tried, in order, for the view count
const VIEW_INSIGHTS: [&str; 3] = ["video_views", "plays", "impressions"];

/// Normalizer for converting canonical reels to metric records
pub struct Normalizer;

impl Normalizer {
    /// Normalize one canonical reel; `index` is its position in the payload
    pub fn normalize(reel: &CanonicalReel, index: usize, config: &AnalysisConfig) -> MetricRecord {
        let mut quality_flags = Vec::new();
        let mut counts = BTreeMap::new();

        if reel.insights.is_none() {
            quality_flags.push(QualityFlag::MissingInsights);
        }

        let likes = reel.like_count.or_else(|| reel.insight("likes"));

        let mut views = VIEW_INSIGHTS.iter().find_map(|name| reel.insight(name));
        if views.is_none() && config.estimate_views_from_likes {
            views = likes.map(|l| l.saturating_mul(10));
            if views.is_some() {
                quality_flags.push(QualityFlag::EstimatedValue);
            }
        }

        let core = [
            (Metric::Views, views),
            (Metric::Likes, likes),
            (
                Metric::Comments,
                reel.comments_count.or_else(|| reel.insight("comments")),
            ),
            (Metric::Shares, reel.insight("shares")),
            (Metric::Saves, reel.insight("saves")),
            (Metric::Follows, reel.insight("follows")),
        ];

        let mut present = 0;
        for (metric, value) in core {
            match value {
                Some(v) => {
                    counts.insert(metric, v);
                    present += 1;
                }
                None => quality_flags.extend(QualityFlag::missing(metric)),
            }
        }

        let extras = [
            (Metric::AccountsReached, reel.insight("reach")),
            (Metric::AccountsEngaged, reel.insight("accounts_engaged")),
            (
                Metric::ProfileActivity,
                reel.insight("profile_activity")
                    .or_else(|| reel.insight("profile_visits")),
            ),
        ];
        for (metric, value) in extras {
            if let Some(v) = value {
                counts.insert(metric, v);
            }
        }

        let date = reel.published_at.map(|t| t.date_naive());
        if date.is_none() {
            quality_flags.push(QualityFlag::MissingDate);
        }

        let title = reel
            .caption
            .as_deref()
            .and_then(|c| extract_title(c, config.title_max_chars))
            .unwrap_or_else(|| format!("Reel #{}", index + 1));

        MetricRecord {
            id: reel.id.clone(),
            title,
            date,
            variant: AnalysisVariant::Standard,
            counts,
            permalink: reel.permalink.clone(),
            coverage: present as f64 / Metric::CORE.len() as f64,
            quality_flags,
        }
    }

    /// Normalize a payload's worth of reels, keeping their order
    pub fn normalize_all(reels: &[CanonicalReel], config: &AnalysisConfig) -> Vec<MetricRecord> {
        reels
            .iter()
            .enumerate()
            .map(|(index, reel)| Self::normalize(reel, index, config))
            .collect()
    }
}

/// First caption line, cut to `max_chars` characters with a trailing ellipsis
pub fn extract_title(caption: &str, max_chars: usize) -> Option<String> {
    let first_line = caption.lines().next()?.trim_end();
    if first_line.is_empty() {
        return None;
    }

    if first_line.chars().count() > max_chars {
        let cut: String = first_line.chars().take(max_chars).collect();
        Some(format!("{}...", cut))
    } else {
        Some(first_line.to_string())
    }
}
