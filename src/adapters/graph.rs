//! Graph API adapter
//!
//! Parses Instagram Graph API media listings (optionally with per-media
//! insights already attached) and maps them to canonical reels.

use crate::error::ComputeError;
use crate::types::CanonicalReel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ReelPayloadAdapter;

/// Media types that count as reels
const REEL_MEDIA_TYPES: [&str; 2] = ["VIDEO", "REELS"];

/// Graph API payload adapter
pub struct GraphApiAdapter;

impl ReelPayloadAdapter for GraphApiAdapter {
    fn parse(&self, raw_json: &str) -> Result<Vec<CanonicalReel>, ComputeError> {
        let value: serde_json::Value = serde_json::from_str(raw_json)?;

        if let Some(error) = value.get("error") {
            let message = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown Graph API error");
            return Err(ComputeError::ParseError(message.to_string()));
        }

        let media = match serde_json::from_value::<GraphPayload>(value)? {
            GraphPayload::Page(page) => page.data,
            GraphPayload::List(items) => items,
        };

        let total = media.len();
        let reels: Vec<CanonicalReel> = media
            .into_iter()
            .filter(|m| is_reel(m.media_type.as_deref()))
            .map(convert_media_to_canonical)
            .collect();

        if reels.len() < total {
            log::debug!("dropped {} non-video media items", total - reels.len());
        }

        Ok(reels)
    }
}

fn is_reel(media_type: Option<&str>) -> bool {
    media_type.is_some_and(|t| REEL_MEDIA_TYPES.contains(&t))
}

fn convert_media_to_canonical(media: GraphMedia) -> CanonicalReel {
    let published_at = media.timestamp.as_deref().and_then(parse_graph_time);
    if media.timestamp.is_some() && published_at.is_none() {
        log::warn!("media {} has an unparseable timestamp", media.id);
    }

    CanonicalReel {
        id: media.id,
        caption: media.caption,
        media_type: media.media_type,
        permalink: media.permalink,
        media_url: media.media_url,
        thumbnail_url: media.thumbnail_url,
        published_at,
        like_count: media.like_count,
        comments_count: media.comments_count,
        page_name: media.page_name,
        insights: media.insights.map(GraphInsights::into_counters),
    }
}

/// Graph timestamps look like `2024-01-15T10:00:00+0000`; RFC 3339 is accepted too
fn parse_graph_time(time_str: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(time_str, "%Y-%m-%dT%H:%M:%S%z")
        .or_else(|_| DateTime::parse_from_rfc3339(time_str))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Non-negative integer counter from an insight value
fn counter_value(value: &serde_json::Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(|v| v.round() as u64)
    })
}

// Graph API payload structures

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GraphPayload {
    Page(GraphMediaPage),
    List(Vec<GraphMedia>),
}

#[derive(Debug, Deserialize)]
struct GraphMediaPage {
    data: Vec<GraphMedia>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GraphMedia {
    id: String,
    caption: Option<String>,
    media_type: Option<String>,
    media_url: Option<String>,
    thumbnail_url: Option<String>,
    permalink: Option<String>,
    timestamp: Option<String>,
    like_count: Option<u64>,
    comments_count: Option<u64>,
    page_name: Option<String>,
    insights: Option<GraphInsights>,
}

/// Insights either in the Graph envelope or already flattened to `name: value`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum GraphInsights {
    Envelope { data: Vec<GraphInsight> },
    Flat(BTreeMap<String, serde_json::Value>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GraphInsight {
    name: String,
    #[serde(default)]
    values: Vec<GraphInsightValue>,
    total_value: Option<GraphInsightValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GraphInsightValue {
    value: serde_json::Value,
}

impl GraphInsights {
    fn into_counters(self) -> BTreeMap<String, u64> {
        match self {
            GraphInsights::Envelope { data } => data
                .into_iter()
                .filter_map(|insight| {
                    let value = insight
                        .values
                        .first()
                        .or(insight.total_value.as_ref())
                        .and_then(|v| counter_value(&v.value))?;
                    Some((insight.name, value))
                })
                .collect(),
            GraphInsights::Flat(map) => map
                .into_iter()
                .filter_map(|(name, value)| counter_value(&value).map(|v| (name, v)))
                .collect(),
        }
    }
}
