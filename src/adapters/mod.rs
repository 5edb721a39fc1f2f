//! Reel payload adapters
//!
//! This module provides adapters that parse raw API payloads and map them to
//! canonical, source-agnostic media items.

mod graph;

pub use graph::GraphApiAdapter;

use crate::error::ComputeError;
use crate::types::CanonicalReel;

/// Trait for reel payload adapters
pub trait ReelPayloadAdapter {
    /// Parse raw JSON and convert to canonical reels
    fn parse(&self, raw_json: &str) -> Result<Vec<CanonicalReel>, ComputeError>;
}
