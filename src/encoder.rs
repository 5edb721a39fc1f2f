//! Report encoding
//!
//! This module stamps computed panels with producer metadata and encodes
//! them as JSON.

use crate::error::ComputeError;
use crate::types::{AnalysisReport, ReelAnalysis, ReportProducer};
use crate::{PRODUCER_NAME, VERSION};
use chrono::Utc;
use uuid::Uuid;

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

/// Encoder producing analysis reports
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn encode(&self, analysis: ReelAnalysis) -> AnalysisReport {
        AnalysisReport {
            report_version: REPORT_VERSION.to_string(),
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            computed_at_utc: Utc::now().to_rfc3339(),
            record_count: analysis.reels.len(),
            reels: analysis.reels,
            portfolio: analysis.portfolio,
            correlation: analysis.correlation,
            regression: analysis.regression,
            engagement_distribution: analysis.engagement_distribution,
            omitted: analysis.omitted,
        }
    }

    /// Encode to JSON string
    pub fn encode_to_json(&self, analysis: ReelAnalysis) -> Result<String, ComputeError> {
        let report = self.encode(analysis);
        serde_json::to_string(&report).map_err(ComputeError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_empty_analysis() {
        let encoder = ReportEncoder::with_instance_id("test-instance".to_string());
        let report = encoder.encode(ReelAnalysis::default());

        assert_eq!(report.report_version, REPORT_VERSION);
        assert_eq!(report.producer.name, PRODUCER_NAME);
        assert_eq!(report.producer.instance_id, "test-instance");
        assert_eq!(report.record_count, 0);
        assert!(chrono::DateTime::parse_from_rfc3339(&report.computed_at_utc).is_ok());
    }

    #[test]
    fn test_instance_ids_are_unique() {
        let a = ReportEncoder::new().encode(ReelAnalysis::default());
        let b = ReportEncoder::new().encode(ReelAnalysis::default());
        assert_ne!(a.producer.instance_id, b.producer.instance_id);
    }

    #[test]
    fn test_encode_to_json() {
        let json = ReportEncoder::new()
            .encode_to_json(ReelAnalysis::default())
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["report_version"], "1.0.0");
        assert!(value["portfolio"].is_null());
        assert!(value["omitted"].as_array().unwrap().is_empty());
    }
}
