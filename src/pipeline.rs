//! Pipeline orchestration
//!
//! This module provides the public API for reel-insight.
//! It orchestrates the full pipeline from raw payload JSON to an analysis report.

use crate::adapters::{GraphApiAdapter, ReelPayloadAdapter};
use crate::chart::ChartSpec;
use crate::config::AnalysisConfig;
use crate::correlation::CorrelationEngine;
use crate::encoder::ReportEncoder;
use crate::engagement::EngagementCalculator;
use crate::error::ComputeError;
use crate::normalizer::Normalizer;
use crate::portfolio::PortfolioSummary;
use crate::quantile::QuantileSummarizer;
use crate::sample::sample_reels;
use crate::series;
use crate::types::{
    AnalysisReport, FiveNumberSummary, MetricRecord, OmittedPanel, ReelAnalysis, ReelInsight,
    RegressionPanel,
};

/// Convert a raw Graph API media payload to an analysis report.
///
/// # Arguments
/// * `raw_json` - Media page `{"data": [...]}` or bare array of media objects
/// * `config` - Analysis configuration
///
/// # Returns
/// Report JSON
///
/// # Example
/// ```ignore
/// let report_json = graph_to_report(media_json, &AnalysisConfig::default())?;
/// ```
pub fn graph_to_report(raw_json: String, config: &AnalysisConfig) -> Result<String, ComputeError> {
    let analyzer = ReelAnalyzer::new(config.clone())?;
    let report = analyzer.process_graph(&raw_json)?;
    serde_json::to_string(&report).map_err(ComputeError::from)
}

/// Convert a JSON array of metric records to an analysis report.
pub fn records_to_report(
    raw_json: String,
    config: &AnalysisConfig,
) -> Result<String, ComputeError> {
    let analyzer = ReelAnalyzer::new(config.clone())?;
    let report = analyzer.process_records_json(&raw_json)?;
    serde_json::to_string(&report).map_err(ComputeError::from)
}

/// Analysis report over the bundled sample reels.
pub fn sample_report(config: &AnalysisConfig) -> Result<String, ComputeError> {
    let analyzer = ReelAnalyzer::new(config.clone())?;
    let report = analyzer.analyze(&sample_reels());
    serde_json::to_string(&report).map_err(ComputeError::from)
}

/// Analyzer composing every report panel over a set of records.
///
/// A panel that cannot be computed is left out of the report and listed in
/// `omitted`; the report itself still succeeds.
pub struct ReelAnalyzer {
    config: AnalysisConfig,
    encoder: ReportEncoder,
}

impl ReelAnalyzer {
    /// Create an analyzer, validating the configuration
    pub fn new(config: AnalysisConfig) -> Result<Self, ComputeError> {
        config.validate()?;
        Ok(Self {
            config,
            encoder: ReportEncoder::new(),
        })
    }

    /// Create an analyzer with a fixed producer instance id
    pub fn with_instance_id(
        config: AnalysisConfig,
        instance_id: String,
    ) -> Result<Self, ComputeError> {
        config.validate()?;
        Ok(Self {
            config,
            encoder: ReportEncoder::with_instance_id(instance_id),
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Parse, normalize and analyze a Graph API media payload
    pub fn process_graph(&self, raw_json: &str) -> Result<AnalysisReport, ComputeError> {
        let reels = GraphApiAdapter.parse(raw_json)?;
        let records = Normalizer::normalize_all(&reels, &self.config);
        log::debug!("normalized {} reels from graph payload", records.len());
        Ok(self.analyze(&records))
    }

    /// Analyze a JSON array of already-normalized metric records
    pub fn process_records_json(&self, raw_json: &str) -> Result<AnalysisReport, ComputeError> {
        let records: Vec<MetricRecord> = serde_json::from_str(raw_json)?;
        Ok(self.analyze(&records))
    }

    /// Compute every panel and stamp the report
    pub fn analyze(&self, records: &[MetricRecord]) -> AnalysisReport {
        self.encoder.encode(self.compute(records))
    }

    /// Compute every panel without report metadata
    pub fn compute(&self, records: &[MetricRecord]) -> ReelAnalysis {
        let mut omitted = Vec::new();

        let rates: Vec<Option<f64>> = records
            .iter()
            .map(|r| {
                panel(
                    &mut omitted,
                    &format!("rate:{}", r.id),
                    EngagementCalculator::record_engagement_rate(r),
                )
            })
            .collect();
        let present_rates: Vec<f64> = rates.iter().flatten().copied().collect();

        let engagement_distribution = panel(
            &mut omitted,
            "engagement_distribution",
            QuantileSummarizer::summarize(&present_rates),
        );

        let reels = records
            .iter()
            .zip(&rates)
            .map(|(record, &rate)| {
                self.reel_insight(record, rate, engagement_distribution.as_ref(), &mut omitted)
            })
            .collect();

        let portfolio = panel(
            &mut omitted,
            "portfolio",
            PortfolioSummary::from_records(records),
        );

        let correlation = panel(
            &mut omitted,
            "correlation",
            CorrelationEngine::compute_correlation_matrix(
                records,
                &self.config.metrics,
                self.config.missing_metric_policy,
            ),
        );

        let regression = panel(&mut omitted, "regression", self.regression(records));

        log::debug!(
            "analyzed {} records, {} panels omitted",
            records.len(),
            omitted.len()
        );

        ReelAnalysis {
            reels,
            portfolio,
            correlation,
            regression,
            engagement_distribution,
            omitted,
        }
    }

    fn reel_insight(
        &self,
        record: &MetricRecord,
        engagement_rate: Option<f64>,
        distribution: Option<&FiveNumberSummary>,
        omitted: &mut Vec<OmittedPanel>,
    ) -> ReelInsight {
        let chart = panel(
            omitted,
            &format!("chart:{}", record.id),
            ChartSpec::for_record(record),
        );

        ReelInsight {
            id: record.id.clone(),
            title: record.title.clone(),
            date: record.date,
            variant: record.variant,
            engagement_rate,
            rate_band: distribution.zip(engagement_rate).map(|(d, r)| d.band_of(r)),
            chart,
            coverage: record.coverage,
            quality_flags: record.quality_flags.clone(),
        }
    }

    fn regression(&self, records: &[MetricRecord]) -> Result<RegressionPanel, ComputeError> {
        let x_metric = self.config.regression_x;
        let y_metric = self.config.regression_y;
        let (x, y) = series::project_pair(
            records,
            x_metric,
            y_metric,
            self.config.missing_metric_policy,
        )?;

        let model = CorrelationEngine::fit_linear_regression(&x, &y)?;
        let correlation = CorrelationEngine::compute_correlation(&x, &y)?;
        let max_x = x.iter().copied().fold(0.0, f64::max);

        Ok(RegressionPanel {
            x_metric,
            y_metric,
            model,
            per_thousand: model.per_thousand(),
            correlation,
            trend_line: model.trend_line(max_x),
        })
    }
}

/// Keep a computed panel, or record why it was left out
fn panel<T>(
    omitted: &mut Vec<OmittedPanel>,
    name: &str,
    result: Result<T, ComputeError>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("omitting {} panel: {}", name, e);
            omitted.push(OmittedPanel {
                panel: name.to_string(),
                reason: e.to_string(),
            });
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DistributionBand, Metric, MissingMetricPolicy};

    fn analyzer() -> ReelAnalyzer {
        ReelAnalyzer::with_instance_id(AnalysisConfig::default(), "test".to_string()).unwrap()
    }

    #[test]
    fn test_sample_analysis_has_every_panel() {
        let report = analyzer().analyze(&sample_reels());

        assert_eq!(report.record_count, 6);
        assert!(report.omitted.is_empty());
        assert!(report.portfolio.is_some());
        assert!(report.reels.iter().all(|r| r.chart.is_some()));

        let matrix = report.correlation.unwrap();
        let r = matrix.get(Metric::Likes, Metric::Views).unwrap();
        assert!((r - 0.958).abs() < 0.001);
    }

    #[test]
    fn test_sample_regression_panel() {
        let report = analyzer().analyze(&sample_reels());
        let regression = report.regression.unwrap();

        assert_eq!(regression.x_metric, Metric::Shares);
        assert_eq!(regression.y_metric, Metric::Follows);
        assert!((regression.correlation - 0.812).abs() < 0.001);
        assert_eq!(regression.per_thousand, 25);
        assert_eq!(regression.trend_line[0].x, 0.0);
        assert_eq!(regression.trend_line[1].x, 45000.0);
    }

    #[test]
    fn test_sample_engagement_distribution() {
        let report = analyzer().analyze(&sample_reels());
        let distribution = report.engagement_distribution.unwrap();

        assert!((distribution.median - 8.315).abs() < 1e-9);
        assert_eq!(distribution.min, 5.24);
        assert_eq!(distribution.max, 11.75);
        assert!(distribution.outliers.is_empty());

        let top = report.reels.iter().find(|r| r.engagement_rate == Some(11.75));
        assert_eq!(top.unwrap().rate_band, Some(DistributionBand::TopQuartile));
    }

    #[test]
    fn test_empty_records_omit_panels() {
        let report = analyzer().analyze(&[]);

        assert_eq!(report.record_count, 0);
        assert!(report.portfolio.is_none());
        assert!(report.regression.is_none());
        assert!(report.engagement_distribution.is_none());

        let names: Vec<&str> = report.omitted.iter().map(|o| o.panel.as_str()).collect();
        assert!(names.contains(&"portfolio"));
        assert!(names.contains(&"regression"));
        assert!(names.contains(&"engagement_distribution"));
    }

    #[test]
    fn test_record_without_views_omits_chart() {
        let mut records = sample_reels();
        records.push(MetricRecord::new("no-views", "Sin vistas").with_count(Metric::Likes, 10));

        let report = analyzer().analyze(&records);
        let insight = report.reels.last().unwrap();

        assert_eq!(insight.engagement_rate, None);
        assert_eq!(insight.rate_band, None);
        assert!(insight.chart.is_none());
        let names: Vec<&str> = report.omitted.iter().map(|o| o.panel.as_str()).collect();
        assert!(names.contains(&"rate:no-views"));
        assert!(names.contains(&"chart:no-views"));
    }

    #[test]
    fn test_reject_policy_omits_matrix() {
        let config = AnalysisConfig {
            missing_metric_policy: MissingMetricPolicy::Reject,
            ..Default::default()
        };
        let analyzer = ReelAnalyzer::new(config).unwrap();

        let mut records = sample_reels();
        records.push(MetricRecord::new("partial", "Parcial").with_count(Metric::Views, 100));

        let report = analyzer.analyze(&records);
        assert!(report.correlation.is_none());
        assert!(report.regression.is_none());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = AnalysisConfig {
            metrics: vec![Metric::Views],
            ..Default::default()
        };
        assert!(matches!(
            ReelAnalyzer::new(config),
            Err(ComputeError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_graph_to_report() {
        let payload = r#"{
            "data": [
                {
                    "id": "1",
                    "caption": "Primer reel",
                    "media_type": "VIDEO",
                    "timestamp": "2024-01-15T10:00:00+0000",
                    "like_count": 100,
                    "comments_count": 5,
                    "insights": {"video_views": 2000, "shares": 10, "saves": 4, "follows": 1}
                },
                {
                    "id": "2",
                    "caption": "Segundo reel",
                    "media_type": "VIDEO",
                    "timestamp": "2024-01-16T10:00:00+0000",
                    "like_count": 300,
                    "comments_count": 9,
                    "insights": {"video_views": 5000, "shares": 30, "saves": 8, "follows": 4}
                },
                {
                    "id": "3",
                    "caption": "Una foto",
                    "media_type": "IMAGE",
                    "like_count": 50
                }
            ]
        }"#;

        let json = graph_to_report(payload.to_string(), &AnalysisConfig::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["record_count"], 2);
        assert_eq!(value["reels"][0]["title"], "Primer reel");
        assert_eq!(value["reels"][0]["engagement_rate"], 5.75);
        assert_eq!(value["portfolio"]["most_popular_id"], "2");
    }

    #[test]
    fn test_records_to_report() {
        let records = serde_json::to_string(&sample_reels()).unwrap();
        let json = records_to_report(records, &AnalysisConfig::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["record_count"], 6);
        assert_eq!(value["portfolio"]["average_engagement_rate"], 9.07);
    }

    #[test]
    fn test_sample_report_json() {
        let json = sample_report(&AnalysisConfig::default()).unwrap();
        let report: AnalysisReport = serde_json::from_str(&json).unwrap();

        assert_eq!(report.producer.name, crate::PRODUCER_NAME);
        assert_eq!(report.reels.len(), 6);
        assert_eq!(report.reels[0].engagement_rate, Some(9.67));
    }

    #[test]
    fn test_graph_error_payload() {
        let payload = r#"{"error": {"message": "Invalid OAuth access token", "code": 190}}"#;
        assert!(matches!(
            graph_to_report(payload.to_string(), &AnalysisConfig::default()),
            Err(ComputeError::ParseError(_))
        ));
    }
}
