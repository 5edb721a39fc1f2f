//! Analysis configuration
//!
//! Every field has a default so a partial JSON file is enough to override
//! one setting.

use crate::error::ComputeError;
use crate::types::{Metric, MissingMetricPolicy};
use serde::{Deserialize, Serialize};

/// Default number of caption characters kept in a derived title
pub const DEFAULT_TITLE_MAX_CHARS: usize = 30;

/// Settings for ingestion and the report panels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Metrics of the correlation matrix, in row order
    pub metrics: Vec<Metric>,
    /// Independent variable of the regression panel
    pub regression_x: Metric,
    /// Dependent variable of the regression panel
    pub regression_y: Metric,
    pub missing_metric_policy: MissingMetricPolicy,
    /// Estimate missing views as ten times the like count
    pub estimate_views_from_likes: bool,
    pub title_max_chars: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            metrics: Metric::CORE.to_vec(),
            regression_x: Metric::Shares,
            regression_y: Metric::Follows,
            missing_metric_policy: MissingMetricPolicy::Zero,
            estimate_views_from_likes: false,
            title_max_chars: DEFAULT_TITLE_MAX_CHARS,
        }
    }
}

impl AnalysisConfig {
    /// Load and validate a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        let config: AnalysisConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn validate(&self) -> Result<(), ComputeError> {
        if self.metrics.len() < 2 {
            return Err(ComputeError::InvalidConfig(
                "at least two metrics are needed for a correlation matrix".to_string(),
            ));
        }
        if self.regression_x == self.regression_y {
            return Err(ComputeError::InvalidConfig(format!(
                "regression needs two different metrics, got {} twice",
                self.regression_x
            )));
        }
        if self.title_max_chars == 0 {
            return Err(ComputeError::InvalidConfig(
                "title_max_chars must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = AnalysisConfig::from_json(r#"{"missing_metric_policy": "skip"}"#).unwrap();

        assert_eq!(config.missing_metric_policy, MissingMetricPolicy::Skip);
        assert_eq!(config.metrics, Metric::CORE.to_vec());
        assert_eq!(config.regression_x, Metric::Shares);
        assert_eq!(config.title_max_chars, 30);
    }

    #[test]
    fn test_serialization() {
        let config = AnalysisConfig {
            regression_x: Metric::Views,
            regression_y: Metric::Likes,
            ..Default::default()
        };

        let json = config.to_json().unwrap();
        assert_eq!(AnalysisConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_rejects_single_metric() {
        let result = AnalysisConfig::from_json(r#"{"metrics": ["views"]}"#);
        assert!(matches!(result, Err(ComputeError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_same_regression_metrics() {
        let result =
            AnalysisConfig::from_json(r#"{"regression_x": "likes", "regression_y": "likes"}"#);
        assert!(matches!(result, Err(ComputeError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_unknown_metric() {
        let result = AnalysisConfig::from_json(r#"{"metrics": ["views", "retweets"]}"#);
        assert!(matches!(result, Err(ComputeError::JsonError(_))));
    }
}
