//! reel-insight - Engagement analytics for short-form video reels
//!
//! reel-insight turns per-reel counters (views, likes, comments, shares,
//! saves, follows) into an analysis report through a deterministic pipeline:
//! payload adaptation → normalization → statistics → report encoding.
//!
//! ## Modules
//!
//! - **Statistics**: engagement rate, Pearson correlation, least-squares
//!   regression, five-number summaries with Tukey fences
//! - **Ingestion**: Graph API media payloads normalized into metric records
//! - **Presentation**: per-reel chart models and the portfolio summary

pub mod adapters;
pub mod chart;
pub mod config;
pub mod correlation;
pub mod encoder;
pub mod engagement;
pub mod error;
pub mod normalizer;
pub mod pipeline;
pub mod portfolio;
pub mod quantile;
pub mod sample;
pub mod series;
pub mod types;

pub use config::AnalysisConfig;
pub use correlation::CorrelationEngine;
pub use engagement::EngagementCalculator;
pub use error::ComputeError;
pub use pipeline::{graph_to_report, records_to_report, sample_report, ReelAnalyzer};
pub use quantile::QuantileSummarizer;
pub use types::{AnalysisReport, Metric, MetricRecord};

/// Crate version embedded in every report
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "reel-insight";
