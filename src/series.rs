//! Metric series projection
//!
//! Turns a slice of records into the plain `f64` series the statistical
//! components consume, resolving missing metrics through a `MissingMetricPolicy`.

use crate::error::ComputeError;
use crate::types::{Metric, MetricRecord, MissingMetricPolicy};

/// Project one metric across all records
pub fn project(
    records: &[MetricRecord],
    metric: Metric,
    policy: MissingMetricPolicy,
) -> Result<Vec<f64>, ComputeError> {
    let mut series = Vec::with_capacity(records.len());

    for record in records {
        match resolve(record, metric, policy)? {
            Some(value) => series.push(value),
            None => continue,
        }
    }

    Ok(series)
}

/// Project two metrics side by side.
///
/// Under `Skip` a record missing either metric is dropped from both series,
/// so the returned series always have equal length.
pub fn project_pair(
    records: &[MetricRecord],
    x_metric: Metric,
    y_metric: Metric,
    policy: MissingMetricPolicy,
) -> Result<(Vec<f64>, Vec<f64>), ComputeError> {
    let mut xs = Vec::with_capacity(records.len());
    let mut ys = Vec::with_capacity(records.len());

    for record in records {
        let x = resolve(record, x_metric, policy)?;
        let y = resolve(record, y_metric, policy)?;
        if let (Some(x), Some(y)) = (x, y) {
            xs.push(x);
            ys.push(y);
        }
    }

    Ok((xs, ys))
}

fn resolve(
    record: &MetricRecord,
    metric: Metric,
    policy: MissingMetricPolicy,
) -> Result<Option<f64>, ComputeError> {
    match (record.value(metric), policy) {
        (Some(value), _) => Ok(Some(value as f64)),
        (None, MissingMetricPolicy::Zero) => Ok(Some(0.0)),
        (None, MissingMetricPolicy::Skip) => Ok(None),
        (None, MissingMetricPolicy::Reject) => Err(ComputeError::MissingField(format!(
            "{} of reel {}",
            metric, record.id
        ))),
    }
}
