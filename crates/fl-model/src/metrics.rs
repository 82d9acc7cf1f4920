use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Key under which `Model::batch_train` reports the batch loss.
pub const LOSS_KEY: &str = "loss";

/// A single value reported by a model for a batch or a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricValue {
    Scalar(f32),
    Count(u64),
    Values(Vec<f32>),
}

impl MetricValue {
    fn kind(&self) -> &'static str {
        match self {
            MetricValue::Scalar(_) => "scalar",
            MetricValue::Count(_) => "count",
            MetricValue::Values(_) => "values",
        }
    }

    /// Numeric view of the value; counts are widened to f32.
    pub fn as_scalar(&self) -> Option<f32> {
        match self {
            MetricValue::Scalar(v) => Some(*v),
            MetricValue::Count(c) => Some(*c as f32),
            MetricValue::Values(_) => None,
        }
    }

    pub fn as_count(&self) -> Option<u64> {
        match self {
            MetricValue::Count(c) => Some(*c),
            _ => None,
        }
    }
}

impl From<f32> for MetricValue {
    fn from(v: f32) -> Self {
        MetricValue::Scalar(v)
    }
}

impl From<u64> for MetricValue {
    fn from(c: u64) -> Self {
        MetricValue::Count(c)
    }
}

impl From<Vec<f32>> for MetricValue {
    fn from(v: Vec<f32>) -> Self {
        MetricValue::Values(v)
    }
}

/// Named values produced by `batch_train`, `batch_eval` and `aggregate`.
///
/// Ordered so that logging and serialization are deterministic.
pub type Metrics = BTreeMap<String, MetricValue>;

fn lookup<'a>(metrics: &'a Metrics, key: &str) -> Result<&'a MetricValue> {
    metrics
        .get(key)
        .ok_or_else(|| ModelError::MissingKey(key.to_string()))
}

/// Reads a numeric metric (scalar or count).
pub fn scalar(metrics: &Metrics, key: &str) -> Result<f32> {
    let value = lookup(metrics, key)?;
    value.as_scalar().ok_or_else(|| ModelError::TypeMismatch {
        key: key.to_string(),
        expected: "scalar".to_string(),
        got: value.kind().to_string(),
    })
}

/// Reads a count metric.
pub fn count(metrics: &Metrics, key: &str) -> Result<u64> {
    let value = lookup(metrics, key)?;
    value.as_count().ok_or_else(|| ModelError::TypeMismatch {
        key: key.to_string(),
        expected: "count".to_string(),
        got: value.kind().to_string(),
    })
}

/// Extracts the training loss from `batch_train` output.
///
/// The loss must be present under [`LOSS_KEY`] as a `Scalar`; anything else
/// is a contract violation by the model.
pub fn required_loss(metrics: &Metrics) -> Result<f32> {
    match lookup(metrics, LOSS_KEY)? {
        MetricValue::Scalar(v) => Ok(*v),
        other => Err(ModelError::TypeMismatch {
            key: LOSS_KEY.to_string(),
            expected: "scalar".to_string(),
            got: other.kind().to_string(),
        }),
    }
}

/// Renders metrics as a JSON object for logs and reports.
pub fn to_json(metrics: &Metrics) -> Result<String> {
    Ok(serde_json::to_string(metrics)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(entries: &[(&str, MetricValue)]) -> Metrics {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_required_loss_present() {
        let m = metrics(&[(LOSS_KEY, 0.25f32.into()), ("tokens", 4u64.into())]);
        assert_eq!(required_loss(&m).unwrap(), 0.25);
    }

    #[test]
    fn test_required_loss_missing() {
        let m = metrics(&[("accuracy", 0.9f32.into())]);
        assert!(matches!(
            required_loss(&m),
            Err(ModelError::MissingKey(k)) if k == LOSS_KEY
        ));
    }

    #[test]
    fn test_required_loss_wrong_type() {
        let m = metrics(&[(LOSS_KEY, vec![0.1f32, 0.2].into())]);
        assert!(matches!(
            required_loss(&m),
            Err(ModelError::TypeMismatch { .. })
        ));
        let m = metrics(&[(LOSS_KEY, 3u64.into())]);
        assert!(required_loss(&m).is_err());
    }

    #[test]
    fn test_scalar_accepts_counts() {
        let m = metrics(&[("tokens", 12u64.into())]);
        assert_eq!(scalar(&m, "tokens").unwrap(), 12.0);
        assert_eq!(count(&m, "tokens").unwrap(), 12);
    }

    #[test]
    fn test_count_rejects_scalar() {
        let m = metrics(&[("tokens", 1.5f32.into())]);
        assert!(matches!(
            count(&m, "tokens"),
            Err(ModelError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_to_json_is_ordered() {
        let m = metrics(&[("b", 2u64.into()), ("a", 0.5f32.into())]);
        assert_eq!(to_json(&m).unwrap(), r#"{"a":{"scalar":0.5},"b":{"count":2}}"#);
    }
}
