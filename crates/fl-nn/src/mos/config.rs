use serde::{Deserialize, Serialize};

use crate::error::{NnError, Result};

fn default_mixture_count() -> usize {
    1
}

fn default_true() -> bool {
    true
}

/// Hyperparameters of a `MixtureOfSoftmax` layer.
///
/// Only the two sizes are required when deserializing; everything else
/// falls back to the layer's defaults:
///
/// ```json
/// { "input_size": 256, "output_size": 10000, "mixture_count": 4 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MosConfig {
    /// Size of the last dimension of an input.
    pub input_size: usize,
    /// Size of the last dimension of an output.
    pub output_size: usize,
    /// Number of mixture components (k).
    #[serde(default = "default_mixture_count")]
    pub mixture_count: usize,
    /// Whether a final softmax / log-softmax is applied to the mixture.
    #[serde(default = "default_true")]
    pub use_activation: bool,
    /// Selects log-softmax over softmax when `use_activation` is set.
    #[serde(default = "default_true")]
    pub take_log: bool,
    /// Seed for parameter initialization.
    #[serde(default)]
    pub seed: u64,
}

impl MosConfig {
    pub fn new(input_size: usize, output_size: usize) -> Self {
        MosConfig {
            input_size,
            output_size,
            mixture_count: default_mixture_count(),
            use_activation: true,
            take_log: true,
            seed: 0,
        }
    }

    pub fn with_mixture_count(mut self, k: usize) -> Self {
        self.mixture_count = k;
        self
    }

    pub fn with_activation(mut self, use_activation: bool) -> Self {
        self.use_activation = use_activation;
        self
    }

    pub fn with_log_output(mut self, take_log: bool) -> Self {
        self.take_log = take_log;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Parse and validate a configuration from JSON.
    pub fn from_json(json: &str) -> Result<MosConfig> {
        let config: MosConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every size is positive.
    pub fn validate(&self) -> Result<()> {
        if self.input_size == 0 {
            return Err(NnError::InvalidConfig("input_size must be > 0".to_string()));
        }
        if self.output_size == 0 {
            return Err(NnError::InvalidConfig("output_size must be > 0".to_string()));
        }
        if self.mixture_count == 0 {
            return Err(NnError::InvalidConfig(
                "mixture_count must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = MosConfig::new(8, 5);
        assert_eq!(c.mixture_count, 1);
        assert!(c.use_activation);
        assert!(c.take_log);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let c = MosConfig::from_json(r#"{"input_size": 4, "output_size": 3, "mixture_count": 2}"#)
            .unwrap();
        assert_eq!(c, MosConfig::new(4, 3).with_mixture_count(2));
    }

    #[test]
    fn test_from_json_rejects_invalid_sizes() {
        let err = MosConfig::from_json(r#"{"input_size": 4, "output_size": 3, "mixture_count": 0}"#)
            .unwrap_err();
        assert!(matches!(err, NnError::InvalidConfig(_)));

        let err = MosConfig::from_json(r#"{"input_size": 0, "output_size": 3}"#).unwrap_err();
        assert!(matches!(err, NnError::InvalidConfig(_)));
    }

    #[test]
    fn test_from_json_missing_size() {
        let err = MosConfig::from_json(r#"{"input_size": 4}"#).unwrap_err();
        assert!(matches!(err, NnError::Json(_)));
    }

    #[test]
    fn test_serialize_roundtrip() {
        let c = MosConfig::new(2, 7)
            .with_mixture_count(3)
            .with_log_output(false)
            .with_seed(42);
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(MosConfig::from_json(&json).unwrap(), c);
    }
}
