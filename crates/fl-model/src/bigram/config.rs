use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Hyperparameters of a [`super::BigramLm`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BigramLmConfig {
    /// Width of the context embedding fed to the output layer.
    pub hidden_size: usize,
    /// Number of mixture components in the output layer.
    pub mixture_count: usize,
    /// Number of (context, target) pairs per batch.
    pub batch_size: usize,
    /// Words seen fewer times than this map to `<unk>`.
    pub min_count: usize,
    /// Seed for parameter initialization and training-batch shuffling.
    pub seed: u64,
}

impl Default for BigramLmConfig {
    fn default() -> Self {
        BigramLmConfig {
            hidden_size: 16,
            mixture_count: 2,
            batch_size: 32,
            min_count: 1,
            seed: 0,
        }
    }
}

impl BigramLmConfig {
    pub fn from_json(json: &str) -> Result<BigramLmConfig> {
        let config: BigramLmConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let check = |ok: bool, msg: &str| {
            if ok {
                Ok(())
            } else {
                Err(ModelError::InvalidConfig(msg.to_string()))
            }
        };
        check(self.hidden_size > 0, "hidden_size must be > 0")?;
        check(self.mixture_count > 0, "mixture_count must be >= 1")?;
        check(self.batch_size > 0, "batch_size must be > 0")?;
        check(self.min_count > 0, "min_count must be >= 1")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(BigramLmConfig::default().validate().is_ok());
    }

    #[test]
    fn test_from_json_partial() {
        let c = BigramLmConfig::from_json(r#"{"hidden_size": 8, "seed": 3}"#).unwrap();
        assert_eq!(c.hidden_size, 8);
        assert_eq!(c.seed, 3);
        assert_eq!(c.batch_size, BigramLmConfig::default().batch_size);
    }

    #[test]
    fn test_from_json_rejects_zero_batch() {
        assert!(matches!(
            BigramLmConfig::from_json(r#"{"batch_size": 0}"#),
            Err(ModelError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_from_json_malformed() {
        assert!(matches!(
            BigramLmConfig::from_json("{"),
            Err(ModelError::Json(_))
        ));
    }
}
