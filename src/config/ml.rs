use super::traits::{ensure_positive, ConfigSection};
use crate::error::OracleError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MlConfig {
    pub min_draws: usize,
    pub max_training_steps: usize,
    pub oversampling: Oversampling,
    pub smote_neighbors: usize,
    /// Highest-probability numbers taken unconditionally.
    pub anchor_count: usize,
    /// Last rank (1-based) considered for the diversity picks.
    pub diversity_rank_end: usize,
    pub cache_capacity: usize,
    pub features: FeatureConfig,
    pub forest: ForestConfig,
    pub boosting: BoostingConfig,
}

/// Class-imbalance correction applied before training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Oversampling {
    Smote,
    Random,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureConfig {
    pub lookback: usize,
    pub trend_window: usize,
    pub delta_window: usize,
    pub max_delta: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestConfig {
    pub n_trees: usize,
    pub max_depth: u16,
    pub min_samples_split: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoostingConfig {
    pub rounds: usize,
    pub max_depth: usize,
    pub learning_rate: f64,
    pub bins: usize,
    pub min_samples_leaf: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            lookback: 50,
            trend_window: 10,
            delta_window: 10,
            max_delta: 30,
        }
    }
}

impl Default for MlConfig {
    fn default() -> Self {
        Self {
            min_draws: 60,
            max_training_steps: 120,
            oversampling: Oversampling::Smote,
            smote_neighbors: 5,
            features: FeatureConfig::default(),
            forest: ForestConfig {
                n_trees: 100,
                max_depth: 5,
                min_samples_split: 2,
            },
            boosting: BoostingConfig {
                rounds: 50,
                max_depth: 3,
                learning_rate: 0.1,
                bins: 32,
                min_samples_leaf: 20,
            },
            anchor_count: 3,
            diversity_rank_end: 15,
            cache_capacity: 16,
        }
    }
}

impl ConfigSection for MlConfig {
    fn section_name() -> &'static str {
        "ml"
    }

    fn validate(&self) -> Result<(), OracleError> {
        if self.features.lookback == 0 {
            return Err(OracleError::Configuration(
                "ml.features.lookback must be at least 1".to_string(),
            ));
        }
        if self.min_draws <= self.features.lookback {
            return Err(OracleError::Configuration(format!(
                "ml.min_draws ({}) must exceed the feature lookback ({})",
                self.min_draws, self.features.lookback
            )));
        }
        if self.max_training_steps == 0 {
            return Err(OracleError::Configuration(
                "ml.max_training_steps must be at least 1".to_string(),
            ));
        }
        if self.forest.n_trees == 0 || self.boosting.rounds == 0 {
            return Err(OracleError::Configuration(
                "ml learners need at least one tree".to_string(),
            ));
        }
        if self.boosting.bins < 2 || self.boosting.bins > 255 {
            return Err(OracleError::Configuration(
                "ml.boosting.bins must be between 2 and 255".to_string(),
            ));
        }
        ensure_positive("ml.boosting", "learning_rate", self.boosting.learning_rate)?;
        if self.anchor_count == 0 || self.anchor_count > 5 {
            return Err(OracleError::Configuration(
                "ml.anchor_count must be between 1 and 5".to_string(),
            ));
        }
        if self.diversity_rank_end < 5 || self.diversity_rank_end > 90 {
            return Err(OracleError::Configuration(
                "ml.diversity_rank_end must be between 5 and 90".to_string(),
            ));
        }
        if self.smote_neighbors == 0 {
            return Err(OracleError::Configuration(
                "ml.smote_neighbors must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(MlConfig::default().validate().is_ok());
    }

    #[test]
    fn test_min_draws_must_exceed_lookback() {
        let mut config = MlConfig::default();
        config.min_draws = 50;
        assert!(config.validate().is_err());
    }
}
