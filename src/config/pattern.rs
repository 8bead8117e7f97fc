use super::traits::{ensure_positive, ConfigSection};
use crate::error::OracleError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternConfig {
    pub min_draws: usize,
    pub recent_window: usize,
    pub recent_winner_bonus: f64,
    pub hot_weight: f64,
    pub cooccurrence_weight: f64,
    pub due_weight: f64,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            min_draws: 60,
            recent_window: 10,
            recent_winner_bonus: 10.0,
            hot_weight: 4.0,
            cooccurrence_weight: 0.5,
            due_weight: 2.0,
        }
    }
}

impl ConfigSection for PatternConfig {
    fn section_name() -> &'static str {
        "pattern"
    }

    fn validate(&self) -> Result<(), OracleError> {
        if self.recent_window == 0 {
            return Err(OracleError::Configuration(
                "pattern.recent_window must be at least 1".to_string(),
            ));
        }
        ensure_positive("pattern", "recent_winner_bonus", self.recent_winner_bonus)?;
        ensure_positive("pattern", "hot_weight", self.hot_weight)?;
        if self.recent_winner_bonus <= self.hot_weight
            || self.recent_winner_bonus <= self.due_weight
        {
            return Err(OracleError::Configuration(
                "pattern.recent_winner_bonus must be the highest fixed weight".to_string(),
            ));
        }
        if self.cooccurrence_weight < 0.0 || self.due_weight < 0.0 {
            return Err(OracleError::Configuration(
                "pattern weights cannot be negative".to_string(),
            ));
        }
        Ok(())
    }
}
