use super::traits::{ensure_positive, ensure_unit_interval, ConfigSection};
use crate::error::OracleError;
use crate::types::StrategyKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnsembleConfig {
    pub weights: StrategyWeights,
    pub regime: RegimeConfig,
    pub confidence: ConfidenceWeights,
}

/// Fixed vote weight per strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyWeights {
    pub ml: f64,
    pub genetic: f64,
    pub pattern: f64,
    pub intelligence: f64,
}

impl StrategyWeights {
    pub fn weight(&self, kind: StrategyKind) -> f64 {
        match kind {
            StrategyKind::Ml => self.ml,
            StrategyKind::Genetic => self.genetic,
            StrategyKind::Pattern => self.pattern,
            StrategyKind::Intelligence => self.intelligence,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegimeConfig {
    pub short_window: usize,
    pub long_window: usize,
    pub min_baseline: usize,
    pub alpha: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfidenceWeights {
    pub zone_diversity: f64,
    pub gap_pattern: f64,
    pub pattern_validity: f64,
    pub position_alignment: f64,
    pub strategy_agreement: f64,
    pub historical_frequency: f64,
    pub high_threshold: f64,
    pub medium_threshold: f64,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            weights: StrategyWeights {
                ml: 1.0,
                genetic: 1.2,
                pattern: 1.1,
                intelligence: 1.3,
            },
            regime: RegimeConfig {
                short_window: 10,
                long_window: 90,
                min_baseline: 30,
                alpha: 0.01,
            },
            confidence: ConfidenceWeights {
                zone_diversity: 0.15,
                gap_pattern: 0.15,
                pattern_validity: 0.20,
                position_alignment: 0.15,
                strategy_agreement: 0.25,
                historical_frequency: 0.10,
                high_threshold: 0.75,
                medium_threshold: 0.55,
            },
        }
    }
}

impl ConfigSection for EnsembleConfig {
    fn section_name() -> &'static str {
        "ensemble"
    }

    fn validate(&self) -> Result<(), OracleError> {
        for kind in StrategyKind::ALL {
            ensure_positive("ensemble.weights", kind.name(), self.weights.weight(kind))?;
        }
        if self.regime.short_window == 0 || self.regime.long_window == 0 {
            return Err(OracleError::Configuration(
                "ensemble.regime windows must be at least 1".to_string(),
            ));
        }
        if self.regime.min_baseline < 2 {
            return Err(OracleError::Configuration(
                "ensemble.regime.min_baseline must be at least 2".to_string(),
            ));
        }
        ensure_unit_interval("ensemble.regime", "alpha", self.regime.alpha)?;

        let c = &self.confidence;
        let total = c.zone_diversity
            + c.gap_pattern
            + c.pattern_validity
            + c.position_alignment
            + c.strategy_agreement
            + c.historical_frequency;
        if (total - 1.0).abs() > 1e-6 {
            return Err(OracleError::Configuration(format!(
                "ensemble.confidence factor weights must sum to 1, got {:.4}",
                total
            )));
        }
        ensure_unit_interval("ensemble.confidence", "high_threshold", c.high_threshold)?;
        ensure_unit_interval("ensemble.confidence", "medium_threshold", c.medium_threshold)?;
        if c.medium_threshold > c.high_threshold {
            return Err(OracleError::Configuration(
                "ensemble.confidence.medium_threshold cannot exceed high_threshold".to_string(),
            ));
        }
        Ok(())
    }
}
