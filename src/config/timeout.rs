use super::traits::{ensure_positive, ConfigSection};
use crate::error::OracleError;
use crate::types::StrategyKind;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Request deadline: `base_ms + per_draw_ms * draws * max cost factor`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    pub enabled: bool,
    pub base_ms: u64,
    pub per_draw_ms: f64,
    pub cost: CostFactors,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostFactors {
    pub ml: f64,
    pub genetic: f64,
    pub pattern: f64,
    pub intelligence: f64,
}

impl CostFactors {
    pub fn factor(&self, kind: StrategyKind) -> f64 {
        match kind {
            StrategyKind::Ml => self.ml,
            StrategyKind::Genetic => self.genetic,
            StrategyKind::Pattern => self.pattern,
            StrategyKind::Intelligence => self.intelligence,
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_ms: 5_000,
            per_draw_ms: 30.0,
            cost: CostFactors {
                ml: 4.0,
                genetic: 2.0,
                pattern: 0.5,
                intelligence: 1.5,
            },
        }
    }
}

impl TimeoutConfig {
    /// Budget for a request over `draws` draws running `strategies`.
    /// `None` when deadlines are disabled.
    pub fn budget(&self, draws: usize, strategies: &[StrategyKind]) -> Option<Duration> {
        if !self.enabled {
            return None;
        }
        let cost = strategies
            .iter()
            .map(|&k| self.cost.factor(k))
            .fold(0.0_f64, f64::max);
        let variable = (self.per_draw_ms * draws as f64 * cost).max(0.0);
        Some(Duration::from_millis(self.base_ms.saturating_add(variable as u64)))
    }
}

impl ConfigSection for TimeoutConfig {
    fn section_name() -> &'static str {
        "timeout"
    }

    fn validate(&self) -> Result<(), OracleError> {
        if self.per_draw_ms < 0.0 || !self.per_draw_ms.is_finite() {
            return Err(OracleError::Configuration(
                "timeout.per_draw_ms cannot be negative".to_string(),
            ));
        }
        for kind in StrategyKind::ALL {
            ensure_positive("timeout.cost", kind.name(), self.cost.factor(kind))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_scales_with_slowest_strategy() {
        let config = TimeoutConfig::default();
        let pattern_only = config.budget(100, &[StrategyKind::Pattern]).unwrap();
        let with_ml = config
            .budget(100, &[StrategyKind::Pattern, StrategyKind::Ml])
            .unwrap();
        assert_eq!(pattern_only, Duration::from_millis(5_000 + 1_500));
        assert_eq!(with_ml, Duration::from_millis(5_000 + 12_000));
    }

    #[test]
    fn test_disabled_budget() {
        let mut config = TimeoutConfig::default();
        config.enabled = false;
        assert!(config.budget(100, &StrategyKind::ALL).is_none());
    }
}
