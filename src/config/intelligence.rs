use super::traits::{ensure_positive, ConfigSection};
use crate::error::OracleError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntelligenceConfig {
    pub min_machine_draws: usize,
    /// Weights for lags 1, 2 and 3; strictly decreasing.
    pub lag_weights: [f64; 3],
    pub decay_lambda: f64,
    pub burst_window: usize,
    pub min_joint_count: usize,
    pub min_family_gravity: f64,
    pub family_max_iterations: usize,
    pub recency_boost: f64,
    pub weights: ScoreWeights,
    pub multipliers: StateMultipliers,
    pub thresholds: StateThresholds,
    pub tickets: TicketBonuses,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub temporal: f64,
    pub lag: f64,
    pub burst: f64,
    pub pair: f64,
    pub family: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateMultipliers {
    pub active: f64,
    pub warming: f64,
    pub breakout: f64,
    pub overheated: f64,
    pub dormant: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateThresholds {
    pub recent_window: usize,
    pub overheated_wins: usize,
    pub active_machine_hits: usize,
    pub active_lag: f64,
    pub breakout_gap: usize,
    pub breakout_lag: f64,
    pub warming_lag: f64,
    pub warming_temporal: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketBonuses {
    pub strong_pair_gravity: f64,
    pub pair_synergy_factor: f64,
    pub synergy_amplifier: f64,
    pub amplify_after_pairs: usize,
    pub family_member_bonus: f64,
    pub family_min_members: usize,
    pub recent_match_window: usize,
    pub recent_match_min: usize,
    pub recent_match_bonus: f64,
    pub sum_range_bonus: f64,
    pub overheated_penalty: f64,
    pub max_overheated: usize,
    pub active_penalty: f64,
    pub max_active: usize,
    /// Top-N numbers by temporal memory that count as anchors.
    pub anchor_pool: usize,
    pub anchor_bonus: f64,
    /// Subtracted when a ticket holds no anchor.
    pub missing_anchor_penalty: f64,
}

impl Default for IntelligenceConfig {
    fn default() -> Self {
        Self {
            min_machine_draws: 50,
            lag_weights: [1.0, 0.7, 0.4],
            decay_lambda: 0.15,
            burst_window: 10,
            min_joint_count: 2,
            min_family_gravity: 1.2,
            family_max_iterations: 100,
            weights: ScoreWeights {
                temporal: 0.30,
                lag: 0.25,
                burst: 0.20,
                pair: 0.15,
                family: 0.10,
            },
            recency_boost: 0.05,
            multipliers: StateMultipliers {
                active: 1.25,
                warming: 1.15,
                breakout: 1.20,
                overheated: 0.75,
                dormant: 0.65,
            },
            thresholds: StateThresholds {
                recent_window: 10,
                overheated_wins: 3,
                active_machine_hits: 2,
                active_lag: 0.3,
                breakout_gap: 20,
                breakout_lag: 0.15,
                warming_lag: 0.2,
                warming_temporal: 0.3,
            },
            tickets: TicketBonuses {
                strong_pair_gravity: 1.5,
                pair_synergy_factor: 0.5,
                synergy_amplifier: 1.5,
                amplify_after_pairs: 3,
                family_member_bonus: 0.3,
                family_min_members: 3,
                recent_match_window: 20,
                recent_match_min: 3,
                recent_match_bonus: 0.5,
                sum_range_bonus: 0.3,
                overheated_penalty: 0.5,
                max_overheated: 1,
                active_penalty: 0.3,
                max_active: 3,
                anchor_pool: 10,
                anchor_bonus: 0.2,
                missing_anchor_penalty: 0.3,
            },
        }
    }
}

impl ConfigSection for IntelligenceConfig {
    fn section_name() -> &'static str {
        "intelligence"
    }

    fn validate(&self) -> Result<(), OracleError> {
        let [w1, w2, w3] = self.lag_weights;
        if !(w1 > w2 && w2 > w3 && w3 > 0.0) {
            return Err(OracleError::Configuration(format!(
                "intelligence.lag_weights must be strictly decreasing and positive, got {:?}",
                self.lag_weights
            )));
        }
        ensure_positive("intelligence", "decay_lambda", self.decay_lambda)?;
        if self.burst_window == 0 || self.thresholds.recent_window == 0 {
            return Err(OracleError::Configuration(
                "intelligence windows must be at least 1".to_string(),
            ));
        }
        if self.min_joint_count == 0 {
            return Err(OracleError::Configuration(
                "intelligence.min_joint_count must be at least 1".to_string(),
            ));
        }
        ensure_positive("intelligence", "min_family_gravity", self.min_family_gravity)?;
        if self.tickets.anchor_bonus < 0.0 || self.tickets.missing_anchor_penalty < 0.0 {
            return Err(OracleError::Configuration(
                "intelligence.tickets anchor terms cannot be negative".to_string(),
            ));
        }

        let w = &self.weights;
        for (name, value) in [
            ("temporal", w.temporal),
            ("lag", w.lag),
            ("burst", w.burst),
            ("pair", w.pair),
            ("family", w.family),
        ] {
            if value < 0.0 || !value.is_finite() {
                return Err(OracleError::Configuration(format!(
                    "intelligence.weights.{} cannot be negative",
                    name
                )));
            }
        }

        let m = &self.multipliers;
        for (name, value) in [
            ("active", m.active),
            ("warming", m.warming),
            ("breakout", m.breakout),
            ("overheated", m.overheated),
            ("dormant", m.dormant),
        ] {
            ensure_positive("intelligence.multipliers", name, value)?;
        }
        Ok(())
    }
}
