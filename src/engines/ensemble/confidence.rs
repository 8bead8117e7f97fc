use crate::config::ConfidenceWeights;
use crate::engines::evaluation::{
    AntiPatternFilter, GapAnalyzer, GapReport, PositionAnalyzer, PositionReport, ZoneAnalyzer,
};
use crate::functions::ranking::frequency_counts;
use crate::types::{NumberSet, PredictionSet, PICK_SIZE};
use serde::Serialize;

const FREQUENCY_WINDOW: usize = 50;
const PER_NUMBER_CAP: f64 = 0.2;
/// Agreement when there is no other strategy to compare with.
const SOLO_AGREEMENT: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
    Invalid,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConfidenceFactors {
    pub zone_diversity: f64,
    pub gap_pattern: f64,
    pub pattern_validity: f64,
    pub position_alignment: f64,
    pub strategy_agreement: f64,
    pub historical_frequency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfidenceReport {
    pub score: f64,
    pub level: ConfidenceLevel,
    pub factors: ConfidenceFactors,
}

impl ConfidenceReport {
    pub fn invalid() -> Self {
        Self {
            score: 0.0,
            level: ConfidenceLevel::Invalid,
            factors: ConfidenceFactors::default(),
        }
    }
}

/// Reporting-only quality score for a strategy's primary set.
pub struct ConfidenceScorer {
    weights: ConfidenceWeights,
    gaps: GapReport,
    positions: PositionReport,
    recent_counts: [u32; 91],
}

impl ConfidenceScorer {
    pub fn new(weights: ConfidenceWeights, draws: &[NumberSet]) -> Self {
        let start = draws.len().saturating_sub(FREQUENCY_WINDOW);
        Self {
            weights,
            gaps: GapAnalyzer::analyze(draws),
            positions: PositionAnalyzer::analyze(draws),
            recent_counts: frequency_counts(&draws[start..]),
        }
    }

    /// `numbers` are the raw strategy output; anything that is not a valid
    /// five-number set scores as invalid.
    pub fn score(&self, numbers: &[u8], others: &[&PredictionSet]) -> ConfidenceReport {
        let Ok(set) = PredictionSet::new(numbers) else {
            return ConfidenceReport::invalid();
        };

        let factors = ConfidenceFactors {
            zone_diversity: ZoneAnalyzer::diversity(&set),
            gap_pattern: GapAnalyzer::validate(&set, &self.gaps),
            pattern_validity: AntiPatternFilter::check(&set).score,
            position_alignment: PositionAnalyzer::validate(&set, &self.positions),
            strategy_agreement: agreement(&set, others),
            historical_frequency: self.historical_frequency(&set),
        };

        let w = &self.weights;
        let score = (factors.zone_diversity * w.zone_diversity
            + factors.gap_pattern * w.gap_pattern
            + factors.pattern_validity * w.pattern_validity
            + factors.position_alignment * w.position_alignment
            + factors.strategy_agreement * w.strategy_agreement
            + factors.historical_frequency * w.historical_frequency)
            .clamp(0.0, 1.0);

        let level = if score >= w.high_threshold {
            ConfidenceLevel::High
        } else if score >= w.medium_threshold {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        };

        ConfidenceReport {
            score,
            level,
            factors,
        }
    }

    fn historical_frequency(&self, set: &PredictionSet) -> f64 {
        set.numbers()
            .iter()
            .map(|&n| (self.recent_counts[n as usize] as f64 / 10.0).min(PER_NUMBER_CAP))
            .sum::<f64>()
            .min(1.0)
    }
}

/// Mean share of numbers shared with each other strategy's primary set.
fn agreement(set: &PredictionSet, others: &[&PredictionSet]) -> f64 {
    if others.is_empty() {
        return SOLO_AGREEMENT;
    }
    let own = set.as_set();
    let total: usize = others.iter().map(|o| own.overlap(&o.as_set())).sum();
    total as f64 / (others.len() * PICK_SIZE) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnsembleConfig;

    fn scorer() -> ConfidenceScorer {
        let draws: Vec<NumberSet> = (0..60u8)
            .map(|i| {
                let base = i % 9;
                NumberSet::from_slice(&[base + 1, base + 14, base + 33, base + 52, base + 71])
            })
            .collect();
        ConfidenceScorer::new(EnsembleConfig::default().confidence, &draws)
    }

    #[test]
    fn test_malformed_output_is_invalid() {
        let report = scorer().score(&[1, 2, 3, 4], &[]);
        assert_eq!(report.level, ConfidenceLevel::Invalid);
        assert_eq!(report.score, 0.0);
        assert_eq!(scorer().score(&[1, 1, 2, 3, 4], &[]).level, ConfidenceLevel::Invalid);
    }

    #[test]
    fn test_agreement_raises_score() {
        let scorer = scorer();
        let same = PredictionSet::new(&[1, 14, 33, 52, 71]).unwrap();
        let other = PredictionSet::new(&[2, 15, 34, 53, 72]).unwrap();

        let agreed = scorer.score(same.numbers(), &[&same]);
        let disagreed = scorer.score(same.numbers(), &[&other]);
        assert_eq!(agreed.factors.strategy_agreement, 1.0);
        assert_eq!(disagreed.factors.strategy_agreement, 0.0);
        assert!(agreed.score > disagreed.score);
        assert_eq!(agreed.factors.zone_diversity, 1.0);
        assert!(agreed.factors.historical_frequency > 0.0);
    }

    #[test]
    fn test_structural_junk_scores_low() {
        let report = scorer().score(&[2, 4, 6, 8, 10], &[]);
        assert_eq!(report.level, ConfidenceLevel::Low);
        assert!(report.factors.pattern_validity < 1.0);
    }
}
