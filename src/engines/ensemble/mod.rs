//! Reconciles the strategies' primary sets through a weighted vote, and
//! attaches the informational regime and confidence reports.

pub mod confidence;
pub mod regime;
pub mod vote;

pub use confidence::{ConfidenceFactors, ConfidenceLevel, ConfidenceReport, ConfidenceScorer};
pub use regime::{RegimeDetails, RegimeDetector, RegimeReport};
pub use vote::{VoteEntry, VoteTally};

use crate::config::EnsembleConfig;
use crate::data::DrawWindow;
use crate::error::{OracleError, Result};
use crate::types::{PredictionSet, StrategyKind, PICK_SIZE};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Consensus {
    pub set: PredictionSet,
    /// Top two of the tally, ascending.
    pub two: Vec<u8>,
    /// Top three of the tally, ascending.
    pub three: Vec<u8>,
    pub tally: Vec<VoteEntry>,
}

pub struct EnsembleCombiner {
    config: EnsembleConfig,
}

impl EnsembleCombiner {
    pub fn new(config: EnsembleConfig) -> Self {
        Self { config }
    }

    pub fn tally(&self, primaries: &BTreeMap<StrategyKind, PredictionSet>, window: &DrawWindow) -> VoteTally {
        let mut tally = VoteTally::new(window.frequencies());
        for (kind, set) in primaries {
            tally.cast(set, self.config.weights.weight(*kind));
        }
        tally
    }

    pub fn combine(
        &self,
        primaries: &BTreeMap<StrategyKind, PredictionSet>,
        window: &DrawWindow,
    ) -> Result<Consensus> {
        if primaries.is_empty() {
            return Err(OracleError::InternalFailure(
                "no strategy produced a prediction to combine".to_string(),
            ));
        }
        let tally = self.tally(primaries, window);
        let set = PredictionSet::new(&tally.top(PICK_SIZE))?;
        log::debug!("consensus {} from {} ballots", set, tally.ballots());

        Ok(Consensus {
            set,
            two: tally.top(2),
            three: tally.top(3),
            tally: tally.entries(),
        })
    }

    pub fn regime(&self, window: &DrawWindow) -> RegimeReport {
        RegimeDetector::new(self.config.regime.clone()).detect(window.winning())
    }

    /// One report per strategy, scoring its primary set against the others.
    pub fn confidence(
        &self,
        primaries: &BTreeMap<StrategyKind, PredictionSet>,
        window: &DrawWindow,
    ) -> BTreeMap<StrategyKind, ConfidenceReport> {
        let scorer = ConfidenceScorer::new(self.config.confidence.clone(), window.winning());
        primaries
            .iter()
            .map(|(kind, set)| {
                let others: Vec<&PredictionSet> = primaries
                    .iter()
                    .filter(|(other, _)| *other != kind)
                    .map(|(_, s)| s)
                    .collect();
                (*kind, scorer.score(set.numbers(), &others))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NumberSet;

    fn primaries() -> BTreeMap<StrategyKind, PredictionSet> {
        let mut map = BTreeMap::new();
        map.insert(StrategyKind::Ml, PredictionSet::new(&[1, 2, 3, 4, 5]).unwrap());
        map.insert(StrategyKind::Genetic, PredictionSet::new(&[1, 2, 3, 6, 7]).unwrap());
        map.insert(StrategyKind::Pattern, PredictionSet::new(&[1, 2, 8, 9, 10]).unwrap());
        map.insert(StrategyKind::Intelligence, PredictionSet::new(&[1, 11, 12, 13, 14]).unwrap());
        map
    }

    #[test]
    fn test_consensus_follows_weighted_vote() {
        let window = DrawWindow::from_sets(vec![NumberSet::from_slice(&[8, 20, 30, 40, 50]); 3]);
        let combiner = EnsembleCombiner::new(EnsembleConfig::default());
        let consensus = combiner.combine(&primaries(), &window).unwrap();

        // 1: 4.6, 2: 3.3, 3: 2.2, then 11..14 at 1.3
        assert_eq!(consensus.three, vec![1, 2, 3]);
        assert_eq!(consensus.two, vec![1, 2]);
        assert_eq!(consensus.set.numbers(), &[1, 2, 3, 11, 12]);
        assert_eq!(consensus.tally[0].number, 1);
        assert!((consensus.tally[0].vote - 4.6).abs() < 1e-9);
    }

    #[test]
    fn test_combine_requires_a_ballot() {
        let combiner = EnsembleCombiner::new(EnsembleConfig::default());
        let err = combiner
            .combine(&BTreeMap::new(), &DrawWindow::default())
            .unwrap_err();
        assert!(matches!(err, OracleError::InternalFailure(_)));
    }

    #[test]
    fn test_confidence_per_strategy() {
        let window = DrawWindow::from_sets(vec![NumberSet::from_slice(&[8, 20, 30, 40, 50]); 3]);
        let combiner = EnsembleCombiner::new(EnsembleConfig::default());
        let reports = combiner.confidence(&primaries(), &window);
        assert_eq!(reports.len(), 4);
        assert!(reports.values().all(|r| r.level != ConfidenceLevel::Invalid));
    }
}
