//! Genetic search over 5-subsets of 1..=90.

pub mod evolution_engine;
pub mod fitness;
pub mod genome;
pub mod hall_of_fame;
pub mod operators;
pub mod progress;

pub use evolution_engine::EvolutionEngine;
pub use fitness::{FitnessModel, NumberWeights};
pub use genome::Genome;
pub use hall_of_fame::{Elite, HallOfFame};
pub use progress::{LogProgressCallback, ProgressCallback};

use crate::config::GeneticConfig;
use crate::engines::analysis::PatternSummary;
use crate::engines::strategy::{Strategy, StrategyContext};
use crate::error::{OracleError, Result};
use crate::types::{PredictionSet, StrategyKind};

pub struct GeneticOptimizer {
    config: GeneticConfig,
}

impl GeneticOptimizer {
    pub fn new(config: GeneticConfig) -> Self {
        Self { config }
    }
}

impl Strategy for GeneticOptimizer {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Genetic
    }

    fn data_requirement(&self, ctx: &StrategyContext) -> (usize, usize) {
        (self.config.min_draws, ctx.window.len())
    }

    fn predict(&self, ctx: &StrategyContext) -> Result<Vec<PredictionSet>> {
        self.check_minimum(ctx)?;

        let draws = ctx.window.winning();
        let summary = PatternSummary::from_window(draws);
        let weights = NumberWeights::from_history(draws, &summary, &self.config);
        let fitness = FitnessModel::new(weights, summary.sum_range, &self.config);

        let rng = ctx.seed.rng_for(StrategyKind::Genetic.name());
        let mut engine = EvolutionEngine::new(self.config.clone(), fitness, rng);
        let elites = engine.run(ctx.deadline, LogProgressCallback)?;

        let sets = elites
            .iter()
            .take(ctx.count.max(1))
            .map(|e| PredictionSet::new(&e.genome))
            .collect::<Result<Vec<_>>>()?;
        if sets.is_empty() {
            return Err(OracleError::InternalFailure(
                "genetic search produced no individuals".to_string(),
            ));
        }
        log::debug!(
            "Genetic best {} (fitness {:.4}, sum range {:?})",
            sets[0],
            elites[0].fitness,
            summary.sum_range
        );
        Ok(sets)
    }
}
