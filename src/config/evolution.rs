use super::traits::{ensure_positive, ensure_unit_interval, ConfigSection};
use crate::error::OracleError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneticConfig {
    pub min_draws: usize,
    pub population_size: usize,
    pub generations: usize,
    pub tournament_size: usize,
    pub crossover_rate: f64,
    pub initial_mutation_rate: f64,
    pub final_mutation_rate: f64,
    pub elitism_rate: f64,
    pub hall_of_fame_size: usize,
    pub local_radius: u8,
    pub nearby_offset: u8,

    // Per-number weighting
    pub base_weight: f64,
    pub hot_weight: f64,
    pub cold_weight: f64,
    pub due_weight: f64,
    pub frequency_weight: f64,
    pub recency_decay: f64,
    pub frequency_window: usize,

    // Fitness shaping
    pub sum_in_range_multiplier: f64,
    pub sum_out_of_range_multiplier: f64,
    pub balance_multiplier: f64,
    pub adjacent_penalty: f64,
    pub run_penalty: f64,
}

impl Default for GeneticConfig {
    fn default() -> Self {
        Self {
            min_draws: 60,
            population_size: 100,
            generations: 50,
            tournament_size: 3,
            crossover_rate: 0.9,
            initial_mutation_rate: 0.40,
            final_mutation_rate: 0.10,
            elitism_rate: 0.10,
            hall_of_fame_size: 10,
            local_radius: 5,
            nearby_offset: 3,
            base_weight: 0.01,
            hot_weight: 0.4,
            cold_weight: 0.3,
            due_weight: 0.2,
            frequency_weight: 0.1,
            recency_decay: 0.1,
            frequency_window: 30,
            sum_in_range_multiplier: 1.2,
            sum_out_of_range_multiplier: 0.8,
            balance_multiplier: 1.1,
            adjacent_penalty: 0.1,
            run_penalty: 1.0,
        }
    }
}

impl ConfigSection for GeneticConfig {
    fn section_name() -> &'static str {
        "genetic"
    }

    fn validate(&self) -> Result<(), OracleError> {
        if self.population_size < 10 {
            return Err(OracleError::Configuration(
                "Population size must be at least 10".to_string(),
            ));
        }
        if self.generations == 0 {
            return Err(OracleError::Configuration(
                "At least one generation is required".to_string(),
            ));
        }
        if self.tournament_size == 0 {
            return Err(OracleError::Configuration(
                "Tournament size must be at least 1".to_string(),
            ));
        }
        ensure_unit_interval("genetic", "crossover_rate", self.crossover_rate)?;
        ensure_unit_interval("genetic", "initial_mutation_rate", self.initial_mutation_rate)?;
        ensure_unit_interval("genetic", "final_mutation_rate", self.final_mutation_rate)?;
        ensure_unit_interval("genetic", "elitism_rate", self.elitism_rate)?;
        if self.local_radius == 0 || self.nearby_offset == 0 {
            return Err(OracleError::Configuration(
                "Mutation offsets must be at least 1".to_string(),
            ));
        }
        ensure_positive("genetic", "base_weight", self.base_weight)?;
        ensure_positive("genetic", "sum_in_range_multiplier", self.sum_in_range_multiplier)?;
        ensure_positive("genetic", "sum_out_of_range_multiplier", self.sum_out_of_range_multiplier)?;
        ensure_positive("genetic", "balance_multiplier", self.balance_multiplier)?;
        if self.frequency_window == 0 {
            return Err(OracleError::Configuration(
                "genetic.frequency_window must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_out_of_range_rates() {
        let mut config = GeneticConfig::default();
        config.crossover_rate = 1.5;
        assert!(config.validate().is_err());

        let mut config = GeneticConfig::default();
        config.population_size = 4;
        assert!(config.validate().is_err());
    }
}
