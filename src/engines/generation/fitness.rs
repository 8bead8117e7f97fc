use super::genome::{adjacent_pairs, genome_sum, has_run, Genome};
use crate::config::GeneticConfig;
use crate::engines::analysis::PatternSummary;
use crate::types::{NumberSet, HIGH_THRESHOLD, MAX_NUMBER, PICK_SIZE};

const HOT_RANKS: usize = 10;
const COLD_RANKS: usize = 5;
const COLD_MIN_SKIP: u32 = 20;
const COLD_SKIP_SCALE: f64 = 30.0;

/// Pattern-derived selection weights per number, summing to 1.
#[derive(Debug, Clone)]
pub struct NumberWeights {
    weights: Vec<f64>,
}

impl NumberWeights {
    pub fn from_history(draws: &[NumberSet], summary: &PatternSummary, config: &GeneticConfig) -> Self {
        let mut raw = vec![0.0; MAX_NUMBER as usize + 1];

        // recency-decayed frequency over the recent window, newest weighs 1
        let start = draws.len().saturating_sub(config.frequency_window);
        let mut decayed = vec![0.0; MAX_NUMBER as usize + 1];
        for (age, draw) in draws[start..].iter().rev().enumerate() {
            let w = (-config.recency_decay * age as f64).exp();
            for n in draw.iter() {
                decayed[n as usize] += w;
            }
        }
        let max_decayed = decayed.iter().cloned().fold(0.0, f64::max);

        for n in 1..=MAX_NUMBER {
            let mut score = config.base_weight;

            if let Some(rank) = summary.hot_numbers.iter().take(HOT_RANKS).position(|&h| h == n) {
                score += config.hot_weight * (HOT_RANKS - rank) as f64 / HOT_RANKS as f64;
            }

            let skip = summary.skip(n);
            if summary.cold_numbers.iter().take(COLD_RANKS).any(|&c| c == n) && skip > COLD_MIN_SKIP {
                score += config.cold_weight * skip as f64 / COLD_SKIP_SCALE;
            }

            if summary.is_due(n) {
                score += config.due_weight;
            }

            if max_decayed > 0.0 {
                score += config.frequency_weight * decayed[n as usize] / max_decayed;
            }

            raw[n as usize] = score;
        }

        let total: f64 = raw.iter().sum();
        let weights = if total > 0.0 {
            raw.iter().map(|w| w / total).collect()
        } else {
            let mut uniform = vec![1.0 / MAX_NUMBER as f64; MAX_NUMBER as usize + 1];
            uniform[0] = 0.0;
            uniform
        };
        Self { weights }
    }

    pub fn get(&self, n: u8) -> f64 {
        self.weights.get(n as usize).copied().unwrap_or(0.0)
    }

    /// Weights for numbers 1..=90 in order.
    pub fn for_numbers(&self) -> &[f64] {
        &self.weights[1..]
    }
}

/// Scores genomes against the weights and the structural constraints.
#[derive(Debug, Clone)]
pub struct FitnessModel {
    weights: NumberWeights,
    sum_range: (u32, u32),
    sum_in_range_multiplier: f64,
    sum_out_of_range_multiplier: f64,
    balance_multiplier: f64,
    adjacent_penalty: f64,
    run_penalty: f64,
}

impl FitnessModel {
    pub fn new(weights: NumberWeights, sum_range: (u32, u32), config: &GeneticConfig) -> Self {
        Self {
            weights,
            sum_range,
            sum_in_range_multiplier: config.sum_in_range_multiplier,
            sum_out_of_range_multiplier: config.sum_out_of_range_multiplier,
            balance_multiplier: config.balance_multiplier,
            adjacent_penalty: config.adjacent_penalty,
            run_penalty: config.run_penalty,
        }
    }

    pub fn weights(&self) -> &NumberWeights {
        &self.weights
    }

    pub fn evaluate(&self, genome: &Genome) -> f64 {
        let mass: f64 = genome.iter().map(|&n| self.weights.get(n)).sum();
        let scaled = mass * MAX_NUMBER as f64 / PICK_SIZE as f64;

        let mut multiplier = if self.sum_in_range(genome) {
            self.sum_in_range_multiplier
        } else {
            self.sum_out_of_range_multiplier
        };
        let evens = genome.iter().filter(|&&n| n % 2 == 0).count();
        if evens == 2 || evens == 3 {
            multiplier *= self.balance_multiplier;
        }
        let highs = genome.iter().filter(|&&n| n > HIGH_THRESHOLD).count();
        if highs == 2 || highs == 3 {
            multiplier *= self.balance_multiplier;
        }

        let mut fitness = scaled * multiplier - self.adjacent_penalty * adjacent_pairs(genome) as f64;
        if has_run(genome) {
            fitness -= self.run_penalty;
        }
        fitness
    }

    fn sum_in_range(&self, genome: &Genome) -> bool {
        let sum = genome_sum(genome);
        sum >= self.sum_range.0 && sum <= self.sum_range.1
    }

    /// Sum inside the typical range and no run of three.
    pub fn satisfies_constraints(&self, genome: &Genome) -> bool {
        self.sum_in_range(genome) && !has_run(genome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history() -> Vec<NumberSet> {
        (0..60u8)
            .map(|i| {
                let b = i % 80;
                NumberSet::from_slice(&[b + 1, b + 3, b + 5, b + 7, b + 9])
            })
            .collect()
    }

    #[test]
    fn test_weights_are_normalised() {
        let draws = history();
        let summary = PatternSummary::from_window(&draws);
        let weights = NumberWeights::from_history(&draws, &summary, &GeneticConfig::default());
        let total: f64 = weights.for_numbers().iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert_eq!(weights.for_numbers().len(), 90);
        assert!(weights.for_numbers().iter().all(|&w| w > 0.0));
    }

    #[test]
    fn test_run_and_adjacency_lower_fitness() {
        let draws = history();
        let summary = PatternSummary::from_window(&draws);
        let config = GeneticConfig::default();
        let weights = NumberWeights::from_history(&draws, &summary, &config);
        let model = FitnessModel::new(weights, (0, 1000), &config);

        // two adjacent pairs and one run of three
        let run = [11, 12, 13, 50, 71];
        let base = model.evaluate(&run);
        let mass: f64 = run.iter().map(|&n| model.weights().get(n)).sum::<f64>() * 18.0;
        let expected = mass * 1.2 * 1.1 * 1.1 - 0.2 - 1.0;
        assert!((base - expected).abs() < 1e-9, "{} vs {}", base, expected);
        assert!(!model.satisfies_constraints(&run));
        assert!(model.satisfies_constraints(&[10, 20, 30, 50, 70]));
    }
}
