use super::fitness::FitnessModel;
use super::genome::Genome;
use super::hall_of_fame::{Elite, HallOfFame};
use super::operators::{crossover, tournament_selection, weighted_genome, Mutator};
use super::progress::ProgressCallback;
use crate::config::GeneticConfig;
use crate::error::Result;
use crate::utils::Deadline;
use rand::rngs::StdRng;
use rand::Rng;

pub struct EvolutionEngine {
    config: GeneticConfig,
    fitness: FitnessModel,
    mutator: Mutator,
    hall_of_fame: HallOfFame,
    rng: StdRng,
}

impl EvolutionEngine {
    pub fn new(config: GeneticConfig, fitness: FitnessModel, rng: StdRng) -> Self {
        let hall_of_fame = HallOfFame::new(config.hall_of_fame_size);
        let mutator = Mutator {
            local_radius: config.local_radius,
            nearby_offset: config.nearby_offset,
        };
        Self {
            config,
            fitness,
            mutator,
            hall_of_fame,
            rng,
        }
    }

    /// Run the evolution and return the hall of fame in fitness order, or
    /// the single fittest genome when nothing satisfied the constraints.
    pub fn run<C: ProgressCallback>(&mut self, deadline: &Deadline, mut callback: C) -> Result<Vec<Elite>> {
        let mut population = self.initialize_population();
        let mut fittest: Option<Elite> = None;

        for generation in 0..self.config.generations {
            deadline.check()?;
            callback.on_generation_start(generation);

            let evaluated: Vec<(Genome, f64)> = population
                .iter()
                .map(|g| (*g, self.fitness.evaluate(g)))
                .collect();

            for (genome, fitness) in &evaluated {
                let candidate = Elite {
                    genome: *genome,
                    fitness: *fitness,
                };
                if fittest.as_ref().map_or(true, |best| is_better(&candidate, best)) {
                    fittest = Some(candidate.clone());
                }
                if self.fitness.satisfies_constraints(genome) {
                    self.hall_of_fame.try_add(candidate);
                }
            }

            let best_fitness = evaluated
                .iter()
                .map(|(_, f)| *f)
                .fold(f64::NEG_INFINITY, f64::max);
            callback.on_generation_complete(generation, best_fitness, self.hall_of_fame.len());

            if generation + 1 == self.config.generations {
                break;
            }
            population = self.create_next_generation(&evaluated, self.mutation_rate(generation));
        }

        if self.hall_of_fame.is_empty() {
            log::warn!("No genome satisfied the constraints, returning the fittest");
            return Ok(fittest.into_iter().collect());
        }
        Ok(self.hall_of_fame.get_all().to_vec())
    }

    /// Linear decay from the initial to the final rate across generations.
    pub fn mutation_rate(&self, generation: usize) -> f64 {
        let span = self.config.generations.saturating_sub(1).max(1) as f64;
        let t = (generation as f64 / span).min(1.0);
        self.config.initial_mutation_rate
            + (self.config.final_mutation_rate - self.config.initial_mutation_rate) * t
    }

    fn initialize_population(&mut self) -> Vec<Genome> {
        (0..self.config.population_size)
            .map(|_| weighted_genome(self.fitness.weights(), &mut self.rng))
            .collect()
    }

    fn create_next_generation(&mut self, evaluated: &[(Genome, f64)], mutation_rate: f64) -> Vec<Genome> {
        let size = self.config.population_size;
        let mut next_generation = Vec::with_capacity(size);

        // Elitism: copy top performers unmodified
        let elite_count = (size as f64 * self.config.elitism_rate) as usize;
        let mut sorted = evaluated.to_vec();
        sorted.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        next_generation.extend(sorted.iter().take(elite_count).map(|(g, _)| *g));

        while next_generation.len() < size {
            let parent1 = tournament_selection(evaluated, self.config.tournament_size, &mut self.rng);
            if self.rng.gen::<f64>() < self.config.crossover_rate {
                let parent2 = tournament_selection(evaluated, self.config.tournament_size, &mut self.rng);
                let (child1, child2) = crossover(&parent1, &parent2, &mut self.rng);

                next_generation.push(self.mutator.mutate(&child1, mutation_rate, &mut self.rng));
                if next_generation.len() < size {
                    next_generation.push(self.mutator.mutate(&child2, mutation_rate, &mut self.rng));
                }
            } else {
                next_generation.push(self.mutator.mutate(&parent1, mutation_rate, &mut self.rng));
            }
        }

        next_generation
    }

    pub fn get_hall_of_fame(&self) -> &HallOfFame {
        &self.hall_of_fame
    }
}

fn is_better(a: &Elite, b: &Elite) -> bool {
    a.fitness > b.fitness || (a.fitness == b.fitness && a.genome < b.genome)
}
