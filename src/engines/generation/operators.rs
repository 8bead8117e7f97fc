use super::fitness::NumberWeights;
use super::genome::{canonical, has_run, Genome};
use crate::types::{NumberSet, MAX_NUMBER, PICK_SIZE};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

const MAX_WEIGHTED_DRAWS: usize = 50;

/// Tournament selection: pick best of K random candidates
pub fn tournament_selection<R: Rng>(
    population: &[(Genome, f64)],
    tournament_size: usize,
    rng: &mut R,
) -> Genome {
    let mut best_idx = rng.gen_range(0..population.len());
    let mut best_fitness = population[best_idx].1;

    for _ in 1..tournament_size {
        let idx = rng.gen_range(0..population.len());
        if population[idx].1 > best_fitness {
            best_idx = idx;
            best_fitness = population[idx].1;
        }
    }

    population[best_idx].0
}

/// Uniqueness-preserving crossover: a prefix of one parent followed by the
/// other parent's genes not yet present.
pub fn crossover<R: Rng>(parent1: &Genome, parent2: &Genome, rng: &mut R) -> (Genome, Genome) {
    let point = rng.gen_range(1..PICK_SIZE);
    let child1 = splice(&parent1[..point], parent2, rng);
    let child2 = splice(&parent2[..point], parent1, rng);
    (child1, child2)
}

fn splice<R: Rng>(prefix: &[u8], other: &Genome, rng: &mut R) -> Genome {
    let mut genes = prefix.to_vec();
    for &g in other {
        if genes.len() >= PICK_SIZE {
            break;
        }
        if !genes.contains(&g) {
            genes.push(g);
        }
    }
    repair(&genes, rng)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationMove {
    /// Any unused number.
    UniformReplace,
    /// Within `local_radius` of another member.
    LocalReplace,
    /// The member itself moved by up to `nearby_offset`.
    NearbyShift,
}

impl MutationMove {
    const ALL: [MutationMove; 3] = [
        MutationMove::UniformReplace,
        MutationMove::LocalReplace,
        MutationMove::NearbyShift,
    ];

    pub fn choose<R: Rng>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

pub struct Mutator {
    pub local_radius: u8,
    pub nearby_offset: u8,
}

impl Mutator {
    /// With probability `rate` replace one gene using a uniformly chosen move.
    pub fn mutate<R: Rng>(&self, genome: &Genome, rate: f64, rng: &mut R) -> Genome {
        if rng.gen::<f64>() >= rate {
            return *genome;
        }
        let mut genes = *genome;
        let idx = rng.gen_range(0..PICK_SIZE);

        genes[idx] = match MutationMove::choose(rng) {
            MutationMove::UniformReplace => {
                let taken = NumberSet::from_slice(&genes);
                random_unused(&taken, rng)
            }
            MutationMove::LocalReplace => {
                let anchor = genes[rng.gen_range(0..PICK_SIZE)];
                offset(anchor, self.local_radius.max(1), rng)
            }
            MutationMove::NearbyShift => offset(genes[idx], self.nearby_offset.max(1), rng),
        };
        repair(&genes, rng)
    }
}

fn offset<R: Rng>(n: u8, radius: u8, rng: &mut R) -> u8 {
    let d = rng.gen_range(1..=radius) as i16;
    let signed = if rng.gen::<bool>() { d } else { -d };
    (n as i16 + signed).clamp(1, MAX_NUMBER as i16) as u8
}

/// Five distinct numbers drawn in proportion to `weights`.
pub fn weighted_genome<R: Rng>(weights: &NumberWeights, rng: &mut R) -> Genome {
    let mut genes: Vec<u8> = Vec::with_capacity(PICK_SIZE);
    if let Ok(dist) = WeightedIndex::new(weights.for_numbers()) {
        for _ in 0..MAX_WEIGHTED_DRAWS {
            if genes.len() == PICK_SIZE {
                break;
            }
            let n = dist.sample(rng) as u8 + 1;
            if !genes.contains(&n) {
                genes.push(n);
            }
        }
    }
    repair(&genes, rng)
}

/// Valid genome from arbitrary genes: out-of-range and duplicate genes are
/// replaced and every run of three or more is broken.
pub fn repair<R: Rng>(genes: &[u8], rng: &mut R) -> Genome {
    let mut set = NumberSet::default();
    for &g in genes {
        if (1..=MAX_NUMBER).contains(&g) && set.len() < PICK_SIZE {
            set.insert(g);
        }
    }
    while set.len() < PICK_SIZE {
        let n = random_unused(&set, rng);
        set.insert(n);
    }

    // each pass isolates one run member, so at most PICK_SIZE passes
    for _ in 0..PICK_SIZE {
        let current = to_genome(&set);
        if !has_run(&current) {
            return current;
        }
        if let Some(middle) = first_run_middle(&current) {
            set.remove(middle);
            let n = isolated_unused(&set, rng);
            set.insert(n);
        }
    }
    to_genome(&set)
}

fn to_genome(set: &NumberSet) -> Genome {
    let mut genome = [0u8; PICK_SIZE];
    for (slot, n) in genome.iter_mut().zip(set.iter()) {
        *slot = n;
    }
    canonical(genome)
}

/// Second member of the first run of three consecutive integers.
fn first_run_middle(genome: &Genome) -> Option<u8> {
    genome
        .windows(3)
        .find(|w| w[1] == w[0] + 1 && w[2] == w[1] + 1)
        .map(|w| w[1])
}

fn random_unused<R: Rng>(taken: &NumberSet, rng: &mut R) -> u8 {
    let free: Vec<u8> = (1..=MAX_NUMBER).filter(|&n| !taken.contains(n)).collect();
    free[rng.gen_range(0..free.len())]
}

/// Unused number with neither neighbour taken, so it cannot join a run.
fn isolated_unused<R: Rng>(taken: &NumberSet, rng: &mut R) -> u8 {
    let free: Vec<u8> = (1..=MAX_NUMBER)
        .filter(|&n| !taken.contains(n) && !taken.contains(n - 1) && !taken.contains(n + 1))
        .collect();
    if free.is_empty() {
        return random_unused(taken, rng);
    }
    free[rng.gen_range(0..free.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn is_valid(g: &Genome) -> bool {
        let set = NumberSet::from_slice(g);
        set.len() == PICK_SIZE && g.iter().all(|&n| (1..=MAX_NUMBER).contains(&n)) && g.windows(2).all(|w| w[0] < w[1])
    }

    #[test]
    fn test_repair_breaks_runs_and_duplicates() {
        let mut rng = StdRng::seed_from_u64(7);
        for genes in [
            vec![1, 2, 3, 4, 5],
            vec![7, 7, 7, 7, 7],
            vec![88, 89, 90, 0, 95],
            vec![40, 41, 42, 60, 61],
            vec![],
        ] {
            let g = repair(&genes, &mut rng);
            assert!(is_valid(&g), "{:?} -> {:?}", genes, g);
            assert!(!has_run(&g), "{:?} -> {:?}", genes, g);
        }
    }

    #[test]
    fn test_repair_keeps_valid_genomes() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(repair(&[50, 3, 20, 71, 9], &mut rng), [3, 9, 20, 50, 71]);
    }

    #[test]
    fn test_crossover_children_are_valid() {
        let mut rng = StdRng::seed_from_u64(3);
        let a = [1, 10, 20, 30, 40];
        let b = [10, 20, 50, 60, 70];
        for _ in 0..50 {
            let (c1, c2) = crossover(&a, &b, &mut rng);
            assert!(is_valid(&c1) && is_valid(&c2));
            assert!(c1.iter().all(|n| a.contains(n) || b.contains(n)));
        }
    }

    #[test]
    fn test_mutation_always_yields_valid_genome() {
        let mut rng = StdRng::seed_from_u64(11);
        let mutator = Mutator {
            local_radius: 5,
            nearby_offset: 3,
        };
        let mut g = [1, 2, 44, 89, 90];
        for _ in 0..200 {
            g = mutator.mutate(&g, 1.0, &mut rng);
            assert!(is_valid(&g) && !has_run(&g));
        }
        let same = mutator.mutate(&[5, 15, 25, 35, 45], 0.0, &mut rng);
        assert_eq!(same, [5, 15, 25, 35, 45]);
    }

    #[test]
    fn test_tournament_prefers_fitter() {
        let mut rng = StdRng::seed_from_u64(5);
        let population = vec![([1, 3, 5, 7, 9], 0.1), ([2, 4, 6, 8, 10], 5.0)];
        let wins = (0..100)
            .filter(|_| tournament_selection(&population, 3, &mut rng) == [2, 4, 6, 8, 10])
            .count();
        assert!(wins > 70);
    }
}
