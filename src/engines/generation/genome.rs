//! Candidate representation for the genetic search.
//!
//! A genome is an unordered 5-subset of 1..=90 stored sorted ascending, so
//! equal subsets compare equal and can be deduplicated directly.

use crate::types::{NumberSet, PICK_SIZE};

pub type Genome = [u8; PICK_SIZE];

/// Sorted genome from exactly five numbers.
pub fn canonical(mut genes: Genome) -> Genome {
    genes.sort_unstable();
    genes
}

pub fn genome_from_set(set: &NumberSet) -> Option<Genome> {
    let numbers = set.to_vec();
    numbers.try_into().ok()
}

/// Pairs of members exactly one apart.
pub fn adjacent_pairs(genome: &Genome) -> usize {
    let sorted = canonical(*genome);
    sorted.windows(2).filter(|w| w[1] == w[0] + 1).count()
}

/// Length of the longest run of consecutive integers.
pub fn longest_run(genome: &Genome) -> usize {
    let sorted = canonical(*genome);
    let mut best = 1;
    let mut current = 1;
    for w in sorted.windows(2) {
        if w[1] == w[0] + 1 {
            current += 1;
            best = best.max(current);
        } else {
            current = 1;
        }
    }
    best
}

/// Three or more consecutive integers.
pub fn has_run(genome: &Genome) -> bool {
    longest_run(genome) >= 3
}

pub fn genome_sum(genome: &Genome) -> u32 {
    genome.iter().map(|&n| n as u32).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runs_and_adjacency() {
        assert_eq!(adjacent_pairs(&[1, 2, 10, 11, 50]), 2);
        assert!(!has_run(&[1, 2, 10, 11, 50]));
        assert!(has_run(&[50, 10, 11, 12, 80]));
        assert_eq!(longest_run(&[1, 2, 3, 4, 5]), 5);
        assert_eq!(genome_sum(&[1, 2, 3, 4, 5]), 15);
    }

    #[test]
    fn test_genome_from_set() {
        let set = NumberSet::from_slice(&[9, 3, 7, 1, 5]);
        assert_eq!(genome_from_set(&set), Some([1, 3, 5, 7, 9]));
        assert_eq!(genome_from_set(&NumberSet::from_slice(&[1, 2])), None);
    }
}
