use crate::types::{PredictionSet, MAX_NUMBER};
use serde::Serialize;
use std::cmp::Ordering;

/// Votes are compared at this resolution so that equal weight totals reached
/// in a different summation order still tie.
const VOTE_SCALE: f64 = 1e9;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoteEntry {
    pub number: u8,
    pub vote: f64,
    pub frequency: u32,
}

/// Per-number weighted votes across the primary sets of each strategy.
#[derive(Debug, Clone)]
pub struct VoteTally {
    votes: [f64; 91],
    frequencies: [u32; 91],
    ballots: usize,
}

impl VoteTally {
    /// `frequencies` are winning-panel appearances in the window, used to
    /// break vote ties.
    pub fn new(frequencies: [u32; 91]) -> Self {
        Self {
            votes: [0.0; 91],
            frequencies,
            ballots: 0,
        }
    }

    pub fn cast(&mut self, set: &PredictionSet, weight: f64) {
        for &n in set.numbers() {
            self.votes[n as usize] += weight;
        }
        self.ballots += 1;
    }

    pub fn vote(&self, n: u8) -> f64 {
        self.votes.get(n as usize).copied().unwrap_or(0.0)
    }

    pub fn ballots(&self) -> usize {
        self.ballots
    }

    /// All 90 numbers: vote desc, frequency desc, number asc.
    pub fn ranking(&self) -> Vec<u8> {
        let mut numbers: Vec<u8> = (1..=MAX_NUMBER).collect();
        numbers.sort_by(|&a, &b| self.compare(a, b));
        numbers
    }

    pub fn top(&self, k: usize) -> Vec<u8> {
        let mut top: Vec<u8> = self.ranking().into_iter().take(k).collect();
        top.sort_unstable();
        top
    }

    /// Numbers that received any vote, in ranking order.
    pub fn entries(&self) -> Vec<VoteEntry> {
        self.ranking()
            .into_iter()
            .filter(|&n| self.votes[n as usize] > 0.0)
            .map(|n| VoteEntry {
                number: n,
                vote: self.votes[n as usize],
                frequency: self.frequencies[n as usize],
            })
            .collect()
    }

    fn compare(&self, a: u8, b: u8) -> Ordering {
        let key = |n: u8| (self.votes[n as usize] * VOTE_SCALE).round() as i64;
        key(b)
            .cmp(&key(a))
            .then(self.frequencies[b as usize].cmp(&self.frequencies[a as usize]))
            .then(a.cmp(&b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weighted_vote_ranking() {
        let mut freq = [0u32; 91];
        freq[7] = 9;
        freq[8] = 3;
        let mut tally = VoteTally::new(freq);
        tally.cast(&PredictionSet::new(&[1, 2, 3, 4, 5]).unwrap(), 1.0);
        tally.cast(&PredictionSet::new(&[1, 2, 3, 7, 8]).unwrap(), 1.2);
        tally.cast(&PredictionSet::new(&[1, 2, 30, 40, 50]).unwrap(), 1.3);

        assert_eq!(tally.ballots(), 3);
        assert!((tally.vote(1) - 3.5).abs() < 1e-12);
        let ranking = tally.ranking();
        // 1, 2 at 3.5; 3 at 2.2; 30/40/50 at 1.3; 7 beats 8 on frequency
        assert_eq!(&ranking[..7], &[1, 2, 3, 30, 40, 50, 7]);
        assert_eq!(ranking[7], 8);
        assert_eq!(tally.top(5), vec![1, 2, 3, 30, 40]);
        assert_eq!(tally.entries().len(), 10);
    }

    #[test]
    fn test_equal_totals_from_different_weights_tie() {
        let mut freq = [0u32; 91];
        freq[60] = 5;
        let mut tally = VoteTally::new(freq);
        tally.cast(&PredictionSet::new(&[10, 20, 30, 40, 50]).unwrap(), 1.0);
        tally.cast(&PredictionSet::new(&[10, 20, 30, 40, 50]).unwrap(), 1.3);
        tally.cast(&PredictionSet::new(&[60, 61, 62, 63, 64]).unwrap(), 1.2);
        tally.cast(&PredictionSet::new(&[60, 61, 62, 63, 64]).unwrap(), 1.1);
        // 2.3 each way; 60 wins the tie on frequency
        assert_eq!(tally.ranking()[0], 60);
    }
}
