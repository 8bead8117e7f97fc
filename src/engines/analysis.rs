use crate::functions::primitives::{mean, mode, percentile, std_dev};
use crate::ml::features::skip_of;
use crate::types::{NumberSet, HIGH_THRESHOLD, MAX_NUMBER};
use serde::Serialize;

/// Draws summarised by [`PatternSummary::from_window`].
pub const SUMMARY_WINDOW: usize = 50;
/// Draws used to rank hot numbers.
pub const HOT_WINDOW: usize = 20;
/// Length of the hot and cold lists.
pub const POOL_SIZE: usize = 15;

/// Shape of the recent draw history shared by the heuristic strategies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternSummary {
    pub draws_analyzed: usize,
    pub sum_mean: f64,
    pub sum_std: f64,
    /// Typical sum range (25th to 75th percentile, truncated).
    pub sum_range: (u32, u32),
    pub even_mode: u8,
    pub high_mode: u8,
    /// Most frequent numbers of the last 20 draws, count desc then number asc.
    pub hot_numbers: Vec<u8>,
    /// Numbers with the largest skip, skip desc then number asc.
    pub cold_numbers: Vec<u8>,
    /// Skip per number inside the summary window, indexed by number.
    #[serde(skip)]
    pub skips: Vec<u32>,
}

impl PatternSummary {
    pub fn from_window(draws: &[NumberSet]) -> Self {
        let start = draws.len().saturating_sub(SUMMARY_WINDOW);
        let recent = &draws[start..];

        let sums: Vec<f64> = recent.iter().map(|d| panel_sum(d) as f64).collect();
        let evens: Vec<u8> = recent
            .iter()
            .map(|d| d.iter().filter(|n| n % 2 == 0).count() as u8)
            .collect();
        let highs: Vec<u8> = recent
            .iter()
            .map(|d| d.iter().filter(|&n| n > HIGH_THRESHOLD).count() as u8)
            .collect();

        let hot_start = recent.len().saturating_sub(HOT_WINDOW);
        let mut hot_counts = [0u32; 91];
        for draw in &recent[hot_start..] {
            for n in draw.iter() {
                hot_counts[n as usize] += 1;
            }
        }
        let mut hot: Vec<u8> = (1..=MAX_NUMBER).filter(|&n| hot_counts[n as usize] > 0).collect();
        hot.sort_by(|&a, &b| hot_counts[b as usize].cmp(&hot_counts[a as usize]).then(a.cmp(&b)));
        hot.truncate(POOL_SIZE);

        let mut skips = vec![0u32; MAX_NUMBER as usize + 1];
        for n in 1..=MAX_NUMBER {
            skips[n as usize] = skip_of(recent, n);
        }
        let mut cold: Vec<u8> = (1..=MAX_NUMBER).collect();
        cold.sort_by(|&a, &b| skips[b as usize].cmp(&skips[a as usize]).then(a.cmp(&b)));
        cold.truncate(POOL_SIZE);

        Self {
            draws_analyzed: recent.len(),
            sum_mean: mean(&sums),
            sum_std: std_dev(&sums),
            sum_range: (
                percentile(&sums, 25.0) as u32,
                percentile(&sums, 75.0) as u32,
            ),
            even_mode: mode(&evens).unwrap_or(0),
            high_mode: mode(&highs).unwrap_or(0),
            hot_numbers: hot,
            cold_numbers: cold,
            skips,
        }
    }

    pub fn skip(&self, n: u8) -> u32 {
        self.skips.get(n as usize).copied().unwrap_or(0)
    }

    /// Mean skip across all 90 numbers.
    pub fn mean_skip(&self) -> f64 {
        let total: u32 = (1..=MAX_NUMBER).map(|n| self.skip(n)).sum();
        total as f64 / MAX_NUMBER as f64
    }

    /// Skip within ±20% of the mean skip.
    pub fn is_due(&self, n: u8) -> bool {
        let avg = self.mean_skip();
        let skip = self.skip(n) as f64;
        skip >= 0.8 * avg && skip <= 1.2 * avg
    }

    pub fn sum_in_range(&self, sum: u32) -> bool {
        sum >= self.sum_range.0 && sum <= self.sum_range.1
    }
}

pub fn panel_sum(set: &NumberSet) -> u32 {
    set.iter().map(|n| n as u32).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_over_repeating_panels() {
        let mut draws = vec![NumberSet::from_slice(&[1, 2, 3, 4, 5]); 40];
        draws.extend(vec![NumberSet::from_slice(&[50, 60, 70, 80, 90]); 20]);
        let summary = PatternSummary::from_window(&draws);

        assert_eq!(summary.draws_analyzed, 50);
        assert_eq!(summary.hot_numbers, vec![50, 60, 70, 80, 90]);
        assert_eq!(summary.skip(50), 0);
        assert_eq!(summary.skip(1), 20);
        assert_eq!(summary.skip(6), 50);
        assert_eq!(summary.cold_numbers[0], 6);
        assert_eq!(summary.high_mode, 0);
        assert_eq!(summary.even_mode, 2);
        // 30 sums of 15 and 20 sums of 350
        assert_eq!(summary.sum_range.0, 15);
        assert_eq!(summary.sum_range.1, 350);
    }
}
