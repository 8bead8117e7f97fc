//! Deterministic heuristic strategy over hot, cold and recent numbers.

use crate::config::PatternConfig;
use crate::engines::analysis::{PatternSummary, POOL_SIZE};
use crate::engines::strategy::{Strategy, StrategyContext};
use crate::error::Result;
use crate::functions::ranking::{compare_scores, frequency_counts, pad_by_frequency};
use crate::types::{NumberSet, PredictionSet, StrategyKind, MAX_NUMBER, PICK_SIZE};

pub struct PatternMatcher {
    config: PatternConfig,
}

impl PatternMatcher {
    pub fn new(config: PatternConfig) -> Self {
        Self { config }
    }

    /// Candidate pool with scores, best first.
    pub fn score_pool(&self, draws: &[NumberSet]) -> Vec<(u8, f64)> {
        let summary = PatternSummary::from_window(draws);
        let recent_start = draws.len().saturating_sub(self.config.recent_window);
        let recent = &draws[recent_start..];

        let mut pool = NumberSet::default();
        for &n in summary.hot_numbers.iter().chain(&summary.cold_numbers) {
            pool.insert(n);
        }
        for draw in recent {
            for n in draw.iter() {
                pool.insert(n);
            }
        }

        let mut recent_winners = NumberSet::default();
        for n in recent.iter().flat_map(|d| d.iter()) {
            recent_winners.insert(n);
        }

        let mut scored: Vec<(u8, f64)> = pool
            .iter()
            .map(|n| (n, self.score(n, &summary, recent, draws, &recent_winners)))
            .collect();
        scored.sort_by(compare_scores);
        scored
    }

    fn score(
        &self,
        n: u8,
        summary: &PatternSummary,
        recent: &[NumberSet],
        draws: &[NumberSet],
        recent_winners: &NumberSet,
    ) -> f64 {
        let rank_scaled = |list: &[u8]| {
            list.iter()
                .position(|&x| x == n)
                .map(|rank| (POOL_SIZE - rank.min(POOL_SIZE)) as f64 / POOL_SIZE as f64)
                .unwrap_or(0.0)
        };

        let mut score = 0.0;
        if recent.iter().any(|d| d.contains(n)) {
            score += self.config.recent_winner_bonus;
        }
        score += self.config.hot_weight * rank_scaled(&summary.hot_numbers);
        score += self.config.cooccurrence_weight * cooccurrence(n, draws, recent_winners);
        score += self.config.due_weight * rank_scaled(&summary.cold_numbers);
        score
    }

    /// Full 90-number ranking: scored pool first, then frequency padding.
    pub fn ranking(&self, draws: &[NumberSet]) -> Vec<u8> {
        let mut ranked: Vec<u8> = self.score_pool(draws).into_iter().map(|(n, _)| n).collect();
        pad_by_frequency(&mut ranked, MAX_NUMBER as usize, &frequency_counts(draws));
        ranked
    }
}

/// Mean number of other recent winners drawn alongside `n`, per historical
/// appearance of `n`. Bounded by `PICK_SIZE - 1`.
fn cooccurrence(n: u8, draws: &[NumberSet], recent_winners: &NumberSet) -> f64 {
    let mut appearances = 0usize;
    let mut joint = 0usize;
    for draw in draws.iter().filter(|d| d.contains(n)) {
        appearances += 1;
        joint += draw
            .iter()
            .filter(|&m| m != n && recent_winners.contains(m))
            .count();
    }
    if appearances == 0 {
        0.0
    } else {
        joint as f64 / appearances as f64
    }
}

impl Strategy for PatternMatcher {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Pattern
    }

    fn data_requirement(&self, ctx: &StrategyContext) -> (usize, usize) {
        (self.config.min_draws, ctx.window.len())
    }

    fn predict(&self, ctx: &StrategyContext) -> Result<Vec<PredictionSet>> {
        self.check_minimum(ctx)?;
        ctx.deadline.check()?;

        let ranked = self.ranking(ctx.window.winning());
        let sets = (0..ctx.count.max(1))
            .take_while(|i| i + PICK_SIZE <= ranked.len())
            .map(|i| PredictionSet::new(&ranked[i..i + PICK_SIZE]))
            .collect::<Result<Vec<_>>>()?;

        if let Some(primary) = sets.first() {
            log::debug!("Pattern primary set {}", primary);
        }
        Ok(sets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_winners_dominate() {
        let mut draws: Vec<NumberSet> = (0..60u8)
            .map(|i| NumberSet::from_slice(&[i % 40 + 1, i % 40 + 41, 81, 82, 83]))
            .collect();
        draws.push(NumberSet::from_slice(&[7, 17, 27, 37, 88]));
        let ranked = PatternMatcher::new(PatternConfig::default()).ranking(&draws);
        assert_eq!(ranked.len(), 90);
        let top: NumberSet = NumberSet::from_slice(&ranked[..5]);
        // recent winners carry the largest bonus
        assert!(top.contains(81) && top.contains(82) && top.contains(83));
        let distinct = NumberSet::from_slice(&ranked);
        assert_eq!(distinct.len(), 90);
    }

    #[test]
    fn test_cooccurrence_separates_equal_recency() {
        let mut draws = Vec::new();
        // 20 has history with the recent winners 30..33, 21 with numbers that are
        // never drawn recently. Both appear the same number of times.
        for _ in 0..4 {
            draws.push(NumberSet::from_slice(&[20, 30, 31, 32, 33]));
            draws.push(NumberSet::from_slice(&[21, 60, 61, 62, 63]));
        }
        for i in 0..56u8 {
            draws.push(NumberSet::from_slice(&[1 + i % 15, 70, 71, 72, 73]));
        }
        draws.push(NumberSet::from_slice(&[20, 21, 30, 31, 32]));
        draws.push(NumberSet::from_slice(&[33, 80, 81, 82, 83]));

        let recent_start = draws.len() - PatternConfig::default().recent_window;
        let mut winners = NumberSet::default();
        for n in draws[recent_start..].iter().flat_map(|d| d.iter()) {
            winners.insert(n);
        }
        assert!(cooccurrence(20, &draws, &winners) > cooccurrence(21, &draws, &winners));

        let scores: Vec<(u8, f64)> = PatternMatcher::new(PatternConfig::default()).score_pool(&draws);
        let score_of = |n: u8| scores.iter().find(|(m, _)| *m == n).map(|(_, s)| *s).unwrap();
        assert!(score_of(20) > score_of(21));

        let flat = PatternMatcher::new(PatternConfig {
            cooccurrence_weight: 0.0,
            ..PatternConfig::default()
        })
        .score_pool(&draws);
        let flat_of = |n: u8| flat.iter().find(|(m, _)| *m == n).map(|(_, s)| *s).unwrap();
        assert!((flat_of(20) - flat_of(21)).abs() < 1e-12);
    }

    #[test]
    fn test_is_deterministic() {
        let draws: Vec<NumberSet> = (0..70u8)
            .map(|i| NumberSet::from_slice(&[(i * 3) % 90 + 1, (i * 5) % 90 + 1, (i * 7) % 90 + 1, (i * 11) % 90 + 1, (i * 13) % 90 + 1]))
            .collect();
        let matcher = PatternMatcher::new(PatternConfig::default());
        assert_eq!(matcher.ranking(&draws), matcher.ranking(&draws));
    }
}
