use crate::functions::primitives::{mean, std_dev};
use crate::types::{NumberSet, PredictionSet};
use serde::Serialize;

const COMMON_GAPS: usize = 10;
const LARGE_GAP: u8 = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapReport {
    /// `(gap, count)` by count desc then gap asc.
    pub common_gaps: Vec<(u8, u32)>,
    pub avg_gap: f64,
    pub std_gap: f64,
    pub min_gap: u8,
    pub max_gap: u8,
    pub ideal_range: (u8, u8),
}

pub struct GapAnalyzer;

impl GapAnalyzer {
    pub fn analyze(draws: &[NumberSet]) -> GapReport {
        let mut counts = [0u32; 91];
        let mut all = Vec::new();
        for draw in draws {
            for g in gaps(&draw.to_vec()) {
                counts[g as usize] += 1;
                all.push(g as f64);
            }
        }

        let mut common: Vec<(u8, u32)> = (1..=90u8)
            .filter(|&g| counts[g as usize] > 0)
            .map(|g| (g, counts[g as usize]))
            .collect();
        common.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        common.truncate(COMMON_GAPS);

        let avg_gap = mean(&all);
        let std_gap = std_dev(&all);
        let lower = (avg_gap - std_gap).max(1.0) as u8;
        let upper = (avg_gap + std_gap).max(0.0) as u8;

        GapReport {
            common_gaps: common,
            avg_gap,
            std_gap,
            min_gap: all.iter().map(|&g| g as u8).min().unwrap_or(0),
            max_gap: all.iter().map(|&g| g as u8).max().unwrap_or(0),
            ideal_range: (lower, upper),
        }
    }

    /// Plausibility of the set's internal gaps, 0..1.
    pub fn validate(set: &PredictionSet, report: &GapReport) -> f64 {
        let gaps = gaps(set.numbers());
        let (lo, hi) = report.ideal_range;
        let top = report.common_gaps.iter().map(|(_, c)| *c).max().unwrap_or(0);

        let mut score = 0.0;
        for &g in &gaps {
            if g >= lo && g <= hi {
                score += 0.15;
            }
            if let Some((_, c)) = report.common_gaps.iter().find(|(gap, _)| *gap == g) {
                score += 0.1 * *c as f64 / top.max(1) as f64;
            }
            if g == 1 {
                score -= 0.1;
            }
            if g > LARGE_GAP {
                score -= 0.1;
            }
        }
        score.clamp(0.0, 1.0)
    }
}

/// Consecutive differences of a sorted panel.
pub fn gaps(sorted: &[u8]) -> Vec<u8> {
    sorted.windows(2).map(|w| w[1] - w[0]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_and_validation() {
        let draws = vec![NumberSet::from_slice(&[10, 20, 30, 40, 50]); 5];
        let report = GapAnalyzer::analyze(&draws);
        assert_eq!(report.common_gaps, vec![(10, 20)]);
        assert_eq!(report.avg_gap, 10.0);
        assert_eq!(report.ideal_range, (10, 10));

        let matching = PredictionSet::new(&[1, 11, 21, 31, 41]).unwrap();
        // four gaps in range plus the common-gap bonus, capped at 1
        assert!(GapAnalyzer::validate(&matching, &report) > 0.99);

        let clumped = PredictionSet::new(&[1, 2, 3, 4, 90]).unwrap();
        assert_eq!(GapAnalyzer::validate(&clumped, &report), 0.0);
    }
}
