use crate::types::{NumberSet, PredictionSet, MAX_NUMBER, PICK_SIZE};
use serde::Serialize;

pub const ZONE_COUNT: usize = 9;
const RECENT_DRAWS: usize = 20;

/// Zone of a number: 1..=10 is zone 0, 81..=90 is zone 8.
pub fn zone_of(n: u8) -> usize {
    ((n.clamp(1, MAX_NUMBER) - 1) / 10) as usize
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneReport {
    pub zone_counts: [u32; ZONE_COUNT],
    pub zone_recent: [u32; ZONE_COUNT],
    /// Under-representation of each zone in the recent draws, 0 or more.
    pub due_scores: [f64; ZONE_COUNT],
    pub hot_zones: Vec<usize>,
    pub cold_zones: Vec<usize>,
}

pub struct ZoneAnalyzer;

impl ZoneAnalyzer {
    pub fn analyze(draws: &[NumberSet]) -> ZoneReport {
        let mut zone_counts = [0u32; ZONE_COUNT];
        let mut zone_recent = [0u32; ZONE_COUNT];
        let recent_start = draws.len().saturating_sub(RECENT_DRAWS);
        for (i, draw) in draws.iter().enumerate() {
            for n in draw.iter() {
                zone_counts[zone_of(n)] += 1;
                if i >= recent_start {
                    zone_recent[zone_of(n)] += 1;
                }
            }
        }

        let expected = (draws.len() * PICK_SIZE) as f64 / ZONE_COUNT as f64;
        let mut due_scores = [0.0; ZONE_COUNT];
        for (z, due) in due_scores.iter_mut().enumerate() {
            *due = ((expected - zone_recent[z] as f64) / (expected + 1.0)).max(0.0);
        }

        let mut by_recent: Vec<usize> = (0..ZONE_COUNT).collect();
        by_recent.sort_by(|&a, &b| zone_recent[b].cmp(&zone_recent[a]).then(a.cmp(&b)));
        let hot_zones = by_recent[..3].to_vec();
        by_recent.sort_by(|&a, &b| zone_recent[a].cmp(&zone_recent[b]).then(a.cmp(&b)));
        let cold_zones = by_recent[..3].to_vec();

        ZoneReport {
            zone_counts,
            zone_recent,
            due_scores,
            hot_zones,
            cold_zones,
        }
    }

    /// Distinct zones covered, over five.
    pub fn diversity(set: &PredictionSet) -> f64 {
        let mut seen = [false; ZONE_COUNT];
        for &n in set.numbers() {
            seen[zone_of(n)] = true;
        }
        seen.iter().filter(|&&s| s).count() as f64 / PICK_SIZE as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_boundaries() {
        assert_eq!(zone_of(1), 0);
        assert_eq!(zone_of(10), 0);
        assert_eq!(zone_of(11), 1);
        assert_eq!(zone_of(90), 8);
    }

    #[test]
    fn test_diversity_and_report() {
        let spread = PredictionSet::new(&[5, 15, 25, 35, 45]).unwrap();
        let packed = PredictionSet::new(&[1, 3, 5, 7, 9]).unwrap();
        assert_eq!(ZoneAnalyzer::diversity(&spread), 1.0);
        assert_eq!(ZoneAnalyzer::diversity(&packed), 0.2);

        let draws = vec![NumberSet::from_slice(&[1, 2, 3, 4, 85]); 9];
        let report = ZoneAnalyzer::analyze(&draws);
        assert_eq!(report.zone_counts[0], 36);
        assert_eq!(report.hot_zones[0], 0);
        assert_eq!(report.hot_zones[1], 8);
        assert!(report.due_scores[4] > 0.0);
        assert_eq!(report.due_scores[0], 0.0);
    }
}
