use crate::types::{NumberSet, PredictionSet, MAX_NUMBER, PICK_SIZE};
use serde::Serialize;

const FAVORITES: usize = 15;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionReport {
    /// Most frequent numbers at each sorted position, count desc then number asc.
    pub favorites: Vec<Vec<u8>>,
}

pub struct PositionAnalyzer;

impl PositionAnalyzer {
    pub fn analyze(draws: &[NumberSet]) -> PositionReport {
        let mut counts = vec![[0u32; MAX_NUMBER as usize + 1]; PICK_SIZE];
        for draw in draws {
            for (pos, n) in draw.iter().take(PICK_SIZE).enumerate() {
                counts[pos][n as usize] += 1;
            }
        }
        let favorites = counts
            .iter()
            .map(|c| {
                let mut seen: Vec<u8> = (1..=MAX_NUMBER).filter(|&n| c[n as usize] > 0).collect();
                seen.sort_by(|&a, &b| c[b as usize].cmp(&c[a as usize]).then(a.cmp(&b)));
                seen.truncate(FAVORITES);
                seen
            })
            .collect();
        PositionReport { favorites }
    }

    /// 0.15 per position hit in the top 5, 0.1 in the top 10, 0.05 below.
    pub fn validate(set: &PredictionSet, report: &PositionReport) -> f64 {
        let mut score: f64 = 0.0;
        for (pos, n) in set.numbers().iter().enumerate() {
            let Some(favorites) = report.favorites.get(pos) else {
                continue;
            };
            match favorites.iter().position(|f| f == n) {
                Some(rank) if rank < 5 => score += 0.15,
                Some(rank) if rank < 10 => score += 0.1,
                Some(_) => score += 0.05,
                None => {}
            }
        }
        score.min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_alignment() {
        let draws = vec![NumberSet::from_slice(&[3, 20, 40, 60, 88]); 4];
        let report = PositionAnalyzer::analyze(&draws);
        assert_eq!(report.favorites[0], vec![3]);
        assert_eq!(report.favorites[4], vec![88]);

        let aligned = PredictionSet::new(&[3, 20, 40, 60, 88]).unwrap();
        assert!((PositionAnalyzer::validate(&aligned, &report) - 0.75).abs() < 1e-12);
        let off = PredictionSet::new(&[4, 21, 41, 61, 89]).unwrap();
        assert_eq!(PositionAnalyzer::validate(&off, &report), 0.0);
    }
}
