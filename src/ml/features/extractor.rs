use crate::config::FeatureConfig;
use crate::error::Result;
use crate::types::{NumberSet, HIGH_THRESHOLD, MAX_NUMBER};
use polars::prelude::*;
use serde::Serialize;

pub const FEATURE_COUNT: usize = 7;

pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "frequency",
    "skip",
    "position_tendency",
    "delta_compatibility",
    "parity",
    "magnitude",
    "trend",
];

/// Per-number feature row for one window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRecord {
    pub number: u8,
    pub frequency: f64,
    pub skip: u32,
    pub position_tendency: f64,
    pub delta_compatibility: f64,
    pub parity: u8,
    pub magnitude: u8,
    pub trend: f64,
}

impl FeatureRecord {
    pub fn to_vector(&self) -> [f64; FEATURE_COUNT] {
        [
            self.frequency,
            self.skip as f64,
            self.position_tendency,
            self.delta_compatibility,
            self.parity as f64,
            self.magnitude as f64,
            self.trend,
        ]
    }
}

/// 90 feature rows, one per number 1..=90 in order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureTable {
    records: Vec<FeatureRecord>,
}

impl FeatureTable {
    pub fn records(&self) -> &[FeatureRecord] {
        &self.records
    }

    pub fn get(&self, number: u8) -> Option<&FeatureRecord> {
        if number == 0 {
            return None;
        }
        self.records.get(number as usize - 1)
    }

    pub fn matrix(&self) -> Vec<[f64; FEATURE_COUNT]> {
        self.records.iter().map(FeatureRecord::to_vector).collect()
    }

    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let numbers: Vec<u32> = self.records.iter().map(|r| r.number as u32).collect();
        let mut columns = vec![Column::new("number".into(), numbers)];
        for (i, name) in FEATURE_NAMES.iter().enumerate() {
            let values: Vec<f64> = self.records.iter().map(|r| r.to_vector()[i]).collect();
            columns.push(Column::new((*name).into(), values));
        }
        Ok(DataFrame::new(columns)?)
    }
}

pub struct FeatureExtractor {
    config: FeatureConfig,
}

impl FeatureExtractor {
    pub fn new(config: FeatureConfig) -> Self {
        Self { config }
    }

    /// Features for every number given `history`, oldest first, ending at
    /// the draw just before the one being predicted.
    pub fn extract(&self, history: &[NumberSet]) -> FeatureTable {
        let lookback_start = history.len().saturating_sub(self.config.lookback);
        let recent = &history[lookback_start..];

        let mut appearances = [0u32; 91];
        for draw in recent {
            for n in draw.iter() {
                appearances[n as usize] += 1;
            }
        }

        let positions = self.position_tendencies(recent);
        let gap_profile = self.gap_profile(recent);
        let trend_start = recent.len().saturating_sub(self.config.trend_window);
        let trend_draws = &recent[trend_start..];

        let records = (1..=MAX_NUMBER)
            .map(|n| FeatureRecord {
                number: n,
                frequency: if recent.is_empty() {
                    0.0
                } else {
                    appearances[n as usize] as f64 / recent.len() as f64
                },
                skip: skip_of(history, n),
                position_tendency: positions[n as usize],
                delta_compatibility: self.delta_compatibility(n, &appearances, &gap_profile),
                parity: n % 2,
                magnitude: u8::from(n > HIGH_THRESHOLD),
                trend: trend_score(trend_draws, n),
            })
            .collect();

        FeatureTable { records }
    }

    fn position_tendencies(&self, recent: &[NumberSet]) -> [f64; 91] {
        let mut sums = [0.0f64; 91];
        let mut hits = [0u32; 91];
        for draw in recent {
            let members = draw.to_vec();
            let denom = members.len().saturating_sub(1).max(1) as f64;
            for (rank, &n) in members.iter().enumerate() {
                sums[n as usize] += rank as f64 / denom;
                hits[n as usize] += 1;
            }
        }
        let mut out = [0.5f64; 91];
        for n in 1..=MAX_NUMBER as usize {
            if hits[n] > 0 {
                out[n] = sums[n] / hits[n] as f64;
            }
        }
        out
    }

    /// Histogram of consecutive gaps inside the sorted panels of the last
    /// `delta_window` draws, plus the gap total.
    fn gap_profile(&self, recent: &[NumberSet]) -> (Vec<u32>, u32) {
        let start = recent.len().saturating_sub(self.config.delta_window);
        let mut counts = vec![0u32; MAX_NUMBER as usize + 1];
        let mut total = 0u32;
        for draw in &recent[start..] {
            let members = draw.to_vec();
            for pair in members.windows(2) {
                counts[(pair[1] - pair[0]) as usize] += 1;
                total += 1;
            }
        }
        (counts, total)
    }

    fn delta_compatibility(&self, n: u8, appearances: &[u32; 91], profile: &(Vec<u32>, u32)) -> f64 {
        let (gap_counts, total) = profile;
        let denom = *total as f64 + 1.0;
        let mut sum = 0.0;
        let mut entries = 0u32;
        for other in 1..=MAX_NUMBER {
            let seen = appearances[other as usize];
            if seen == 0 {
                continue;
            }
            let delta = n.abs_diff(other);
            if delta > self.config.max_delta {
                continue;
            }
            sum += seen as f64 * gap_counts[delta as usize] as f64 / denom;
            entries += seen;
        }
        if entries == 0 {
            0.0
        } else {
            sum / entries as f64
        }
    }
}

/// Draws since `n` last appeared; `history.len()` when it never did.
pub fn skip_of(history: &[NumberSet], n: u8) -> u32 {
    history
        .iter()
        .rev()
        .position(|d| d.contains(n))
        .unwrap_or(history.len()) as u32
}

/// `(second-half frequency - first-half frequency + 1) / 2`; 0.5 when fewer
/// than five draws are available.
pub fn trend_score(draws: &[NumberSet], n: u8) -> f64 {
    if draws.len() < 5 {
        return 0.5;
    }
    let half = draws.len() / 2;
    let (first, second) = draws.split_at(half);
    let freq = |part: &[NumberSet]| {
        part.iter().filter(|d| d.contains(n)).count() as f64 / (part.len() as f64 + 1.0)
    };
    (freq(second) - freq(first) + 1.0) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(numbers: &[u8]) -> NumberSet {
        NumberSet::from_slice(numbers)
    }

    #[test]
    fn test_basic_columns() {
        let history = vec![
            set(&[1, 2, 3, 4, 5]),
            set(&[1, 10, 20, 30, 40]),
            set(&[50, 60, 70, 80, 90]),
        ];
        let table = FeatureExtractor::new(FeatureConfig::default()).extract(&history);
        assert_eq!(table.records().len(), 90);

        let one = table.get(1).unwrap();
        assert!((one.frequency - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(one.skip, 1);
        assert_eq!(one.position_tendency, 0.0);
        assert_eq!(one.parity, 1);
        assert_eq!(one.magnitude, 0);
        assert_eq!(one.trend, 0.5);

        let ninety = table.get(90).unwrap();
        assert_eq!(ninety.skip, 0);
        assert_eq!(ninety.position_tendency, 1.0);
        assert_eq!(ninety.magnitude, 1);

        let never = table.get(89).unwrap();
        assert_eq!(never.skip, 3);
        assert_eq!(never.frequency, 0.0);
        assert_eq!(never.position_tendency, 0.5);
    }

    #[test]
    fn test_duplicates_collapse_before_extraction() {
        let with_dup = vec![NumberSet::from_slice(&[7, 7, 8, 9, 10])];
        let table = FeatureExtractor::new(FeatureConfig::default()).extract(&with_dup);
        assert_eq!(table.get(7).unwrap().frequency, 1.0);
        assert_eq!(table.get(7).unwrap().position_tendency, 0.0);
        assert_eq!(table.get(10).unwrap().position_tendency, 1.0);
    }

    #[test]
    fn test_trend_score_rising_number() {
        let mut draws = vec![set(&[1, 2, 3, 4, 5]); 5];
        draws.extend(vec![set(&[6, 7, 8, 9, 10]); 5]);
        let rising = trend_score(&draws, 6);
        let falling = trend_score(&draws, 1);
        assert!(rising > 0.5);
        assert!(falling < 0.5);
        assert!((rising - (5.0 / 6.0 + 1.0) / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_delta_compatibility_tracks_common_gaps() {
        // Every panel has consecutive gaps of 1, so numbers adjacent to
        // frequent ones score higher than distant ones.
        let history = vec![set(&[10, 11, 12, 13, 14]); 10];
        let table = FeatureExtractor::new(FeatureConfig::default()).extract(&history);
        let near = table.get(15).unwrap().delta_compatibility;
        let far = table.get(80).unwrap().delta_compatibility;
        assert!(near > 0.0);
        assert_eq!(far, 0.0);
    }

    #[test]
    fn test_dataframe_export() {
        let history = vec![set(&[1, 2, 3, 4, 5]); 3];
        let table = FeatureExtractor::new(FeatureConfig::default()).extract(&history);
        let df = table.to_dataframe().unwrap();
        assert_eq!(df.height(), 90);
        assert_eq!(df.width(), 8);
        let freq = df
            .column("frequency")
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .get(0);
        assert_eq!(freq, Some(1.0));
    }
}
